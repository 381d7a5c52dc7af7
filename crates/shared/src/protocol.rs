use serde::{Deserialize, Serialize};

use crate::domain::{DoctorId, PatientId};

/// Body of both the create and the update appointment requests.
///
/// `appointment_date_time` travels as the literal `YYYY-MM-DDTHH:MM:00` string
/// assembled from the dialog's separate date and time fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPayload {
    pub doctor_id: DoctorId,
    pub patient_id: PatientId,
    pub appointment_date_time: String,
}

/// Serde adapter for the collaborator's zone-less timestamps.
pub mod local_date_time {
    use chrono::NaiveDateTime;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    const ACCEPTED_FORMATS: [&str; 3] = [WIRE_FORMAT, "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        ACCEPTED_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    }

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(WIRE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid local timestamp '{raw}'")))
    }
}
