//! Create/edit dialog state machine.
//!
//! `Closed -> Open(Create) -> Submitting(Create) -> Closed` and
//! `Closed -> Open(Update(id)) -> Submitting(Update(id)) -> Closed`. A failed
//! save drops back to `Open` with the form untouched.

use chrono::{NaiveDate, NaiveTime};
use shared::{
    domain::{Appointment, AppointmentId, DoctorId, PatientId},
    protocol::AppointmentPayload,
};

use crate::{
    appointments::projection::{display_date, display_time},
    error::ViewError,
};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// Pending dialog values, kept as the raw strings the user typed or picked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditForm {
    pub doctor_id: String,
    pub patient_id: String,
    pub date: String,
    pub time: String,
}

impl EditForm {
    pub fn from_appointment(appointment: &Appointment) -> Self {
        Self {
            doctor_id: appointment.doctor_id.to_string(),
            patient_id: appointment.patient_id.to_string(),
            date: display_date(appointment.appointment_date_time),
            time: display_time(appointment.appointment_date_time),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.doctor_id.is_empty()
            && !self.patient_id.is_empty()
            && !self.date.is_empty()
            && !self.time.is_empty()
    }

    /// Builds the wire payload; the timestamp is `date + "T" + time + ":00"`.
    pub fn to_payload(&self) -> Result<AppointmentPayload, String> {
        let doctor_id = self
            .doctor_id
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("Doctor id '{}' is not a number", self.doctor_id))?;
        let patient_id = self
            .patient_id
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("Patient id '{}' is not a number", self.patient_id))?;
        let date = NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT)
            .map_err(|_| format!("Date '{}' must look like YYYY-MM-DD", self.date))?;
        let time = NaiveTime::parse_from_str(self.time.trim(), TIME_FORMAT)
            .map_err(|_| format!("Time '{}' must look like HH:MM", self.time))?;

        Ok(AppointmentPayload {
            doctor_id: DoctorId(doctor_id),
            patient_id: PatientId(patient_id),
            appointment_date_time: format!(
                "{}T{}:00",
                date.format(DATE_FORMAT),
                time.format(TIME_FORMAT)
            ),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTarget {
    Create,
    Update(AppointmentId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Closed,
    Open(SaveTarget),
    Submitting(SaveTarget),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub ticket: u64,
    pub target: SaveTarget,
    pub payload: AppointmentPayload,
}

#[derive(Debug, Default)]
pub struct EditSession {
    state: SessionState,
    form: EditForm,
    error: Option<ViewError>,
    last_ticket: u64,
}

impl EditSession {
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != SessionState::Closed
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, SessionState::Submitting(_))
    }

    pub fn target(&self) -> Option<SaveTarget> {
        match self.state {
            SessionState::Closed => None,
            SessionState::Open(target) | SessionState::Submitting(target) => Some(target),
        }
    }

    pub fn form(&self) -> &EditForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut EditForm {
        &mut self.form
    }

    /// Inline dialog error: a failed save or a malformed field.
    pub fn error(&self) -> Option<&ViewError> {
        self.error.as_ref()
    }

    pub fn open_for_create(&mut self) {
        self.state = SessionState::Open(SaveTarget::Create);
        self.form = EditForm::default();
        self.error = None;
    }

    pub fn open_for_edit(&mut self, appointment: &Appointment) {
        self.state = SessionState::Open(SaveTarget::Update(appointment.id));
        self.form = EditForm::from_appointment(appointment);
        self.error = None;
    }

    pub fn cancel(&mut self) {
        self.close();
    }

    /// Moves an open, valid session to `Submitting` and returns the request to issue.
    ///
    /// Returns `None` without side effects when closed, already submitting or
    /// when a field is empty. Malformed fields also return `None` but record an
    /// inline error.
    pub fn submit(&mut self) -> Option<SaveRequest> {
        let SessionState::Open(target) = self.state else {
            return None;
        };
        if !self.form.is_complete() {
            return None;
        }

        let payload = match self.form.to_payload() {
            Ok(payload) => payload,
            Err(reason) => {
                self.error = Some(ViewError::Invalid(reason));
                return None;
            }
        };

        self.last_ticket += 1;
        self.state = SessionState::Submitting(target);
        self.error = None;
        Some(SaveRequest {
            ticket: self.last_ticket,
            target,
            payload,
        })
    }

    fn owns(&self, ticket: u64) -> bool {
        self.is_submitting() && ticket == self.last_ticket
    }

    /// Closes the session if `ticket` is the save it is waiting on.
    pub fn complete_save(&mut self, ticket: u64) -> bool {
        if !self.owns(ticket) {
            return false;
        }
        self.close();
        true
    }

    /// Re-opens the session with the form preserved if `ticket` is the save it is waiting on.
    pub fn fail_save(&mut self, ticket: u64, error: ViewError) -> bool {
        if !self.owns(ticket) {
            return false;
        }
        if let SessionState::Submitting(target) = self.state {
            self.state = SessionState::Open(target);
        }
        self.error = Some(error);
        true
    }

    pub fn close(&mut self) {
        self.state = SessionState::Closed;
        self.form = EditForm::default();
        self.error = None;
    }
}
