use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Appointment, AppointmentId, DoctorSummary, PatientSummary},
    error::{ApiException, ErrorCode},
    protocol::AppointmentPayload,
};
use tracing::{debug, warn};

pub mod appointments;
pub mod config;
pub mod directory;
pub mod error;
pub mod sort;

pub use appointments::{
    edit_session::{EditForm, EditSession, SaveRequest, SaveTarget, SessionState},
    projection::{CalendarEvent, TableSortKey, ViewMode},
    view::AppointmentView,
    worker::{spawn_view_worker, ViewCommand, ViewEvent, ViewOutcome},
};
pub use error::{ClientError, ClientResult, FetchResource, ViewError};

/// The REST collaborator that owns patients, doctors and appointments.
#[async_trait]
pub trait SchedulingApi: Send + Sync {
    async fn list_appointments(&self) -> ClientResult<Vec<Appointment>>;
    async fn create_appointment(&self, payload: &AppointmentPayload) -> ClientResult<Appointment>;
    async fn update_appointment(
        &self,
        id: AppointmentId,
        payload: &AppointmentPayload,
    ) -> ClientResult<Appointment>;
    async fn delete_appointment(&self, id: AppointmentId) -> ClientResult<()>;
    async fn list_doctors(&self) -> ClientResult<Vec<DoctorSummary>>;
    async fn list_patients(&self) -> ClientResult<Vec<PatientSummary>>;
}

pub struct HttpSchedulingApi {
    http: Client,
    base_url: String,
}

impl HttpSchedulingApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = self.url(path);
        let res = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;
        decode_json(&url, ensure_success(res).await?).await
    }
}

async fn ensure_success(res: Response) -> ClientResult<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let code = ErrorCode::from_status(status.as_u16());
    let body = res.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body
    };
    warn!(status = status.as_u16(), ?code, "collaborator rejected request");
    Err(ClientError::Status {
        status: status.as_u16(),
        source: ApiException::new(code, message),
    })
}

async fn decode_json<T: DeserializeOwned>(url: &str, res: Response) -> ClientResult<T> {
    res.json::<T>().await.map_err(|source| ClientError::Decode {
        url: url.to_string(),
        source,
    })
}

#[async_trait]
impl SchedulingApi for HttpSchedulingApi {
    async fn list_appointments(&self) -> ClientResult<Vec<Appointment>> {
        let appointments: Vec<Appointment> = self.get_json("appointments").await?;
        debug!(count = appointments.len(), "fetched appointments");
        Ok(appointments)
    }

    async fn create_appointment(&self, payload: &AppointmentPayload) -> ClientResult<Appointment> {
        let url = self.url("appointments");
        let res = self
            .http
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;
        decode_json(&url, ensure_success(res).await?).await
    }

    async fn update_appointment(
        &self,
        id: AppointmentId,
        payload: &AppointmentPayload,
    ) -> ClientResult<Appointment> {
        let url = self.url(&format!("appointments/{}", id.0));
        let res = self
            .http
            .put(&url)
            .json(payload)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;
        decode_json(&url, ensure_success(res).await?).await
    }

    async fn delete_appointment(&self, id: AppointmentId) -> ClientResult<()> {
        let url = self.url(&format!("appointments/{}", id.0));
        let res = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;
        ensure_success(res).await?;
        Ok(())
    }

    async fn list_doctors(&self) -> ClientResult<Vec<DoctorSummary>> {
        self.get_json("doctors").await
    }

    async fn list_patients(&self) -> ClientResult<Vec<PatientSummary>> {
        self.get_json("patients").await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
