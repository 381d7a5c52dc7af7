//! Collaborator and view-level error types.

use shared::error::{ApiError, ApiException, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("collaborator returned HTTP {status}: {source}")]
    Status {
        status: u16,
        #[source]
        source: ApiException,
    },
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Transport { .. } => ErrorCode::Transport,
            Self::Status { source, .. } => source.code,
            Self::Decode { .. } => ErrorCode::Internal,
        }
    }
}

impl From<&ClientError> for ApiError {
    fn from(value: &ClientError) -> Self {
        match value {
            ClientError::Status { source, .. } => ApiError::new(source.code, source.message.clone()),
            other => ApiError::new(other.code(), other.to_string()),
        }
    }
}

/// Which mount-time collection a failed fetch belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchResource {
    Appointments,
    Doctors,
    Patients,
}

impl FetchResource {
    pub fn label(self) -> &'static str {
        match self {
            Self::Appointments => "appointments",
            Self::Doctors => "doctors",
            Self::Patients => "patients",
        }
    }
}

/// Failures converted into user-visible view state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewError {
    #[error("Failed to fetch {}", .resource.label())]
    Fetch {
        resource: FetchResource,
        detail: String,
    },
    #[error("Failed to save appointment")]
    Save { detail: String },
    #[error("Failed to delete appointment")]
    Delete { detail: String },
    #[error("{0}")]
    Invalid(String),
    #[error("Background worker unavailable: {0}")]
    Dispatch(String),
}

impl ViewError {
    pub fn detail(&self) -> &str {
        match self {
            Self::Fetch { detail, .. } | Self::Save { detail } | Self::Delete { detail } => detail,
            Self::Dispatch(reason) | Self::Invalid(reason) => reason,
        }
    }
}
