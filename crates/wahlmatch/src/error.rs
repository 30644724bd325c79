use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::dataset::DatasetError;
use crate::workflows::matching::{InvariantViolation, SessionError};
use crate::workflows::share::ShareError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Json(serde_json::Error),
    Dataset(DatasetError),
    Invariant(InvariantViolation),
    Session(SessionError),
    Share(ShareError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Json(err) => write!(f, "json error: {}", err),
            AppError::Dataset(err) => write!(f, "dataset error: {}", err),
            AppError::Invariant(err) => write!(f, "invariant violation: {}", err),
            AppError::Session(err) => write!(f, "session error: {}", err),
            AppError::Share(err) => write!(f, "share card error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Json(err) => Some(err),
            AppError::Dataset(err) => Some(err),
            AppError::Invariant(err) => Some(err),
            AppError::Session(err) => Some(err),
            AppError::Share(err) => Some(err),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Dataset(DatasetError::DataUnavailable { .. }) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Dataset(_) | AppError::Invariant(_) | AppError::Json(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Session(_) => StatusCode::CONFLICT,
            AppError::Share(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Config(_) | AppError::Telemetry(_) | AppError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<DatasetError> for AppError {
    fn from(value: DatasetError) -> Self {
        Self::Dataset(value)
    }
}

impl From<InvariantViolation> for AppError {
    fn from(value: InvariantViolation) -> Self {
        Self::Invariant(value)
    }
}

impl From<SessionError> for AppError {
    fn from(value: SessionError) -> Self {
        Self::Session(value)
    }
}

impl From<ShareError> for AppError {
    fn from(value: ShareError) -> Self {
        Self::Share(value)
    }
}
