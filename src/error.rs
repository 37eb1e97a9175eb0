use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ErrorBody;

/// Message returned to callers for every 500-class failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Error interno del servidor";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Provider error: {0}")]
    Provider(String),
    #[error("Generation {generation_id} returned no image after {attempts} polling attempts")]
    Timeout {
        generation_id: String,
        attempts: u32,
    },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Message safe to hand back to an HTTP caller.
    pub fn public_message(&self) -> String {
        match self {
            GatewayError::BadRequest(msg)
            | GatewayError::Unauthorized(msg)
            | GatewayError::Forbidden(msg) => msg.clone(),
            GatewayError::Provider(_)
            | GatewayError::Timeout { .. }
            | GatewayError::Config(_)
            | GatewayError::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => GatewayError::Provider(format!("HTTP {}: {}", status, err)),
            None => GatewayError::Provider(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Provider(format!("Malformed provider payload: {}", err))
    }
}

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            GatewayError::Forbidden(_) => StatusCode::FORBIDDEN,
            GatewayError::Provider(_)
            | GatewayError::Timeout { .. }
            | GatewayError::Config(_)
            | GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        } else {
            log::warn!("Request rejected ({}): {}", status.as_u16(), self);
        }

        HttpResponse::build(status).json(ErrorBody {
            error: self.public_message(),
        })
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
