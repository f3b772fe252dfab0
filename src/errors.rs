use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standard error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Bad Request", "Internal Server Error")
    #[schema(example = "Bad Request")]
    pub error: String,
    /// Human-readable error description
    #[schema(example = "Missing required field: title")]
    pub message: String,
    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// ISO 8601 timestamp when the error occurred
    #[schema(example = "2024-12-09T10:30:00.000Z")]
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid provider_data format: {0}")]
    MalformedProviderData(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Provider rejected the request: {0}")]
    ProviderRejected(String),

    #[error("Transport failure: {0}")]
    TransportFailure(String),

    #[error("Undecodable order identity in invoice payload: {0}")]
    UndecodableOrderId(String),

    #[error("Payment store unavailable: {0}")]
    StoreUnavailable(#[from] sea_orm::DbErr),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    /// Single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingField(_) | Self::MalformedProviderData(_) | Self::ValidationError(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::ProviderRejected(_)
            | Self::TransportFailure(_)
            | Self::UndecodableOrderId(_)
            | Self::StoreUnavailable(_)
            | Self::SerializationError(_)
            | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message suitable for HTTP responses. Internal errors return generic
    /// messages to avoid leaking implementation details; the provider's own
    /// rejection description passes through verbatim.
    pub fn response_message(&self) -> String {
        match self {
            Self::ProviderRejected(description) => description.clone(),
            Self::TransportFailure(_) => "Failed to create invoice link.".to_string(),
            Self::UndecodableOrderId(_)
            | Self::StoreUnavailable(_)
            | Self::SerializationError(_)
            | Self::InternalError(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            details: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        (status, Json(err)).into_response()
    }
}
