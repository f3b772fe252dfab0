use axum::extract::{Json, State};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::models::invoice::{InvoiceRequest, InvoiceWireRequest};

#[derive(Debug, Serialize, ToSchema)]
pub struct InvoiceLinkResponse {
    #[schema(example = "Invoice link created successfully")]
    pub message: String,
    #[schema(example = "https://t.me/invoice/xyz")]
    pub invoice_link: String,
}

/// Create a payment invoice link
#[utoipa::path(
    post,
    path = "/api/v1/invoices/link",
    request_body = InvoiceRequest,
    responses(
        (status = 200, description = "Invoice link created", body = InvoiceLinkResponse),
        (status = 400, description = "Missing or malformed fields", body = crate::errors::ErrorResponse),
        (status = 500, description = "Provider rejected the invoice or is unreachable", body = crate::errors::ErrorResponse)
    ),
    tag = "Invoices"
)]
pub async fn create_invoice_link(
    State(state): State<AppState>,
    Json(request): Json<InvoiceRequest>,
) -> Result<Json<InvoiceLinkResponse>, ServiceError> {
    request.validate_complete()?;
    let wire = InvoiceWireRequest::assemble(&request)?;
    let invoice_link = state.gateway.create_invoice_link(&wire).await?;
    info!(currency = %request.currency, "invoice link created");
    Ok(Json(InvoiceLinkResponse {
        message: "Invoice link created successfully".to_string(),
        invoice_link,
    }))
}
