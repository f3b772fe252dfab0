use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::errors::ServiceError;

/// One line item forwarded verbatim to the provider. `amount` is in minor
/// currency units (cents).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LabeledPrice {
    pub label: String,
    pub amount: i64,
}

fn validate_currency(currency: &str) -> Result<(), ValidationError> {
    if currency.len() == 3 && currency.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("currency");
        err.message = Some("Currency must be a 3-letter ISO code".into());
        Err(err)
    }
}

/// Invoice-creation request as submitted by the storefront frontend.
///
/// `payload` is the opaque text the provider round-trips unmodified from
/// invoice creation through to the payment webhook; the frontend encodes the
/// order identity into it (see [`crate::models::order::OrderContext`]), and
/// this service never rewrites it.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "title": "Consultation",
    "description": "1h session",
    "payload": "{\"orderId\":\"ord_1\"}",
    "provider_token": "284685063:TEST:...",
    "currency": "USD",
    "prices": [{"label": "Fee", "amount": 5000}],
    "provider_data": {"receipt": {"items": [{"name": "Fee"}]}}
}))]
pub struct InvoiceRequest {
    // Required fields default to empty on deserialization so an absent field
    // surfaces as a named MissingField error rather than a decode failure.
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub payload: String,
    #[serde(default)]
    pub provider_token: String,
    #[serde(default)]
    #[validate(custom = "validate_currency")]
    pub currency: String,
    #[serde(default)]
    pub prices: Vec<LabeledPrice>,
    /// Receipt metadata for the payment provider. Accepted either as a
    /// structured object or as its pre-serialized text form.
    #[serde(default)]
    pub provider_data: Option<Value>,
}

impl InvoiceRequest {
    /// Checks required-field presence and structural well-formedness of
    /// `provider_data`. Pure; does not mutate the request.
    pub fn validate_complete(&self) -> Result<(), ServiceError> {
        let required: [(&str, bool); 5] = [
            ("title", self.title.trim().is_empty()),
            ("description", self.description.trim().is_empty()),
            ("payload", self.payload.trim().is_empty()),
            ("provider_token", self.provider_token.trim().is_empty()),
            ("currency", self.currency.trim().is_empty()),
        ];
        for (name, missing) in required {
            if missing {
                return Err(ServiceError::MissingField(name.to_string()));
            }
        }
        if self.prices.is_empty() {
            return Err(ServiceError::MissingField("prices".to_string()));
        }

        self.validate()?;

        if let Some(provider_data) = &self.provider_data {
            let decoded = decode_provider_data(provider_data)?;
            let items = decoded
                .get("receipt")
                .and_then(|receipt| receipt.get("items"))
                .and_then(Value::as_array);
            match items {
                Some(items) if !items.is_empty() => {}
                _ => {
                    return Err(ServiceError::MalformedProviderData(
                        "missing receipt or items".to_string(),
                    ))
                }
            }
        }
        Ok(())
    }
}

fn decode_provider_data(provider_data: &Value) -> Result<Value, ServiceError> {
    match provider_data {
        Value::String(text) => serde_json::from_str(text)
            .map_err(|err| ServiceError::MalformedProviderData(err.to_string())),
        other => Ok(other.clone()),
    }
}

/// Provider-facing invoice payload, matching the Bot API `createInvoiceLink`
/// field contract. `provider_data` is always the text-serialized form.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceWireRequest {
    pub title: String,
    pub description: String,
    pub payload: String,
    pub provider_token: String,
    pub currency: String,
    pub prices: Vec<LabeledPrice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_data: Option<String>,
}

impl InvoiceWireRequest {
    /// Builds the outbound request from a request that passed
    /// [`InvoiceRequest::validate_complete`]. All pass-through fields are
    /// copied verbatim; in particular the opaque `payload` is forwarded
    /// unchanged so the embedded order identity survives the provider
    /// round-trip.
    pub fn assemble(request: &InvoiceRequest) -> Result<Self, ServiceError> {
        let provider_data = match &request.provider_data {
            Some(Value::String(text)) => Some(text.clone()),
            Some(structured) => Some(
                serde_json::to_string(structured)
                    .map_err(|err| ServiceError::SerializationError(err.to_string()))?,
            ),
            None => None,
        };
        Ok(Self {
            title: request.title.clone(),
            description: request.description.clone(),
            payload: request.payload.clone(),
            provider_token: request.provider_token.clone(),
            currency: request.currency.clone(),
            prices: request.prices.clone(),
            provider_data,
        })
    }
}
