use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// Order identity carried end-to-end inside the opaque invoice payload.
///
/// The frontend produces it at invoice-creation time; this service only ever
/// consumes it when the payment webhook arrives. `order_id` is the
/// idempotency key for payment recording and must round-trip through the
/// provider unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderContext {
    pub order_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_details: Option<BookingDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetails {
    #[serde(default)]
    pub specialist_id: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
}

impl OrderContext {
    /// Decodes the opaque payload text. Fails when the text is not JSON or
    /// carries no usable `orderId`.
    pub fn decode(payload: &str) -> Result<Self, ServiceError> {
        let context: OrderContext = serde_json::from_str(payload)
            .map_err(|err| ServiceError::UndecodableOrderId(err.to_string()))?;
        if context.order_id.trim().is_empty() {
            return Err(ServiceError::UndecodableOrderId(
                "empty orderId in invoice payload".to_string(),
            ));
        }
        Ok(context)
    }
}
