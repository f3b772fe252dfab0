use std::sync::Arc;
use tracing::error;

use crate::gateway::BotApi;
use crate::models::order::BookingDetails;

/// Placeholder rendered for booking fields the order context did not carry.
pub const NOT_SPECIFIED: &str = "not specified";

/// Sends the human-readable payment confirmation back to the originating
/// chat. Strictly downstream of the recording transaction: a delivery
/// failure is logged and never re-triggers or rolls back the commit.
pub struct ConfirmationNotifier {
    gateway: Arc<dyn BotApi>,
}

impl ConfirmationNotifier {
    pub fn new(gateway: Arc<dyn BotApi>) -> Self {
        Self { gateway }
    }

    /// Fixed confirmation template. Missing booking fields render as an
    /// explicit placeholder instead of being omitted.
    pub fn confirmation_text(booking: Option<&BookingDetails>) -> String {
        let field = |value: Option<&String>| {
            value
                .map(String::as_str)
                .unwrap_or(NOT_SPECIFIED)
                .to_string()
        };
        let (specialist, date, time) = match booking {
            Some(details) => (
                field(details.specialist_id.as_ref()),
                field(details.date.as_ref()),
                field(details.time.as_ref()),
            ),
            None => (
                NOT_SPECIFIED.to_string(),
                NOT_SPECIFIED.to_string(),
                NOT_SPECIFIED.to_string(),
            ),
        };
        format!(
            "Payment received! Your booking is confirmed.\nSpecialist: {specialist}\nDate: {date}\nTime: {time}"
        )
    }

    pub async fn notify(
        &self,
        chat_id: i64,
        booking: Option<&BookingDetails>,
    ) -> Result<(), crate::errors::ServiceError> {
        let text = Self::confirmation_text(booking);
        self.gateway.send_message(chat_id, &text).await
    }

    /// Detached best-effort send: the result is logged, never joined back
    /// into the webhook's processing path.
    pub fn notify_detached(&self, chat_id: i64, booking: Option<BookingDetails>) {
        let gateway = self.gateway.clone();
        tokio::spawn(async move {
            let text = Self::confirmation_text(booking.as_ref());
            if let Err(err) = gateway.send_message(chat_id, &text).await {
                error!(chat_id, %err, "confirmation message delivery failed");
            }
        });
    }
}
