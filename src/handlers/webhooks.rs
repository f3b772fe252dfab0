use axum::extract::State;
use axum::http::StatusCode;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::handlers::AppState;
use crate::models::telegram::{IncomingMessage, SuccessfulPayment, TelegramUpdate, UpdateKind};
use crate::services::notifier::ConfirmationNotifier;
use crate::services::payments::{PaymentRecorder, RecordOutcome};

/// Fixed plain-text acknowledgment body.
pub const WEBHOOK_ACK: &str = "Webhook received";

/// Receive a provider webhook update
///
/// Always acknowledges with 200: the provider redelivers on missing or slow
/// acknowledgment, not on semantic failure, so a non-200 here would only
/// cause duplicate delivery storms. Processing failures are observable
/// through logs, never through the response.
#[utoipa::path(
    post,
    path = "/api/v1/telegram/webhook",
    request_body = String,
    responses(
        (status = 200, description = "Update acknowledged")
    ),
    tag = "Webhooks"
)]
pub async fn telegram_webhook(
    State(state): State<AppState>,
    body: String,
) -> (StatusCode, &'static str) {
    let update: TelegramUpdate = match serde_json::from_str(&body) {
        Ok(update) => update,
        Err(err) => {
            warn!(%err, "undecodable webhook envelope, acknowledging anyway");
            return (StatusCode::OK, WEBHOOK_ACK);
        }
    };
    debug!(update_id = ?update.update_id, kind = ?update.classify(), "webhook update received");

    if let Some(query) = &update.pre_checkout_query {
        // The provider expects an answer within a short deadline; a failure
        // here is logged but must not change the acknowledgment.
        if let Err(err) = state.gateway.answer_pre_checkout(&query.id).await {
            error!(query_id = %query.id, %err, "failed to answer pre-checkout query");
        }
    }

    if let Some(message) = &update.message {
        if let Some(payment) = &message.successful_payment {
            process_successful_payment(&state, message, payment).await;
        }
    }

    if update.classify() == UpdateKind::Unrecognized {
        debug!("unrecognized update, nothing to do");
    }

    (StatusCode::OK, WEBHOOK_ACK)
}

async fn process_successful_payment(
    state: &AppState,
    message: &IncomingMessage,
    payment: &SuccessfulPayment,
) {
    let recorder = PaymentRecorder::new(state.db.clone());
    match recorder.record(message, payment).await {
        Ok(RecordOutcome::Created { signal, booking }) => {
            ConfirmationNotifier::new(Arc::clone(&state.gateway))
                .notify_detached(signal.chat_id, booking);
        }
        Ok(RecordOutcome::AlreadyRecorded) => {
            info!(chat_id = message.chat.id, "duplicate payment delivery ignored");
        }
        Err(err @ crate::errors::ServiceError::UndecodableOrderId(_)) => {
            // No redelivery channel exists for this failure; the event is
            // dropped after logging.
            error!(chat_id = message.chat.id, %err, "payment event dropped");
        }
        Err(err) => {
            error!(
                chat_id = message.chat.id,
                %err,
                "payment signal not recorded; paid order has no durable record"
            );
        }
    }
}
