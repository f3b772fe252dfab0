use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set, SqlErr, TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::entities::payment_signal;
use crate::errors::ServiceError;
use crate::models::order::{BookingDetails, OrderContext};
use crate::models::telegram::{IncomingMessage, SuccessfulPayment};

/// The only status this pipeline ever writes.
pub const STATUS_PAID: &str = "paid";

/// Sentinels for absent payer identity fields. Explicit values, so a missing
/// field is a visible policy rather than an incidental fallback.
pub const UNKNOWN_USERNAME: &str = "Unknown";
pub const UNKNOWN_USER_ID: i64 = 0;

/// Outcome of one recording attempt.
#[derive(Debug)]
pub enum RecordOutcome {
    /// This delivery created the record; the confirmation message is owed.
    Created {
        signal: payment_signal::Model,
        booking: Option<BookingDetails>,
    },
    /// A previous delivery already committed this order. No write happened.
    AlreadyRecorded,
}

/// Commits one payment signal per order, exactly once, no matter how many
/// times the provider delivers the same successful-payment notice.
///
/// The store transaction is the sole dedup mechanism. The service runs
/// stateless per invocation, so an in-memory cache would not survive across
/// deliveries; only the store's atomicity can arbitrate a race.
pub struct PaymentRecorder {
    db: Arc<DatabaseConnection>,
}

impl PaymentRecorder {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Builds the durable record from a webhook event, resolving every
    /// absent payer field to its explicit sentinel. `total_amount` arrives
    /// in integer minor units and is stored as a major-unit decimal.
    pub fn build_signal(
        order_id: &str,
        message: &IncomingMessage,
        payment: &SuccessfulPayment,
    ) -> payment_signal::Model {
        let from = message.from.as_ref();
        payment_signal::Model {
            order_id: order_id.to_string(),
            chat_id: message.chat.id,
            telegram_user_id: from.map_or(UNKNOWN_USER_ID, |user| user.id),
            telegram_username: from
                .and_then(|user| user.username.clone())
                .unwrap_or_else(|| UNKNOWN_USERNAME.to_string()),
            email: payment
                .order_info
                .as_ref()
                .and_then(|info| info.email.clone()),
            amount: Decimal::new(payment.total_amount, 2),
            currency: payment.currency.clone(),
            status: STATUS_PAID.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Decodes the order identity from the opaque payload and commits the
    /// payment signal through a conditional transaction: read by key, write
    /// only if absent. A racing duplicate that slips past the read loses at
    /// the primary key instead and is reported as already recorded.
    #[instrument(skip(self, message, payment), fields(chat_id = message.chat.id))]
    pub async fn record(
        &self,
        message: &IncomingMessage,
        payment: &SuccessfulPayment,
    ) -> Result<RecordOutcome, ServiceError> {
        let context = OrderContext::decode(&payment.invoice_payload)?;
        let signal = Self::build_signal(&context.order_id, message, payment);

        let txn = self.db.begin().await?;
        let existing = payment_signal::Entity::find_by_id(context.order_id.as_str())
            .one(&txn)
            .await?;
        if existing.is_some() {
            txn.commit().await?;
            info!(order_id = %context.order_id, "payment signal already recorded");
            return Ok(RecordOutcome::AlreadyRecorded);
        }

        let active = payment_signal::ActiveModel {
            order_id: Set(signal.order_id.clone()),
            chat_id: Set(signal.chat_id),
            telegram_user_id: Set(signal.telegram_user_id),
            telegram_username: Set(signal.telegram_username.clone()),
            email: Set(signal.email.clone()),
            amount: Set(signal.amount),
            currency: Set(signal.currency.clone()),
            status: Set(signal.status.clone()),
            created_at: Set(signal.created_at),
        };
        match active.insert(&txn).await {
            Ok(inserted) => {
                txn.commit().await?;
                info!(order_id = %inserted.order_id, amount = %inserted.amount, "payment signal recorded");
                Ok(RecordOutcome::Created {
                    signal: inserted,
                    booking: context.booking_details,
                })
            }
            Err(err) if is_unique_violation(&err) => {
                txn.rollback().await?;
                info!(order_id = %context.order_id, "lost recording race, payment signal already recorded");
                Ok(RecordOutcome::AlreadyRecorded)
            }
            Err(err) => {
                let _ = txn.rollback().await;
                Err(err.into())
            }
        }
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
