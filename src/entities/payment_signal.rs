use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Durable record of one captured payment. Written exactly once per order at
/// the first successful-payment delivery; never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_signals")]
pub struct Model {
    /// Order identity decoded from the invoice payload; doubles as the
    /// idempotency key for duplicate webhook deliveries.
    #[sea_orm(primary_key, auto_increment = false)]
    pub order_id: String,

    /// Destination chat for the confirmation message.
    pub chat_id: i64,

    pub telegram_user_id: i64,
    pub telegram_username: String,
    pub email: Option<String>,

    /// Major-unit amount (the provider reports integer minor units).
    pub amount: Decimal,
    pub currency: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
