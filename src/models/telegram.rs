use serde::Deserialize;

/// Inbound update envelope from the provider webhook. Deliberately partial:
/// only the members this service acts on are modeled, everything else in the
/// envelope is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUpdate {
    #[serde(default)]
    pub update_id: Option<i64>,
    #[serde(default)]
    pub pre_checkout_query: Option<PreCheckoutQuery>,
    #[serde(default)]
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreCheckoutQuery {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<TelegramUser>,
    #[serde(default)]
    pub successful_payment: Option<SuccessfulPayment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

/// The provider's asynchronous notice that funds were captured.
/// `total_amount` is in integer minor units; `invoice_payload` is the opaque
/// payload supplied at invoice creation, returned unmodified.
#[derive(Debug, Clone, Deserialize)]
pub struct SuccessfulPayment {
    pub total_amount: i64,
    pub currency: String,
    pub invoice_payload: String,
    #[serde(default)]
    pub order_info: Option<OrderInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderInfo {
    #[serde(default)]
    pub email: Option<String>,
}

/// Terminal classification of one inbound update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    PreCheckout,
    SuccessfulPayment,
    Unrecognized,
}

impl TelegramUpdate {
    pub fn classify(&self) -> UpdateKind {
        if self.pre_checkout_query.is_some() {
            UpdateKind::PreCheckout
        } else if self
            .message
            .as_ref()
            .is_some_and(|message| message.successful_payment.is_some())
        {
            UpdateKind::SuccessfulPayment
        } else {
            UpdateKind::Unrecognized
        }
    }
}
