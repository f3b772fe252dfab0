use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::errors::ServiceError;
use crate::models::invoice::InvoiceWireRequest;

/// The three provider operations this service depends on. Behind a trait so
/// handlers and services can run against a test double.
#[async_trait]
pub trait BotApi: Send + Sync {
    /// Returns the invoice link URL on success.
    async fn create_invoice_link(&self, request: &InvoiceWireRequest)
        -> Result<String, ServiceError>;

    /// Answers a pre-checkout query affirmatively. No price or stock
    /// re-validation happens here; every query is accepted.
    async fn answer_pre_checkout(&self, query_id: &str) -> Result<(), ServiceError>;

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), ServiceError>;
}

/// Bot API response envelope shared by every method. The optional members
/// stay plain `Option`s (no serde default) so the derived impl does not pick
/// up a `T: Default` bound that the generic call path cannot satisfy.
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

/// Thin reqwest wrapper around the Telegram Bot API.
pub struct TelegramGateway {
    client: reqwest::Client,
    api_base: String,
    bot_token: String,
}

impl TelegramGateway {
    pub fn new(api_base: impl Into<String>, bot_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            api_base: api_base.into(),
            bot_token: bot_token.into(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.api_base.trim_end_matches('/'),
            self.bot_token,
            method
        )
    }

    /// Posts one Bot API method call and unwraps the `{ok, result,
    /// description}` envelope. A rejected call carries the provider's own
    /// description; anything that prevents reading the envelope at all is a
    /// transport failure.
    async fn call<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(|err| ServiceError::TransportFailure(err.to_string()))?;

        let status = response.status();
        let envelope: ApiEnvelope<T> = response
            .json()
            .await
            .map_err(|err| ServiceError::TransportFailure(format!("{status}: {err}")))?;

        if envelope.ok {
            envelope.result.ok_or_else(|| {
                ServiceError::TransportFailure("provider response missing result".to_string())
            })
        } else {
            Err(ServiceError::ProviderRejected(
                envelope
                    .description
                    .unwrap_or_else(|| "provider rejected the request".to_string()),
            ))
        }
    }
}

#[async_trait]
impl BotApi for TelegramGateway {
    #[instrument(skip(self, request), fields(currency = %request.currency))]
    async fn create_invoice_link(
        &self,
        request: &InvoiceWireRequest,
    ) -> Result<String, ServiceError> {
        let link: String = self.call("createInvoiceLink", request).await?;
        debug!("invoice link created");
        Ok(link)
    }

    #[instrument(skip(self))]
    async fn answer_pre_checkout(&self, query_id: &str) -> Result<(), ServiceError> {
        let _: Value = self
            .call(
                "answerPreCheckoutQuery",
                &json!({ "pre_checkout_query_id": query_id, "ok": true }),
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self, text))]
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), ServiceError> {
        let _: Value = self
            .call("sendMessage", &json!({ "chat_id": chat_id, "text": text }))
            .await?;
        Ok(())
    }
}
