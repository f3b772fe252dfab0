//! Webhook processing flow: unconditional acknowledgment, exactly-once
//! payment recording, and best-effort provider calls.

mod common;

use common::{response_text, TestApp, TEST_BOT_TOKEN};
use rust_decimal_macros::dec;
use sea_orm::{ConnectionTrait, EntityTrait};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use paybridge_api::entities::payment_signal;

fn payment_update(order_payload: &str) -> Value {
    json!({
        "update_id": 100,
        "message": {
            "chat": {"id": 42},
            "from": {"id": 777, "username": "alice"},
            "successful_payment": {
                "total_amount": 5000,
                "currency": "USD",
                "invoice_payload": order_payload
            }
        }
    })
}

async fn mount_send_message(app: &TestApp) {
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", TEST_BOT_TOKEN)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": {"message_id": 1}
        })))
        .mount(&app.telegram)
        .await;
}

#[tokio::test]
async fn successful_payment_is_recorded_and_confirmed() {
    let app = TestApp::new().await;
    mount_send_message(&app).await;

    let response = app
        .post_json(
            "/api/v1/telegram/webhook",
            &payment_update("{\"orderId\":\"ord_1\"}"),
        )
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(response_text(response).await, "Webhook received");

    let signal = payment_signal::Entity::find_by_id("ord_1")
        .one(app.db.as_ref())
        .await
        .unwrap()
        .expect("payment signal recorded");
    assert_eq!(signal.amount, dec!(50.00));
    assert_eq!(signal.currency, "USD");
    assert_eq!(signal.status, "paid");
    assert_eq!(signal.chat_id, 42);
    assert_eq!(signal.telegram_username, "alice");

    // Confirmation is detached from the webhook path; wait for it.
    assert_eq!(app.wait_for_provider_calls("/sendMessage", 1).await, 1);
    let requests = app.provider_requests("/sendMessage").await;
    let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent["chat_id"], 42);
    assert!(sent["text"].as_str().unwrap().contains("Payment received"));
}

#[tokio::test]
async fn redelivery_is_idempotent() {
    let app = TestApp::new().await;
    mount_send_message(&app).await;

    let update = payment_update("{\"orderId\":\"ord_1\"}");
    let first = app.post_json("/api/v1/telegram/webhook", &update).await;
    assert_eq!(first.status(), 200);
    assert_eq!(app.wait_for_provider_calls("/sendMessage", 1).await, 1);

    let second = app.post_json("/api/v1/telegram/webhook", &update).await;
    assert_eq!(second.status(), 200);

    let signals = payment_signal::Entity::find()
        .all(app.db.as_ref())
        .await
        .unwrap();
    assert_eq!(signals.len(), 1, "redelivery must not create a second record");

    // Give a would-be duplicate confirmation time to show up, then confirm
    // it never did.
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(app.provider_requests("/sendMessage").await.len(), 1);
}

#[tokio::test]
async fn undecodable_payload_is_acknowledged_and_dropped() {
    let app = TestApp::new().await;
    mount_send_message(&app).await;

    let response = app
        .post_json("/api/v1/telegram/webhook", &payment_update("not json"))
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(response_text(response).await, "Webhook received");

    let signals = payment_signal::Entity::find()
        .all(app.db.as_ref())
        .await
        .unwrap();
    assert!(signals.is_empty());

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert!(app.provider_requests("/sendMessage").await.is_empty());
}

#[tokio::test]
async fn store_failure_is_still_acknowledged() {
    let app = TestApp::new().await;
    mount_send_message(&app).await;

    // Take the store down underneath the handler.
    app.db
        .execute_unprepared("DROP TABLE payment_signals")
        .await
        .expect("table dropped");

    let response = app
        .post_json(
            "/api/v1/telegram/webhook",
            &payment_update("{\"orderId\":\"ord_1\"}"),
        )
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(response_text(response).await, "Webhook received");

    // Nothing was recorded, so no confirmation may go out either.
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert!(app.provider_requests("/sendMessage").await.is_empty());
}

#[tokio::test]
async fn pre_checkout_query_is_answered_affirmatively() {
    let app = TestApp::new().await;
    Mock::given(method("POST"))
        .and(path(format!(
            "/bot{}/answerPreCheckoutQuery",
            TEST_BOT_TOKEN
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": true
        })))
        .expect(1)
        .mount(&app.telegram)
        .await;

    let response = app
        .post_json(
            "/api/v1/telegram/webhook",
            &json!({
                "update_id": 7,
                "pre_checkout_query": {
                    "id": "q1",
                    "currency": "USD",
                    "total_amount": 5000,
                    "invoice_payload": "{\"orderId\":\"ord_1\"}"
                }
            }),
        )
        .await;
    assert_eq!(response.status(), 200);

    let requests = app.provider_requests("/answerPreCheckoutQuery").await;
    let answer: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(answer["pre_checkout_query_id"], "q1");
    assert_eq!(answer["ok"], true);
}

#[tokio::test]
async fn pre_checkout_answer_failure_does_not_change_acknowledgment() {
    let app = TestApp::new().await;
    // No mock mounted: the answer call 404s against the mock server.
    let response = app
        .post_json(
            "/api/v1/telegram/webhook",
            &json!({"update_id": 8, "pre_checkout_query": {"id": "q2"}}),
        )
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(response_text(response).await, "Webhook received");
}

#[tokio::test]
async fn unrecognized_update_is_acknowledged_without_side_effects() {
    let app = TestApp::new().await;

    let response = app
        .post_json(
            "/api/v1/telegram/webhook",
            &json!({
                "update_id": 9,
                "message": {"chat": {"id": 1}, "text": "hello"}
            }),
        )
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(response_text(response).await, "Webhook received");

    assert!(app.telegram.received_requests().await.unwrap_or_default().is_empty());
    assert!(payment_signal::Entity::find()
        .all(app.db.as_ref())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn non_json_body_is_still_acknowledged() {
    let app = TestApp::new().await;

    let response = app
        .post_raw("/api/v1/telegram/webhook", "!!! not json !!!".to_string())
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(response_text(response).await, "Webhook received");
}
