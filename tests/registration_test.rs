mod common;

use bookshelf_bot::infrastructure::lambda::handle_event;
use common::*;
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn lifecycle_event(request_type: &str, webhook_url: Option<&str>) -> Value {
    let mut event = json!({
        "RequestType": request_type,
        "ServiceToken": "arn:aws:lambda:eu-west-3:123456789012:function:provider",
        "ResponseURL": "https://cloudformation-custom-resource-response.s3.amazonaws.com/x",
        "StackId": "arn:aws:cloudformation:eu-west-3:123456789012:stack/bookshelf/1",
        "RequestId": "6b1a9c1e",
        "LogicalResourceId": "TelegramWebhook",
        "ResourceType": "Custom::TelegramWebhook",
        "ResourceProperties": {"ServiceToken": "arn:provider"}
    });
    if let Some(url) = webhook_url {
        event["ResourceProperties"]["WebhookUrl"] = json!(url);
    }
    if request_type != "Create" {
        event["PhysicalResourceId"] = json!("telegram-webhook");
    }
    event
}

async fn mount_ok(telegram: &MockServer, api_method: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(method_path(api_method)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": true})))
        .expect(expected_calls)
        .mount(telegram)
        .await;
}

#[tokio::test]
async fn test_create_registers_configured_url_and_publishes_index() {
    let telegram = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(method_path("setWebhook")))
        .and(body_json(json!({"url": "https://hook.lambda-url.eu-west-3.on.aws/"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": true})))
        .expect(1)
        .mount(&telegram)
        .await;

    let storage = Arc::new(MockStorageService::new());
    let handler = build_handler(test_config(&telegram), storage.clone());

    let response = handle_event(
        &handler,
        lifecycle_event("Create", Some("https://ignored.example.com/")),
    )
    .await
    .unwrap();

    assert_eq!(response["Status"], "SUCCESS");
    assert_eq!(response["PhysicalResourceId"], "telegram-webhook");
    assert_eq!(
        response["Data"]["WebhookUrl"],
        "https://hook.lambda-url.eu-west-3.on.aws/"
    );
    assert!(response.get("Reason").is_none());

    let index = storage.get("index.html").expect("initial index published");
    assert!(index.upload.content_type.starts_with("text/html"));
    assert_eq!(index.upload.cache_control.as_deref(), Some("max-age=300"));
    assert_eq!(
        index.upload.metadata.get("file-count").map(String::as_str),
        Some("0")
    );
    assert!(String::from_utf8(index.data).unwrap().contains("No files uploaded yet"));
    assert!(storage.get("error.html").is_some());
}

#[tokio::test]
async fn test_create_falls_back_to_event_url() {
    let telegram = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(method_path("setWebhook")))
        .and(body_json(json!({"url": "https://from-event.example.com/hook"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": true})))
        .expect(1)
        .mount(&telegram)
        .await;

    let mut config = test_config(&telegram);
    config.public_url = None;
    let handler = build_handler(config, Arc::new(MockStorageService::new()));

    let response = handle_event(
        &handler,
        lifecycle_event("Create", Some("https://from-event.example.com/hook")),
    )
    .await
    .unwrap();

    assert_eq!(response["Status"], "SUCCESS");
    assert_eq!(response["Data"]["WebhookUrl"], "https://from-event.example.com/hook");
}

#[tokio::test]
async fn test_rejected_registration_reports_failure() {
    let telegram = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(method_path("setWebhook")))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: bad webhook: HTTPS url must be provided for webhook"
        })))
        .expect(1)
        .mount(&telegram)
        .await;

    let handler = build_handler(test_config(&telegram), Arc::new(MockStorageService::new()));

    let response = handle_event(&handler, lifecycle_event("Update", None))
        .await
        .unwrap();

    assert_eq!(response["Status"], "FAILED");
    let reason = response["Reason"].as_str().unwrap();
    assert!(reason.contains("HTTPS url must be provided"), "{}", reason);
    assert!(!reason.contains(TOKEN));
    assert!(response.get("Data").is_none());
}

#[tokio::test]
async fn test_missing_url_fails_without_calling_telegram() {
    let telegram = MockServer::start().await;
    mount_ok(&telegram, "setWebhook", 0).await;

    let mut config = test_config(&telegram);
    config.public_url = None;
    let storage = Arc::new(MockStorageService::new());
    let handler = build_handler(config, storage.clone());

    let response = handle_event(&handler, lifecycle_event("Create", None))
        .await
        .unwrap();

    assert_eq!(response["Status"], "FAILED");
    assert!(storage.keys().is_empty());
}

#[tokio::test]
async fn test_update_does_not_touch_index() {
    let telegram = MockServer::start().await;
    mount_ok(&telegram, "setWebhook", 1).await;

    let storage = Arc::new(MockStorageService::new());
    let handler = build_handler(test_config(&telegram), storage.clone());

    let response = handle_event(&handler, lifecycle_event("Update", None))
        .await
        .unwrap();

    assert_eq!(response["Status"], "SUCCESS");
    assert!(storage.get("index.html").is_none());
}

#[tokio::test]
async fn test_delete_always_succeeds() {
    let telegram = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(method_path("deleteWebhook")))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .expect(1)
        .mount(&telegram)
        .await;

    let handler = build_handler(test_config(&telegram), Arc::new(MockStorageService::new()));

    let response = handle_event(&handler, lifecycle_event("Delete", None))
        .await
        .unwrap();

    assert_eq!(response["Status"], "SUCCESS");
    assert_eq!(response["PhysicalResourceId"], "telegram-webhook");
    assert_eq!(response["Data"]["Message"], "Webhook removed");
}

#[tokio::test]
async fn test_delete_removes_webhook() {
    let telegram = MockServer::start().await;
    mount_ok(&telegram, "deleteWebhook", 1).await;

    let handler = build_handler(test_config(&telegram), Arc::new(MockStorageService::new()));

    let response = handle_event(&handler, lifecycle_event("Delete", None))
        .await
        .unwrap();
    assert_eq!(response["Status"], "SUCCESS");
}
