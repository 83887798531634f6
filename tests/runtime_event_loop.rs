//! Triggered mode against a mock runtime API.

mod common;

use std::sync::Arc;

use common::{config_with, dispatcher, interruption, pubsub, scheduled, Recorder};
use spotswap::domain::models::NotificationAction;
use spotswap::infrastructure::lambda::{EventLoop, RuntimeApiClient};
use spotswap::{Action, RuntimeApiError};

const NEXT: &str = "/2018-06-01/runtime/invocation/next";

#[tokio::test]
async fn test_invocation_is_handled_and_acknowledged() {
    common::setup_test_logging();
    let mut server = mockito::Server::new_async().await;
    let next = server
        .mock("GET", NEXT)
        .with_status(200)
        .with_header("Lambda-Runtime-Aws-Request-Id", "req-42")
        .with_header("Lambda-Runtime-Deadline-Ms", "1700000000000")
        .with_body(pubsub(&interruption("i-0777", "eu-north-1")).to_string())
        .create_async()
        .await;
    let ack = server
        .mock("POST", "/2018-06-01/runtime/invocation/req-42/response")
        .match_body("null")
        .with_status(202)
        .create_async()
        .await;

    let recorder = Arc::new(Recorder::default());
    let dispatcher = dispatcher(config_with(|_| {}), &recorder);
    let client = RuntimeApiClient::new(&server.url()).unwrap();

    let action = EventLoop::new(&client, &dispatcher)
        .process_next()
        .await
        .unwrap();

    next.assert_async().await;
    ack.assert_async().await;
    assert!(matches!(action, Action::InvokeTermination { .. }));
    assert_eq!(
        recorder.terminations(),
        vec![("i-0777".to_string(), "eu-north-1".to_string(), NotificationAction::Auto)]
    );
}

#[tokio::test]
async fn test_dropped_event_is_still_acknowledged() {
    let mut server = mockito::Server::new_async().await;
    let _next = server
        .mock("GET", NEXT)
        .with_status(200)
        .with_header("Lambda-Runtime-Aws-Request-Id", "req-7")
        .with_body("definitely not an event")
        .create_async()
        .await;
    let ack = server
        .mock("POST", "/2018-06-01/runtime/invocation/req-7/response")
        .with_status(202)
        .create_async()
        .await;

    let recorder = Arc::new(Recorder::default());
    let dispatcher = dispatcher(config_with(|_| {}), &recorder);
    let client = RuntimeApiClient::new(&server.url()).unwrap();

    let action = EventLoop::new(&client, &dispatcher)
        .process_next()
        .await
        .unwrap();

    ack.assert_async().await;
    assert_eq!(action, Action::NoAction);
    assert_eq!(recorder.run_count(), 0);
}

#[tokio::test]
async fn test_loop_stops_when_runtime_api_fails() {
    let mut server = mockito::Server::new_async().await;
    let next = server
        .mock("GET", NEXT)
        .with_status(200)
        .with_header("Lambda-Runtime-Aws-Request-Id", "req-1")
        .with_body(scheduled("us-east-1").to_string())
        .expect(1)
        .create_async()
        .await;
    let _ack = server
        .mock("POST", "/2018-06-01/runtime/invocation/req-1/response")
        .with_status(500)
        .create_async()
        .await;

    let recorder = Arc::new(Recorder::default());
    let dispatcher = dispatcher(config_with(|_| {}), &recorder);
    let client = RuntimeApiClient::new(&server.url()).unwrap();

    let err = EventLoop::new(&client, &dispatcher).run().await.unwrap_err();

    next.assert_async().await;
    assert!(matches!(err, RuntimeApiError::UnexpectedStatus { status: 500, .. }));
    assert_eq!(recorder.run_count(), 1);
}
