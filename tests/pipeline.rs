use async_trait::async_trait;
use envelope_lambda::event::{ApiGatewayRequest, Event};
use envelope_lambda::properties::Properties;
use envelope_lambda::service::{Registry, Service, ServiceRegistry};
use envelope_lambda::{Adapter, AdapterError};
use serde_json::{json, Value};
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};

/// Returns the request body as the response body.
struct Echo;

#[async_trait]
impl Service for Echo {
    type Request = ApiGatewayRequest;

    async fn handle_event(
        &self,
        mut event: Event<ApiGatewayRequest>,
    ) -> Result<Option<Event<ApiGatewayRequest>>, lambda_runtime::Error> {
        let body = event.request.body.clone();
        event.response.set_status_code(200).set_body(body).set_media_type("text/plain");
        Ok(Some(event))
    }
}

/// A stream that breaks on the first read.
struct BrokenInput;

impl AsyncRead for BrokenInput {
    fn poll_read(self: Pin<&mut Self>, _cx: &mut Context<'_>, _buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::Error::new(io::ErrorKind::ConnectionReset, "stream closed")))
    }
}

/// Never answers.
struct Silent;

#[async_trait]
impl Service for Silent {
    type Request = ApiGatewayRequest;

    async fn handle_event(
        &self,
        _event: Event<ApiGatewayRequest>,
    ) -> Result<Option<Event<ApiGatewayRequest>>, lambda_runtime::Error> {
        Ok(None)
    }
}

fn adapter(name: &str) -> Adapter {
    let registry = ServiceRegistry::with_builtin().register("echo", Echo).register("silent", Silent);
    Adapter::new(registry.resolve(name).unwrap(), Arc::new(Properties::new()))
}

async fn invoke(adapter: &Adapter, input: &str) -> Result<Value, AdapterError> {
    let mut out = Vec::new();
    adapter.handle_request(input.as_bytes(), &mut out).await?;
    Ok(serde_json::from_slice(&out).unwrap())
}

#[tokio::test]
async fn api_gateway_request_through_hello() {
    let adapter = adapter("hello");
    let input = json!({
        "resource": "/hello",
        "path": "/hello",
        "httpMethod": "GET",
        "headers": {"Accept": "application/json"},
        "requestContext": {"stage": "dev", "requestId": "abc"},
        "isBase64Encoded": false,
        "body": null
    });

    let response = invoke(&adapter, &input.to_string()).await.unwrap();

    assert_eq!(
        response,
        json!({
            "statusCode": 200,
            "headers": {"Content-Type": "application/json; charset=utf-8"},
            "body": "[\"S1\",\"S2\",\"S3\",\"S4\",\"S5\"]"
        })
    );
    assert_eq!(adapter.properties().stage().as_deref(), Some("dev"));
}

#[tokio::test]
async fn http_body_reaches_the_service_as_bytes() {
    let adapter = adapter("echo");

    let response = invoke(&adapter, r#"{"isBase64Encoded": false, "body": "hello", "headers": {"a": "1"}}"#)
        .await
        .unwrap();

    assert_eq!(
        response,
        json!({"statusCode": 200, "headers": {"Content-Type": "text/plain"}, "body": "hello"})
    );
}

#[tokio::test]
async fn base64_flagged_body_is_decoded_when_materialized() {
    let adapter = adapter("echo");

    let response = invoke(&adapter, r#"{"isBase64Encoded": true, "body": "aGVsbG8="}"#).await.unwrap();

    assert_eq!(response["body"], "hello");
}

#[tokio::test]
async fn records_batch_drops_metadata() {
    let adapter = adapter("echo");
    let records = json!([{"eventSource": "aws:sqs", "body": "m1"}, {"eventSource": "aws:sqs", "body": "m2"}]);
    let input = json!({"Records": records, "requestContext": {"stage": "prod"}});

    let response = invoke(&adapter, &input.to_string()).await.unwrap();

    assert_eq!(response["body"], records.to_string());
    assert_eq!(adapter.properties().stage(), None);
}

#[tokio::test]
async fn raw_invocation_is_the_payload() {
    let adapter = adapter("echo");
    let input = json!({"command": "run"});

    let response = invoke(&adapter, &input.to_string()).await.unwrap();

    assert_eq!(response["body"], input.to_string());
}

#[tokio::test]
async fn no_response_gives_empty_object() {
    let adapter = adapter("silent");

    let response = invoke(&adapter, r#"{"body": "x"}"#).await.unwrap();

    assert_eq!(response, json!({}));
}

#[tokio::test]
async fn invalid_input_writes_nothing() {
    let adapter = adapter("echo");

    for input in ["not json", "[1, 2]", r#"{"body": "x", "path": 42}"#] {
        let mut out = Vec::new();
        let res = adapter.handle_request(input.as_bytes(), &mut out).await;

        assert!(matches!(res, Err(AdapterError::Deserialization(_))), "input: {input}");
        assert!(out.is_empty());
    }
}

#[tokio::test]
async fn stage_is_shared_across_invocations() {
    let adapter = adapter("echo");

    invoke(&adapter, r#"{"body": "", "requestContext": {"stage": "dev"}}"#).await.unwrap();
    invoke(&adapter, r#"{"body": "", "requestContext": {"stage": "prod"}}"#).await.unwrap();
    // no context, the previous value stays
    invoke(&adapter, r#"{"body": ""}"#).await.unwrap();

    assert_eq!(adapter.properties().stage().as_deref(), Some("prod"));
}

#[tokio::test]
async fn null_flag_and_header_values_are_accepted() {
    let adapter = adapter("echo");

    let response = invoke(&adapter, r#"{"body": "hi", "isBase64Encoded": null, "headers": {"X": null}}"#)
        .await
        .unwrap();

    assert_eq!(response["body"], "hi");
}

#[tokio::test]
async fn read_errors_propagate_unmodified_and_write_nothing() {
    let adapter = adapter("echo");
    let mut out = Vec::new();

    let res = adapter.handle_request(BrokenInput, &mut out).await;

    match res {
        Err(AdapterError::Io(e)) => {
            assert_eq!(e.kind(), io::ErrorKind::ConnectionReset);
            assert_eq!(e.to_string(), "stream closed");
        }
        _ => panic!("Expected an I/O error"),
    }
    assert!(out.is_empty());
}
