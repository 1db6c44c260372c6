//! A basic service for testing the adapter end-to-end.

use crate::event::{ApiGatewayRequest, Event};
use crate::service::Service;
use async_trait::async_trait;
use lambda_runtime::Error;
use serde_json::{json, Value};
use tracing::info;

pub const NAME: &str = "hello";

pub const JSON_UTF_8: &str = "application/json; charset=utf-8";

/// Answers every request with the same JSON array.
pub struct HelloService {
    hello_data: Value,
}

impl Default for HelloService {
    fn default() -> Self {
        Self {
            hello_data: json!(["S1", "S2", "S3", "S4", "S5"]),
        }
    }
}

impl HelloService {
    pub fn new(hello_data: Value) -> Self {
        Self { hello_data }
    }

    pub fn hello_data(&self) -> &Value {
        &self.hello_data
    }
}

#[async_trait]
impl Service for HelloService {
    type Request = ApiGatewayRequest;

    async fn handle_event(&self, mut event: Event<ApiGatewayRequest>) -> Result<Option<Event<ApiGatewayRequest>>, Error> {
        info!("Hello invoked: {:?} {:?}", event.request.http_method, event.request.path);

        event
            .response
            .set_status_code(200)
            .set_body(self.hello_data.to_string())
            .set_media_type(JSON_UTF_8);

        Ok(Some(event))
    }
}
