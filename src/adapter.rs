use crate::config::Config;
use crate::envelope::normalize;
use crate::error::{AdapterError, Result};
use crate::properties::Properties;
use crate::sanitize::sanitize;
use crate::service::{Handler, Registry};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Drives a single invocation through normalization, materialization, dispatch and sanitization.
/// One instance lives for the lifetime of the process and is shared by all invocations.
#[derive(Clone)]
pub struct Adapter {
    handler: Arc<dyn Handler>,
    properties: Arc<Properties>,
}

impl Adapter {
    pub fn new(handler: Arc<dyn Handler>, properties: Arc<Properties>) -> Self {
        Self { handler, properties }
    }

    /// Resolves the configured service from the registry. Fails if the service is unknown.
    pub fn from_config<G: Registry>(config: &Config, registry: &G, properties: Arc<Properties>) -> Result<Self> {
        Ok(Self::new(registry.resolve(&config.service)?, properties))
    }

    /// Properties shared by all invocations of this process, e.g. `stage`.
    pub fn properties(&self) -> &Arc<Properties> {
        &self.properties
    }

    /// Runs the pipeline on an already parsed envelope and returns the sanitized response.
    /// The envelope must be a JSON object.
    pub async fn handle_message(&self, request: Value) -> Result<Map<String, Value>> {
        let raw: Map<String, Value> = serde_json::from_value(request).map_err(AdapterError::Deserialization)?;

        let canonical = normalize(raw);
        let response = self.handler.handle(canonical, &self.properties).await?;
        let response = serde_json::to_value(&response).map_err(AdapterError::Serialization)?;

        sanitize(response)
    }

    /// Reads the whole envelope from `input`, runs the pipeline and writes the sanitized JSON to `output`.
    /// Nothing is written if any step fails. `output` is shut down after a successful write
    /// and dropped on every path.
    pub async fn handle_request<R, W>(&self, mut input: R, mut output: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();
        input.read_to_end(&mut buf).await?;

        let request: Value = serde_json::from_slice(&buf).map_err(AdapterError::Deserialization)?;
        debug!("Request: {request}");

        let response = self.handle_message(request).await?;
        let response = serde_json::to_string(&response).map_err(AdapterError::Serialization)?;
        debug!("Response: {response}");

        output.write_all(response.as_bytes()).await?;
        output.flush().await?;
        output.shutdown().await?;

        Ok(())
    }
}
