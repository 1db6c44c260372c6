use envelope_lambda::config::{init_tracing, Config};
use envelope_lambda::properties::Properties;
use envelope_lambda::service::ServiceRegistry;
use envelope_lambda::Adapter;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use std::env::args;
use std::sync::Arc;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // there is no point starting without a service to dispatch to
    let config = Config::from_env()?;
    init_tracing(config.tracing_level);

    // shared by all invocations handled by this process
    let properties = Arc::new(Properties::new());
    let adapter = Adapter::from_config(&config, &ServiceRegistry::with_builtin(), properties)?;

    // run a single invocation from a local file if the file name is provided in the command line arguments
    if let Some(payload_file) = args().nth(1) {
        return run_local(&adapter, &payload_file).await;
    }

    info!("Waiting for invocations, service: {}", config.service);

    let adapter = &adapter;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        let (payload, ctx) = event.into_parts();
        debug!("Request ID: {}", ctx.request_id);

        match adapter.handle_message(payload).await {
            Ok(response) => Ok(Value::Object(response)),
            Err(e) => {
                error!("Invocation failed: {e}");
                Err(Error::from(e))
            }
        }
    }))
    .await
}

/// Reads the payload from `payload_file` and writes the sanitized response to stdout.
async fn run_local(adapter: &Adapter, payload_file: &str) -> Result<(), Error> {
    if payload_file == "--help" {
        println!("AWS Lambda envelope adapter.");
        println!("Set `service` env var to the name of the service to dispatch to, e.g. `export service=hello`.");
        println!();
        println!("Deployed to AWS: no params, invocations come from the Lambda runtime.");
        println!("Locally: envelope_lambda [payload_file], e.g. api_gateway_event.json");
        return Ok(());
    }

    info!("Payload from: {payload_file}");

    let input = tokio::fs::File::open(payload_file).await?;
    adapter.handle_request(input, tokio::io::stdout()).await?;
    println!();

    Ok(())
}
