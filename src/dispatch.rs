use crate::envelope::CanonicalEnvelope;
use crate::error::{AdapterError, Result};
use crate::event::{RequestEvent, ResponseEvent};
use crate::properties::{Properties, STAGE};
use crate::service::Service;
use serde_json::Value;
use tracing::debug;

/// Deserializes the canonical envelope into the request type the service expects.
pub fn materialize<R: RequestEvent>(canonical: CanonicalEnvelope) -> Result<R> {
    serde_json::from_value(canonical.into_value()).map_err(AdapterError::Deserialization)
}

/// Copies `requestContext.stage` into the process-wide properties, if the request has one.
/// String stages are stored as-is, anything else in its JSON text form.
pub fn populate_properties<R: RequestEvent>(request: &R, properties: &Properties) {
    let stage = match request.request_context().and_then(|ctx| ctx.get(STAGE)) {
        None | Some(Value::Null) => return,
        Some(Value::String(stage)) => stage.clone(),
        Some(other) => other.to_string(),
    };

    debug!("Stage: {stage}");
    properties.set(STAGE, stage);
}

/// Runs the request through the service and returns its response,
/// or an empty response if the service produced none.
pub async fn dispatch<S: Service>(service: &S, request: S::Request) -> Result<ResponseEvent> {
    let event = service.create_event(request);

    match service.handle_event(event).await.map_err(AdapterError::Handler)? {
        Some(event) => Ok(event.into_response()),
        None => {
            debug!("No response from the service, using an empty one");
            Ok(ResponseEvent::default())
        }
    }
}
