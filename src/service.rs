use crate::dispatch::{dispatch, materialize, populate_properties};
use crate::envelope::CanonicalEnvelope;
use crate::error::{AdapterError, Result};
use crate::event::{Event, RequestEvent, ResponseEvent};
use crate::properties::Properties;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Application logic behind the adapter.
#[async_trait]
pub trait Service: Send + Sync + 'static {
    /// The type the canonical envelope is deserialized into before it reaches the service
    type Request: RequestEvent;

    /// Wraps the request into the event the service processes.
    fn create_event(&self, request: Self::Request) -> Event<Self::Request> {
        Event::new(request)
    }

    /// Processes the event and returns it with the response filled in.
    /// `None` means the service has nothing to say and an empty response is sent back.
    async fn handle_event(&self, event: Event<Self::Request>) -> std::result::Result<Option<Event<Self::Request>>, lambda_runtime::Error>;
}

/// A [Service] with its request type erased so it can be looked up by name at runtime.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Materializes the canonical envelope into the service's request type and dispatches it.
    async fn handle(&self, canonical: CanonicalEnvelope, properties: &Properties) -> Result<ResponseEvent>;
}

#[async_trait]
impl<S: Service> Handler for S {
    async fn handle(&self, canonical: CanonicalEnvelope, properties: &Properties) -> Result<ResponseEvent> {
        let request = materialize::<S::Request>(canonical)?;
        populate_properties(&request, properties);
        dispatch(self, request).await
    }
}

/// Resolves a service by the name given in the lambda environment.
pub trait Registry {
    fn resolve(&self, name: &str) -> Result<Arc<dyn Handler>>;
}

/// A name -> service map populated at startup.
#[derive(Default)]
pub struct ServiceRegistry {
    services: HashMap<String, Arc<dyn Handler>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with all services shipped with this crate.
    pub fn with_builtin() -> Self {
        Self::new().register(crate::services::hello::NAME, crate::services::hello::HelloService::default())
    }

    pub fn register<S: Service>(mut self, name: impl Into<String>, service: S) -> Self {
        self.services.insert(name.into(), Arc::new(service));
        self
    }
}

impl Registry for ServiceRegistry {
    fn resolve(&self, name: &str) -> Result<Arc<dyn Handler>> {
        match self.services.get(name) {
            Some(handler) => {
                info!("Resolved service: {name}");
                Ok(handler.clone())
            }
            None => Err(AdapterError::Configuration(format!("Unknown service: {name}"))),
        }
    }
}
