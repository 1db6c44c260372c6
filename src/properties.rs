use std::collections::HashMap;
use std::sync::RwLock;
use tracing::error;

/// Key of the deployment stage property, e.g. `dev` or `prod`
pub const STAGE: &str = "stage";

/// Process-wide properties set as a side effect of handling invocations and read by services downstream.
///
/// A warm Lambda process handles many invocations and every one of them sees the same instance.
/// Values are never rolled back and the last writer wins. Concurrent invocations must not
/// assume a value they read was set by their own request.
#[derive(Debug, Default)]
pub struct Properties {
    values: RwLock<HashMap<String, String>>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        if let Ok(mut w) = self.values.write() {
            w.insert(key.into(), value.into());
        } else {
            error!("Poisoned lock on Properties. It's a bug");
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match self.values.read() {
            Ok(r) => r.get(key).cloned(),
            Err(_) => {
                error!("Poisoned lock on Properties. It's a bug");
                None
            }
        }
    }

    /// A shortcut for the `stage` property
    pub fn stage(&self) -> Option<String> {
        self.get(STAGE)
    }
}
