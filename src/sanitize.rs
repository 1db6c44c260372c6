use crate::error::{AdapterError, Result};
use serde_json::{Map, Value};
use tracing::debug;

/// The only response fields the invoking platform gets to see.
pub const ALLOWED_FIELDS: [&str; 5] = ["isBase64Encoded", "statusCode", "headers", "multiValueHeaders", "body"];

/// Removes every top-level field not in [ALLOWED_FIELDS]. Never adds fields.
/// Fails on `null` because a service must always produce a response object.
pub fn sanitize(response: Value) -> Result<Map<String, Value>> {
    let mut fields = match response {
        Value::Object(fields) => fields,
        Value::Null => return Err(AdapterError::NullResponse),
        other => {
            return Err(AdapterError::InvalidResponse(format!(
                "expected a JSON object, got {other}"
            )))
        }
    };

    fields.retain(|key, _| {
        let allowed = ALLOWED_FIELDS.contains(&key.as_str());
        if !allowed {
            debug!("Dropping response field: {key}");
        }
        allowed
    });

    Ok(fields)
}
