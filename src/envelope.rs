//! Normalization of trigger envelopes into a canonical form with a byte-valued `body`.
//!
//! Lambda receives differently shaped JSON depending on what invoked it:
//! - API Gateway and function URLs send an object with a `body` string and routing metadata around it,
//! - stream and queue triggers send a batch under `records` or `Records` (the casing depends on the source),
//! - direct invocations send arbitrary JSON.
//!
//! All of them are reduced to a [CanonicalEnvelope] the request event types can be deserialized from.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{Map, Value};
use tracing::debug;

pub const BODY: &str = "body";
pub const IS_BASE64_ENCODED: &str = "isBase64Encoded";
pub const RECORDS: &str = "records";
pub const RECORDS_CAPITALIZED: &str = "Records";

/// The payload of a canonical envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// UTF-8 bytes of the payload text
    Bytes(Vec<u8>),
    /// The `body` value exactly as the trigger sent it because it was flagged as base64 encoded.
    /// Nothing is decoded at this stage.
    Transmitted(Value),
}

/// An envelope guaranteed to carry its payload in `body`, plus whatever metadata survived normalization.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CanonicalEnvelope {
    /// `None` if the trigger sent `"body": null`
    pub body: Option<Body>,
    /// All other top-level keys, copied verbatim. Empty for batches and raw invocations.
    pub metadata: Map<String, Value>,
}

impl CanonicalEnvelope {
    /// Converts the envelope into the JSON shape request events are deserialized from.
    /// Bytes are written as base64 text, which is how byte fields travel through JSON.
    /// A transmitted body is written back as-is.
    pub fn into_value(self) -> Value {
        let mut fields = self.metadata;
        match self.body {
            Some(Body::Bytes(bytes)) => {
                fields.insert(BODY.to_owned(), Value::String(STANDARD.encode(bytes)));
            }
            Some(Body::Transmitted(value)) => {
                fields.insert(BODY.to_owned(), value);
            }
            None => {}
        }
        Value::Object(fields)
    }
}

/// The envelope shapes recognized by the normalizer, checked in this order:
/// `body`, `records`, `Records`, anything else.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// An object with a `body` key, e.g. from API Gateway
    Http(Map<String, Value>),
    /// The value of `records` or `Records`. The rest of the envelope is dropped.
    Batch(Value),
    /// No recognized payload key, the whole envelope is the payload
    Raw(Map<String, Value>),
}

impl Envelope {
    /// Decides which shape `raw` has. First match wins.
    pub fn classify(mut raw: Map<String, Value>) -> Self {
        if raw.contains_key(BODY) {
            return Self::Http(raw);
        }

        for key in [RECORDS, RECORDS_CAPITALIZED] {
            if let Some(records) = raw.remove(key) {
                return Self::Batch(records);
            }
        }

        Self::Raw(raw)
    }

    pub fn normalize(self) -> CanonicalEnvelope {
        let canonical = match self {
            Self::Http(fields) => normalize_http(fields),
            Self::Batch(records) => payload_only(&records),
            Self::Raw(fields) => payload_only(&Value::Object(fields)),
        };

        match &canonical.body {
            Some(Body::Bytes(bytes)) => debug!("Normalized body: {}", String::from_utf8_lossy(bytes)),
            Some(Body::Transmitted(value)) => debug!("Transmitted body: {value}"),
            None => debug!("No body"),
        }

        canonical
    }
}

/// Classifies and normalizes `raw` in one go.
pub fn normalize(raw: Map<String, Value>) -> CanonicalEnvelope {
    Envelope::classify(raw).normalize()
}

/// Keeps all keys and replaces `body` with its bytes, unless the body is flagged as base64 encoded.
fn normalize_http(mut fields: Map<String, Value>) -> CanonicalEnvelope {
    // anything but an explicit `true` counts as not encoded
    let is_base64_encoded = fields.get(IS_BASE64_ENCODED).and_then(Value::as_bool).unwrap_or(false);

    let body = match fields.remove(BODY) {
        None | Some(Value::Null) => None,
        Some(value) if is_base64_encoded => Some(Body::Transmitted(value)),
        Some(Value::String(text)) => Some(Body::Bytes(text.into_bytes())),
        // non-string bodies are taken in their JSON text form
        Some(value) => Some(Body::Bytes(value.to_string().into_bytes())),
    };

    CanonicalEnvelope { body, metadata: fields }
}

/// The payload becomes the body and nothing else from the envelope is kept.
fn payload_only(payload: &Value) -> CanonicalEnvelope {
    CanonicalEnvelope {
        body: Some(Body::Bytes(payload.to_string().into_bytes())),
        metadata: Map::new(),
    }
}
