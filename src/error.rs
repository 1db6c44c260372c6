use thiserror::Error;

/// Everything that can go wrong between reading the trigger envelope and writing the sanitized response.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// A required startup value is missing or invalid. Fatal at construction.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The input or the canonical envelope could not be coerced into the expected type.
    #[error("Failed to deserialize the request: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The sanitizer was handed a `null` response. The handler broke its contract.
    #[error("Response is null")]
    NullResponse,

    /// The serialized response is not a JSON object.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to serialize the response: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The application handler returned an error.
    #[error("Handler error: {0}")]
    Handler(lambda_runtime::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AdapterError>;
