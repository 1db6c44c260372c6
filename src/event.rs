use base64::{engine::general_purpose::STANDARD, Engine};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Byte fields travel through JSON as base64 text.
pub(crate) mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(bytes))
    }

    /// `null` and a missing field both give an empty payload.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(s) => STANDARD.decode(s).map_err(serde::de::Error::custom),
            None => Ok(Vec::new()),
        }
    }
}

/// API Gateway sends `null` for absent values, including inside header and parameter maps.
pub(crate) mod null_tolerant {
    use serde::{Deserialize, Deserializer};
    use std::collections::HashMap;

    /// `null` gives the default value.
    pub fn or_default<'de, D, T>(d: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Default,
    {
        Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
    }

    /// Map entries with `null` values are dropped.
    pub fn map<'de, D, V>(d: D) -> Result<Option<HashMap<String, V>>, D::Error>
    where
        D: Deserializer<'de>,
        V: Deserialize<'de>,
    {
        let map = Option::<HashMap<String, Option<V>>>::deserialize(d)?;
        Ok(map.map(|m| m.into_iter().filter_map(|(k, v)| v.map(|v| (k, v))).collect()))
    }
}

/// A request type a service can have the canonical envelope deserialized into.
/// Unknown envelope fields are dropped by the deserializer.
pub trait RequestEvent: DeserializeOwned + Send + Sync + 'static {
    /// Routing metadata of the invocation, e.g. API Gateway `requestContext`
    fn request_context(&self) -> Option<&Map<String, Value>>;
}

/// API Gateway proxy request with the body already reduced to bytes.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiGatewayRequest {
    pub resource: Option<String>,
    pub path: Option<String>,
    pub http_method: Option<String>,
    #[serde(deserialize_with = "null_tolerant::map")]
    pub headers: Option<HashMap<String, String>>,
    #[serde(deserialize_with = "null_tolerant::map")]
    pub multi_value_headers: Option<HashMap<String, Vec<String>>>,
    #[serde(deserialize_with = "null_tolerant::map")]
    pub query_string_parameters: Option<HashMap<String, String>>,
    #[serde(deserialize_with = "null_tolerant::map")]
    pub multi_value_query_string_parameters: Option<HashMap<String, Vec<String>>>,
    #[serde(deserialize_with = "null_tolerant::map")]
    pub path_parameters: Option<HashMap<String, String>>,
    #[serde(deserialize_with = "null_tolerant::map")]
    pub stage_variables: Option<HashMap<String, String>>,
    pub request_context: Option<Map<String, Value>>,
    #[serde(rename = "isBase64Encoded", deserialize_with = "null_tolerant::or_default")]
    pub is_base64_encoded: bool,
    #[serde(with = "base64_bytes")]
    pub body: Vec<u8>,
}

impl RequestEvent for ApiGatewayRequest {
    fn request_context(&self) -> Option<&Map<String, Value>> {
        self.request_context.as_ref()
    }
}

/// The response a service produces. All fields are empty by default and
/// empty fields are omitted when serialized, so the default response is `{}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseEvent {
    pub is_base64_encoded: bool,
    pub status_code: Option<u16>,
    pub headers: HashMap<String, String>,
    pub multi_value_headers: HashMap<String, Vec<String>>,
    pub body: Vec<u8>,
    /// E.g. `application/json; charset=utf-8`
    pub media_type: Option<String>,
}

impl ResponseEvent {
    pub fn set_status_code(&mut self, status_code: u16) -> &mut Self {
        self.status_code = Some(status_code);
        self
    }

    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) -> &mut Self {
        self.body = body.into();
        self
    }

    pub fn set_media_type(&mut self, media_type: impl Into<String>) -> &mut Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// The body as the platform expects it together with its `isBase64Encoded` flag.
    /// Bodies flagged as encoded or not valid UTF-8 are sent as base64.
    pub fn body_text(&self) -> (bool, String) {
        if !self.is_base64_encoded {
            if let Ok(text) = std::str::from_utf8(&self.body) {
                return (false, text.to_owned());
            }
        }
        (true, STANDARD.encode(&self.body))
    }
}

/// The JSON shape of a response. `mediaType` is not understood by the platform
/// and never survives sanitization, so it is also copied into `Content-Type`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireResponse<'a> {
    #[serde(rename = "isBase64Encoded", skip_serializing_if = "is_false")]
    is_base64_encoded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    status_code: Option<u16>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    headers: HashMap<String, String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    multi_value_headers: HashMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    media_type: Option<&'a str>,
}

fn is_false(v: &bool) -> bool {
    !*v
}

impl Serialize for ResponseEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut headers = self.headers.clone();
        if let Some(media_type) = &self.media_type {
            if !headers.keys().any(|k| k.eq_ignore_ascii_case("content-type")) {
                headers.insert("Content-Type".to_owned(), media_type.clone());
            }
        }

        let (is_base64_encoded, body) = if self.body.is_empty() {
            (self.is_base64_encoded, None)
        } else {
            let (encoded, text) = self.body_text();
            (encoded, Some(text))
        };

        WireResponse {
            is_base64_encoded,
            status_code: self.status_code,
            headers,
            multi_value_headers: self.multi_value_headers.clone(),
            body,
            media_type: self.media_type.as_deref(),
        }
        .serialize(serializer)
    }
}

/// A request paired with the response the service fills in while processing it.
#[derive(Debug, Clone, Default)]
pub struct Event<R> {
    pub request: R,
    pub response: ResponseEvent,
}

impl<R> Event<R> {
    pub fn new(request: R) -> Self {
        Self {
            request,
            response: ResponseEvent::default(),
        }
    }

    pub fn into_response(self) -> ResponseEvent {
        self.response
    }
}
