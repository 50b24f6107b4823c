//! CloudFront edge event descriptors.
//!
//! The host hands each function a trigger event of the shape
//! `{ "Records": [ { "cf": { "config": ..., "request": ..., "response": ... } } ] }`.
//! Only the first record is consulted. The request/response descriptors are
//! kept as raw JSON inside the envelope and only parsed into their typed form
//! once the handler knows which phase the function runs in.

use crate::config::{EventType, Phase};
use crate::handler::HandlerError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

/// A single header entry as CloudFront encodes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEntry {
    /// Canonical (wire) header name. CloudFront may omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Header value.
    pub value: String,
    /// Anything else CloudFront attached to the entry.
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl HeaderEntry {
    /// Create an entry carrying both the wire name and the value.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            value: value.into(),
            extra: Map::new(),
        }
    }

    /// Create an entry with only a value.
    pub fn value_only(value: impl Into<String>) -> Self {
        Self {
            key: None,
            value: value.into(),
            extra: Map::new(),
        }
    }
}

/// Header map keyed by lower-cased header name.
///
/// Each name maps to an ordered sequence of entries; lookups consult the
/// first one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers(BTreeMap<String, Vec<HeaderEntry>>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries for a header name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&[HeaderEntry]> {
        self.0.get(&name.to_lowercase()).map(Vec::as_slice)
    }

    /// Value of the first entry for a header name.
    pub fn first_value(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(|entries| entries.first())
            .map(|entry| entry.value.as_str())
    }

    /// Replace every entry for `name` with a single entry.
    pub fn set(&mut self, name: &str, entry: HeaderEntry) {
        self.0.insert(name.to_lowercase(), vec![entry]);
    }
}

/// Request descriptor.
///
/// `headers` stays absent on output when it was absent on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Path component of the request, always starting with `/`.
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub querystring: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<String>,
    /// Fields this crate does not interpret, passed through verbatim.
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Request {
    /// Create a request with the given URI and no headers.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            headers: None,
            method: None,
            querystring: None,
            client_ip: None,
            extra: Map::new(),
        }
    }

    /// Builder-style header setter.
    pub fn with_header(mut self, name: &str, entry: HeaderEntry) -> Self {
        self.headers.get_or_insert_with(Headers::new).set(name, entry);
        self
    }

    /// Value of the first `host` header entry.
    pub fn host(&self) -> Option<&str> {
        self.headers.as_ref()?.first_value("host")
    }
}

/// Response descriptor, either received from origin or synthesized at the edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// Status code as a string, e.g. `"302"`. Numeric input is accepted.
    #[serde(deserialize_with = "status_from_string_or_number")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_description: Option<String>,
    pub headers: Headers,
    /// Fields this crate does not interpret, passed through verbatim.
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Response {
    /// Create a response with a status, its description and no headers.
    pub fn new(status: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            status_description: Some(description.into()),
            headers: Headers::new(),
            extra: Map::new(),
        }
    }

    /// Builder-style header setter.
    pub fn with_header(mut self, name: &str, entry: HeaderEntry) -> Self {
        self.headers.set(name, entry);
        self
    }
}

/// YAML events carry `status: 200` as a number; CloudFront sends a string.
fn status_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Status {
        Text(String),
        Code(u64),
    }

    Ok(match Status::deserialize(deserializer)? {
        Status::Text(text) => text,
        Status::Code(code) => code.to_string(),
    })
}

/// Trigger event envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EdgeEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<EventRecord>,
}

/// One record of a trigger event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventRecord {
    pub cf: CloudFrontPayload,
}

/// The `cf` object of a record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CloudFrontPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<DistributionConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<JsonValue>,
}

/// Distribution metadata attached to every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution_domain_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl EdgeEvent {
    /// Wrap a single payload into an event.
    pub fn single(cf: CloudFrontPayload) -> Self {
        Self {
            records: vec![EventRecord { cf }],
        }
    }

    /// Build a request-phase event around a request descriptor.
    pub fn for_request(request: &Request) -> Result<Self, HandlerError> {
        Ok(Self::single(CloudFrontPayload {
            request: Some(serde_json::to_value(request)?),
            ..Default::default()
        }))
    }

    /// Build a response-phase event around a response descriptor.
    pub fn for_response(response: &Response) -> Result<Self, HandlerError> {
        Ok(Self::single(CloudFrontPayload {
            response: Some(serde_json::to_value(response)?),
            ..Default::default()
        }))
    }

    /// Parse an event from JSON.
    pub fn from_json(json: &str) -> Result<Self, HandlerError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse an event from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, HandlerError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Take the first record; any further records are ignored.
    pub fn into_first_record(self) -> Option<EventRecord> {
        self.records.into_iter().next()
    }
}

/// A descriptor a function can consume, extracted from a record payload.
pub trait Descriptor: Sized + DeserializeOwned {
    /// Which side of the exchange this descriptor represents.
    const PHASE: Phase;

    /// Pull this descriptor's raw JSON out of the payload.
    fn raw(payload: CloudFrontPayload) -> Option<JsonValue>;

    /// Extract and validate the descriptor.
    fn take_from(payload: CloudFrontPayload) -> Result<Self, HandlerError> {
        let raw = Self::raw(payload).ok_or(HandlerError::MissingDescriptor(Self::PHASE))?;
        serde_json::from_value(raw).map_err(|source| HandlerError::Descriptor {
            phase: Self::PHASE,
            source,
        })
    }
}

impl Descriptor for Request {
    const PHASE: Phase = Phase::Request;

    fn raw(payload: CloudFrontPayload) -> Option<JsonValue> {
        payload.request
    }
}

impl Descriptor for Response {
    const PHASE: Phase = Phase::Response;

    fn raw(payload: CloudFrontPayload) -> Option<JsonValue> {
        payload.response
    }
}
