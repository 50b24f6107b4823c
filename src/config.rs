//! Function selection and trigger metadata.
//!
//! The edge functions carry no runtime settings. What remains configurable is
//! which function a deployment (or the local invoker) runs and which
//! CloudFront event it is bound to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The edge functions this crate provides.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum FunctionKind {
    /// Append `index.html` to directory-style request paths.
    DeeplinkIndex,
    /// Force `Cache-Control: no-store` on responses.
    NoStoreCache,
    /// Redirect `www.` hosts to the bare domain.
    WwwToRootRedirect,
}

impl FunctionKind {
    pub const ALL: [FunctionKind; 3] = [
        FunctionKind::DeeplinkIndex,
        FunctionKind::NoStoreCache,
        FunctionKind::WwwToRootRedirect,
    ];

    /// Stable name, matching the serde and CLI spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DeeplinkIndex => "deeplink-index",
            Self::NoStoreCache => "no-store-cache",
            Self::WwwToRootRedirect => "www-to-root-redirect",
        }
    }

    /// Which descriptor the function consumes.
    pub fn phase(self) -> Phase {
        match self {
            Self::DeeplinkIndex | Self::WwwToRootRedirect => Phase::Request,
            Self::NoStoreCache => Phase::Response,
        }
    }

    /// The CloudFront event the function is normally associated with.
    pub fn default_event_type(self) -> EventType {
        match self {
            Self::DeeplinkIndex => EventType::OriginRequest,
            Self::NoStoreCache => EventType::OriginResponse,
            Self::WwwToRootRedirect => EventType::ViewerRequest,
        }
    }
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FunctionKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownFunction(s.to_string()))
    }
}

/// Side of the exchange a function operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Request,
    Response,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request => f.write_str("request"),
            Self::Response => f.write_str("response"),
        }
    }
}

/// CloudFront trigger event type (`cf.config.eventType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    ViewerRequest,
    OriginRequest,
    OriginResponse,
    ViewerResponse,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ViewerRequest => "viewer-request",
            Self::OriginRequest => "origin-request",
            Self::OriginResponse => "origin-response",
            Self::ViewerResponse => "viewer-response",
        }
    }

    pub fn phase(self) -> Phase {
        match self {
            Self::ViewerRequest | Self::OriginRequest => Phase::Request,
            Self::OriginResponse | Self::ViewerResponse => Phase::Response,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "viewer-request" => Ok(Self::ViewerRequest),
            "origin-request" => Ok(Self::OriginRequest),
            "origin-response" => Ok(Self::OriginResponse),
            "viewer-response" => Ok(Self::ViewerResponse),
            other => Err(ConfigError::UnknownEventType(other.to_string())),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Unknown event type: {0}")]
    UnknownEventType(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_kind_round_trip_names() {
        for kind in FunctionKind::ALL {
            assert_eq!(kind.as_str().parse::<FunctionKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.as_str());
        }
    }

    #[test]
    fn test_function_kind_serde() {
        let kind: FunctionKind = serde_json::from_str(r#""www-to-root-redirect""#).unwrap();
        assert_eq!(kind, FunctionKind::WwwToRootRedirect);

        let kind: FunctionKind = serde_yaml::from_str("no-store-cache").unwrap();
        assert_eq!(kind, FunctionKind::NoStoreCache);
    }

    #[test]
    fn test_unknown_function() {
        let err = "index-rewrite".parse::<FunctionKind>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown function: index-rewrite");
    }

    #[test]
    fn test_phases() {
        assert_eq!(FunctionKind::DeeplinkIndex.phase(), Phase::Request);
        assert_eq!(FunctionKind::NoStoreCache.phase(), Phase::Response);
        assert_eq!(FunctionKind::WwwToRootRedirect.phase(), Phase::Request);

        for kind in FunctionKind::ALL {
            assert_eq!(kind.default_event_type().phase(), kind.phase());
        }
    }

    #[test]
    fn test_event_type_parsing() {
        assert_eq!(
            "origin-response".parse::<EventType>().unwrap(),
            EventType::OriginResponse
        );
        assert!("origin".parse::<EventType>().is_err());

        let event_type: EventType = serde_json::from_str(r#""viewer-request""#).unwrap();
        assert_eq!(event_type.phase(), Phase::Request);
    }
}
