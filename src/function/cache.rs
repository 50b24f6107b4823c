//! Response cache suppression.

use super::{EdgeFunction, FunctionError};
use crate::event::{HeaderEntry, Response};
use crate::log::FunctionLog;

const CACHE_CONTROL: &str = "cache-control";
const CACHE_CONTROL_KEY: &str = "Cache-Control";
const NO_STORE: &str = "no-store";

/// Overwrites `Cache-Control` with `no-store` on every response.
#[derive(Debug, Clone, Default)]
pub struct NoStoreCache {
    log: FunctionLog,
}

impl NoStoreCache {
    pub fn new(log: FunctionLog) -> Self {
        Self { log }
    }
}

impl EdgeFunction for NoStoreCache {
    type Input = Response;
    type Output = Response;

    fn name(&self) -> &'static str {
        "no-store-cache"
    }

    fn log(&self) -> &FunctionLog {
        &self.log
    }

    fn transform(&self, mut response: Response) -> Result<Response, FunctionError> {
        response
            .headers
            .set(CACHE_CONTROL, HeaderEntry::new(CACHE_CONTROL_KEY, NO_STORE));
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Headers;
    use crate::log::CaptureLayer;
    use serde_json::json;

    fn no_store() -> Vec<HeaderEntry> {
        vec![HeaderEntry::new("Cache-Control", "no-store")]
    }

    #[test]
    fn test_sets_no_store() {
        let function = NoStoreCache::new(FunctionLog::disabled());
        let response = function.invoke(Response::new("200", "OK")).unwrap();

        assert_eq!(response.headers.get("cache-control"), Some(&no_store()[..]));
    }

    #[test]
    fn test_overwrites_existing_value() {
        let function = NoStoreCache::new(FunctionLog::disabled());
        let mut input = Response::new("200", "OK");
        input.headers = serde_json::from_value(json!({
            "cache-control": [
                {"key": "Cache-Control", "value": "max-age=3600"},
                {"key": "Cache-Control", "value": "public"}
            ]
        }))
        .unwrap();

        let response = function.invoke(input).unwrap();
        assert_eq!(response.headers.get("cache-control"), Some(&no_store()[..]));
    }

    #[test]
    fn test_other_headers_untouched() {
        let function = NoStoreCache::new(FunctionLog::disabled());
        let input = Response::new("200", "OK")
            .with_header("content-type", HeaderEntry::new("Content-Type", "text/html"))
            .with_header("etag", HeaderEntry::new("ETag", "\"abc\""));

        let response = function.invoke(input.clone()).unwrap();

        let expected: Headers = serde_json::from_value(json!({
            "cache-control": [{"key": "Cache-Control", "value": "no-store"}],
            "content-type": [{"key": "Content-Type", "value": "text/html"}],
            "etag": [{"key": "ETag", "value": "\"abc\""}]
        }))
        .unwrap();
        assert_eq!(response.headers, expected);
        assert_eq!(response.status, "200");
        assert_eq!(response.status_description, input.status_description);
    }

    #[test]
    fn test_does_not_log() {
        let capture = CaptureLayer::new();
        let function = NoStoreCache::new(capture.function_log());
        function.invoke(Response::new("404", "Not Found")).unwrap();
        assert_eq!(capture.count(), 0);
    }
}
