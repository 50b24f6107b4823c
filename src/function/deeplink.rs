//! Deep-link index rewriting.
//!
//! Static site generators emit `foo/index.html` for `/foo/`. Origins such as S3
//! do not resolve directory indexes, so directory-style URIs get the index
//! document appended before the request reaches origin.

use super::{EdgeFunction, FunctionError};
use crate::event::Request;
use crate::log::FunctionLog;
use tracing::info;

/// Document appended to directory-style URIs.
const INDEX_DOCUMENT: &str = "index.html";

/// Appends `index.html` to request URIs ending in `/`.
#[derive(Debug, Clone, Default)]
pub struct DeepLinkIndex {
    log: FunctionLog,
}

impl DeepLinkIndex {
    pub fn new(log: FunctionLog) -> Self {
        Self { log }
    }
}

/// The rewritten URI, or `None` when `uri` does not end in `/`.
pub fn rewrite_uri(uri: &str) -> Option<String> {
    uri.ends_with('/')
        .then(|| format!("{}{}", uri, INDEX_DOCUMENT))
}

impl EdgeFunction for DeepLinkIndex {
    type Input = Request;
    type Output = Request;

    fn name(&self) -> &'static str {
        "deeplink-index"
    }

    fn log(&self) -> &FunctionLog {
        &self.log
    }

    fn transform(&self, mut request: Request) -> Result<Request, FunctionError> {
        if let Some(new_uri) = rewrite_uri(&request.uri) {
            info!(uri = %request.uri, "Old URI");
            info!(uri = %new_uri, "New URI");
            request.uri = new_uri;
        }

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::HeaderEntry;
    use crate::log::CaptureLayer;
    use tracing::Level;

    fn run(uri: &str) -> (Request, CaptureLayer) {
        let capture = CaptureLayer::new();
        let function = DeepLinkIndex::new(capture.function_log());
        let request = function.invoke(Request::new(uri)).unwrap();
        (request, capture)
    }

    #[test]
    fn test_rewrite_uri() {
        assert_eq!(rewrite_uri("/foo/"), Some("/foo/index.html".to_string()));
        assert_eq!(rewrite_uri("/"), Some("/index.html".to_string()));
        assert_eq!(rewrite_uri("/foo/index.html"), None);
        assert_eq!(rewrite_uri("/foo"), None);
    }

    #[test]
    fn test_trailing_slash_rewritten() {
        let (request, _) = run("/foo/");
        assert_eq!(request.uri, "/foo/index.html");
    }

    #[test]
    fn test_root_rewritten() {
        let (request, _) = run("/");
        assert_eq!(request.uri, "/index.html");
    }

    #[test]
    fn test_nested_directory_rewritten() {
        let (request, _) = run("/docs/guide/intro/");
        assert_eq!(request.uri, "/docs/guide/intro/index.html");
    }

    #[test]
    fn test_file_path_unchanged() {
        let (request, capture) = run("/foo/index.html");
        assert_eq!(request.uri, "/foo/index.html");
        assert_eq!(capture.count(), 0);
    }

    #[test]
    fn test_extensionless_path_unchanged() {
        let (request, capture) = run("/foo");
        assert_eq!(request.uri, "/foo");
        assert_eq!(capture.count(), 0);
    }

    #[test]
    fn test_rewrite_logs_old_and_new_uri() {
        let (_, capture) = run("/foo/");

        let events = capture.events();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.level == Level::INFO));
        assert_eq!(events[0].message, "Old URI");
        assert_eq!(events[0].field("uri"), Some("/foo/"));
        assert_eq!(events[1].message, "New URI");
        assert_eq!(events[1].field("uri"), Some("/foo/index.html"));
    }

    #[test]
    fn test_other_fields_untouched() {
        let capture = CaptureLayer::new();
        let function = DeepLinkIndex::new(capture.function_log());

        let mut input = Request::new("/blog/")
            .with_header("host", HeaderEntry::new("Host", "example.com"));
        input.querystring = Some("page=2".to_string());

        let output = function.invoke(input.clone()).unwrap();
        assert_eq!(output.headers, input.headers);
        assert_eq!(output.querystring, input.querystring);
    }

    #[test]
    fn test_rewrite_applies_once_per_call() {
        let function = DeepLinkIndex::new(FunctionLog::disabled());
        let once = function.invoke(Request::new("/foo/")).unwrap();
        let twice = function.invoke(once.clone()).unwrap();
        assert_eq!(once.uri, twice.uri);
    }
}
