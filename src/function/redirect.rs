//! `www.` to root-domain redirect.

use super::{EdgeFunction, FunctionError};
use crate::event::{HeaderEntry, Request, Response};
use crate::log::FunctionLog;
use serde::Serialize;
use tracing::{debug, info};

const HOST: &str = "host";
/// Hosts starting with this are redirected.
const WWW_PREFIX: &str = "www";
/// Label removed from the host to build the redirect domain.
const WWW_LABEL: &str = "www.";
const REDIRECT_STATUS: &str = "302";
const REDIRECT_DESCRIPTION: &str = "Found";

/// Result of the redirect check.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RedirectOutcome {
    /// Synthesized redirect; the host answers the viewer with it directly.
    Redirect(Response),
    /// Request continues through the CDN unchanged.
    Forward(Request),
}

impl RedirectOutcome {
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect(_))
    }

    /// The `Location` value of a redirect.
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Redirect(response) => response.headers.first_value("location"),
            Self::Forward(_) => None,
        }
    }
}

/// Redirects requests for `www.*` hosts to the bare domain over HTTPS.
#[derive(Debug, Clone, Default)]
pub struct WwwToRootRedirect {
    log: FunctionLog,
}

impl WwwToRootRedirect {
    pub fn new(log: FunctionLog) -> Self {
        Self { log }
    }
}

/// Remove the first `www.` from a host.
///
/// This is a substring removal, not a prefix strip: `www.a.www.b` becomes
/// `a.www.b`, and a bare `www` is returned as-is.
pub fn redirect_domain(host: &str) -> String {
    host.replacen(WWW_LABEL, "", 1)
}

impl EdgeFunction for WwwToRootRedirect {
    type Input = Request;
    type Output = RedirectOutcome;

    fn name(&self) -> &'static str {
        "www-to-root-redirect"
    }

    fn log(&self) -> &FunctionLog {
        &self.log
    }

    fn transform(&self, request: Request) -> Result<RedirectOutcome, FunctionError> {
        info!(request = ?request, "Received request");

        let host = request.host().ok_or(FunctionError::MissingHeader(HOST))?;

        if !host.starts_with(WWW_PREFIX) {
            debug!(host, "Host has no www prefix, forwarding");
            return Ok(RedirectOutcome::Forward(request));
        }

        let domain = redirect_domain(host);
        info!(redirect_domain = %domain, "Computed redirect domain");

        let location = format!("https://{}{}", domain, request.uri);
        info!(location = %location, "Redirecting to root domain");

        let response = Response::new(REDIRECT_STATUS, REDIRECT_DESCRIPTION)
            .with_header("location", HeaderEntry::new("Location", location));

        Ok(RedirectOutcome::Redirect(response))
    }
}
