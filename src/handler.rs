//! Host-facing handler: event in, descriptor out.
//!
//! The handler is the boundary where untyped trigger events become typed
//! descriptors. Anything that breaks the host's contract is returned as a
//! [`HandlerError`] for the host to surface; there is no partial recovery.

use crate::config::{FunctionKind, Phase};
use crate::event::{Descriptor, EdgeEvent};
use crate::function::{
    DeepLinkIndex, EdgeFunction, FunctionError, NoStoreCache, WwwToRootRedirect,
};
use crate::log::FunctionLog;
use serde_json::Value as JsonValue;
use tracing::{debug, info_span, warn};

/// Runs one edge function against trigger events.
#[derive(Debug, Clone)]
pub struct EdgeHandler<F> {
    function: F,
}

impl<F: EdgeFunction> EdgeHandler<F> {
    pub fn new(function: F) -> Self {
        Self { function }
    }

    /// Handle a parsed trigger event.
    pub fn handle(&self, event: EdgeEvent) -> Result<F::Output, HandlerError> {
        let record = event.into_first_record().ok_or(HandlerError::NoRecords)?;
        let config = record.cf.config.clone().unwrap_or_default();
        let phase = <F::Input as Descriptor>::PHASE;

        self.function.log().scope(|| {
            let span = info_span!(
                "edge_function",
                function = self.function.name(),
                request_id = config.request_id.as_deref(),
                event_type = config.event_type.map(|t| t.as_str()),
            );

            span.in_scope(|| -> Result<F::Output, HandlerError> {
                if let Some(event_type) = config.event_type {
                    if event_type.phase() != phase {
                        warn!(
                            event_type = %event_type,
                            expected = %phase,
                            "Function bound to an event of the wrong phase"
                        );
                    }
                }

                let input = F::Input::take_from(record.cf).inspect_err(|e| {
                    warn!(error = %e, "Rejected malformed event");
                })?;

                let output = self.function.transform(input).inspect_err(|e| {
                    warn!(error = %e, "Edge function failed");
                })?;

                debug!("Edge function completed");
                Ok(output)
            })
        })
    }

    /// Handle an event given as a JSON value.
    pub fn handle_value(&self, event: JsonValue) -> Result<JsonValue, HandlerError> {
        let event: EdgeEvent = serde_json::from_value(event)?;
        let output = self.handle(event)?;
        Ok(serde_json::to_value(output)?)
    }

    /// Handle an event given as a JSON document.
    pub fn handle_json(&self, event: &str) -> Result<String, HandlerError> {
        let output = self.handle(EdgeEvent::from_json(event)?)?;
        Ok(serde_json::to_string(&output)?)
    }
}

/// Object-safe view of an [`EdgeHandler`], for picking a function at runtime.
pub trait DynHandler: Send + Sync {
    /// Function name.
    fn name(&self) -> &'static str;

    /// Which descriptor the function consumes.
    fn phase(&self) -> Phase;

    /// Handle an event given as a JSON value.
    fn handle_value(&self, event: JsonValue) -> Result<JsonValue, HandlerError>;
}

impl<F: EdgeFunction> DynHandler for EdgeHandler<F> {
    fn name(&self) -> &'static str {
        self.function.name()
    }

    fn phase(&self) -> Phase {
        <F::Input as Descriptor>::PHASE
    }

    fn handle_value(&self, event: JsonValue) -> Result<JsonValue, HandlerError> {
        EdgeHandler::handle_value(self, event)
    }
}

/// Build the handler for a function kind.
pub fn handler_for(kind: FunctionKind, log: FunctionLog) -> Box<dyn DynHandler> {
    match kind {
        FunctionKind::DeeplinkIndex => Box::new(EdgeHandler::new(DeepLinkIndex::new(log))),
        FunctionKind::NoStoreCache => Box::new(EdgeHandler::new(NoStoreCache::new(log))),
        FunctionKind::WwwToRootRedirect => {
            Box::new(EdgeHandler::new(WwwToRootRedirect::new(log)))
        }
    }
}

/// Fatal errors surfaced to the host.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Event contains no records")]
    NoRecords,

    #[error("Event record has no {0} descriptor")]
    MissingDescriptor(Phase),

    #[error("Malformed {phase} descriptor: {source}")]
    Descriptor {
        phase: Phase,
        source: serde_json::Error,
    },

    #[error("Function error: {0}")]
    Function(#[from] FunctionError),
}
