//! The edge functions.
//!
//! Each function is a fixed, stateless transformation of one descriptor. They
//! share the [`EdgeFunction`] contract and nothing else.

mod cache;
mod deeplink;
mod redirect;

pub use cache::NoStoreCache;
pub use deeplink::{rewrite_uri, DeepLinkIndex};
pub use redirect::{redirect_domain, RedirectOutcome, WwwToRootRedirect};

use crate::event::Descriptor;
use crate::log::FunctionLog;
use serde::Serialize;
use std::fmt;

/// Contract implemented by every edge function.
pub trait EdgeFunction: Send + Sync {
    /// Descriptor consumed from the trigger event.
    type Input: Descriptor + fmt::Debug;
    /// Value handed back to the host.
    type Output: Serialize + fmt::Debug;

    /// Function name for logging.
    fn name(&self) -> &'static str;

    /// The logging capability this function writes to.
    fn log(&self) -> &FunctionLog;

    /// Apply the transformation.
    ///
    /// Log output goes to whatever dispatcher is active; callers that want it
    /// routed to [`EdgeFunction::log`] should use [`EdgeFunction::invoke`].
    fn transform(&self, input: Self::Input) -> Result<Self::Output, FunctionError>;

    /// Apply the transformation inside this function's logging scope.
    fn invoke(&self, input: Self::Input) -> Result<Self::Output, FunctionError> {
        self.log().scope(|| self.transform(input))
    }
}

/// Precondition failures raised by a function.
///
/// None of these are recoverable: they mean the host handed over an event
/// that breaks its own contract.
#[derive(Debug, thiserror::Error)]
pub enum FunctionError {
    #[error("Missing required header: {0}")]
    MissingHeader(&'static str),
}
