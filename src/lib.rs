//! CloudFront edge rewrite functions.
//!
//! Three independent, stateless functions run by the CDN per request or
//! response:
//!
//! - `deeplink-index`: append `index.html` to request URIs ending in `/`
//! - `no-store-cache`: force `Cache-Control: no-store` on responses
//! - `www-to-root-redirect`: redirect `www.` hosts to the bare domain
//!
//! ## Example
//!
//! ```
//! use edge_rewrites::{DeepLinkIndex, EdgeHandler, FunctionLog};
//!
//! let handler = EdgeHandler::new(DeepLinkIndex::new(FunctionLog::disabled()));
//! let out = handler
//!     .handle_json(r#"{"Records": [{"cf": {"request": {"uri": "/docs/"}}}]}"#)
//!     .unwrap();
//! assert!(out.contains("/docs/index.html"));
//! ```

pub mod config;
pub mod event;
pub mod function;
pub mod handler;
pub mod log;

pub use config::{EventType, FunctionKind, Phase};
pub use event::{EdgeEvent, HeaderEntry, Headers, Request, Response};
pub use function::{
    DeepLinkIndex, EdgeFunction, FunctionError, NoStoreCache, RedirectOutcome, WwwToRootRedirect,
};
pub use handler::{handler_for, DynHandler, EdgeHandler, HandlerError};
pub use log::FunctionLog;
