//! Logging capability handed to each edge function.
//!
//! Functions never rely on a process-wide logger. Each one owns a
//! [`FunctionLog`] and runs its work inside [`FunctionLog::scope`], which
//! routes every `tracing` event to the dispatcher it was built with.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::field::{Field, Visit};
use tracing::{dispatcher, Dispatch, Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

/// Explicit logging capability.
#[derive(Debug, Clone)]
pub struct FunctionLog {
    dispatch: Dispatch,
}

impl FunctionLog {
    pub fn new(dispatch: Dispatch) -> Self {
        Self { dispatch }
    }

    /// Build from any subscriber.
    pub fn from_subscriber<S>(subscriber: S) -> Self
    where
        S: Subscriber + Send + Sync + 'static,
    {
        Self::new(Dispatch::new(subscriber))
    }

    /// Capture the dispatcher that is the default at this point.
    pub fn current() -> Self {
        Self::new(dispatcher::get_default(Dispatch::clone))
    }

    /// A capability that drops everything.
    pub fn disabled() -> Self {
        Self::new(Dispatch::none())
    }

    /// Run `f` with this capability as the active dispatcher.
    pub fn scope<T>(&self, f: impl FnOnce() -> T) -> T {
        dispatcher::with_default(&self.dispatch, f)
    }
}

impl Default for FunctionLog {
    fn default() -> Self {
        Self::current()
    }
}

/// A recorded log event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: String,
    /// Structured fields other than `message`, formatted as strings.
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Layer that records every event it sees.
///
/// ```
/// use edge_rewrites::log::{CaptureLayer, FunctionLog};
/// use tracing_subscriber::layer::SubscriberExt;
///
/// let capture = CaptureLayer::new();
/// let log = FunctionLog::from_subscriber(tracing_subscriber::registry().with(capture.clone()));
///
/// log.scope(|| tracing::info!(uri = "/", "hello"));
/// assert_eq!(capture.count(), 1);
/// assert_eq!(capture.events()[0].field("uri"), Some("/"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CaptureLayer {
    captured: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CaptureLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all captured events.
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.lock().clone()
    }

    /// Captured messages at a given level.
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|e| e.level == level)
            .map(|e| e.message.clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.lock().len()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// A [`FunctionLog`] whose events land in this layer.
    pub fn function_log(&self) -> FunctionLog {
        use tracing_subscriber::layer::SubscriberExt;

        FunctionLog::from_subscriber(tracing_subscriber::registry().with(self.clone()))
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CapturedEvent>> {
        self.captured.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        self.lock().push(CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: BTreeMap<String, String>,
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields
                .insert(field.name().to_string(), value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields
                .insert(field.name().to_string(), format!("{:?}", value));
        }
    }
}
