//! Seams to the outside world: the page that hosts the widgets, the widget
//! platform that builds them, and the handles it returns.
//!
//! All side effects (script injection, DOM insertion/removal, widget
//! construction) go through these traits. Implementations must be
//! `Send + Sync` so the registry can be shared across threads; a
//! single-threaded browser adapter can satisfy that with `send_wrapper`.

use std::fmt;
use std::sync::Arc;

use crate::error::PlatformError;
use crate::options::{Placeholder, PlayerOptions, ScriptTag};
use crate::types::PlayerState;

/// Shared capability to one live widget.
pub type SharedPlayer = Arc<dyn PlayerHandle>;

/// One live embedded widget.
pub trait PlayerHandle: Send + Sync {
    fn state(&self) -> PlayerState;

    fn stop(&self);

    /// Tear the widget down. The handle must not be used afterwards.
    fn destroy(&self);

    /// Stop delivering `onError` to the sink given at construction.
    fn remove_error_listener(&self);
}

impl fmt::Debug for dyn PlayerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlayerHandle")
    }
}

/// Receiver of a widget's `onReady` / `onError` callbacks.
///
/// The platform may call either method from any thread and more than once;
/// the implementation decides which call wins.
pub trait PlayerEventSink: Send + Sync {
    fn on_ready(&self);

    fn on_error(&self, code: i32);
}

/// Builds widgets.
pub trait WidgetPlatform: Send + Sync {
    /// Mount a new widget on the element `element_id`.
    ///
    /// Callbacks are delivered to `events`; a platform is allowed to deliver
    /// them before this method returns.
    fn create_player(
        &self,
        element_id: &str,
        options: &PlayerOptions,
        events: Arc<dyn PlayerEventSink>,
    ) -> Result<SharedPlayer, PlatformError>;
}

/// The document the widgets live in.
pub trait PageHost: Send + Sync {
    /// Origin the widgets are restricted to (e.g. `https://example.org`).
    fn origin(&self) -> String;

    fn has_element(&self, id: &str) -> bool;

    fn inject_script(&self, script: &ScriptTag);

    /// Install the platform's global "API ready" callback.
    fn set_api_ready_hook(&self, hook: ApiReadyHook);

    fn append_placeholder(&self, placeholder: &Placeholder);

    fn remove_placeholder(&self, id: &str);
}

/// The platform's global readiness callback. Firing consumes it.
pub struct ApiReadyHook(Box<dyn FnOnce() + Send>);

impl ApiReadyHook {
    pub fn new(callback: impl FnOnce() + Send + 'static) -> Self {
        Self(Box::new(callback))
    }

    pub fn fire(self) {
        (self.0)()
    }
}

impl fmt::Debug for ApiReadyHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiReadyHook")
    }
}
