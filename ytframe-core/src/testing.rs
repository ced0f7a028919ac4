//! In-memory fakes of [`PageHost`] and [`WidgetPlatform`].
//!
//! Enabled by the `testing` feature. The fakes record every side effect and
//! let a test decide when (and whether) the platform calls back.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::PlatformError;
use crate::options::{Placeholder, PlayerOptions, ScriptTag};
use crate::platform::{
    ApiReadyHook, PageHost, PlayerEventSink, PlayerHandle, SharedPlayer, WidgetPlatform,
};
use crate::types::PlayerState;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

#[derive(Default)]
struct PageState {
    elements: Vec<String>,
    scripts: Vec<ScriptTag>,
    placeholders: BTreeMap<String, Placeholder>,
    removed: Vec<String>,
    hook: Option<ApiReadyHook>,
    hooks_installed: usize,
}

/// A document with a fixed origin.
pub struct FakePage {
    origin: String,
    state: Mutex<PageState>,
}

impl FakePage {
    pub fn new(origin: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::bare(origin))
    }

    /// A page that already contains an element with `id` (e.g. the loader script).
    pub fn with_element(origin: impl Into<String>, id: impl Into<String>) -> Arc<Self> {
        let page = Self::bare(origin);
        lock(&page.state).elements.push(id.into());
        Arc::new(page)
    }

    fn bare(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            state: Mutex::new(PageState::default()),
        }
    }

    /// Play the platform: invoke the installed readiness hook, if any.
    pub fn fire_api_ready(&self) -> bool {
        let hook = lock(&self.state).hook.take();
        match hook {
            Some(hook) => {
                hook.fire();
                true
            }
            None => false,
        }
    }

    /// Remove the readiness hook without firing it.
    pub fn take_api_ready_hook(&self) -> Option<ApiReadyHook> {
        lock(&self.state).hook.take()
    }

    pub fn hooks_installed(&self) -> usize {
        lock(&self.state).hooks_installed
    }

    pub fn injected_scripts(&self) -> Vec<ScriptTag> {
        lock(&self.state).scripts.clone()
    }

    pub fn placeholder(&self, id: &str) -> Option<Placeholder> {
        lock(&self.state).placeholders.get(id).cloned()
    }

    pub fn placeholder_count(&self) -> usize {
        lock(&self.state).placeholders.len()
    }

    /// Ids passed to `remove_placeholder`, in call order.
    pub fn removed_placeholders(&self) -> Vec<String> {
        lock(&self.state).removed.clone()
    }
}

impl PageHost for FakePage {
    fn origin(&self) -> String {
        self.origin.clone()
    }

    fn has_element(&self, id: &str) -> bool {
        let state = lock(&self.state);
        state.elements.iter().any(|e| e == id) || state.placeholders.contains_key(id)
    }

    fn inject_script(&self, script: &ScriptTag) {
        let mut state = lock(&self.state);
        state.elements.push(script.id.clone());
        state.scripts.push(script.clone());
    }

    fn set_api_ready_hook(&self, hook: ApiReadyHook) {
        let mut state = lock(&self.state);
        state.hook = Some(hook);
        state.hooks_installed += 1;
    }

    fn append_placeholder(&self, placeholder: &Placeholder) {
        lock(&self.state)
            .placeholders
            .insert(placeholder.id.clone(), placeholder.clone());
    }

    fn remove_placeholder(&self, id: &str) {
        let mut state = lock(&self.state);
        state.placeholders.remove(id);
        state.removed.push(id.to_owned());
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A call a [`FakePlayer`] received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCall {
    State,
    Stop,
    Destroy,
    RemoveErrorListener,
}

pub struct FakePlayer {
    state: Mutex<PlayerState>,
    calls: Mutex<Vec<PlayerCall>>,
    error_listener: AtomicBool,
}

impl FakePlayer {
    fn new() -> Self {
        Self {
            state: Mutex::new(PlayerState::Unstarted),
            calls: Mutex::new(Vec::new()),
            error_listener: AtomicBool::new(true),
        }
    }

    pub fn set_state(&self, state: PlayerState) {
        *lock(&self.state) = state;
    }

    pub fn calls(&self) -> Vec<PlayerCall> {
        lock(&self.calls).clone()
    }

    /// Calls other than state queries.
    pub fn commands(&self) -> Vec<PlayerCall> {
        self.calls()
            .into_iter()
            .filter(|call| *call != PlayerCall::State)
            .collect()
    }

    pub fn is_destroyed(&self) -> bool {
        self.calls().contains(&PlayerCall::Destroy)
    }

    pub fn error_listener_attached(&self) -> bool {
        self.error_listener.load(Ordering::SeqCst)
    }

    fn record(&self, call: PlayerCall) {
        lock(&self.calls).push(call);
    }
}

impl PlayerHandle for FakePlayer {
    fn state(&self) -> PlayerState {
        self.record(PlayerCall::State);
        *lock(&self.state)
    }

    fn stop(&self) {
        self.record(PlayerCall::Stop);
        *lock(&self.state) = PlayerState::Ended;
    }

    fn destroy(&self) {
        self.record(PlayerCall::Destroy);
    }

    fn remove_error_listener(&self) {
        self.record(PlayerCall::RemoveErrorListener);
        self.error_listener.store(false, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------

/// A widget the fake platform built.
#[derive(Clone)]
pub struct FakeWidget {
    pub element_id: String,
    pub options: PlayerOptions,
    pub events: Arc<dyn PlayerEventSink>,
    pub player: Arc<FakePlayer>,
}

#[derive(Default)]
pub struct FakePlatform {
    widgets: Mutex<Vec<FakeWidget>>,
    fail_next: Mutex<Option<PlatformError>>,
    ready_on_create: AtomicBool,
    error_on_create: Mutex<Option<i32>>,
}

impl FakePlatform {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make the next `create_player` call fail with `err`.
    pub fn fail_next(&self, err: PlatformError) {
        *lock(&self.fail_next) = Some(err);
    }

    /// Fire `on_ready` from inside `create_player`, before it returns.
    pub fn ready_on_create(&self, enabled: bool) {
        self.ready_on_create.store(enabled, Ordering::SeqCst);
    }

    /// Fire `on_error(code)` from inside the next `create_player` call,
    /// before it returns.
    pub fn error_on_create(&self, code: i32) {
        *lock(&self.error_on_create) = Some(code);
    }

    /// Forget every widget mounted on `element_id`, dropping the platform's
    /// references to their event sinks without calling back.
    pub fn discard_widgets(&self, element_id: &str) -> usize {
        let mut widgets = lock(&self.widgets);
        let before = widgets.len();
        widgets.retain(|w| w.element_id != element_id);
        before - widgets.len()
    }

    /// The most recent widget mounted on `element_id`.
    pub fn widget(&self, element_id: &str) -> Option<FakeWidget> {
        lock(&self.widgets)
            .iter()
            .rev()
            .find(|w| w.element_id == element_id)
            .cloned()
    }

    pub fn widget_count(&self) -> usize {
        lock(&self.widgets).len()
    }

    /// Deliver `onReady` to the latest widget on `element_id`.
    pub fn emit_ready(&self, element_id: &str) -> bool {
        match self.widget(element_id) {
            Some(widget) => {
                widget.events.on_ready();
                true
            }
            None => false,
        }
    }

    /// Deliver `onError`, unless the widget's error listener was removed.
    pub fn emit_error(&self, element_id: &str, code: i32) -> bool {
        match self.widget(element_id) {
            Some(widget) if widget.player.error_listener_attached() => {
                widget.events.on_error(code);
                true
            }
            _ => false,
        }
    }
}

impl WidgetPlatform for FakePlatform {
    fn create_player(
        &self,
        element_id: &str,
        options: &PlayerOptions,
        events: Arc<dyn PlayerEventSink>,
    ) -> Result<SharedPlayer, PlatformError> {
        if let Some(err) = lock(&self.fail_next).take() {
            return Err(err);
        }

        let player = Arc::new(FakePlayer::new());
        lock(&self.widgets).push(FakeWidget {
            element_id: element_id.to_owned(),
            options: options.clone(),
            events: Arc::clone(&events),
            player: Arc::clone(&player),
        });

        if self.ready_on_create.load(Ordering::SeqCst) {
            events.on_ready();
        }
        let error = lock(&self.error_on_create).take();
        if let Some(code) = error {
            events.on_error(code);
        }
        let handle: SharedPlayer = player;
        Ok(handle)
    }
}
