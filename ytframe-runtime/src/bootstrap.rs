//! One-time bootstrap of the widget platform.
//!
//! [`initialize`] installs the platform's global readiness hook, injects the
//! loader script if the page lacks it, and hands back an [`Initialization`]
//! future. Firing the hook builds the process-wide [`PlayerRegistry`];
//! [`get_instance`] fails until then.
//!
//! Both steps are explicit so callers await readiness instead of racing it.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::{Instant, Sleep};

use ytframe_core::{ApiReadyHook, EmbedConfig, PageHost, ScriptTag, WidgetPlatform};

use crate::error::EmbedError;
use crate::registry::PlayerRegistry;

static GATE: OnceLock<BootstrapGate> = OnceLock::new();

fn global() -> &'static BootstrapGate {
    GATE.get_or_init(BootstrapGate::new)
}

/// Start loading the widget platform. Callable once per process.
///
/// A second call fails with [`EmbedError::AlreadyInitialized`] whether or not
/// the first has settled. An invalid `config` fails without using up the call.
pub fn initialize(
    host: Arc<dyn PageHost>,
    platform: Arc<dyn WidgetPlatform>,
    config: EmbedConfig,
) -> Result<Initialization, EmbedError> {
    global().initialize(host, platform, config)
}

/// The process-wide registry, once the platform has signalled readiness.
pub fn get_instance() -> Result<&'static PlayerRegistry, EmbedError> {
    global().instance()
}

/// Holds the "started" flag and the registry built by the readiness hook.
pub struct BootstrapGate {
    started: AtomicBool,
    registry: Arc<OnceLock<PlayerRegistry>>,
}

impl BootstrapGate {
    fn new() -> Self {
        Self {
            started: AtomicBool::new(false),
            registry: Arc::new(OnceLock::new()),
        }
    }

    pub fn initialize(
        &self,
        host: Arc<dyn PageHost>,
        platform: Arc<dyn WidgetPlatform>,
        config: EmbedConfig,
    ) -> Result<Initialization, EmbedError> {
        config.validate()?;
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(EmbedError::AlreadyInitialized);
        }

        let script = ScriptTag::from_config(&config);
        let timeout = config.ready_timeout();
        let (ready_tx, ready_rx) = oneshot::channel();

        let registry = Arc::clone(&self.registry);
        let registry_host = Arc::clone(&host);
        let hook = ApiReadyHook::new(move || {
            if registry
                .set(PlayerRegistry::new(registry_host, platform, config))
                .is_ok()
            {
                tracing::debug!("embed platform ready; player registry constructed");
            }
            let _ = ready_tx.send(());
        });
        host.set_api_ready_hook(hook);

        if !host.has_element(&script.id) {
            tracing::debug!(src = %script.src, "downloading embed platform script");
            host.inject_script(&script);
        }

        Ok(Initialization::new(ready_rx, timeout))
    }

    pub fn instance(&self) -> Result<&PlayerRegistry, EmbedError> {
        self.registry.get().ok_or(EmbedError::Uninitialized)
    }
}

/// Resolves when the platform's readiness hook fires.
///
/// Waits indefinitely unless the config set `ready_timeout_ms`, counted from
/// the [`initialize`] call.
#[derive(Debug)]
#[must_use = "initialization only reports readiness when awaited"]
pub struct Initialization {
    ready: oneshot::Receiver<()>,
    deadline: Option<(Duration, Instant)>,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl Initialization {
    fn new(ready: oneshot::Receiver<()>, timeout: Option<Duration>) -> Self {
        Self {
            ready,
            deadline: timeout.map(|after| (after, Instant::now() + after)),
            sleep: None,
        }
    }
}

impl Future for Initialization {
    type Output = Result<(), EmbedError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        match Pin::new(&mut this.ready).poll(cx) {
            Poll::Ready(Ok(())) => return Poll::Ready(Ok(())),
            Poll::Ready(Err(_)) => return Poll::Ready(Err(EmbedError::ReadyHookDropped)),
            Poll::Pending => {}
        }

        let Some((after, deadline)) = this.deadline else {
            return Poll::Pending;
        };
        // The timer is registered on first poll so construction needs no runtime.
        let sleep = this
            .sleep
            .get_or_insert_with(|| Box::pin(tokio::time::sleep_until(deadline)));
        match sleep.as_mut().poll(cx) {
            Poll::Ready(()) => {
                tracing::warn!(?after, "embed platform did not signal readiness in time");
                Poll::Ready(Err(EmbedError::ReadyTimeout { after }))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
