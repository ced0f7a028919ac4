//! ytframe runtime: bootstrap gate + player registry.
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # async fn demo(
//! #     host: Arc<dyn ytframe_core::PageHost>,
//! #     platform: Arc<dyn ytframe_core::WidgetPlatform>,
//! # ) -> Result<(), ytframe_runtime::EmbedError> {
//! ytframe_runtime::initialize(host, platform, Default::default())?.await?;
//!
//! let registry = ytframe_runtime::get_instance()?;
//! let player = registry.create_player(1, "dQw4w9WgXcQ")?.await?;
//! // ...
//! registry.destroy_player(1, "dQw4w9WgXcQ")?;
//! # drop(player);
//! # Ok(())
//! # }
//! ```

mod bootstrap;
mod error;
mod listener;
mod registry;

pub use bootstrap::{get_instance, initialize, BootstrapGate, Initialization};
pub use error::EmbedError;
pub use listener::PendingPlayer;
pub use registry::PlayerRegistry;

/// Install a `tracing` fmt subscriber filtered by `RUST_LOG` (default `info`).
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
