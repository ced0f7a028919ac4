use std::time::Duration;

use thiserror::Error;

use ytframe_core::{ConfigError, PlatformError, PlaybackError, PlayerKey};

/// Error surface of the bootstrap gate and the player registry.
#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("cannot initialize the embed platform more than once")]
    AlreadyInitialized,

    #[error("tried to get the player registry before initialization")]
    Uninitialized,

    #[error("player already exists for {key}")]
    PlayerExists { key: PlayerKey },

    #[error("player does not exist: {key}")]
    PlayerMissing { key: PlayerKey },

    /// Carries the mapped platform message verbatim.
    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error("embed platform did not become ready within {after:?}")]
    ReadyTimeout { after: Duration },

    #[error("readiness hook was dropped without being fired")]
    ReadyHookDropped,

    #[error("widget platform dropped the callbacks for {key} before either fired")]
    CallbacksDropped { key: PlayerKey },

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}
