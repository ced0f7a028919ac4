//! ytframe core library: identifiers, widget options, config, collaborator traits.
//!
//! - [`types`] — [`PlayerKey`] and friends, [`PlayerState`]
//! - [`error`] — [`ConfigError`], [`PlaybackError`], [`PlatformError`]
//! - [`config`] — [`EmbedConfig`] and YAML loading
//! - [`options`] — the option object and DOM nodes handed to collaborators
//! - [`platform`] — [`PageHost`], [`WidgetPlatform`], [`PlayerHandle`] seams
//! - `testing` (feature `testing`) — in-memory fakes of the seams

pub mod config;
pub mod error;
pub mod options;
pub mod platform;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod types;

pub use config::EmbedConfig;
pub use error::{ConfigError, PlatformError, PlaybackError};
pub use options::{ListType, Placeholder, PlayerOptions, PlayerVars, ScriptTag};
pub use platform::{
    ApiReadyHook, PageHost, PlayerEventSink, PlayerHandle, SharedPlayer, WidgetPlatform,
};
pub use types::{ContainerId, MediaId, PlayerKey, PlayerSource, PlayerState};
