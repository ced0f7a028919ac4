//! Identifier newtypes and player states.
//!
//! A player is identified by the pair (container, media). [`PlayerKey`]
//! derives the single string token used both as the registry key and as the
//! DOM id of the player's placeholder element.

use std::fmt;

/// Fixed prefix of every player element id.
pub const KEY_PREFIX: &str = "ytframe-player";

/// Separator between the prefix, container id and media id.
pub const KEY_DELIMITER: char = '-';

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Caller-supplied identifier of the container that owns a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(pub u64);

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A video id or a playlist id, depending on how the player was created.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaId(pub String);

impl MediaId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for MediaId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MediaId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Composite identity of a player: equal iff both components are equal.
///
/// `Display` renders `ytframe-player-<container>-<media>`. The container id is
/// an unsigned integer and so never contains the delimiter, which keeps the
/// rendered token injective.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerKey {
    container: ContainerId,
    media: MediaId,
}

impl PlayerKey {
    pub fn new(container: u64, media: impl Into<MediaId>) -> Self {
        Self {
            container: ContainerId(container),
            media: media.into(),
        }
    }

    pub fn container(&self) -> ContainerId {
        self.container
    }

    pub fn media(&self) -> &MediaId {
        &self.media
    }

    /// Id of the placeholder element the widget is mounted on.
    pub fn element_id(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{KEY_PREFIX}{KEY_DELIMITER}{}{KEY_DELIMITER}{}",
            self.container, self.media
        )
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What a widget plays: a single video looped on itself, or a playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerSource {
    Video(MediaId),
    Playlist(MediaId),
}

/// Playback state as reported by a live widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerState {
    #[default]
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
}

impl PlayerState {
    /// Map the platform's numeric state; unknown codes read as `Unstarted`.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => PlayerState::Ended,
            1 => PlayerState::Playing,
            2 => PlayerState::Paused,
            3 => PlayerState::Buffering,
            5 => PlayerState::Cued,
            _ => PlayerState::Unstarted,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            PlayerState::Unstarted => -1,
            PlayerState::Ended => 0,
            PlayerState::Playing => 1,
            PlayerState::Paused => 2,
            PlayerState::Buffering => 3,
            PlayerState::Cued => 5,
        }
    }
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerState::Unstarted => write!(f, "unstarted"),
            PlayerState::Ended => write!(f, "ended"),
            PlayerState::Playing => write!(f, "playing"),
            PlayerState::Paused => write!(f, "paused"),
            PlayerState::Buffering => write!(f, "buffering"),
            PlayerState::Cued => write!(f, "cued"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
