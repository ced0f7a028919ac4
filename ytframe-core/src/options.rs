//! The option object handed to the widget platform, plus the two DOM nodes
//! (loader script and player placeholder) the page host is asked to insert.
//!
//! [`PlayerOptions`] serializes to the exact shape the platform's player
//! constructor expects (`videoId`, `playerVars.listType`, ...), so a browser
//! adapter can pass it through `serde-wasm-bindgen` unchanged.

use serde::Serialize;

use crate::config::EmbedConfig;
use crate::types::{PlayerKey, PlayerSource};

/// Inline style of the placeholder: hidden and zero-sized.
pub const PLACEHOLDER_STYLE: &str = "position: absolute; width: 0; height: 0; border: 0; display: none;";

/// Constructor options for one widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerOptions {
    pub width: String,
    pub height: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    pub player_vars: PlayerVars,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    Playlist,
}

/// Embedded player parameters. Integer flags are what the platform reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerVars {
    #[serde(rename = "loop", skip_serializing_if = "Option::is_none")]
    pub loop_: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_type: Option<ListType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list: Option<String>,
    pub controls: u8,
    pub autohide: u8,
    pub origin: String,
}

impl PlayerOptions {
    /// Build the options for `source`, restricted to the page's `origin`.
    ///
    /// A single video loops by naming itself as a one-item playlist; the
    /// platform ignores `loop` otherwise, and toggling it later would reload
    /// the iframe.
    pub fn new(config: &EmbedConfig, source: &PlayerSource, origin: &str) -> Self {
        let (video_id, loop_, playlist, list_type, list) = match source {
            PlayerSource::Video(id) => (
                Some(id.0.clone()),
                Some(1),
                Some(id.0.clone()),
                None,
                None,
            ),
            PlayerSource::Playlist(id) => {
                (None, None, None, Some(ListType::Playlist), Some(id.0.clone()))
            }
        };

        Self {
            width: config.width.clone(),
            height: config.height.clone(),
            video_id,
            player_vars: PlayerVars {
                loop_,
                playlist,
                list_type,
                list,
                controls: 0,
                autohide: 1,
                origin: origin.to_owned(),
            },
        }
    }
}

/// The loader `<script>` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTag {
    pub id: String,
    pub src: String,
    pub mime_type: &'static str,
}

impl ScriptTag {
    pub fn from_config(config: &EmbedConfig) -> Self {
        Self {
            id: config.script_id.clone(),
            src: config.script_src.clone(),
            mime_type: "text/javascript",
        }
    }
}

/// The hidden `<div>` a widget mounts itself on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub id: String,
    pub style: &'static str,
}

impl Placeholder {
    pub fn for_key(key: &PlayerKey) -> Self {
        Self {
            id: key.element_id(),
            style: PLACEHOLDER_STYLE,
        }
    }
}
