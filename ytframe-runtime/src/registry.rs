//! The player registry: at most one live widget per (container, media) key.
//!
//! # Key states
//!
//! ```text
//! Absent --create--> Pending --onReady--> Ready --destroy--> Absent
//!                       |
//!                       +--onError--> Absent
//! ```
//!
//! Only `Ready` keys are visible to [`PlayerRegistry::get_player`]. A
//! `Pending` key still blocks a second create, so the presence check and the
//! reservation happen in one critical section before anything suspends.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use ytframe_core::{
    EmbedConfig, MediaId, PageHost, Placeholder, PlayerEventSink, PlayerKey, PlayerOptions,
    PlayerSource, PlayerState, SharedPlayer, WidgetPlatform,
};

use crate::error::EmbedError;
use crate::listener::{CreationListener, PendingPlayer};

pub(crate) enum Slot {
    Pending,
    Ready(SharedPlayer),
}

pub(crate) type SharedSlots = Arc<Mutex<HashMap<PlayerKey, Slot>>>;

/// Every map mutation is a plain insert/remove, so a poisoned lock still
/// holds a consistent map.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Creates, looks up and destroys players.
///
/// Obtained from [`crate::get_instance`] once the platform is ready.
pub struct PlayerRegistry {
    host: Arc<dyn PageHost>,
    platform: Arc<dyn WidgetPlatform>,
    config: EmbedConfig,
    slots: SharedSlots,
}

impl PlayerRegistry {
    pub(crate) fn new(
        host: Arc<dyn PageHost>,
        platform: Arc<dyn WidgetPlatform>,
        config: EmbedConfig,
    ) -> Self {
        Self {
            host,
            platform,
            config,
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The ready player for `(container, media)`, if any.
    pub fn get_player(&self, container: u64, media: impl Into<MediaId>) -> Option<SharedPlayer> {
        let key = PlayerKey::new(container, media);
        match lock(&self.slots).get(&key) {
            Some(Slot::Ready(player)) => Some(Arc::clone(player)),
            _ => None,
        }
    }

    /// Create a player for a single video, looping on itself.
    ///
    /// Fails immediately with [`EmbedError::PlayerExists`] if the key is
    /// pending or ready. Otherwise the widget is built right away and the
    /// returned future settles on the platform's first ready/error callback.
    pub fn create_player(
        &self,
        container: u64,
        media: impl Into<MediaId>,
    ) -> Result<PendingPlayer, EmbedError> {
        let media = media.into();
        let key = PlayerKey::new(container, media.clone());
        self.create(key, PlayerSource::Video(media))
    }

    /// Create a player for a playlist. Same protocol as [`create_player`].
    ///
    /// [`create_player`]: Self::create_player
    pub fn create_playlist_player(
        &self,
        container: u64,
        playlist: impl Into<MediaId>,
    ) -> Result<PendingPlayer, EmbedError> {
        let playlist = playlist.into();
        let key = PlayerKey::new(container, playlist.clone());
        self.create(key, PlayerSource::Playlist(playlist))
    }

    /// Tear down the ready player for `(container, media)`.
    ///
    /// The key is unmapped first; the widget is then stopped if playing,
    /// destroyed, and its placeholder removed.
    pub fn destroy_player(
        &self,
        container: u64,
        media: impl Into<MediaId>,
    ) -> Result<(), EmbedError> {
        let key = PlayerKey::new(container, media);

        let player = {
            let mut slots = lock(&self.slots);
            match slots.get(&key) {
                Some(Slot::Ready(player)) => {
                    let player = Arc::clone(player);
                    slots.remove(&key);
                    player
                }
                _ => return Err(EmbedError::PlayerMissing { key }),
            }
        };

        if player.state() == PlayerState::Playing {
            player.stop();
        }
        player.destroy();
        self.host.remove_placeholder(&key.element_id());
        tracing::debug!(key = %key, "player destroyed");
        Ok(())
    }

    fn create(&self, key: PlayerKey, source: PlayerSource) -> Result<PendingPlayer, EmbedError> {
        match lock(&self.slots).entry(key.clone()) {
            Entry::Occupied(_) => return Err(EmbedError::PlayerExists { key }),
            Entry::Vacant(slot) => {
                slot.insert(Slot::Pending);
            }
        }

        let placeholder = Placeholder::for_key(&key);
        self.host.append_placeholder(&placeholder);

        let options = PlayerOptions::new(&self.config, &source, &self.host.origin());
        let (listener, outcome) =
            CreationListener::new(key.clone(), Arc::clone(&self.slots), Arc::clone(&self.host));
        let events: Arc<dyn PlayerEventSink> = listener.clone();

        tracing::debug!(key = %key, source = ?source, "creating player");
        match self.platform.create_player(&placeholder.id, &options, events) {
            Ok(player) => listener.attach(player),
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "widget platform failed to create player");
                listener.cancel();
                return Err(err.into());
            }
        }

        Ok(PendingPlayer::new(key, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use tokio_test::{assert_pending, assert_ready, task};
    use ytframe_core::testing::{FakePage, FakePlatform, PlayerCall};
    use ytframe_core::{PlatformError, PlaybackError};

    const ORIGIN: &str = "https://table.example";

    struct Fixture {
        page: Arc<FakePage>,
        platform: Arc<FakePlatform>,
        registry: PlayerRegistry,
    }

    fn fixture() -> Fixture {
        let page = FakePage::new(ORIGIN);
        let platform = FakePlatform::new();
        let registry = PlayerRegistry::new(page.clone(), platform.clone(), EmbedConfig::default());
        Fixture {
            page,
            platform,
            registry,
        }
    }

    fn element(container: u64, media: &str) -> String {
        PlayerKey::new(container, media).element_id()
    }

    async fn ready_player(fx: &Fixture, container: u64, media: &str) -> SharedPlayer {
        let pending = fx.registry.create_player(container, media).expect("create");
        assert!(fx.platform.emit_ready(&element(container, media)));
        pending.await.expect("ready")
    }

    // ─── Create ──────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn create_then_ready_registers_handle() {
        let fx = fixture();
        let pending = fx.registry.create_player(1, "abc").expect("create");
        assert_eq!(pending.key(), &PlayerKey::new(1, "abc"));
        assert!(fx.registry.get_player(1, "abc").is_none(), "pending keys are invisible");

        let id = element(1, "abc");
        let placeholder = fx.page.placeholder(&id).expect("placeholder inserted");
        assert!(placeholder.style.contains("display: none"));

        let widget = fx.platform.widget(&id).expect("widget built");
        assert_eq!(widget.options.video_id.as_deref(), Some("abc"));
        assert_eq!(widget.options.player_vars.loop_, Some(1));
        assert_eq!(widget.options.player_vars.playlist.as_deref(), Some("abc"));
        assert_eq!(widget.options.player_vars.origin, ORIGIN);

        fx.platform.emit_ready(&id);
        let player = pending.await.expect("ready");

        let found = fx.registry.get_player(1, "abc").expect("registered");
        assert!(Arc::ptr_eq(&player, &found));
        assert!(!widget.player.error_listener_attached(), "ready detaches onError");
    }

    #[tokio::test]
    async fn playlist_player_uses_list_options() {
        let fx = fixture();
        let pending = fx.registry.create_playlist_player(4, "PL42").expect("create");
        let widget = fx.platform.widget(&element(4, "PL42")).expect("widget built");
        assert_eq!(widget.options.video_id, None);
        assert_eq!(widget.options.player_vars.list.as_deref(), Some("PL42"));
        assert_eq!(widget.options.player_vars.loop_, None);

        fx.platform.emit_ready(&element(4, "PL42"));
        pending.await.expect("ready");
        assert!(fx.registry.get_player(4, "PL42").is_some());
    }

    #[tokio::test]
    async fn second_create_while_pending_fails_synchronously() {
        let fx = fixture();
        let first = fx.registry.create_player(1, "abc").expect("first create");

        let err = fx.registry.create_player(1, "abc").unwrap_err();
        assert!(matches!(err, EmbedError::PlayerExists { .. }), "got: {err}");
        assert!(err.to_string().contains("already exists"));
        assert_eq!(fx.platform.widget_count(), 1, "no second widget");
        assert_eq!(fx.page.placeholder_count(), 1, "no second placeholder");

        fx.platform.emit_ready(&element(1, "abc"));
        first.await.expect("first still settles");
    }

    #[tokio::test]
    async fn create_while_ready_fails_and_playlist_shares_key_space() {
        let fx = fixture();
        ready_player(&fx, 1, "abc").await;

        let err = fx.registry.create_player(1, "abc").unwrap_err();
        assert!(matches!(err, EmbedError::PlayerExists { .. }));
        let err = fx.registry.create_playlist_player(1, "abc").unwrap_err();
        assert!(matches!(err, EmbedError::PlayerExists { .. }));

        // Other keys are unaffected.
        ready_player(&fx, 2, "abc").await;
        ready_player(&fx, 1, "abd").await;
    }

    #[tokio::test]
    async fn future_is_pending_until_a_callback_fires() {
        let fx = fixture();
        let mut pending = task::spawn(fx.registry.create_player(9, "slow").expect("create"));
        assert_pending!(pending.poll());
        assert_pending!(pending.poll());

        fx.platform.emit_ready(&element(9, "slow"));
        assert!(pending.is_woken());
        let player = assert_ready!(pending.poll()).expect("ready");
        assert!(Arc::ptr_eq(&player, &fx.registry.get_player(9, "slow").expect("registered")));
    }

    #[tokio::test]
    async fn ready_during_construction_still_registers() {
        let fx = fixture();
        fx.platform.ready_on_create(true);

        let pending = fx.registry.create_player(3, "eager").expect("create");
        assert!(fx.registry.get_player(3, "eager").is_some(), "registered at ready time");
        pending.await.expect("ready");
    }

    #[tokio::test]
    async fn platform_construction_failure_releases_the_key() {
        let fx = fixture();
        fx.platform.fail_next(PlatformError::new("YT is not defined"));

        let err = fx.registry.create_player(1, "abc").unwrap_err();
        assert!(matches!(err, EmbedError::Platform(_)), "got: {err}");
        assert_eq!(fx.page.placeholder_count(), 0, "placeholder removed");

        ready_player(&fx, 1, "abc").await;
    }

    // ─── Errors during Pending ───────────────────────────────────────────────

    #[tokio::test]
    async fn not_found_error_rejects_and_key_stays_absent() {
        let fx = fixture();
        let pending = fx.registry.create_player(1, "gone").expect("create");
        let id = element(1, "gone");

        fx.platform.emit_error(&id, PlaybackError::NOT_FOUND);
        let err = pending.await.unwrap_err();
        assert!(matches!(err, EmbedError::Playback(PlaybackError::NotFound)), "got: {err}");
        assert_eq!(
            err.to_string(),
            "Video not found; It may have been deleted or marked as private."
        );

        assert!(fx.registry.get_player(1, "gone").is_none());
        assert_eq!(fx.page.placeholder(&id), None);
        let widget = fx.platform.widget(&id).expect("widget");
        assert!(widget.player.is_destroyed(), "failed widget is torn down");

        // A late ready for the failed attempt changes nothing.
        widget.events.on_ready();
        assert!(fx.registry.get_player(1, "gone").is_none());

        // The key is free again.
        ready_player(&fx, 1, "gone").await;
    }

    #[rstest]
    #[case(PlaybackError::INVALID_PARAM, "Invalid videoId value.")]
    #[case(PlaybackError::EMBEDDING_NOT_ALLOWED, "Embedding is not supported for this video.")]
    #[case(
        PlaybackError::EMBEDDING_NOT_ALLOWED_DISGUISED,
        "Embedding is not supported for this video."
    )]
    #[case(9999, "Unspecified Error")]
    #[tokio::test]
    async fn pending_error_rejects_with_mapped_message(#[case] code: i32, #[case] message: &str) {
        let fx = fixture();
        let pending = fx.registry.create_player(1, "odd").expect("create");
        fx.platform.emit_error(&element(1, "odd"), code);

        let err = pending.await.unwrap_err();
        assert_eq!(err.to_string(), message);
        assert!(fx.registry.get_player(1, "odd").is_none());
    }

    #[tokio::test]
    async fn error_after_ready_is_ignored() {
        let fx = fixture();
        let player = ready_player(&fx, 1, "abc").await;
        let widget = fx.platform.widget(&element(1, "abc")).expect("widget");

        // The platform honours the detach...
        assert!(!fx.platform.emit_error(&element(1, "abc"), PlaybackError::HTML5));
        // ...and a misbehaving one is neutralised by the latch.
        widget.events.on_error(PlaybackError::HTML5);

        let found = fx.registry.get_player(1, "abc").expect("still registered");
        assert!(Arc::ptr_eq(&player, &found));
        assert!(!widget.player.is_destroyed());
    }

    #[tokio::test]
    async fn dropped_creation_still_registers_on_ready() {
        let fx = fixture();
        let id = element(5, "walk-away");
        drop(fx.registry.create_player(5, "walk-away").expect("create"));

        let widget = fx.platform.widget(&id).expect("widget");
        assert!(!widget.player.is_destroyed(), "dropping the future cancels nothing");
        assert!(fx.page.placeholder(&id).is_some());
        let err = fx.registry.create_player(5, "walk-away").unwrap_err();
        assert!(matches!(err, EmbedError::PlayerExists { .. }), "still pending");

        fx.platform.emit_ready(&id);
        let found = fx.registry.get_player(5, "walk-away").expect("registered");
        let expected: SharedPlayer = widget.player.clone();
        assert!(Arc::ptr_eq(&found, &expected));
    }

    #[tokio::test]
    async fn dropped_creation_still_releases_on_error() {
        let fx = fixture();
        let id = element(5, "gone");
        drop(fx.registry.create_player(5, "gone").expect("create"));

        fx.platform.emit_error(&id, PlaybackError::NOT_FOUND);
        assert!(fx.registry.get_player(5, "gone").is_none());
        assert_eq!(fx.page.placeholder_count(), 0);
        ready_player(&fx, 5, "gone").await;
    }

    #[tokio::test]
    async fn error_during_construction_rejects_and_tears_down() {
        let fx = fixture();
        fx.platform.error_on_create(PlaybackError::NOT_FOUND);

        let pending = fx.registry.create_player(6, "gone").expect("create");
        let err = pending.await.unwrap_err();
        assert!(matches!(err, EmbedError::Playback(PlaybackError::NotFound)), "got: {err}");
        assert_eq!(
            err.to_string(),
            "Video not found; It may have been deleted or marked as private."
        );

        assert!(fx.registry.get_player(6, "gone").is_none());
        let widget = fx.platform.widget(&element(6, "gone")).expect("widget");
        assert!(widget.player.is_destroyed(), "late handle is destroyed on arrival");
        assert_eq!(fx.page.placeholder_count(), 0);

        ready_player(&fx, 6, "gone").await;
    }

    #[tokio::test]
    async fn platform_dropping_callbacks_fails_instead_of_hanging() {
        let fx = fixture();
        let pending = fx.registry.create_player(8, "silent").expect("create");
        assert_eq!(fx.platform.discard_widgets(&element(8, "silent")), 1);

        let err = pending.await.unwrap_err();
        assert!(matches!(err, EmbedError::CallbacksDropped { .. }), "got: {err}");
        assert_eq!(fx.page.placeholder_count(), 0);

        // The reservation went with the callbacks.
        ready_player(&fx, 8, "silent").await;
    }

    // ─── Destroy ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn destroy_stops_playing_player_before_release() {
        let fx = fixture();
        ready_player(&fx, 1, "abc").await;
        let widget = fx.platform.widget(&element(1, "abc")).expect("widget");
        widget.player.set_state(PlayerState::Playing);

        fx.registry.destroy_player(1, "abc").expect("destroy");

        assert_eq!(
            widget.player.commands(),
            vec![PlayerCall::RemoveErrorListener, PlayerCall::Stop, PlayerCall::Destroy]
        );
        assert!(fx.registry.get_player(1, "abc").is_none());
        assert_eq!(fx.page.removed_placeholders(), vec![element(1, "abc")]);
    }

    #[tokio::test]
    async fn destroy_skips_stop_when_not_playing() {
        let fx = fixture();
        ready_player(&fx, 1, "abc").await;
        let widget = fx.platform.widget(&element(1, "abc")).expect("widget");
        widget.player.set_state(PlayerState::Paused);

        fx.registry.destroy_player(1, "abc").expect("destroy");
        assert!(!widget.player.commands().contains(&PlayerCall::Stop));
        assert!(widget.player.is_destroyed());
    }

    #[tokio::test]
    async fn destroy_missing_or_pending_key_fails() {
        let fx = fixture();
        let err = fx.registry.destroy_player(1, "nope").unwrap_err();
        assert!(matches!(err, EmbedError::PlayerMissing { .. }), "got: {err}");
        assert!(err.to_string().contains("does not exist"));

        let pending = fx.registry.create_player(1, "later").expect("create");
        let err = fx.registry.destroy_player(1, "later").unwrap_err();
        assert!(matches!(err, EmbedError::PlayerMissing { .. }));
        assert_eq!(fx.page.placeholder_count(), 1, "pending placeholder untouched");

        fx.platform.emit_ready(&element(1, "later"));
        pending.await.expect("ready");
        fx.registry.destroy_player(1, "later").expect("destroy once ready");
    }

    #[tokio::test]
    async fn create_get_destroy_get_destroy() {
        let fx = fixture();
        let player = ready_player(&fx, 1, "abc").await;
        assert!(Arc::ptr_eq(&player, &fx.registry.get_player(1, "abc").expect("found")));

        fx.registry.destroy_player(1, "abc").expect("destroy");
        assert!(fx.registry.get_player(1, "abc").is_none());

        let err = fx.registry.destroy_player(1, "abc").unwrap_err();
        assert!(matches!(err, EmbedError::PlayerMissing { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_destroys_release_the_player_once() {
        let fx = Arc::new(fixture());
        ready_player(&fx, 7, "twice").await;
        let widget = fx.platform.widget(&element(7, "twice")).expect("widget");
        widget.player.set_state(PlayerState::Playing);

        let mut joins = Vec::new();
        for _ in 0..8 {
            let fx = Arc::clone(&fx);
            joins.push(tokio::spawn(async move { fx.registry.destroy_player(7, "twice") }));
        }
        let mut ok = 0;
        for join in joins {
            if join.await.expect("join").is_ok() {
                ok += 1;
            }
        }

        assert_eq!(ok, 1);
        let commands = widget.player.commands();
        assert_eq!(commands.iter().filter(|c| **c == PlayerCall::Stop).count(), 1);
        assert_eq!(commands.iter().filter(|c| **c == PlayerCall::Destroy).count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_for_one_key_admit_exactly_one() {
        let fx = Arc::new(fixture());
        let mut joins = Vec::new();
        for _ in 0..16 {
            let fx = Arc::clone(&fx);
            joins.push(tokio::spawn(async move { fx.registry.create_player(7, "race") }));
        }

        // Results (and so the winning reservation) stay alive until the asserts run.
        let mut results = Vec::new();
        for join in joins {
            results.push(join.await.expect("join"));
        }
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(fx.platform.widget_count(), 1);
    }
}
