//! Playback controller
//!
//! Ties the queue, its rendered view and the live audio session together.
//!
//! Starting a track is split up so the host never holds the controller while
//! it waits on the network or the audio element:
//!
//! 1. An operation that changes the current entry returns a [`PlayTicket`]
//!    and moves to `Loading`.
//! 2. The host resolves the ticket's track and calls
//!    [`PlaybackController::start_play`], which swaps in the new session and
//!    hands back a [`PendingStart`].
//! 3. Once [`PendingStart::wait`] resolves, the host passes the outcome to
//!    [`PlaybackController::complete_start`].
//!
//! Only the most recently issued ticket is honoured. If the user picked
//! another track while a lookup or start was in flight, the older result is
//! dropped. [`PlaybackController::finish_play`] runs steps 2 and 3 for hosts
//! that own the controller outright.

use crate::error::{PlaybackError, Result};
use crate::events::PlaybackEvent;
use crate::player::{AudioBackend, AudioPlayer, PlayFuture};
use crate::queue::{QueueChange, QueueModel};
use crate::session::{PlaybackSession, SessionId};
use crate::types::{format_position, PlaybackState};
use crate::view::{QueueView, RowBox};
use crate::volume::Volume;
use cadence_core::{PlaybackSettings, TrackDetails, TrackId, TrackResolver};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Permission to load one track
///
/// Stale once any later ticket has been issued or playback was stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayTicket {
    generation: u64,
    track_id: TrackId,
}

impl PlayTicket {
    /// Track to resolve and load
    pub fn track_id(&self) -> &TrackId {
        &self.track_id
    }

    /// Issue order of this ticket
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What `next` / `previous` require from the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The pointer moved; resolve and load the ticket's track
    Load(PlayTicket),

    /// At the boundary; replay the current track from the start
    Restart,
}

/// A start requested from the live session
///
/// Owns nothing borrowed from the controller; await it with
/// [`PendingStart::wait`] and hand the outcome to
/// [`PlaybackController::complete_start`].
pub struct PendingStart {
    session_id: SessionId,
    generation: u64,
    started: PlayFuture,
}

impl PendingStart {
    /// Session being started
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Wait for the audio element to answer
    pub async fn wait(self) -> StartOutcome {
        StartOutcome {
            session_id: self.session_id,
            generation: self.generation,
            result: self.started.await,
        }
    }
}

impl std::fmt::Debug for PendingStart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingStart")
            .field("session_id", &self.session_id)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

/// Answer of the audio element to a [`PendingStart`]
#[derive(Debug)]
pub struct StartOutcome {
    session_id: SessionId,
    generation: u64,
    result: Result<()>,
}

/// Orchestrates queue, view and audio session
pub struct PlaybackController<B: AudioBackend> {
    backend: B,
    queue: QueueModel,
    view: QueueView,
    session: Option<PlaybackSession<B::Player>>,
    state: PlaybackState,
    volume: Volume,
    generation: u64,
    next_session: u64,
    pending_events: Vec<PlaybackEvent>,
}

impl<B: AudioBackend> PlaybackController<B> {
    /// Create new controller at full volume
    pub fn new(backend: B) -> Self {
        Self::with_settings(backend, &PlaybackSettings::default())
    }

    /// Create new controller with the configured volume and mute state
    pub fn with_settings(backend: B, settings: &PlaybackSettings) -> Self {
        let mut volume = Volume::new(settings.initial_volume);
        if settings.start_muted {
            volume.mute();
        }

        Self {
            backend,
            queue: QueueModel::new(),
            view: QueueView::new(),
            session: None,
            state: PlaybackState::Idle,
            volume,
            generation: 0,
            next_session: 0,
            pending_events: Vec::new(),
        }
    }

    // ===== Queries =====

    /// Current playback state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// The queue
    pub fn queue(&self) -> &QueueModel {
        &self.queue
    }

    /// The rendered queue
    pub fn view(&self) -> &QueueView {
        &self.view
    }

    /// The rendered queue, for filtering and draining row patches
    pub fn view_mut(&mut self) -> &mut QueueView {
        &mut self.view
    }

    /// Live audio session, if any
    pub fn session(&self) -> Option<&PlaybackSession<B::Player>> {
        self.session.as_ref()
    }

    /// Id of the live audio session
    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(PlaybackSession::id)
    }

    /// Volume state
    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    /// The audio backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Check if `ticket` is still the latest issued
    pub fn is_current_ticket(&self, ticket: &PlayTicket) -> bool {
        ticket.generation == self.generation
    }

    // ===== Track loading =====

    /// Issue a ticket for `track_id` and enter `Loading`
    ///
    /// Any ticket issued earlier becomes stale.
    pub fn begin_play(&mut self, track_id: TrackId) -> PlayTicket {
        self.generation += 1;
        self.set_state(PlaybackState::Loading);
        tracing::debug!(track = %track_id, generation = self.generation, "Loading track");

        PlayTicket {
            generation: self.generation,
            track_id,
        }
    }

    /// Replace the live session with `details` and ask it to start
    ///
    /// Returns `Ok(None)` without touching anything if `ticket` is stale.
    /// The previous session is paused and dropped before the new player is
    /// created, so at most one stream is ever audible. The track labels are
    /// announced here, before the start is known to succeed.
    pub fn start_play(
        &mut self,
        ticket: PlayTicket,
        details: TrackDetails,
    ) -> Result<Option<PendingStart>> {
        if !self.is_current_ticket(&ticket) {
            tracing::debug!(
                track = %ticket.track_id,
                generation = ticket.generation,
                latest = self.generation,
                "Discarding stale track load"
            );
            return Ok(None);
        }

        let previous_track_id = self.close_session();

        let mut player = match self.backend.load(&details.stream_url) {
            Ok(player) => player,
            Err(e) => {
                tracing::error!(track = %ticket.track_id, url = %details.stream_url, error = %e, "Failed to load track");
                self.set_state(PlaybackState::Idle);
                self.emit_error(&e);
                return Err(e);
            }
        };
        player.set_volume(self.volume.level());
        player.set_muted(self.volume.is_muted());

        let session_id = SessionId::new(self.next_session);
        self.next_session += 1;
        let session = self
            .session
            .insert(PlaybackSession::new(session_id, ticket.track_id.clone(), player));
        let started = session.player_mut().play();

        self.pending_events.push(PlaybackEvent::TrackChanged {
            track_id: ticket.track_id.to_string(),
            previous_track_id,
        });
        self.pending_events.push(PlaybackEvent::NowPlaying {
            name: details.name,
            artist_name: details.artist_name,
        });

        Ok(Some(PendingStart {
            session_id,
            generation: ticket.generation,
            started,
        }))
    }

    /// Apply the result of a start once the audio element answered
    ///
    /// Returns `Ok(true)` if the controller is now `Playing`. A start from a
    /// replaced session, or one overtaken by a newer ticket, changes no state.
    /// A refused start leaves the session paused.
    pub fn complete_start(&mut self, outcome: StartOutcome) -> Result<bool> {
        let StartOutcome {
            session_id,
            generation,
            result,
        } = outcome;

        if self.session_id() != Some(session_id) {
            tracing::debug!(session = %session_id, "Start finished for a replaced session");
            return Ok(false);
        }
        let latest = generation == self.generation;

        match result {
            Err(e) => {
                tracing::error!(session = %session_id, error = %e, "Failed to start playback");
                if latest {
                    self.set_state(PlaybackState::Paused);
                }
                self.emit_error(&e);
                Err(e)
            }
            Ok(()) if latest => {
                tracing::info!(session = %session_id, "Now playing");
                self.set_state(PlaybackState::Playing);
                self.emit_position();
                Ok(true)
            }
            Ok(()) => {
                tracing::debug!(session = %session_id, "Start overtaken by a newer load");
                Ok(false)
            }
        }
    }

    /// `start_play` and `complete_start` in one call
    ///
    /// Returns `Ok(false)` if `ticket` is stale or was overtaken while the
    /// audio element started.
    pub async fn finish_play(
        &mut self,
        ticket: PlayTicket,
        details: TrackDetails,
    ) -> Result<bool> {
        let pending = self.start_play(ticket, details)?;
        self.await_start(pending).await
    }

    async fn await_start(&mut self, pending: Option<PendingStart>) -> Result<bool> {
        match pending {
            Some(pending) => {
                let outcome = pending.wait().await;
                self.complete_start(outcome)
            }
            None => Ok(false),
        }
    }

    /// Give up on `ticket` after its lookup failed
    ///
    /// Restores the state of whatever session is still live. Stale tickets
    /// are ignored.
    pub fn abort_play(&mut self, ticket: &PlayTicket, error: &PlaybackError) {
        if !self.is_current_ticket(ticket) {
            return;
        }

        tracing::warn!(track = %ticket.track_id, error = %error, "Track load aborted");
        let state = match &self.session {
            Some(session) if session.player().is_paused() => PlaybackState::Paused,
            Some(_) => PlaybackState::Playing,
            None => PlaybackState::Idle,
        };
        self.set_state(state);
        self.emit_error(error);
    }

    /// Resolve and load `ticket` in one call
    ///
    /// Holds the controller across the lookup; hosts that must stay
    /// responsive meanwhile call `start_play` themselves.
    pub async fn load<R>(&mut self, resolver: &R, ticket: PlayTicket) -> Result<bool>
    where
        R: TrackResolver + ?Sized,
    {
        match resolver.resolve(&ticket.track_id).await {
            Ok(details) => self.finish_play(ticket, details).await,
            Err(e) => {
                let error = PlaybackError::from(e);
                self.abort_play(&ticket, &error);
                Err(error)
            }
        }
    }

    /// Play `track_id` without touching the queue
    pub async fn play_track<R>(&mut self, resolver: &R, track_id: TrackId) -> Result<bool>
    where
        R: TrackResolver + ?Sized,
    {
        let ticket = self.begin_play(track_id);
        self.load(resolver, ticket).await
    }

    fn current_ticket(&mut self) -> Option<PlayTicket> {
        let track_id = self.queue.current_track()?.clone();
        Some(self.begin_play(track_id))
    }

    fn close_session(&mut self) -> Option<String> {
        self.session.take().map(|session| {
            let track_id = session.track_id().to_string();
            session.close();
            track_id
        })
    }

    /// Tear down the session and go idle
    ///
    /// Also invalidates any ticket in flight.
    pub fn stop(&mut self) {
        self.generation += 1;
        self.close_session();
        self.set_state(PlaybackState::Idle);
        self.pending_events.push(PlaybackEvent::PlaybackStopped);
    }

    // ===== Transport =====

    /// Pause if playing
    pub fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.player_mut().pause();
            self.set_state(PlaybackState::Paused);
        }
    }

    fn start_session(&mut self) -> Option<PendingStart> {
        let generation = self.generation;
        let session = self.session.as_mut()?;
        Some(PendingStart {
            session_id: session.id(),
            generation,
            started: session.player_mut().play(),
        })
    }

    /// Ask a paused session to resume
    pub fn start_resume(&mut self) -> Option<PendingStart> {
        if self.state != PlaybackState::Paused {
            return None;
        }
        self.start_session()
    }

    /// Resume if paused
    pub async fn resume(&mut self) -> Result<()> {
        let pending = self.start_resume();
        self.await_start(pending).await.map(drop)
    }

    /// Pause when playing, ask to resume when paused
    ///
    /// Nothing happens while idle or loading.
    pub fn start_toggle_play_pause(&mut self) -> Option<PendingStart> {
        match self.state {
            PlaybackState::Playing => {
                self.pause();
                None
            }
            PlaybackState::Paused => self.start_resume(),
            PlaybackState::Idle | PlaybackState::Loading => {
                tracing::debug!(state = self.state.as_str(), "Play/pause ignored");
                None
            }
        }
    }

    /// Playing and Paused swap; nothing happens while idle or loading
    pub async fn toggle_play_pause(&mut self) -> Result<()> {
        let pending = self.start_toggle_play_pause();
        self.await_start(pending).await.map(drop)
    }

    /// Rewind the live track and ask it to play
    pub fn start_restart(&mut self) -> Option<PendingStart> {
        self.session
            .as_mut()?
            .player_mut()
            .set_position(Duration::ZERO);
        self.start_session()
    }

    /// Replay the live track from the start
    pub async fn restart(&mut self) -> Result<()> {
        let pending = self.start_restart();
        self.await_start(pending).await.map(drop)
    }

    /// Move to the next entry, or restart at the end of the queue
    pub fn next_step(&mut self) -> Step {
        match self.queue.advance() {
            Some(change) => {
                self.apply_change(change);
                self.current_ticket().map_or(Step::Restart, Step::Load)
            }
            None => Step::Restart,
        }
    }

    /// Move to the previous entry, or restart at the start of the queue
    pub fn previous_step(&mut self) -> Step {
        match self.queue.retreat() {
            Some(change) => {
                self.apply_change(change);
                self.current_ticket().map_or(Step::Restart, Step::Load)
            }
            None => Step::Restart,
        }
    }

    /// Skip forward, restarting in place at the last entry
    pub async fn next<R>(&mut self, resolver: &R) -> Result<()>
    where
        R: TrackResolver + ?Sized,
    {
        match self.next_step() {
            Step::Load(ticket) => self.load(resolver, ticket).await.map(drop),
            Step::Restart => self.restart().await,
        }
    }

    /// Skip back, restarting in place at the first entry
    pub async fn previous<R>(&mut self, resolver: &R) -> Result<()>
    where
        R: TrackResolver + ?Sized,
    {
        match self.previous_step() {
            Step::Load(ticket) => self.load(resolver, ticket).await.map(drop),
            Step::Restart => self.restart().await,
        }
    }

    /// The live track reached its end
    ///
    /// Advances to the next entry if there is one. At the end of the queue
    /// the track is rewound and paused. The same happens when the queue
    /// pointer already left the ended track, since a newer request owns the
    /// pointer then. Notifications from a replaced session are ignored.
    pub fn on_ended(&mut self, session_id: SessionId) -> Option<PlayTicket> {
        let session = match self.session.as_mut() {
            Some(session) if session.id() == session_id => session,
            _ => {
                tracing::debug!(session = %session_id, "Ignoring ended from replaced session");
                return None;
            }
        };

        let finished = session.track_id().clone();
        self.pending_events.push(PlaybackEvent::TrackFinished {
            track_id: finished.to_string(),
        });

        let superseded = self.state == PlaybackState::Loading
            || self.queue.current_track() != Some(&finished);
        if superseded {
            tracing::debug!(track = %finished, "Pointer moved on; not advancing");
        } else if let Some(change) = self.queue.advance() {
            self.apply_change(change);
            return self.current_ticket();
        }

        let player = session.player_mut();
        player.pause();
        player.set_position(Duration::ZERO);
        if self.state != PlaybackState::Loading {
            self.set_state(PlaybackState::Paused);
        }
        self.emit_position();
        None
    }

    /// Periodic position report from the live session
    pub fn on_time_update(&mut self, session_id: SessionId) {
        if self.session_id() == Some(session_id) {
            self.emit_position();
        }
    }

    /// Seek the live track
    pub fn seek(&mut self, position: Duration) {
        if let Some(session) = self.session.as_mut() {
            session.player_mut().set_position(position);
            self.emit_position();
        }
    }

    // ===== Volume =====

    /// Set volume level (0.0-1.0); mute state is kept
    pub fn set_volume(&mut self, level: f32) {
        self.volume.set_level(level);
        self.apply_volume();
    }

    /// Toggle mute; the level survives
    pub fn toggle_mute(&mut self) {
        self.volume.toggle_mute();
        self.apply_volume();
    }

    fn apply_volume(&mut self) {
        if let Some(session) = self.session.as_mut() {
            let player = session.player_mut();
            player.set_volume(self.volume.level());
            player.set_muted(self.volume.is_muted());
        }

        self.pending_events.push(PlaybackEvent::VolumeChanged {
            volume: self.volume.level(),
            muted: self.volume.is_muted(),
            level: self.volume.indicator(),
        });
    }

    // ===== Queue =====

    /// Replace the queue with `candidates` and load `selected`
    ///
    /// Ends any shuffled session. On `NotFound` nothing changes.
    pub fn start_queue(&mut self, candidates: &[TrackId], selected: &TrackId) -> Result<PlayTicket> {
        let was_shuffled = self.queue.is_shuffled();
        let change = self.queue.build_from(candidates, selected)?;
        self.apply_change(change);

        if was_shuffled {
            self.pending_events
                .push(PlaybackEvent::ShuffleChanged { shuffled: false });
        }

        Ok(self.begin_play(selected.clone()))
    }

    /// Queue `track_id` right after the current entry
    ///
    /// Returns a ticket when the queue was empty and nothing is loaded.
    pub fn insert_next(&mut self, track_id: TrackId) -> Option<PlayTicket> {
        let was_empty = self.queue.is_empty();
        let change = self.queue.insert_next(track_id);
        self.apply_change(change);
        self.ticket_if_first(was_empty)
    }

    /// Queue `track_id` at the end
    ///
    /// Returns a ticket when the queue was empty and nothing is loaded.
    pub fn append(&mut self, track_id: TrackId) -> Option<PlayTicket> {
        let was_empty = self.queue.is_empty();
        let change = self.queue.append(track_id);
        self.apply_change(change);
        self.ticket_if_first(was_empty)
    }

    fn ticket_if_first(&mut self, was_empty: bool) -> Option<PlayTicket> {
        if was_empty && self.session.is_none() && self.state == PlaybackState::Idle {
            self.current_ticket()
        } else {
            None
        }
    }

    /// Remove the entry at `position`
    ///
    /// Removing the current entry returns a ticket for its successor;
    /// removing the last remaining entry stops playback.
    pub fn remove_at(&mut self, position: usize) -> Result<Option<PlayTicket>> {
        let outcome = self.queue.remove_at(position)?;
        self.apply_change(outcome.change);

        if outcome.stop {
            self.stop();
            return Ok(None);
        }
        if outcome.current_changed {
            return Ok(self.current_ticket());
        }
        Ok(None)
    }

    /// Move one entry
    pub fn move_to(&mut self, from: usize, to: usize) -> Result<()> {
        let change = self.queue.move_to(from, to)?;
        self.apply_change(change);
        Ok(())
    }

    /// Finish a drag of the row at `dragged`, dropped at height `y`
    ///
    /// Moves the entry to the position picked by the nearest-midpoint rule,
    /// then drops every entry whose row is hidden by the filter (the current
    /// entry always stays). Returns the entry's final position.
    pub fn drop_dragged(&mut self, dragged: usize, boxes: &[RowBox], y: f64) -> Result<usize> {
        if dragged >= self.queue.len() {
            return Err(PlaybackError::IndexOutOfBounds(dragged));
        }
        let key = self.queue.keys()[dragged];

        let target = self.view.drop_target(dragged, boxes, y);
        self.move_to(dragged, target)?;

        let visible: HashSet<_> = self.view.visible_keys().into_iter().collect();
        let change = self.queue.retain_keys(&visible);
        self.apply_change(change);

        self.queue
            .position_of(key)
            .ok_or_else(|| PlaybackError::InvalidState("Dragged entry was filtered out".to_string()))
    }

    /// Play the entry at `position` (a click on its row)
    pub fn jump_to(&mut self, position: usize) -> Result<PlayTicket> {
        let change = self.queue.jump_to(position)?;
        self.apply_change(change);
        self.current_ticket()
            .ok_or_else(|| PlaybackError::InvalidState("Queue has no current entry".to_string()))
    }

    /// Keep only the current entry
    pub fn clear_queue(&mut self) {
        let change = self.queue.clear_upcoming_and_history();
        self.apply_change(change);
    }

    /// Shuffle or restore the queue
    pub fn toggle_shuffle(&mut self) {
        self.toggle_shuffle_with(&mut rand::thread_rng());
    }

    /// Shuffle or restore the queue with a given generator
    pub fn toggle_shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.queue.is_shuffled() {
            match self.queue.unshuffle() {
                Ok(change) => self.apply_change(change),
                Err(e) => tracing::debug!(error = %e, "Nothing to restore"),
            }
        } else {
            let change = self.queue.shuffle_with(rng);
            self.apply_change(change);
        }

        self.pending_events.push(PlaybackEvent::ShuffleChanged {
            shuffled: self.queue.is_shuffled(),
        });
    }

    fn apply_change(&mut self, change: QueueChange) {
        self.view.sync(&self.queue, &change);

        if !matches!(
            change,
            QueueChange::PointerMoved { .. } | QueueChange::Unchanged
        ) {
            self.pending_events.push(PlaybackEvent::QueueChanged {
                length: self.queue.len(),
            });
        }
    }

    // ===== Events =====

    /// Take events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.state != state {
            self.state = state;
            self.pending_events
                .push(PlaybackEvent::StateChanged { state });
        }
    }

    fn emit_position(&mut self) {
        if let Some(session) = &self.session {
            let player = session.player();
            let position = player.position();
            self.pending_events.push(PlaybackEvent::PositionUpdate {
                position_secs: position.as_secs_f64(),
                duration_secs: player.duration().map(|d| d.as_secs_f64()),
                display: format_position(position),
            });
        }
    }

    fn emit_error(&mut self, error: &PlaybackError) {
        self.pending_events.push(PlaybackEvent::Error {
            message: error.to_string(),
        });
    }
}
