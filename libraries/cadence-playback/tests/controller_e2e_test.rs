//! End-to-end tests for the playback controller
//!
//! Drives the controller through the flows the player page produces
//! (library click, next/previous, natural end, queue edits) against a fake
//! audio backend and catalog.


use cadence_core::TrackId;
use cadence_playback::{
    PlaybackController, PlaybackError, PlaybackEvent, PlaybackState, RowBox, Step, VolumeLevel,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use test_helpers::{details, ids, order, MockBackend, MockResolver};

type Controller = PlaybackController<MockBackend>;

async fn playing(names: &[&str], selected: &str) -> (Controller, MockBackend, MockResolver) {
    test_helpers::init_tracing();

    let backend = MockBackend::new();
    let resolver = MockResolver::new();
    let mut controller = PlaybackController::new(backend.clone());

    let ticket = controller
        .start_queue(&ids(names), &TrackId::new(selected))
        .unwrap();
    controller.load(&resolver, ticket).await.unwrap();
    controller.drain_events();

    (controller, backend, resolver)
}

fn current(controller: &Controller) -> Option<String> {
    controller
        .session()
        .map(|session| session.track_id().as_str().to_string())
}

// ===== Starting playback =====

#[tokio::test]
async fn test_library_click_plays_selected_track() {
    test_helpers::init_tracing();
    let backend = MockBackend::new();
    let resolver = MockResolver::new();
    let mut controller = PlaybackController::new(backend.clone());

    let ticket = controller
        .start_queue(&ids(&["a", "b", "c"]), &TrackId::new("b"))
        .unwrap();
    assert_eq!(controller.state(), PlaybackState::Loading);

    assert!(controller.load(&resolver, ticket).await.unwrap());

    assert_eq!(controller.state(), PlaybackState::Playing);
    assert_eq!(current(&controller).as_deref(), Some("b"));
    assert_eq!(backend.audible(), 1);
    assert_eq!(backend.last().unwrap().url.as_str(), "http://localhost:3000/b.mp3");

    let events = controller.drain_events();
    assert!(events.contains(&PlaybackEvent::TrackChanged {
        track_id: "b".to_string(),
        previous_track_id: None,
    }));
    assert!(events.contains(&PlaybackEvent::NowPlaying {
        name: "Song b".to_string(),
        artist_name: "Artist b".to_string(),
    }));
    assert!(events.contains(&PlaybackEvent::StateChanged {
        state: PlaybackState::Playing
    }));
}

#[tokio::test]
async fn test_new_track_stops_previous_session() {
    let (mut controller, backend, resolver) = playing(&["a", "b", "c"], "a").await;

    controller.next(&resolver).await.unwrap();
    controller.next(&resolver).await.unwrap();

    let players = backend.players();
    assert_eq!(players.len(), 3);
    assert!(players[0].paused);
    assert!(players[1].paused);
    assert!(!players[2].paused);
    assert_eq!(backend.audible(), 1);
    assert_eq!(current(&controller).as_deref(), Some("c"));
}

#[tokio::test]
async fn test_volume_and_mute_carry_to_next_track() {
    let (mut controller, backend, resolver) = playing(&["a", "b"], "a").await;

    controller.set_volume(0.3);
    controller.toggle_mute();
    controller.next(&resolver).await.unwrap();

    let player = backend.last().unwrap();
    assert!(player.muted);
    assert_eq!(player.volume, 0.3);
}

// ===== Next / previous =====

#[tokio::test]
async fn test_next_at_end_restarts_current_track() {
    let (mut controller, backend, resolver) = playing(&["a", "b"], "b").await;
    backend.advance_last(Duration::from_secs(95));

    controller.next(&resolver).await.unwrap();

    let players = backend.players();
    assert_eq!(players.len(), 1, "no new session for a restart");
    assert_eq!(players[0].position, Duration::ZERO);
    assert_eq!(players[0].play_calls, 2);
    assert_eq!(controller.queue().current_index(), Some(1));
    assert_eq!(controller.state(), PlaybackState::Playing);
}

#[tokio::test]
async fn test_previous_at_start_restarts_current_track() {
    let (mut controller, backend, _resolver) = playing(&["a", "b"], "a").await;
    backend.advance_last(Duration::from_secs(30));

    assert_eq!(controller.previous_step(), Step::Restart);
    controller.restart().await.unwrap();

    assert_eq!(backend.last().unwrap().position, Duration::ZERO);
    assert_eq!(controller.queue().current_index(), Some(0));
}

#[tokio::test]
async fn test_previous_moves_pointer_back() {
    let (mut controller, _backend, resolver) = playing(&["A", "B", "C"], "C").await;

    controller.previous(&resolver).await.unwrap();

    assert_eq!(current(&controller).as_deref(), Some("B"));
    assert_eq!(controller.queue().current_index(), Some(1));
    assert!(controller.view().is_parallel_to(controller.queue()));
}

// ===== Natural end =====

#[tokio::test]
async fn test_ended_advances_to_next_entry() {
    let (mut controller, _backend, resolver) = playing(&["a", "b"], "a").await;
    let session = controller.session_id().unwrap();

    let ticket = controller.on_ended(session).unwrap();
    assert_eq!(ticket.track_id().as_str(), "b");
    controller.load(&resolver, ticket).await.unwrap();

    assert_eq!(current(&controller).as_deref(), Some("b"));
    let events = controller.drain_events();
    assert!(events.contains(&PlaybackEvent::TrackFinished {
        track_id: "a".to_string()
    }));
}

#[tokio::test]
async fn test_ended_on_last_entry_rewinds_and_pauses() {
    let (mut controller, backend, _resolver) = playing(&["a", "b"], "b").await;
    backend.advance_last(Duration::from_secs(180));
    let session = controller.session_id().unwrap();

    assert!(controller.on_ended(session).is_none());

    assert_eq!(controller.state(), PlaybackState::Paused);
    let player = backend.last().unwrap();
    assert!(player.paused);
    assert_eq!(player.position, Duration::ZERO);

    let events = controller.drain_events();
    assert!(events.iter().any(|event| matches!(
        event,
        PlaybackEvent::PositionUpdate { display, .. } if display == "0:00"
    )));
}

#[tokio::test]
async fn test_ended_from_replaced_session_is_ignored() {
    let (mut controller, _backend, resolver) = playing(&["a", "b", "c"], "a").await;
    let old_session = controller.session_id().unwrap();
    controller.next(&resolver).await.unwrap();

    assert!(controller.on_ended(old_session).is_none());
    assert_eq!(controller.queue().current_index(), Some(1));
    assert_eq!(controller.state(), PlaybackState::Playing);
}

#[tokio::test]
async fn test_ended_while_next_track_loads_does_not_skip_it() {
    let (mut controller, backend, _resolver) = playing(&["a", "b", "c"], "a").await;
    let a_session = controller.session_id().unwrap();

    // Skip pressed; a runs out before b's details arrive
    let Step::Load(ticket) = controller.next_step() else {
        panic!("expected a load for b");
    };
    assert_eq!(ticket.track_id().as_str(), "b");
    backend.advance_last(Duration::from_secs(180));

    assert!(controller.on_ended(a_session).is_none());

    assert_eq!(controller.queue().current_index(), Some(1));
    assert_eq!(controller.state(), PlaybackState::Loading);
    let a_player = backend.last().unwrap();
    assert!(a_player.paused);
    assert_eq!(a_player.position, Duration::ZERO);

    assert!(controller.finish_play(ticket, details("b")).await.unwrap());
    assert_eq!(current(&controller).as_deref(), Some("b"));
    assert_eq!(controller.state(), PlaybackState::Playing);
}

#[tokio::test]
async fn test_ended_after_failed_lookup_stays_on_pointer() {
    test_helpers::init_tracing();
    let backend = MockBackend::new();
    let resolver = MockResolver::without(&["b"]);
    let mut controller = PlaybackController::new(backend.clone());
    let ticket = controller
        .start_queue(&ids(&["a", "b", "c"]), &TrackId::new("a"))
        .unwrap();
    controller.load(&resolver, ticket).await.unwrap();
    let a_session = controller.session_id().unwrap();
    assert!(controller.next(&resolver).await.is_err());

    assert!(controller.on_ended(a_session).is_none());

    assert_eq!(controller.queue().current_index(), Some(1));
    assert_eq!(controller.state(), PlaybackState::Paused);
    assert_eq!(current(&controller).as_deref(), Some("a"));
    assert_eq!(backend.audible(), 0);
}

#[tokio::test]
async fn test_time_update_reports_position_label() {
    let (mut controller, backend, _resolver) = playing(&["a"], "a").await;
    backend.advance_last(Duration::from_secs(75));

    controller.on_time_update(controller.session_id().unwrap());

    assert_eq!(
        controller.drain_events(),
        vec![PlaybackEvent::PositionUpdate {
            position_secs: 75.0,
            duration_secs: Some(180.0),
            display: "1:15".to_string(),
        }]
    );
}

// ===== Stale responses =====

#[tokio::test]
async fn test_stale_lookup_is_discarded() {
    let (mut controller, backend, _resolver) = playing(&["a", "b", "c"], "a").await;

    // Click b, then c before b's details arrive
    let slow = controller.jump_to(1).unwrap();
    let fast = controller.jump_to(2).unwrap();

    assert!(controller.finish_play(fast, details("c")).await.unwrap());
    assert!(!controller.finish_play(slow, details("b")).await.unwrap());

    assert_eq!(current(&controller).as_deref(), Some("c"));
    assert_eq!(backend.players().len(), 2);
    assert_eq!(backend.audible(), 1);
}

#[tokio::test]
async fn test_queue_edit_during_lookup_wins() {
    let (mut controller, _backend, _resolver) = playing(&["a", "b", "c"], "a").await;

    let pending = controller.jump_to(1).unwrap();
    // While b is being fetched the user removes it from the queue
    let replacement = controller.remove_at(1).unwrap().unwrap();
    assert_eq!(replacement.track_id().as_str(), "c");

    assert!(!controller.finish_play(pending, details("b")).await.unwrap());
    assert!(controller.finish_play(replacement, details("c")).await.unwrap());
    assert_eq!(current(&controller).as_deref(), Some("c"));
}

#[tokio::test]
async fn test_failed_lookup_keeps_previous_track_playing() {
    test_helpers::init_tracing();
    let backend = MockBackend::new();
    let resolver = MockResolver::without(&["b"]);
    let mut controller = PlaybackController::new(backend.clone());
    let ticket = controller
        .start_queue(&ids(&["a", "b"]), &TrackId::new("a"))
        .unwrap();
    controller.load(&resolver, ticket).await.unwrap();

    let result = controller.next(&resolver).await;

    assert!(matches!(result, Err(PlaybackError::Resolve(_))));
    assert_eq!(controller.state(), PlaybackState::Playing);
    assert_eq!(current(&controller).as_deref(), Some("a"));
    assert_eq!(resolver.calls("b"), 1);
    assert!(controller
        .drain_events()
        .iter()
        .any(|event| matches!(event, PlaybackEvent::Error { .. })));
}

#[tokio::test]
async fn test_blocked_play_leaves_paused_session() {
    let (mut controller, backend, resolver) = playing(&["a", "b"], "a").await;
    backend.fail_play(true);

    let result = controller.next(&resolver).await;

    assert!(matches!(result, Err(PlaybackError::Audio(_))));
    assert_eq!(controller.state(), PlaybackState::Paused);
    assert_eq!(backend.audible(), 0);

    // Labels still follow the loaded track so the user can press play
    let events = controller.drain_events();
    assert!(events.contains(&PlaybackEvent::TrackChanged {
        track_id: "b".to_string(),
        previous_track_id: Some("a".to_string()),
    }));
    assert!(events.contains(&PlaybackEvent::NowPlaying {
        name: "Song b".to_string(),
        artist_name: "Artist b".to_string(),
    }));
}

// ===== Pending starts =====

#[tokio::test]
async fn test_pending_start_completes_to_playing() {
    let (mut controller, backend, _resolver) = playing(&["a", "b"], "a").await;
    let ticket = controller.jump_to(1).unwrap();

    let pending = controller.start_play(ticket, details("b")).unwrap().unwrap();
    assert_eq!(controller.session_id(), Some(pending.session_id()));
    assert_eq!(controller.state(), PlaybackState::Loading);

    assert!(controller.complete_start(pending.wait().await).unwrap());
    assert_eq!(controller.state(), PlaybackState::Playing);
    assert_eq!(backend.audible(), 1);
}

#[tokio::test]
async fn test_queue_edits_allowed_while_start_pending() {
    let (mut controller, _backend, _resolver) = playing(&["a", "b", "c", "d"], "a").await;
    let ticket = controller.jump_to(1).unwrap();
    let pending = controller.start_play(ticket, details("b")).unwrap().unwrap();

    // The controller is free while the audio element decides
    assert!(controller.remove_at(3).unwrap().is_none());
    let newer = controller.jump_to(2).unwrap();

    assert!(!controller.complete_start(pending.wait().await).unwrap());
    assert_eq!(controller.state(), PlaybackState::Loading);
    assert_eq!(order(controller.queue()), vec!["a", "b", "c"]);

    assert!(controller.finish_play(newer, details("c")).await.unwrap());
    assert_eq!(current(&controller).as_deref(), Some("c"));
}

#[tokio::test]
async fn test_stop_while_start_pending() {
    let (mut controller, backend, _resolver) = playing(&["a", "b"], "a").await;
    let ticket = controller.jump_to(1).unwrap();
    let pending = controller.start_play(ticket, details("b")).unwrap().unwrap();

    controller.stop();

    assert!(!controller.complete_start(pending.wait().await).unwrap());
    assert_eq!(controller.state(), PlaybackState::Idle);
    assert!(controller.session().is_none());
    assert_eq!(backend.audible(), 0);
}

// ===== Queue edits =====

#[tokio::test]
async fn test_removing_current_hands_over_to_successor() {
    let (mut controller, _backend, resolver) = playing(&["a", "b", "c"], "b").await;

    let ticket = controller.remove_at(1).unwrap().unwrap();
    controller.load(&resolver, ticket).await.unwrap();

    assert_eq!(order(controller.queue()), vec!["a", "c"]);
    assert_eq!(current(&controller).as_deref(), Some("c"));
}

#[tokio::test]
async fn test_removing_last_entry_stops_playback() {
    let (mut controller, backend, _resolver) = playing(&["a"], "a").await;

    assert!(controller.remove_at(0).unwrap().is_none());

    assert_eq!(controller.state(), PlaybackState::Idle);
    assert!(controller.session().is_none());
    assert_eq!(backend.audible(), 0);
    assert!(controller
        .drain_events()
        .contains(&PlaybackEvent::PlaybackStopped));
}

#[tokio::test]
async fn test_removing_other_entry_keeps_playing() {
    let (mut controller, backend, _resolver) = playing(&["a", "b", "c"], "b").await;

    assert!(controller.remove_at(0).unwrap().is_none());

    assert_eq!(current(&controller).as_deref(), Some("b"));
    assert_eq!(backend.players().len(), 1);
    assert_eq!(controller.queue().current_index(), Some(0));
}

#[tokio::test]
async fn test_drag_drops_hidden_entries_from_queue() {
    let (mut controller, _backend, _resolver) = playing(&["a", "b", "c", "d"], "a").await;
    controller
        .view_mut()
        .apply_filter(|row| row.track_id.as_str() != "c");

    let boxes: Vec<RowBox> = (0..4)
        .map(|position| RowBox {
            position,
            top: position as f64 * 40.0,
            height: 40.0,
        })
        .collect();
    // Drag d to the very top
    let position = controller.drop_dragged(3, &boxes, 1.0).unwrap();

    assert_eq!(position, 0);
    assert_eq!(order(controller.queue()), vec!["d", "a", "b"]);
    assert!(controller.view().is_parallel_to(controller.queue()));
    assert_eq!(current(&controller).as_deref(), Some("a"));
}

#[tokio::test]
async fn test_clear_queue_keeps_playing_track() {
    let (mut controller, backend, _resolver) = playing(&["a", "b", "c"], "b").await;

    controller.clear_queue();

    assert_eq!(order(controller.queue()), vec!["b"]);
    assert_eq!(backend.audible(), 1);
    assert!(controller
        .drain_events()
        .contains(&PlaybackEvent::QueueChanged { length: 1 }));
}

#[tokio::test]
async fn test_shuffle_toggle_round_trip() {
    let (mut controller, backend, _resolver) = playing(&["a", "b", "c", "d", "e"], "c").await;
    let before = controller.queue().keys();

    controller.toggle_shuffle_with(&mut StdRng::seed_from_u64(9));
    assert!(controller.queue().is_shuffled());
    assert_eq!(controller.queue().current_index(), Some(0));
    assert!(controller.view().is_parallel_to(controller.queue()));

    controller.toggle_shuffle();
    assert!(!controller.queue().is_shuffled());
    assert_eq!(controller.queue().keys(), before);
    assert!(controller.view().is_parallel_to(controller.queue()));

    // Audio untouched by reordering
    assert_eq!(backend.players().len(), 1);
    let shuffle_events: Vec<_> = controller
        .drain_events()
        .into_iter()
        .filter(|event| matches!(event, PlaybackEvent::ShuffleChanged { .. }))
        .collect();
    assert_eq!(
        shuffle_events,
        vec![
            PlaybackEvent::ShuffleChanged { shuffled: true },
            PlaybackEvent::ShuffleChanged { shuffled: false },
        ]
    );
}

#[tokio::test]
async fn test_starting_new_queue_ends_shuffle() {
    let (mut controller, _backend, _resolver) = playing(&["a", "b", "c"], "a").await;
    controller.toggle_shuffle();

    controller
        .start_queue(&ids(&["x", "y"]), &TrackId::new("y"))
        .unwrap();

    assert!(!controller.queue().is_shuffled());
    assert!(controller.queue().snapshot().is_none());
}

// ===== Transport and volume =====

#[tokio::test]
async fn test_toggle_play_pause() {
    let (mut controller, backend, _resolver) = playing(&["a"], "a").await;

    controller.toggle_play_pause().await.unwrap();
    assert_eq!(controller.state(), PlaybackState::Paused);
    assert_eq!(backend.audible(), 0);

    controller.toggle_play_pause().await.unwrap();
    assert_eq!(controller.state(), PlaybackState::Playing);
    assert_eq!(backend.audible(), 1);
}

#[tokio::test]
async fn test_mute_restores_previous_volume() {
    let (mut controller, backend, _resolver) = playing(&["a"], "a").await;
    controller.set_volume(0.7);

    controller.toggle_mute();
    let player = backend.last().unwrap();
    assert!(player.muted);
    assert_eq!(player.volume, 0.7);

    controller.toggle_mute();
    let player = backend.last().unwrap();
    assert!(!player.muted);
    assert_eq!(player.volume, 0.7);

    let levels: Vec<VolumeLevel> = controller
        .drain_events()
        .into_iter()
        .filter_map(|event| match event {
            PlaybackEvent::VolumeChanged { level, .. } => Some(level),
            _ => None,
        })
        .collect();
    assert_eq!(levels, vec![VolumeLevel::High, VolumeLevel::Muted, VolumeLevel::High]);
}

#[tokio::test]
async fn test_seek_moves_live_player() {
    let (mut controller, backend, _resolver) = playing(&["a"], "a").await;

    controller.seek(Duration::from_secs(42));

    assert_eq!(backend.last().unwrap().position, Duration::from_secs(42));
}
