//! JavaScript-facing playback controller
//!
//! The page fetches track details itself: operations that start a track hand
//! back a ticket object, and the page passes it to `finishPlay` together with
//! the fetched details. The controller is only borrowed between suspension
//! points, never while a fetch or an `<audio>` start is pending, so clicks in
//! the meantime run against the current state.

use super::audio::HtmlAudioBackend;
use crate::controller::{PendingStart, PlayTicket, PlaybackController, Step};
use crate::error::PlaybackError;
use crate::view::RowBox;
use cadence_core::{PlaybackSettings, TrackDetails, TrackId};
use js_sys::{Function, Promise};
use serde::Serialize;
use std::cell::{RefCell, RefMut};
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::HtmlAudioElement;

type Controller = PlaybackController<HtmlAudioBackend>;

fn js_error(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(js_error)
}

fn from_js<T: serde::de::DeserializeOwned>(value: JsValue, what: &str) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("Failed to parse {what}: {e}")))
}

fn borrow(inner: &Rc<RefCell<Controller>>) -> Result<RefMut<'_, Controller>, JsValue> {
    inner
        .try_borrow_mut()
        .map_err(|_| JsValue::from_str("Player is busy"))
}

/// WASM-compatible playback controller
#[wasm_bindgen]
pub struct WasmPlayer {
    inner: Rc<RefCell<Controller>>,
    on_event: Rc<RefCell<Option<Function>>>,
}

#[wasm_bindgen]
impl WasmPlayer {
    /// Create a player at the given volume (0.0-1.0)
    #[wasm_bindgen(constructor)]
    pub fn new(initial_volume: f32, start_muted: bool) -> Self {
        console_error_panic_hook::set_once();

        let settings = PlaybackSettings {
            initial_volume,
            start_muted,
        };
        Self {
            inner: Rc::new(RefCell::new(PlaybackController::with_settings(
                HtmlAudioBackend,
                &settings,
            ))),
            on_event: Rc::new(RefCell::new(None)),
        }
    }

    /// Register the event callback; it receives one event object per call
    #[wasm_bindgen(js_name = onEvent)]
    pub fn on_event(&mut self, callback: Function) {
        *self.on_event.borrow_mut() = Some(callback);
    }

    // ===== Track loading =====

    /// Complete a ticket with fetched details; resolves to `false` if stale
    #[wasm_bindgen(js_name = finishPlay)]
    pub fn finish_play(&self, ticket: JsValue, details: JsValue) -> Result<Promise, JsValue> {
        let ticket: PlayTicket = from_js(ticket, "ticket")?;
        let details: TrackDetails = from_js(details, "track details")?;
        let inner = Rc::clone(&self.inner);
        let on_event = Rc::clone(&self.on_event);

        Ok(future_to_promise(async move {
            let pending = run(&inner, &on_event, |c| c.start_play(ticket, details))?
                .map_err(js_error)?;
            settle(&inner, &on_event, pending)
                .await
                .map(JsValue::from_bool)
        }))
    }

    /// Report a failed lookup for a ticket
    #[wasm_bindgen(js_name = abortPlay)]
    pub fn abort_play(&self, ticket: JsValue, message: String) -> Result<(), JsValue> {
        let ticket: PlayTicket = from_js(ticket, "ticket")?;
        self.with(|c| {
            c.abort_play(&ticket, &PlaybackError::Audio(message));
            Ok(JsValue::UNDEFINED)
        })
        .map(drop)
    }

    // ===== Transport =====

    /// Toggle play/pause
    #[wasm_bindgen(js_name = togglePlayPause)]
    pub fn toggle_play_pause(&self) -> Promise {
        let inner = Rc::clone(&self.inner);
        let on_event = Rc::clone(&self.on_event);

        future_to_promise(async move {
            let pending = run(&inner, &on_event, Controller::start_toggle_play_pause)?;
            settle(&inner, &on_event, pending)
                .await
                .map(|_| JsValue::UNDEFINED)
        })
    }

    /// Next entry; returns a ticket, or `null` after restarting in place
    pub fn next(&self) -> Promise {
        self.step(true)
    }

    /// Previous entry; returns a ticket, or `null` after restarting in place
    pub fn previous(&self) -> Promise {
        self.step(false)
    }

    fn step(&self, forward: bool) -> Promise {
        let inner = Rc::clone(&self.inner);
        let on_event = Rc::clone(&self.on_event);

        future_to_promise(async move {
            let step = run(&inner, &on_event, |c| {
                if forward {
                    c.next_step()
                } else {
                    c.previous_step()
                }
            })?;

            match step {
                Step::Load(ticket) => to_js(&ticket),
                Step::Restart => {
                    let pending = run(&inner, &on_event, Controller::start_restart)?;
                    settle(&inner, &on_event, pending).await?;
                    Ok(JsValue::NULL)
                }
            }
        })
    }

    /// The `ended` event fired for `session_id`; returns a ticket or `null`
    #[wasm_bindgen(js_name = onEnded)]
    pub fn on_ended(&self, session_id: JsValue) -> Result<JsValue, JsValue> {
        let session_id = from_js(session_id, "session id")?;
        self.with(|c| match c.on_ended(session_id) {
            Some(ticket) => to_js(&ticket),
            None => Ok(JsValue::NULL),
        })
    }

    /// The `timeupdate` event fired for `session_id`
    #[wasm_bindgen(js_name = onTimeUpdate)]
    pub fn on_time_update(&self, session_id: JsValue) -> Result<(), JsValue> {
        let session_id = from_js(session_id, "session id")?;
        self.with(|c| {
            c.on_time_update(session_id);
            Ok(JsValue::UNDEFINED)
        })
        .map(drop)
    }

    /// Seek to position in seconds
    #[wasm_bindgen(js_name = seekTo)]
    pub fn seek_to(&self, position_secs: f64) -> Result<(), JsValue> {
        let position = Duration::try_from_secs_f64(position_secs.max(0.0)).map_err(js_error)?;
        self.with(|c| {
            c.seek(position);
            Ok(JsValue::UNDEFINED)
        })
        .map(drop)
    }

    /// Set volume (0.0-1.0)
    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&self, level: f32) -> Result<(), JsValue> {
        self.with(|c| {
            c.set_volume(level);
            Ok(JsValue::UNDEFINED)
        })
        .map(drop)
    }

    /// Toggle mute
    #[wasm_bindgen(js_name = toggleMute)]
    pub fn toggle_mute(&self) -> Result<(), JsValue> {
        self.with(|c| {
            c.toggle_mute();
            Ok(JsValue::UNDEFINED)
        })
        .map(drop)
    }

    /// Current state name
    pub fn state(&self) -> Result<String, JsValue> {
        Ok(borrow(&self.inner)?.state().as_str().to_string())
    }

    /// Live session id, or `null`
    #[wasm_bindgen(js_name = sessionId)]
    pub fn session_id(&self) -> Result<JsValue, JsValue> {
        match borrow(&self.inner)?.session_id() {
            Some(id) => to_js(&id),
            None => Ok(JsValue::NULL),
        }
    }

    /// Live `<audio>` element, for attaching listeners
    #[wasm_bindgen(js_name = audioElement)]
    pub fn audio_element(&self) -> Result<Option<HtmlAudioElement>, JsValue> {
        Ok(borrow(&self.inner)?
            .session()
            .map(|session| session.player().element().clone()))
    }

    // ===== Queue =====

    /// Replace the queue with the visible candidates; returns a ticket
    #[wasm_bindgen(js_name = startQueue)]
    pub fn start_queue(&self, candidates: JsValue, selected: JsValue) -> Result<JsValue, JsValue> {
        let candidates: Vec<TrackId> = from_js(candidates, "candidates")?;
        let selected: TrackId = from_js(selected, "selected track")?;
        self.with(|c| {
            let ticket = c.start_queue(&candidates, &selected).map_err(js_error)?;
            to_js(&ticket)
        })
    }

    /// Queue after the current entry; returns a ticket or `null`
    #[wasm_bindgen(js_name = insertNext)]
    pub fn insert_next(&self, track_id: JsValue) -> Result<JsValue, JsValue> {
        let track_id: TrackId = from_js(track_id, "track id")?;
        self.with(|c| optional_ticket(c.insert_next(track_id)))
    }

    /// Queue at the end; returns a ticket or `null`
    pub fn append(&self, track_id: JsValue) -> Result<JsValue, JsValue> {
        let track_id: TrackId = from_js(track_id, "track id")?;
        self.with(|c| optional_ticket(c.append(track_id)))
    }

    /// Remove a row; returns a ticket or `null`
    #[wasm_bindgen(js_name = removeAt)]
    pub fn remove_at(&self, position: usize) -> Result<JsValue, JsValue> {
        self.with(|c| optional_ticket(c.remove_at(position).map_err(js_error)?))
    }

    /// Finish a drag; `boxes` holds `{ position, top, height }` per row
    #[wasm_bindgen(js_name = dropDragged)]
    pub fn drop_dragged(&self, dragged: usize, boxes: JsValue, y: f64) -> Result<usize, JsValue> {
        let boxes: Vec<RowBox> = from_js(boxes, "row boxes")?;
        let mut position = 0;
        self.with(|c| {
            position = c.drop_dragged(dragged, &boxes, y).map_err(js_error)?;
            Ok(JsValue::UNDEFINED)
        })?;
        Ok(position)
    }

    /// Play a clicked row; returns a ticket
    #[wasm_bindgen(js_name = jumpTo)]
    pub fn jump_to(&self, position: usize) -> Result<JsValue, JsValue> {
        self.with(|c| {
            let ticket = c.jump_to(position).map_err(js_error)?;
            to_js(&ticket)
        })
    }

    /// Keep only the current entry
    #[wasm_bindgen(js_name = clearQueue)]
    pub fn clear_queue(&self) -> Result<(), JsValue> {
        self.with(|c| {
            c.clear_queue();
            Ok(JsValue::UNDEFINED)
        })
        .map(drop)
    }

    /// Shuffle or restore the queue
    #[wasm_bindgen(js_name = toggleShuffle)]
    pub fn toggle_shuffle(&self) -> Result<(), JsValue> {
        self.with(|c| {
            c.toggle_shuffle();
            Ok(JsValue::UNDEFINED)
        })
        .map(drop)
    }

    /// Hide rows whose track id is not in `visible`
    #[wasm_bindgen(js_name = filterQueue)]
    pub fn filter_queue(&self, visible: JsValue) -> Result<(), JsValue> {
        let visible: Vec<TrackId> = from_js(visible, "visible track ids")?;
        self.with(|c| {
            c.view_mut()
                .apply_filter(|row| visible.contains(&row.track_id));
            Ok(JsValue::UNDEFINED)
        })
        .map(drop)
    }

    /// Current queue rows
    #[wasm_bindgen(js_name = queueRows)]
    pub fn queue_rows(&self) -> Result<JsValue, JsValue> {
        to_js(&borrow(&self.inner)?.view().rows())
    }

    /// Row patches since the last call
    #[wasm_bindgen(js_name = drainPatches)]
    pub fn drain_patches(&self) -> Result<JsValue, JsValue> {
        to_js(&borrow(&self.inner)?.view_mut().drain_patches())
    }

    /// Whether the queue is shuffled
    #[wasm_bindgen(js_name = isShuffled)]
    pub fn is_shuffled(&self) -> Result<bool, JsValue> {
        Ok(borrow(&self.inner)?.queue().is_shuffled())
    }

    fn with<F>(&self, f: F) -> Result<JsValue, JsValue>
    where
        F: FnOnce(&mut Controller) -> Result<JsValue, JsValue>,
    {
        run(&self.inner, &self.on_event, f)?
    }
}

/// Borrow the controller for one synchronous step, then flush its events
fn run<T, F>(
    inner: &Rc<RefCell<Controller>>,
    on_event: &Rc<RefCell<Option<Function>>>,
    f: F,
) -> Result<T, JsValue>
where
    F: FnOnce(&mut Controller) -> T,
{
    let value = {
        let mut controller = borrow(inner)?;
        f(&mut controller)
    };
    flush(inner, on_event);
    Ok(value)
}

/// Wait for an `<audio>` start without holding the controller, then apply it
async fn settle(
    inner: &Rc<RefCell<Controller>>,
    on_event: &Rc<RefCell<Option<Function>>>,
    pending: Option<PendingStart>,
) -> Result<bool, JsValue> {
    let Some(pending) = pending else {
        return Ok(false);
    };
    let outcome = pending.wait().await;
    run(inner, on_event, |c| c.complete_start(outcome))?.map_err(js_error)
}

fn optional_ticket(ticket: Option<PlayTicket>) -> Result<JsValue, JsValue> {
    match ticket {
        Some(ticket) => to_js(&ticket),
        None => Ok(JsValue::NULL),
    }
}

/// Hand queued events to the page callback
fn flush(inner: &Rc<RefCell<Controller>>, on_event: &Rc<RefCell<Option<Function>>>) {
    let events = match inner.try_borrow_mut() {
        Ok(mut controller) => controller.drain_events(),
        Err(_) => return,
    };

    let callback = on_event.borrow();
    let Some(callback) = callback.as_ref() else {
        return;
    };

    for event in events {
        match serde_wasm_bindgen::to_value(&event) {
            Ok(value) => {
                if let Err(e) = callback.call1(&JsValue::NULL, &value) {
                    tracing::warn!(error = ?e, "Event callback threw");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Failed to serialize event"),
        }
    }
}
