//! `HtmlAudioElement` audio backend

use crate::error::{PlaybackError, Result};
use crate::player::{AudioBackend, AudioPlayer, PlayFuture};
use std::time::Duration;
use url::Url;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlAudioElement;

fn audio_error(context: &str, value: JsValue) -> PlaybackError {
    let detail = value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value));
    PlaybackError::Audio(format!("{context}: {detail}"))
}

fn seconds(value: f64) -> Option<Duration> {
    (value.is_finite() && value >= 0.0).then(|| Duration::from_secs_f64(value))
}

/// One `<audio>` element
pub struct HtmlAudioPlayer {
    element: HtmlAudioElement,
}

impl HtmlAudioPlayer {
    /// The element, for wiring `ended` / `timeupdate` listeners
    pub fn element(&self) -> &HtmlAudioElement {
        &self.element
    }
}

impl AudioPlayer for HtmlAudioPlayer {
    fn play(&mut self) -> PlayFuture {
        let promise = self.element.play();
        Box::pin(async move {
            let promise = promise.map_err(|e| audio_error("play() rejected", e))?;
            JsFuture::from(promise)
                .await
                .map_err(|e| audio_error("Playback did not start", e))?;
            Ok(())
        })
    }

    fn pause(&mut self) {
        if let Err(e) = self.element.pause() {
            tracing::warn!(error = ?e, "pause() failed");
        }
    }

    fn is_paused(&self) -> bool {
        self.element.paused()
    }

    fn position(&self) -> Duration {
        seconds(self.element.current_time()).unwrap_or(Duration::ZERO)
    }

    fn set_position(&mut self, position: Duration) {
        self.element.set_current_time(position.as_secs_f64());
    }

    fn duration(&self) -> Option<Duration> {
        seconds(self.element.duration())
    }

    fn volume(&self) -> f32 {
        self.element.volume() as f32
    }

    fn set_volume(&mut self, volume: f32) {
        self.element.set_volume(f64::from(volume.clamp(0.0, 1.0)));
    }

    fn is_muted(&self) -> bool {
        self.element.muted()
    }

    fn set_muted(&mut self, muted: bool) {
        self.element.set_muted(muted);
    }
}

/// Creates a fresh `<audio>` element per track
#[derive(Debug, Default)]
pub struct HtmlAudioBackend;

impl AudioBackend for HtmlAudioBackend {
    type Player = HtmlAudioPlayer;

    fn load(&mut self, url: &Url) -> Result<HtmlAudioPlayer> {
        let element = HtmlAudioElement::new_with_src(url.as_str())
            .map_err(|e| audio_error("Failed to create audio element", e))?;
        Ok(HtmlAudioPlayer { element })
    }
}
