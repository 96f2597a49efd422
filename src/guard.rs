//! Playback confinement. Every transport call in the app goes through
//! the guard; nothing else touches the engine's play/seek directly.

use crate::audio::AudioEngine;
use crate::region::TrimRegion;

/// Poll at least this often while playing so overshoot past the region
/// end stays imperceptible.
pub const POLL_INTERVAL_MS: u64 = 100;

/// Keeps the cursor inside the trim region. The engine holds the only
/// "is playing" truth; the guard just remembers what it observed last
/// tick so it can catch the engine's own end-of-buffer stop.
pub struct PlaybackGuard {
    was_playing: bool,
}

impl Default for PlaybackGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackGuard {
    pub fn new() -> Self {
        Self { was_playing: false }
    }

    /// Forget observed state, e.g. on a source change.
    pub fn reset(&mut self) {
        self.was_playing = false;
    }

    /// Start playback inside the region: a cursor outside `[start, end)`
    /// is seeked to `start` first.
    pub fn request_play(&mut self, engine: &AudioEngine, region: TrimRegion) {
        if !engine.has_samples() {
            return;
        }
        let pos = engine.position_secs();
        if !(pos >= region.start && pos < region.end) {
            engine.seek_secs(region.start);
        }
        engine.play();
        self.was_playing = engine.is_playing();
    }

    pub fn request_pause(&mut self, engine: &AudioEngine) {
        engine.stop();
        self.was_playing = false;
    }

    pub fn toggle(&mut self, engine: &AudioEngine, region: TrimRegion) {
        if engine.is_playing() {
            self.request_pause(engine);
        } else {
            self.request_play(engine, region);
        }
    }

    /// Rewind-to-start transport button.
    pub fn rewind(&self, engine: &AudioEngine, region: TrimRegion) {
        engine.seek_secs(region.start);
    }

    /// Per-frame confinement poll. The instant the cursor reaches the
    /// region end the pass stops and rewinds to the region start, never
    /// to 0. Returns true when that happened this tick.
    pub fn tick(&mut self, engine: &AudioEngine, region: TrimRegion) -> bool {
        let playing = engine.is_playing();
        let pos = engine.position_secs();
        // was_playing covers the engine stopping by itself at buffer end
        let ended = pos >= region.end && (playing || self.was_playing);
        if ended {
            engine.stop();
            engine.seek_secs(region.start);
        }
        self.was_playing = engine.is_playing();
        ended
    }

    /// Waveform click: inside `[start, end]` seeks literally, outside
    /// returns to the region start.
    pub fn click(&self, engine: &AudioEngine, region: TrimRegion, time: f32) {
        if !time.is_finite() {
            return;
        }
        if region.contains(time) {
            engine.seek_secs(time);
        } else {
            engine.seek_secs(region.start);
        }
    }
}
