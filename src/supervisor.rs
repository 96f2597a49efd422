//! Component lifecycle and the visualization readiness watchdog.

use std::time::{Duration, Instant};

/// How long the waveform pipeline may stay silent after a load starts
/// before the component degrades to transport-only.
pub const READY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComponentMode {
    Loading,
    Ready,
    Degraded,
    Error,
}

impl ComponentMode {
    pub fn label(self) -> &'static str {
        match self {
            ComponentMode::Loading => "loading",
            ComponentMode::Ready => "ready",
            ComponentMode::Degraded => "degraded",
            ComponentMode::Error => "error",
        }
    }
}

/// One-directional mode machine: `Loading` may become `Ready`,
/// `Degraded` or `Error`; after that nothing moves it except a fresh
/// [`FallbackSupervisor::arm`] for the next source.
#[derive(Debug)]
pub struct FallbackSupervisor {
    mode: ComponentMode,
    deadline: Option<Instant>,
    notice: Option<String>,
}

impl Default for FallbackSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl FallbackSupervisor {
    pub fn new() -> Self {
        Self {
            mode: ComponentMode::Loading,
            deadline: None,
            notice: None,
        }
    }

    pub fn mode(&self) -> ComponentMode {
        self.mode
    }

    /// User-facing text for degraded/error panels.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Start a load attempt: back to `Loading` with the watchdog armed.
    pub fn arm(&mut self, now: Instant) {
        self.mode = ComponentMode::Loading;
        self.deadline = Some(now + READY_TIMEOUT);
        self.notice = None;
    }

    /// The waveform pipeline delivered. Flips `Loading` to `Ready` and
    /// disarms the watchdog; ignored (returning false) in any later
    /// mode, so a late signal never reverts a degraded component.
    pub fn note_visual_ready(&mut self) -> bool {
        if self.mode != ComponentMode::Loading {
            return false;
        }
        self.mode = ComponentMode::Ready;
        self.deadline = None;
        true
    }

    /// Fatal load failure: `Error` immediately, no waiting for the
    /// watchdog. Returns true only on the transition, so callers report
    /// the failure at most once.
    pub fn note_error(&mut self, message: impl Into<String>) -> bool {
        match self.mode {
            ComponentMode::Loading | ComponentMode::Ready => {
                self.mode = ComponentMode::Error;
                self.deadline = None;
                self.notice = Some(message.into());
                true
            }
            _ => false,
        }
    }

    /// Watchdog check. Fires at most once per armed deadline; a load
    /// that signalled in time is never cancelled.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.mode != ComponentMode::Loading {
            return false;
        }
        let Some(deadline) = self.deadline else {
            return false;
        };
        if now < deadline {
            return false;
        }
        self.mode = ComponentMode::Degraded;
        self.deadline = None;
        self.notice =
            Some("Timed out loading the waveform view. Playback continues without it.".into());
        true
    }
}
