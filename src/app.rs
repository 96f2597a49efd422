use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use anyhow::Result;
use egui::{Color32, FontId, Key, TextStyle, Visuals};

use crate::audio::AudioEngine;
use crate::gesture::DragSession;
use crate::guard::{PlaybackGuard, POLL_INTERVAL_MS};
use crate::region::{RegionState, TrimBounds};
use crate::source::MaterializedSource;
use crate::supervisor::{ComponentMode, FallbackSupervisor};

mod capture;
mod debug_ops;
pub(crate) mod helpers;
#[cfg(feature = "kittest")]
mod kittest_ops;
mod load_ops;
mod startup;
mod transport_ops;
mod trim_ops;
mod types;
mod ui;

pub use types::{InspectorConfig, LaunchConfig, Theme, TrimEvent};

use types::{InspectorState, LaunchState, LoadMsg};

/// The trim controller application: one audio source, one constrained
/// trim region over it, playback confined to the region.
pub struct TrimApp {
    pub audio: AudioEngine,
    region: RegionState,
    guard: PlaybackGuard,
    supervisor: FallbackSupervisor,
    drag: Option<DragSession>,
    overview: Vec<(f32, f32)>,
    // held while a source is loaded; dropping it removes any temp file
    materialized: Option<MaterializedSource>,
    source_label: Option<String>,
    load_rx: Option<Receiver<LoadMsg>>,
    load_generation: u64,
    events: Vec<TrimEvent>,
    volume_db: f32,
    theme: Theme,
    startup: LaunchState,
    debug: InspectorState,
    pending_screenshot: Option<PathBuf>,
    exit_after_screenshot: bool,
    screenshot_seq: u32,
}

impl TrimApp {
    pub fn new(cc: &eframe::CreationContext<'_>, startup: LaunchConfig) -> Result<Self> {
        let audio = AudioEngine::new()?;
        Ok(Self::with_engine(cc, audio, startup))
    }

    /// Same app without an output stream, for harness runs on machines
    /// with no audio device.
    pub fn new_for_test(cc: &eframe::CreationContext<'_>, startup: LaunchConfig) -> Result<Self> {
        let audio = AudioEngine::new_for_test();
        Ok(Self::with_engine(cc, audio, startup))
    }

    fn with_engine(
        cc: &eframe::CreationContext<'_>,
        audio: AudioEngine,
        startup: LaunchConfig,
    ) -> Self {
        apply_visuals(&cc.egui_ctx);
        let theme = helpers::parse_hex_color(&startup.primary_color)
            .map(Theme::from_primary)
            .unwrap_or_else(|| {
                eprintln!(
                    "invalid primary color {:?}, using default",
                    startup.primary_color
                );
                Theme::from_primary(Color32::from_rgb(79, 142, 219))
            });
        let mut bounds = TrimBounds::new(startup.min_len, startup.max_len);
        bounds.short_clips = startup.short_clips;
        let debug = InspectorState::new(startup.debug.clone());
        let volume_db = -12.0;
        audio.set_volume(helpers::db_to_amp(volume_db));
        Self {
            audio,
            region: RegionState::new(bounds),
            guard: PlaybackGuard::new(),
            supervisor: FallbackSupervisor::new(),
            drag: None,
            overview: Vec::new(),
            materialized: None,
            source_label: None,
            load_rx: None,
            load_generation: 0,
            events: Vec::new(),
            volume_db,
            theme,
            startup: LaunchState::new(startup),
            debug,
            pending_screenshot: None,
            exit_after_screenshot: false,
            screenshot_seq: 0,
        }
    }

    pub fn mode(&self) -> ComponentMode {
        self.supervisor.mode()
    }

    /// Drain events accumulated since the last call, oldest first.
    pub fn take_events(&mut self) -> Vec<TrimEvent> {
        std::mem::take(&mut self.events)
    }

    fn push_event(&mut self, ev: TrimEvent) {
        match &ev {
            TrimEvent::AudioLoaded { duration } => {
                eprintln!("audio loaded: {:.2}s", duration);
            }
            TrimEvent::Error { message } => {
                eprintln!("load error: {message}");
            }
            TrimEvent::TrimSaved {
                start,
                end,
                duration,
            } => {
                eprintln!("trim saved: {:.2}s – {:.2}s of {:.2}s", start, end, duration);
            }
        }
        self.debug.events_emitted += 1;
        self.debug_log(format!("event: {ev:?}"));
        self.events.push(ev);
    }
}

impl eframe::App for TrimApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_screenshot_events(ctx);
        self.apply_startup_source();
        self.tick_load_messages(ctx);

        if self.supervisor.poll(Instant::now()) {
            self.debug.watchdog_fires += 1;
            let notice = self.supervisor.notice().unwrap_or_default().to_string();
            eprintln!("waveform timed out, transport stays up: {notice}");
            self.debug_log(format!("degraded: {notice}"));
            self.drop_stale_worker_after_degrade();
            ctx.request_repaint();
        }

        self.tick_playback(ctx);

        if !ctx.wants_keyboard_input() && ctx.input(|i| i.key_pressed(Key::Space)) {
            self.toggle_play();
        }

        self.ui_top_panel(ctx);
        self.ui_main(ctx);
        self.ui_inspector_window(ctx);
        self.run_startup_actions(ctx);

        // Fast repaints keep the cursor smooth and the end-of-region
        // poll well under its 100 ms bound; while loading the slower
        // cadence still services the worker channel and the watchdog.
        if self.audio.is_playing() {
            ctx.request_repaint_after(Duration::from_millis(16));
        } else if self.load_rx.is_some() || self.supervisor.mode() == ComponentMode::Loading {
            ctx.request_repaint_after(Duration::from_millis(POLL_INTERVAL_MS));
        }
    }
}

fn apply_visuals(ctx: &egui::Context) {
    let mut visuals = Visuals::dark();
    visuals.widgets.noninteractive.bg_fill = Color32::from_rgb(20, 20, 23);
    visuals.widgets.inactive.bg_fill = Color32::from_rgb(28, 28, 32);
    visuals.panel_fill = Color32::from_rgb(18, 18, 20);
    ctx.set_visuals(visuals);
    let mut style = (*ctx.style()).clone();
    style.text_styles.insert(TextStyle::Body, FontId::proportional(16.0));
    style
        .text_styles
        .insert(TextStyle::Monospace, FontId::monospace(14.0));
    ctx.set_style(style);
}
