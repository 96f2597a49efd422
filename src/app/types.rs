use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Instant;

use egui::Color32;

use crate::region::{ShortClipPolicy, DEFAULT_MAX_LEN, DEFAULT_MIN_LEN};
use crate::source::MaterializedSource;

/// Host-facing notifications. Each fires at most once per triggering
/// action; `TrimSaved` only on the explicit save action.
#[derive(Clone, Debug, PartialEq)]
pub enum TrimEvent {
    AudioLoaded { duration: f32 },
    Error { message: String },
    TrimSaved { start: f32, end: f32, duration: f32 },
}

/// Messages from the loader worker. Transport readiness (decoded
/// buffer) and visual readiness (overview peaks) arrive separately so
/// a stalled waveform pipeline cannot hold playback hostage.
pub enum LoadMsg {
    Transport {
        generation: u64,
        channels: Vec<Vec<f32>>,
        duration: f32,
        materialized: MaterializedSource,
    },
    Visual {
        generation: u64,
        overview: Vec<(f32, f32)>,
    },
    Failed {
        generation: u64,
        message: String,
    },
}

#[derive(Clone)]
pub struct LaunchConfig {
    // at most one source is honored: path, then url, then b64
    pub audio_path: Option<PathBuf>,
    pub audio_url: Option<String>,
    pub audio_b64: Option<PathBuf>,
    pub min_len: f32,
    pub max_len: f32,
    pub show_instructions: bool,
    pub primary_color: String,
    pub short_clips: ShortClipPolicy,
    pub save_json: Option<PathBuf>,
    pub stall_visual: bool,
    pub screenshot_path: Option<PathBuf>,
    pub screenshot_delay_frames: u32,
    pub exit_after_screenshot: bool,
    pub debug: InspectorConfig,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            audio_path: None,
            audio_url: None,
            audio_b64: None,
            min_len: DEFAULT_MIN_LEN,
            max_len: DEFAULT_MAX_LEN,
            show_instructions: true,
            primary_color: "#4f8edb".to_string(),
            short_clips: ShortClipPolicy::Allow,
            save_json: None,
            stall_visual: false,
            screenshot_path: None,
            screenshot_delay_frames: 5,
            exit_after_screenshot: false,
            debug: InspectorConfig::default(),
        }
    }
}

#[derive(Clone)]
pub struct LaunchState {
    pub cfg: LaunchConfig,
    pub source_pending: bool,
    pub screenshot_pending: bool,
    pub screenshot_frames_left: u32,
}

impl LaunchState {
    pub fn new(cfg: LaunchConfig) -> Self {
        Self {
            source_pending: cfg.audio_path.is_some()
                || cfg.audio_url.is_some()
                || cfg.audio_b64.is_some(),
            screenshot_pending: cfg.screenshot_path.is_some(),
            screenshot_frames_left: cfg.screenshot_delay_frames,
            cfg,
        }
    }
}

#[derive(Clone, Default)]
pub struct InspectorConfig {
    pub enabled: bool,
    pub log_path: Option<PathBuf>,
}

pub struct InspectorState {
    pub cfg: InspectorConfig,
    pub show_window: bool,
    pub logs: VecDeque<String>,
    pub loads_started: u32,
    pub transports_ready: u32,
    pub visuals_ready: u32,
    pub load_failures: u32,
    pub watchdog_fires: u32,
    pub region_corrections: u32,
    pub events_emitted: u32,
    pub started_at: Instant,
}

impl InspectorState {
    pub fn new(cfg: InspectorConfig) -> Self {
        Self {
            show_window: cfg.enabled,
            logs: VecDeque::new(),
            loads_started: 0,
            transports_ready: 0,
            visuals_ready: 0,
            load_failures: 0,
            watchdog_fires: 0,
            region_corrections: 0,
            events_emitted: 0,
            started_at: Instant::now(),
            cfg,
        }
    }
}

/// Per-instance colors derived from the configured primary color.
#[derive(Clone, Copy)]
pub struct Theme {
    pub primary: Color32,
    pub wave_low: Color32,
    pub wave_high: Color32,
    pub region_fill: Color32,
    pub region_edge: Color32,
    pub handle: Color32,
    pub cursor: Color32,
    pub background: Color32,
    pub grid: Color32,
}

impl Theme {
    pub fn from_primary(primary: Color32) -> Self {
        let dim = super::helpers::lerp_color(primary, Color32::from_rgb(16, 16, 18), 0.55);
        let bright = super::helpers::lerp_color(primary, Color32::WHITE, 0.35);
        Self {
            primary,
            wave_low: dim,
            wave_high: primary,
            region_fill: Color32::from_rgba_unmultiplied(primary.r(), primary.g(), primary.b(), 46),
            region_edge: primary,
            handle: bright,
            cursor: Color32::from_rgb(235, 235, 240),
            background: Color32::from_rgb(16, 16, 18),
            grid: Color32::from_rgb(45, 45, 50),
        }
    }
}
