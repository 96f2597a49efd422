use std::io::Write as _;
use std::path::PathBuf;

use super::capture;

const DEBUG_LOG_CAP: usize = 200;

impl super::TrimApp {
    /// Append to the in-memory debug ring and, when configured, to the
    /// log file. The ring keeps the newest entries only.
    pub(super) fn debug_log(&mut self, line: impl Into<String>) {
        let line = line.into();
        let stamp = self.debug.started_at.elapsed().as_secs_f64();
        let entry = format!("[{stamp:9.3}] {line}");
        if let Some(path) = &self.debug.cfg.log_path {
            if let Ok(mut f) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
            {
                let _ = writeln!(f, "{entry}");
            }
        }
        self.debug.logs.push_back(entry);
        while self.debug.logs.len() > DEBUG_LOG_CAP {
            self.debug.logs.pop_front();
        }
    }

    pub(super) fn debug_summary(&self) -> Vec<String> {
        let mut lines = Vec::new();
        lines.push(format!("mode: {}", self.supervisor.mode().label()));
        lines.push(format!(
            "source: {}",
            self.source_label.as_deref().unwrap_or("none")
        ));
        match self.region.region() {
            Some(r) => lines.push(format!(
                "region: {:.2}s – {:.2}s ({:.2}s)",
                r.start,
                r.end,
                r.len()
            )),
            None => lines.push("region: not ready".to_string()),
        }
        lines.push(format!("duration: {:.2}s", self.region.duration()));
        lines.push(format!(
            "cursor: {:.2}s{}",
            self.audio.position_secs(),
            if self.audio.is_playing() {
                " (playing)"
            } else {
                ""
            }
        ));
        lines.push(format!("overview bins: {}", self.overview.len()));
        lines.push(format!(
            "loads: {} started, {} transport, {} visual, {} failed",
            self.debug.loads_started,
            self.debug.transports_ready,
            self.debug.visuals_ready,
            self.debug.load_failures
        ));
        lines.push(format!("watchdog fires: {}", self.debug.watchdog_fires));
        lines.push(format!(
            "region corrections: {}",
            self.debug.region_corrections
        ));
        lines.push(format!("events emitted: {}", self.debug.events_emitted));
        lines.push(format!(
            "uptime: {:.1}s",
            self.debug.started_at.elapsed().as_secs_f32()
        ));
        lines
    }

    pub(super) fn capture_dir() -> PathBuf {
        std::env::temp_dir().join("WaveTrim").join("captures")
    }

    pub(super) fn next_screenshot_path(&mut self) -> PathBuf {
        self.screenshot_seq += 1;
        Self::capture_dir().join(format!("wavetrim_{:03}.png", self.screenshot_seq))
    }

    pub(super) fn save_debug_summary(&mut self) {
        let path = Self::capture_dir().join("debug_summary.json");
        let doc = serde_json::json!({
            "mode": self.supervisor.mode().label(),
            "source": self.source_label,
            "region": self.region.region().map(|r| {
                serde_json::json!({ "start": r.start, "end": r.end, "len": r.len() })
            }),
            "duration": self.region.duration(),
            "cursor": self.audio.position_secs(),
            "playing": self.audio.is_playing(),
            "counters": {
                "loads_started": self.debug.loads_started,
                "transports_ready": self.debug.transports_ready,
                "visuals_ready": self.debug.visuals_ready,
                "load_failures": self.debug.load_failures,
                "watchdog_fires": self.debug.watchdog_fires,
                "region_corrections": self.debug.region_corrections,
                "events_emitted": self.debug.events_emitted,
            },
            "log": self.debug.logs.iter().cloned().collect::<Vec<_>>(),
        });
        let result = std::fs::create_dir_all(Self::capture_dir())
            .map_err(anyhow::Error::from)
            .and_then(|_| serde_json::to_string_pretty(&doc).map_err(anyhow::Error::from))
            .and_then(|text| std::fs::write(&path, text).map_err(anyhow::Error::from));
        match result {
            Ok(()) => self.debug_log(format!("debug summary written: {}", path.display())),
            Err(err) => self.debug_log(format!("debug summary failed: {err:#}")),
        }
    }

    /// Ask the viewport for a frame grab. Only one may be in flight;
    /// the reply arrives through `handle_screenshot_events`.
    pub(super) fn request_screenshot(&mut self, ctx: &egui::Context, path: PathBuf) {
        if self.pending_screenshot.is_some() {
            return;
        }
        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        self.pending_screenshot = Some(path);
        ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot(Default::default()));
    }

    pub(super) fn handle_screenshot_events(&mut self, ctx: &egui::Context) {
        let images: Vec<_> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|e| match e {
                    egui::Event::Screenshot { image, .. } => Some(image.clone()),
                    _ => None,
                })
                .collect()
        });
        if images.is_empty() {
            return;
        }
        let Some(path) = self.pending_screenshot.take() else {
            return;
        };
        for image in images {
            match capture::save_color_image_png(&path, &image) {
                Ok(()) => self.debug_log(format!("screenshot saved: {}", path.display())),
                Err(err) => eprintln!("screenshot failed: {err:#}"),
            }
        }
        if self.exit_after_screenshot {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }
}
