use crate::source::{decode_base64_payload, AudioSource};

impl super::TrimApp {
    /// Resolve the source handed over on the command line, once, on the
    /// first frame. Only one of path/url/base64 is honored.
    pub(super) fn apply_startup_source(&mut self) {
        if !self.startup.source_pending {
            return;
        }
        self.startup.source_pending = false;
        let cfg = self.startup.cfg.clone();
        if let Some(path) = cfg.audio_path {
            self.set_source(AudioSource::Path(path));
        } else if let Some(url) = cfg.audio_url {
            self.set_source(AudioSource::Url(url));
        } else if let Some(b64_path) = cfg.audio_b64 {
            let decoded = std::fs::read_to_string(&b64_path)
                .map_err(anyhow::Error::from)
                .and_then(|text| decode_base64_payload(&text));
            match decoded {
                Ok(bytes) => self.set_source(AudioSource::Data(bytes)),
                Err(err) => {
                    self.apply_load_failed(format!(
                        "read base64 payload {}: {err:#}",
                        b64_path.display()
                    ));
                }
            }
        }
    }

    /// Deferred one-shot actions, currently just the startup screenshot.
    /// The delay lets fonts and the first waveform frame settle.
    pub(super) fn run_startup_actions(&mut self, ctx: &egui::Context) {
        if !self.startup.screenshot_pending {
            return;
        }
        if self.startup.screenshot_frames_left > 0 {
            self.startup.screenshot_frames_left -= 1;
            ctx.request_repaint();
            return;
        }
        self.startup.screenshot_pending = false;
        if let Some(path) = self.startup.cfg.screenshot_path.clone() {
            self.exit_after_screenshot = self.startup.cfg.exit_after_screenshot;
            self.request_screenshot(ctx, path);
        }
    }
}
