use std::sync::mpsc;
use std::time::Instant;

use anyhow::Result;

use crate::audio_io::decode_planar;
use crate::region::ShortClipPolicy;
use crate::source::{materialize, AudioSource, MaterializedSource};
use crate::wave::{build_minmax, mixdown_mono, resample_linear};

use super::types::{LoadMsg, TrimEvent};

const OVERVIEW_BINS: usize = 2048;

impl super::TrimApp {
    /// Replace the current source. Tears down playback, region, drag
    /// session, mode and pending events, then starts a fresh load.
    pub fn set_source(&mut self, source: AudioSource) {
        self.guard.request_pause(&self.audio);
        self.audio.clear_samples();
        self.drag = None;
        self.region.reset();
        self.overview.clear();
        self.events.clear();
        // dropping the previous materialization removes its temp file
        self.materialized = None;
        self.guard.reset();
        self.source_label = Some(source.describe());
        self.supervisor.arm(Instant::now());
        self.debug.loads_started += 1;
        self.debug_log(format!("load started: {}", source.describe()));
        self.spawn_load(source);
    }

    fn spawn_load(&mut self, source: AudioSource) {
        self.load_generation = self.load_generation.wrapping_add(1);
        let generation = self.load_generation;
        let (tx, rx) = mpsc::channel::<LoadMsg>();
        self.load_rx = Some(rx);
        let out_sr = self.audio.output_rate();
        let min_len = self.region.bounds.min_len;
        let short_clips = self.region.bounds.short_clips;
        let stall_visual = self.startup.cfg.stall_visual;
        std::thread::spawn(move || {
            let (channels, duration, materialized) =
                match load_transport(&source, out_sr, min_len, short_clips) {
                    Ok(v) => v,
                    Err(err) => {
                        let _ = tx.send(LoadMsg::Failed {
                            generation,
                            message: format!("{err:#}"),
                        });
                        return;
                    }
                };
            let mono = mixdown_mono(&channels);
            let _ = tx.send(LoadMsg::Transport {
                generation,
                channels,
                duration,
                materialized,
            });
            if stall_visual {
                // test lever: leave the waveform pipeline silent so the
                // watchdog path can be exercised end to end
                return;
            }
            let mut overview = Vec::new();
            build_minmax(&mut overview, &mono, OVERVIEW_BINS);
            let _ = tx.send(LoadMsg::Visual {
                generation,
                overview,
            });
        });
    }

    /// Drain worker messages, at most once per frame. Generations from
    /// a superseded load are dropped unseen.
    pub(super) fn tick_load_messages(&mut self, ctx: &egui::Context) {
        let mut msgs = Vec::new();
        if let Some(rx) = &self.load_rx {
            while let Ok(msg) = rx.try_recv() {
                msgs.push(msg);
            }
        }
        for msg in msgs {
            match msg {
                LoadMsg::Transport {
                    generation,
                    channels,
                    duration,
                    materialized,
                } => {
                    if generation != self.load_generation {
                        continue;
                    }
                    self.apply_transport_ready(channels, duration, materialized);
                    ctx.request_repaint();
                }
                LoadMsg::Visual {
                    generation,
                    overview,
                } => {
                    if generation != self.load_generation {
                        continue;
                    }
                    self.apply_visual_ready(overview);
                    ctx.request_repaint();
                }
                LoadMsg::Failed {
                    generation,
                    message,
                } => {
                    if generation != self.load_generation {
                        continue;
                    }
                    self.apply_load_failed(message);
                    ctx.request_repaint();
                }
            }
        }
    }

    fn apply_transport_ready(
        &mut self,
        channels: Vec<Vec<f32>>,
        duration: f32,
        materialized: MaterializedSource,
    ) {
        self.audio.set_samples_channels(channels);
        self.materialized = Some(materialized);
        self.guard.reset();
        self.debug.transports_ready += 1;
        if let Some(r) = self.region.init_for_duration(duration) {
            self.debug_log(format!("region seeded: {:.2}s – {:.2}s", r.start, r.end));
        }
        if self.startup.cfg.stall_visual {
            // no further worker messages in this configuration
            self.load_rx = None;
        }
        self.push_event(TrimEvent::AudioLoaded { duration });
    }

    fn apply_visual_ready(&mut self, overview: Vec<(f32, f32)>) {
        // the overview is the worker's last message either way
        self.load_rx = None;
        if self.supervisor.note_visual_ready() {
            self.debug.visuals_ready += 1;
            self.overview = overview;
            self.debug_log(format!("waveform ready: {} bins", self.overview.len()));
        } else {
            self.debug_log("waveform arrived after fallback, ignored".to_string());
        }
    }

    pub(super) fn apply_load_failed(&mut self, message: String) {
        self.load_rx = None;
        self.debug.load_failures += 1;
        if self.supervisor.note_error(message.clone()) {
            self.push_event(TrimEvent::Error { message });
        }
    }

    /// Once degraded with a playable buffer in hand, nothing further is
    /// expected from the worker.
    pub(super) fn drop_stale_worker_after_degrade(&mut self) {
        if self.audio.has_samples() {
            self.load_rx = None;
        }
    }
}

fn load_transport(
    source: &AudioSource,
    out_sr: u32,
    min_len: f32,
    short_clips: ShortClipPolicy,
) -> Result<(Vec<Vec<f32>>, f32, MaterializedSource)> {
    let materialized = materialize(source)?;
    let (channels, in_sr) = decode_planar(materialized.path())?;
    let frames = channels.first().map(|c| c.len()).unwrap_or(0);
    let duration = frames as f32 / in_sr.max(1) as f32;
    if short_clips == ShortClipPolicy::Reject && duration < min_len {
        anyhow::bail!(
            "clip is {:.2}s, shorter than the {:.0}s minimum",
            duration,
            min_len
        );
    }
    let channels: Vec<Vec<f32>> = channels
        .iter()
        .map(|ch| resample_linear(ch, in_sr, out_sr))
        .collect();
    let frames = channels.first().map(|c| c.len()).unwrap_or(0);
    let duration = frames as f32 / out_sr.max(1) as f32;
    Ok((channels, duration, materialized))
}
