#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::path::{Path, PathBuf};

use wavetrim::app;
use wavetrim::region::ShortClipPolicy;

/// Optional TOML config, merged when `--config` is seen. Flags after
/// it still override.
#[derive(Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    audio: Option<PathBuf>,
    audio_url: Option<String>,
    audio_b64: Option<PathBuf>,
    min_length: Option<f32>,
    max_length: Option<f32>,
    instructions: Option<bool>,
    color: Option<String>,
    short_clips: Option<String>,
    save_json: Option<PathBuf>,
}

fn parse_short_clips(value: &str) -> Option<ShortClipPolicy> {
    match value.to_lowercase().as_str() {
        "allow" => Some(ShortClipPolicy::Allow),
        "reject" => Some(ShortClipPolicy::Reject),
        _ => None,
    }
}

fn apply_config_file(cfg: &mut app::LaunchConfig, path: &Path) {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(err) => {
            eprintln!("read config {}: {err}", path.display());
            return;
        }
    };
    let file: ConfigFile = match toml::from_str(&text) {
        Ok(f) => f,
        Err(err) => {
            eprintln!("bad config {}: {err}", path.display());
            return;
        }
    };
    if let Some(p) = file.audio {
        cfg.audio_path = Some(p);
    }
    if let Some(u) = file.audio_url {
        cfg.audio_url = Some(u);
    }
    if let Some(p) = file.audio_b64 {
        cfg.audio_b64 = Some(p);
    }
    if let Some(v) = file.min_length {
        cfg.min_len = v;
    }
    if let Some(v) = file.max_length {
        cfg.max_len = v;
    }
    if let Some(v) = file.instructions {
        cfg.show_instructions = v;
    }
    if let Some(c) = file.color {
        cfg.primary_color = c;
    }
    if let Some(s) = file.short_clips {
        if let Some(policy) = parse_short_clips(&s) {
            cfg.short_clips = policy;
        }
    }
    if let Some(p) = file.save_json {
        cfg.save_json = Some(p);
    }
}

/// Pull the next argument and parse it; a missing or malformed value
/// leaves the flag without effect.
fn parsed_value<T: std::str::FromStr>(args: &mut impl Iterator<Item = String>) -> Option<T> {
    args.next().and_then(|raw| raw.parse().ok())
}

fn parse_launch_config() -> app::LaunchConfig {
    let mut cfg = app::LaunchConfig::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--audio" => {
                if let Some(p) = parsed_value(&mut args) {
                    cfg.audio_path = Some(p);
                }
            }
            "--audio-url" => {
                if let Some(u) = parsed_value(&mut args) {
                    cfg.audio_url = Some(u);
                }
            }
            "--audio-b64" => {
                if let Some(p) = parsed_value(&mut args) {
                    cfg.audio_b64 = Some(p);
                }
            }
            "--min-length" => {
                if let Some(secs) = parsed_value::<f32>(&mut args) {
                    cfg.min_len = secs;
                }
            }
            "--max-length" => {
                if let Some(secs) = parsed_value::<f32>(&mut args) {
                    cfg.max_len = secs;
                }
            }
            "--no-instructions" => cfg.show_instructions = false,
            "--color" => {
                if let Some(c) = parsed_value(&mut args) {
                    cfg.primary_color = c;
                }
            }
            "--short-clips" => {
                let policy = parsed_value::<String>(&mut args);
                if let Some(policy) = policy.as_deref().and_then(parse_short_clips) {
                    cfg.short_clips = policy;
                }
            }
            "--save-json" => {
                if let Some(p) = parsed_value(&mut args) {
                    cfg.save_json = Some(p);
                }
            }
            "--config" => {
                if let Some(p) = parsed_value::<PathBuf>(&mut args) {
                    apply_config_file(&mut cfg, &p);
                }
            }
            "--stall-visual" => cfg.stall_visual = true,
            "--screenshot" => {
                if let Some(p) = parsed_value(&mut args) {
                    cfg.screenshot_path = Some(p);
                }
            }
            "--screenshot-delay" => {
                if let Some(frames) = parsed_value::<u32>(&mut args) {
                    cfg.screenshot_delay_frames = frames;
                }
            }
            "--exit-after-screenshot" => cfg.exit_after_screenshot = true,
            "--debug" => cfg.debug.enabled = true,
            "--debug-log" => {
                if let Some(p) = parsed_value(&mut args) {
                    cfg.debug = app::InspectorConfig {
                        enabled: true,
                        log_path: Some(p),
                    };
                }
            }
            "--help" | "-h" => {
                eprintln!(
                    "Usage:\n  wavetrim [options] [audio-file]\n\nOptions:\n  --audio <path>\n  --audio-url <url>\n  --audio-b64 <file with base64 payload>\n  --min-length <secs>\n  --max-length <secs>\n  --no-instructions\n  --color <#rrggbb>\n  --short-clips <allow|reject>\n  --save-json <path>\n  --config <settings.toml>\n  --stall-visual\n  --screenshot <path.png>\n  --screenshot-delay <frames>\n  --exit-after-screenshot\n  --debug\n  --debug-log <path>\n  --help"
                );
                std::process::exit(0);
            }
            other => {
                if !other.starts_with('-') {
                    cfg.audio_path = Some(PathBuf::from(other));
                }
            }
        }
    }
    cfg
}

fn main() -> eframe::Result<()> {
    let startup = parse_launch_config();
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_min_inner_size([900.0, 580.0])
            .with_inner_size([1240.0, 760.0]),
        ..Default::default()
    };
    eframe::run_native(
        "WaveTrim",
        native_options,
        Box::new(move |cc| {
            Ok(Box::new(
                app::TrimApp::new(cc, startup).expect("failed to init app"),
            ))
        }),
    )
}
