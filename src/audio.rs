//! cpal output engine. The UI thread and the device callback share
//! state only through lock-free cells.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use arc_swap::ArcSwapOption;
use atomic_float::AtomicF32;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

/// Decoded clip at the device rate, one `Vec<f32>` per channel, values
/// in [-1, 1]. All channels share the same frame count.
struct PcmClip {
    channels: Vec<Vec<f32>>,
}

impl PcmClip {
    fn new(channels: Vec<Vec<f32>>) -> Self {
        if channels.is_empty() {
            return Self {
                channels: vec![Vec::new()],
            };
        }
        Self { channels }
    }

    fn frames(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }

    /// Channel feeding output slot `out_idx`: mono fans out to every
    /// slot, extra output slots replay the last source channel.
    fn channel(&self, out_idx: usize) -> &[f32] {
        let idx = out_idx.min(self.channels.len() - 1);
        &self.channels[idx]
    }
}

struct TransportShared {
    clip: ArcSwapOption<PcmClip>,
    head: AtomicUsize,
    rolling: AtomicBool,
    gain: AtomicF32,
    device_rate: u32,
}

impl TransportShared {
    fn at_rate(device_rate: u32) -> Self {
        Self {
            clip: ArcSwapOption::from(None),
            head: AtomicUsize::new(0),
            rolling: AtomicBool::new(false),
            gain: AtomicF32::new(1.0),
            device_rate,
        }
    }
}

/// Fill one output buffer. Silence is written first so every early
/// return leaves clean output; a frame head past the clip flips
/// `rolling` off (the engine's own auto-stop, which the playback guard
/// turns into a rewind).
fn render<T>(data: &mut [T], out_channels: usize, shared: &TransportShared)
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    data.fill(T::from_sample(0.0));
    if !shared.rolling.load(Ordering::Relaxed) {
        return;
    }
    let Some(clip) = shared.clip.load_full() else {
        return;
    };
    let frames = clip.frames();
    if frames == 0 {
        return;
    }
    let gain = shared.gain.load(Ordering::Relaxed);
    let mut head = shared.head.load(Ordering::Relaxed);
    for frame in data.chunks_mut(out_channels) {
        if head >= frames {
            shared.rolling.store(false, Ordering::Relaxed);
            break;
        }
        for (slot_idx, slot) in frame.iter_mut().enumerate() {
            let sample = clip.channel(slot_idx)[head] * gain;
            *slot = T::from_sample(sample.clamp(-1.0, 1.0));
        }
        head += 1;
    }
    shared.head.store(head, Ordering::Relaxed);
}

fn open_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    shared: Arc<TransportShared>,
) -> Result<cpal::Stream>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let out_channels = config.channels as usize;
    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            render(data, out_channels, &shared);
        },
        |err| eprintln!("audio stream error: {err}"),
        None,
    )?;
    stream.play()?;
    Ok(stream)
}

pub struct AudioEngine {
    _stream: Option<cpal::Stream>,
    shared: Arc<TransportShared>,
}

impl AudioEngine {
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .context("no audio output device")?;
        let default_cfg = device
            .default_output_config()
            .context("no default output config")?;
        let shared = Arc::new(TransportShared::at_rate(default_cfg.sample_rate()));
        let config: cpal::StreamConfig = default_cfg.clone().into();
        let stream = match default_cfg.sample_format() {
            cpal::SampleFormat::F32 => open_stream::<f32>(&device, &config, Arc::clone(&shared))?,
            cpal::SampleFormat::I16 => open_stream::<i16>(&device, &config, Arc::clone(&shared))?,
            cpal::SampleFormat::U16 => open_stream::<u16>(&device, &config, Arc::clone(&shared))?,
            other => anyhow::bail!("unsupported output sample format {other:?}"),
        };
        Ok(Self {
            _stream: Some(stream),
            shared,
        })
    }

    /// Engine without a device stream; the head only moves via seeks.
    pub fn new_for_test() -> Self {
        Self {
            _stream: None,
            shared: Arc::new(TransportShared::at_rate(48_000)),
        }
    }

    pub fn output_rate(&self) -> u32 {
        self.shared.device_rate
    }

    /// Install a freshly decoded clip, stopped with the head at 0.
    pub fn set_samples_channels(&self, channels: Vec<Vec<f32>>) {
        self.shared.rolling.store(false, Ordering::Relaxed);
        self.shared.head.store(0, Ordering::Relaxed);
        self.shared.clip.store(Some(Arc::new(PcmClip::new(channels))));
    }

    pub fn clear_samples(&self) {
        self.shared.rolling.store(false, Ordering::Relaxed);
        self.shared.head.store(0, Ordering::Relaxed);
        self.shared.clip.store(None);
    }

    pub fn has_samples(&self) -> bool {
        self.shared.clip.load().is_some()
    }

    pub fn set_volume(&self, gain: f32) {
        self.shared.gain.store(gain.clamp(0.0, 1.0), Ordering::Relaxed);
    }

    pub fn is_playing(&self) -> bool {
        self.shared.rolling.load(Ordering::Relaxed)
    }

    pub fn play(&self) {
        let Some(clip) = self.shared.clip.load_full() else {
            return;
        };
        if self.shared.head.load(Ordering::Relaxed) >= clip.frames() {
            self.shared.head.store(0, Ordering::Relaxed);
        }
        self.shared.rolling.store(true, Ordering::Relaxed);
    }

    pub fn stop(&self) {
        self.shared.rolling.store(false, Ordering::Relaxed);
    }

    /// Move the head; out-of-range and non-finite targets are ignored,
    /// in-range ones clamp to the clip length. No clip, no movement.
    pub fn seek_secs(&self, secs: f32) {
        if !secs.is_finite() || secs < 0.0 {
            return;
        }
        let Some(clip) = self.shared.clip.load_full() else {
            return;
        };
        let target = (secs as f64 * self.shared.device_rate as f64) as usize;
        self.shared
            .head
            .store(target.min(clip.frames()), Ordering::Relaxed);
    }

    pub fn position_secs(&self) -> f32 {
        let head = self.shared.head.load(Ordering::Relaxed);
        head as f32 / self.shared.device_rate as f32
    }
}
