use std::path::Path;

use egui::Vec2;
use egui_kittest::Harness;

use crate::{LaunchConfig, TrimApp};

pub fn harness_with_startup(startup: LaunchConfig) -> Harness<'static, TrimApp> {
    Harness::builder()
        .with_size(Vec2::new(1280.0, 720.0))
        .with_os(egui::os::OperatingSystem::from_target_os())
        .build_eframe(|cc| TrimApp::new_for_test(cc, startup).expect("init test app"))
}

pub fn harness_default() -> Harness<'static, TrimApp> {
    harness_with_startup(LaunchConfig::default())
}

/// Write a mono 16-bit sine wav for harness tests.
pub fn write_sine_wav(path: &Path, secs: f32, sample_rate: u32) -> anyhow::Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut w = hound::WavWriter::create(path, spec)?;
    let frames = (secs * sample_rate as f32) as usize;
    for i in 0..frames {
        let t = i as f32 / sample_rate as f32;
        let s = (t * 220.0 * std::f32::consts::TAU).sin() * 0.5;
        w.write_sample((s * i16::MAX as f32) as i16)?;
    }
    w.finalize()?;
    Ok(())
}
