//! Decoding to planar f32. symphonia does the real work; a hound
//! fallback covers PCM wav files its probe refuses.

use std::fs::File;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::{Hint, ProbeResult};
use symphonia::default::{get_codecs, get_probe};

/// Extensions offered in the open dialog. The decoder is the real
/// authority; anything it can probe will load.
pub const SUPPORTED_EXTS: &[&str] = &["wav", "mp3", "m4a", "ogg"];

fn trace_enabled() -> bool {
    static ON: OnceLock<bool> = OnceLock::new();
    *ON.get_or_init(|| match std::env::var("WAVETRIM_TRACE") {
        Ok(v) => {
            let v = v.trim();
            !v.is_empty()
                && v != "0"
                && !v.eq_ignore_ascii_case("false")
                && !v.eq_ignore_ascii_case("off")
        }
        Err(_) => false,
    })
}

struct DecodeSession {
    reader: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    rate_hint: u32,
}

impl DecodeSession {
    fn open(path: &Path) -> Result<Self> {
        let probed = match Self::probe(path, true) {
            Ok(p) => p,
            // A wrong extension can sink the hinted probe; retry blind.
            Err(err) if path.extension().is_some() => Self::probe(path, false)
                .with_context(|| format!("cannot probe {} ({err:#})", path.display()))?,
            Err(err) => return Err(err),
        };
        let reader = probed.format;
        let track = reader.default_track().context("no default track")?.clone();
        let decoder = get_codecs().make(&track.codec_params, &DecoderOptions::default())?;
        Ok(Self {
            reader,
            decoder,
            track_id: track.id,
            rate_hint: track.codec_params.sample_rate.unwrap_or(0),
        })
    }

    fn probe(path: &Path, use_hint: bool) -> Result<ProbeResult> {
        let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
        let stream = MediaSourceStream::new(Box::new(file), Default::default());
        let mut hint = Hint::new();
        if use_hint {
            if let Some(ext) = path.extension().and_then(|s| s.to_str()) {
                hint.with_extension(ext);
            }
        }
        let probed = get_probe().format(
            &hint,
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;
        Ok(probed)
    }
}

enum PacketFate {
    Skip,
    End,
}

/// Decode problems inside a single packet are skippable; end-of-stream
/// shows up as either UnexpectedEof or ResetRequired depending on the
/// container. Everything else aborts the decode.
fn packet_fate(err: SymphoniaError) -> Result<PacketFate> {
    match err {
        SymphoniaError::DecodeError(_) => Ok(PacketFate::Skip),
        SymphoniaError::IoError(io) if io.kind() == std::io::ErrorKind::UnexpectedEof => {
            Ok(PacketFate::End)
        }
        SymphoniaError::ResetRequired => Ok(PacketFate::End),
        other => Err(other.into()),
    }
}

/// Decode a file to one `Vec<f32>` per channel at its native rate.
pub fn decode_planar(path: &Path) -> Result<(Vec<Vec<f32>>, u32)> {
    let mut session = match DecodeSession::open(path) {
        Ok(s) => s,
        Err(probe_err) => {
            // symphonia's probe refuses some PCM wavs that hound reads fine
            if let Ok(done) = wav_fallback(path) {
                return Ok(done);
            }
            return Err(probe_err);
        }
    };
    let mut planar: Vec<Vec<f32>> = Vec::new();
    let mut sample_rate = session.rate_hint;
    let mut skipped = 0u32;
    loop {
        let packet = match session.reader.next_packet() {
            Ok(p) => p,
            Err(err) => match packet_fate(err)? {
                PacketFate::Skip => {
                    skipped = skipped.saturating_add(1);
                    continue;
                }
                PacketFate::End => break,
            },
        };
        if packet.track_id() != session.track_id {
            continue;
        }
        let decoded = match session.decoder.decode(&packet) {
            Ok(d) => d,
            Err(err) => match packet_fate(err)? {
                PacketFate::Skip => {
                    skipped = skipped.saturating_add(1);
                    continue;
                }
                PacketFate::End => break,
            },
        };
        let spec = *decoded.spec();
        if sample_rate == 0 {
            sample_rate = spec.rate;
        }
        let lanes = spec.channels.count().max(1);
        if planar.is_empty() {
            planar = vec![Vec::new(); lanes];
        }
        let mut interleaved = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        interleaved.copy_interleaved_ref(decoded);
        for (i, &v) in interleaved.samples().iter().enumerate() {
            planar[i % lanes].push(v);
        }
    }
    if sample_rate == 0 {
        anyhow::bail!("sample rate unknown for {}", path.display());
    }
    if planar.iter().all(|lane| lane.is_empty()) {
        anyhow::bail!("no audio frames in {}", path.display());
    }
    #[cfg(debug_assertions)]
    scrub_non_finite(path, &mut planar);
    if trace_enabled() {
        eprintln!(
            "decode path=\"{}\" sr={sample_rate} ch={} frames={} skipped={skipped}",
            path.display(),
            planar.len(),
            planar[0].len(),
        );
    }
    Ok((planar, sample_rate))
}

fn wav_fallback(path: &Path) -> Result<(Vec<Vec<f32>>, u32)> {
    let mut reader =
        hound::WavReader::open(path).with_context(|| format!("open wav {}", path.display()))?;
    let spec = reader.spec();
    let lanes = spec.channels.max(1) as usize;
    let mut planar = vec![Vec::new(); lanes];
    match spec.sample_format {
        hound::SampleFormat::Float => {
            for (i, sample) in reader.samples::<f32>().enumerate() {
                planar[i % lanes].push(sample?);
            }
        }
        hound::SampleFormat::Int => {
            let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            for (i, sample) in reader.samples::<i32>().enumerate() {
                planar[i % lanes].push(sample? as f32 / full_scale);
            }
        }
    }
    if planar.iter().all(|lane| lane.is_empty()) {
        anyhow::bail!("wav has no samples: {}", path.display());
    }
    if trace_enabled() {
        eprintln!(
            "decode(wav fallback) path=\"{}\" sr={} ch={lanes} frames={}",
            path.display(),
            spec.sample_rate,
            planar[0].len(),
        );
    }
    Ok((planar, spec.sample_rate))
}

#[cfg(debug_assertions)]
fn scrub_non_finite(path: &Path, planar: &mut [Vec<f32>]) {
    let mut zeroed = 0usize;
    for lane in planar.iter_mut() {
        for v in lane.iter_mut() {
            if !v.is_finite() {
                *v = 0.0;
                zeroed += 1;
            }
        }
    }
    if zeroed > 0 {
        eprintln!(
            "scrubbed {zeroed} non-finite samples from {}",
            path.display()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_roundtrips_synthesized_wav() {
        let dir = std::env::temp_dir().join("wavetrim-test-io");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sine_io.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 22_050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for i in 0..22_050 {
            let t = i as f32 / 22_050.0;
            let v = (t * 440.0 * std::f32::consts::TAU).sin() * 0.5;
            let s = (v * i16::MAX as f32) as i16;
            writer.write_sample(s).unwrap();
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        let (planar, sr) = decode_planar(&path).unwrap();
        assert_eq!(sr, 22_050);
        assert_eq!(planar.len(), 2);
        assert_eq!(planar[0].len(), 22_050);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        let dir = std::env::temp_dir().join("wavetrim-test-io");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("not_audio.wav");
        std::fs::write(&path, b"definitely not a riff").unwrap();
        assert!(decode_planar(&path).is_err());
        let _ = std::fs::remove_file(&path);
    }
}
