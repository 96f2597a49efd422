use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine as _;
use wavetrim::audio_io::decode_planar;
use wavetrim::source::{decode_base64_payload, materialize, AudioSource};
use wavetrim::wave::{mixdown_mono, resample_linear};

fn make_temp_dir(tag: &str) -> PathBuf {
    static NEXT_ID: AtomicU64 = AtomicU64::new(1);
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let seq = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    let mut dir = std::env::temp_dir();
    dir.push(format!(
        "wavetrim_payloads_{tag}_{}_{}_{}",
        std::process::id(),
        now_ms,
        seq
    ));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn write_tone_wav(path: &Path, secs: f32, sample_rate: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut w = hound::WavWriter::create(path, spec).expect("create wav");
    let frames = (secs * sample_rate as f32) as usize;
    for i in 0..frames {
        let t = i as f32 / sample_rate as f32;
        let s = (t * 330.0 * std::f32::consts::TAU).sin() * 0.4;
        w.write_sample((s * i16::MAX as f32) as i16)
            .expect("write sample");
    }
    w.finalize().expect("finalize wav");
}

/// Wrap bytes the way an embedding host would: data URI header plus
/// base64 folded into 76-column lines.
fn data_uri_for(bytes: &[u8]) -> String {
    let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
    let mut folded = String::with_capacity(b64.len() + b64.len() / 76 + 32);
    folded.push_str("data:audio/wav;base64,");
    for (i, ch) in b64.chars().enumerate() {
        if i > 0 && i % 76 == 0 {
            folded.push('\n');
        }
        folded.push(ch);
    }
    folded
}

#[test]
fn base64_payload_materializes_to_a_removable_temp_wav() {
    let dir = make_temp_dir("data");
    let wav = dir.join("tone.wav");
    write_tone_wav(&wav, 2.0, 22_050);
    let bytes = std::fs::read(&wav).expect("read fixture");

    let decoded = decode_base64_payload(&data_uri_for(&bytes)).expect("decode payload");
    assert_eq!(decoded, bytes);

    let source = AudioSource::Data(decoded);
    let temp_path;
    {
        let mat = materialize(&source).expect("materialize data source");
        assert!(mat.is_temp());
        assert_eq!(
            mat.path().extension().and_then(|e| e.to_str()),
            Some("wav")
        );
        assert!(mat.path().exists());

        let (channels, sr) = decode_planar(mat.path()).expect("decode materialized wav");
        assert_eq!(sr, 22_050);
        assert_eq!(channels.len(), 1);
        assert_eq!(channels[0].len(), 44_100);

        temp_path = mat.path().to_path_buf();
    }
    // dropping the materialization removes its temp file
    assert!(!temp_path.exists());
}

#[test]
fn path_sources_decode_in_place_without_temp_copies() {
    let dir = make_temp_dir("path");
    let wav = dir.join("tone.wav");
    write_tone_wav(&wav, 1.0, 22_050);

    let source = AudioSource::Path(wav.clone());
    {
        let mat = materialize(&source).expect("materialize path source");
        assert!(!mat.is_temp());
        assert_eq!(mat.path(), wav.as_path());

        let (channels, sr) = decode_planar(mat.path()).expect("decode wav");
        assert_eq!(sr, 22_050);
        assert_eq!(channels[0].len(), 22_050);
    }
    // the original file is not ours to delete
    assert!(wav.exists());
}

#[test]
fn decoded_audio_resamples_to_the_engine_rate() {
    let dir = make_temp_dir("resample");
    let wav = dir.join("tone.wav");
    write_tone_wav(&wav, 2.0, 22_050);

    let (channels, sr) = decode_planar(&wav).expect("decode wav");
    assert_eq!(sr, 22_050);
    let mono = mixdown_mono(&channels);
    let out = resample_linear(&mono, sr, 48_000);
    let expected = 96_000i64;
    assert!(
        (out.len() as i64 - expected).abs() <= 1,
        "resampled length {} far from {expected}",
        out.len()
    );
    // the tone survives the rate change at roughly the same level
    let peak_in = mono.iter().fold(0.0f32, |m, &v| m.max(v.abs()));
    let peak_out = out.iter().fold(0.0f32, |m, &v| m.max(v.abs()));
    assert!((peak_in - peak_out).abs() < 0.05, "{peak_in} vs {peak_out}");
}
