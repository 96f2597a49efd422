use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use base64::Engine as _;

/// Where the audio comes from. Immutable once resolved; swapping the
/// source rebuilds the whole controller state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AudioSource {
    Path(PathBuf),
    Url(String),
    Data(Vec<u8>),
}

impl AudioSource {
    pub fn describe(&self) -> String {
        match self {
            AudioSource::Path(p) => p
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("file")
                .to_string(),
            AudioSource::Url(u) => u.clone(),
            AudioSource::Data(bytes) => format!("embedded audio ({} bytes)", bytes.len()),
        }
    }
}

fn source_trace(event: &str, detail: &str) {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    let on = *ENABLED.get_or_init(|| {
        std::env::var("WAVETRIM_TRACE")
            .ok()
            .map(|v| {
                let v = v.trim().to_ascii_lowercase();
                !(v.is_empty() || v == "0" || v == "false" || v == "off")
            })
            .unwrap_or(false)
    });
    if on {
        eprintln!("source_trace event={event} {detail}");
    }
}

/// Decode an embedded base64 audio payload. Accepts an optional
/// `data:<mime>;base64,` prefix and ignores embedded whitespace.
pub fn decode_base64_payload(text: &str) -> Result<Vec<u8>> {
    let trimmed = text.trim();
    let payload = if let Some(idx) = trimmed.find(";base64,") {
        &trimmed[idx + ";base64,".len()..]
    } else if trimmed.starts_with("data:") {
        match trimmed.find(',') {
            Some(idx) => &trimmed[idx + 1..],
            None => anyhow::bail!("data URI without a payload separator"),
        }
    } else {
        trimmed
    };
    let cleaned: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    anyhow::ensure!(!cleaned.is_empty(), "empty base64 audio payload");
    let engine = base64::engine::general_purpose::STANDARD;
    match engine.decode(cleaned.as_bytes()) {
        Ok(bytes) => Ok(bytes),
        Err(_) => base64::engine::general_purpose::STANDARD_NO_PAD
            .decode(cleaned.trim_end_matches('=').as_bytes())
            .context("decode base64 audio payload"),
    }
}

/// Best-effort container sniff so temp files get a useful extension hint.
pub fn guess_extension(bytes: &[u8]) -> &'static str {
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE" {
        return "wav";
    }
    if bytes.len() >= 4 && &bytes[0..4] == b"OggS" {
        return "ogg";
    }
    if bytes.len() >= 3 && &bytes[0..3] == b"ID3" {
        return "mp3";
    }
    if bytes.len() >= 2 && bytes[0] == 0xFF && (bytes[1] & 0xE0) == 0xE0 {
        return "mp3";
    }
    if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" {
        return "m4a";
    }
    "dat"
}

/// A source resolved to a local file the decoder can open. Files this
/// struct created under the temp dir are removed when it drops; keeping
/// one alive past a source change would leak the file.
#[derive(Debug)]
pub struct MaterializedSource {
    path: PathBuf,
    temp: bool,
}

impl MaterializedSource {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_temp(&self) -> bool {
        self.temp
    }
}

impl Drop for MaterializedSource {
    fn drop(&mut self) {
        if self.temp {
            source_trace("release_temp", &format!("path=\"{}\"", self.path.display()));
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

fn temp_file_path(ext: &str) -> Result<PathBuf> {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let dir = std::env::temp_dir().join("WaveTrim");
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("create temp dir: {}", dir.display()))?;
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    Ok(dir.join(format!("clip_{ts}_{n}.{ext}")))
}

fn write_temp(bytes: &[u8]) -> Result<MaterializedSource> {
    anyhow::ensure!(!bytes.is_empty(), "audio payload is empty");
    let path = temp_file_path(guess_extension(bytes))?;
    std::fs::write(&path, bytes)
        .with_context(|| format!("write temp audio: {}", path.display()))?;
    source_trace(
        "materialize_temp",
        &format!("path=\"{}\" bytes={}", path.display(), bytes.len()),
    );
    Ok(MaterializedSource { path, temp: true })
}

fn fetch_url(url: &str) -> Result<Vec<u8>> {
    let resp = reqwest::blocking::get(url)
        .with_context(|| format!("fetch audio url: {url}"))?
        .error_for_status()
        .with_context(|| format!("fetch audio url: {url}"))?;
    let bytes = resp
        .bytes()
        .with_context(|| format!("read audio url body: {url}"))?;
    source_trace("fetch_url", &format!("url=\"{url}\" bytes={}", bytes.len()));
    Ok(bytes.to_vec())
}

/// Resolve a source into a local file. Blocking; run on a worker thread.
pub fn materialize(source: &AudioSource) -> Result<MaterializedSource> {
    match source {
        AudioSource::Path(p) => {
            anyhow::ensure!(p.is_file(), "audio file not found: {}", p.display());
            Ok(MaterializedSource {
                path: p.clone(),
                temp: false,
            })
        }
        AudioSource::Url(u) => {
            let bytes = fetch_url(u)?;
            write_temp(&bytes)
        }
        AudioSource::Data(bytes) => write_temp(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_accepts_bare_and_data_uri_payloads() {
        let engine = base64::engine::general_purpose::STANDARD;
        let raw = b"RIFFtestWAVE....";
        let encoded = engine.encode(raw);
        let bare = decode_base64_payload(&encoded).unwrap();
        let prefixed =
            decode_base64_payload(&format!("data:audio/wav;base64,{encoded}")).unwrap();
        assert_eq!(bare, raw);
        assert_eq!(prefixed, raw);
    }

    #[test]
    fn base64_ignores_embedded_whitespace() {
        let engine = base64::engine::general_purpose::STANDARD;
        let encoded = engine.encode(b"hello audio bytes");
        let mut wrapped = String::new();
        for (i, c) in encoded.chars().enumerate() {
            if i > 0 && i % 8 == 0 {
                wrapped.push('\n');
            }
            wrapped.push(c);
        }
        assert_eq!(decode_base64_payload(&wrapped).unwrap(), b"hello audio bytes");
    }

    #[test]
    fn base64_rejects_garbage() {
        assert!(decode_base64_payload("!!not base64!!").is_err());
        assert!(decode_base64_payload("").is_err());
    }

    #[test]
    fn extension_sniffing_recognizes_containers() {
        let mut wav = Vec::new();
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&[0u8; 4]);
        wav.extend_from_slice(b"WAVE");
        assert_eq!(guess_extension(&wav), "wav");
        assert_eq!(guess_extension(b"OggS....."), "ogg");
        assert_eq!(guess_extension(b"ID3......"), "mp3");
        assert_eq!(guess_extension(&[0xFF, 0xFB, 0x90, 0x00]), "mp3");
        assert_eq!(guess_extension(b"plaintext"), "dat");
    }

    #[test]
    fn materialized_temp_file_is_removed_on_drop() {
        let src = AudioSource::Data(b"RIFF\0\0\0\0WAVEdata".to_vec());
        let mat = materialize(&src).unwrap();
        let path = mat.path().to_path_buf();
        assert!(path.exists());
        drop(mat);
        assert!(!path.exists());
    }

    #[test]
    fn materialize_keeps_plain_paths_alone() {
        let dir = std::env::temp_dir().join("WaveTrim");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("keepme_source_test.wav");
        std::fs::write(&path, b"RIFF\0\0\0\0WAVE").unwrap();
        let mat = materialize(&AudioSource::Path(path.clone())).unwrap();
        assert!(!mat.is_temp());
        drop(mat);
        assert!(path.exists(), "non-temp paths must survive drop");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn materialize_missing_path_errors() {
        let src = AudioSource::Path(PathBuf::from("/nonexistent/wavetrim_missing.wav"));
        assert!(materialize(&src).is_err());
    }
}
