/// Linear-interpolation resample of a single lane. Accurate enough for
/// preview playback; selection boundaries live in seconds so nothing
/// accumulates across the clip.
pub fn resample_linear(mono: &[f32], in_sr: u32, out_sr: u32) -> Vec<f32> {
    if mono.is_empty() || in_sr == out_sr || in_sr == 0 || out_sr == 0 {
        return mono.to_vec();
    }
    let step = in_sr as f64 / out_sr as f64;
    let out_len = ((mono.len() as f64) * (out_sr as f64 / in_sr as f64)).ceil() as usize;
    let last = mono.len() - 1;
    let mut out = Vec::with_capacity(out_len);
    for i in 0..out_len {
        let pos = (i as f64) * step;
        let base = pos.floor() as usize;
        if base >= last {
            out.push(mono[last]);
            continue;
        }
        let frac = (pos - base as f64) as f32;
        out.push(mono[base] + (mono[base + 1] - mono[base]) * frac);
    }
    out
}

/// Average all channels into one lane for the overview strip.
pub fn mixdown_mono(chans: &[Vec<f32>]) -> Vec<f32> {
    let Some(first) = chans.first() else {
        return Vec::new();
    };
    if chans.len() == 1 {
        return first.clone();
    }
    let frames = chans.iter().map(Vec::len).min().unwrap_or(0);
    let scale = 1.0 / chans.len() as f32;
    (0..frames)
        .map(|i| chans.iter().map(|c| c[i]).sum::<f32>() * scale)
        .collect()
}

/// Min/max peaks per bin for the painted overview. Short inputs yield
/// fewer than `bins` pairs.
pub fn build_minmax(out: &mut Vec<(f32, f32)>, samples: &[f32], bins: usize) {
    out.clear();
    if samples.is_empty() || bins == 0 {
        return;
    }
    let len = samples.len();
    let width = (len as f32 / bins as f32).max(1.0);
    let mut cursor = 0.0f32;
    for _ in 0..bins {
        let from = cursor as usize;
        let to = ((cursor + width) as usize).min(len);
        if from < to {
            out.push(peak_pair(&samples[from..to]));
        } else {
            out.push((0.0, 0.0));
        }
        cursor += width;
        if cursor as usize >= len {
            break;
        }
    }
}

fn peak_pair(window: &[f32]) -> (f32, f32) {
    let mut lo = f32::INFINITY;
    let mut hi = f32::NEG_INFINITY;
    for &v in window {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if lo.is_finite() && hi.is_finite() {
        (lo, hi)
    } else {
        (0.0, 0.0)
    }
}
