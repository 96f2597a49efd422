use egui::Color32;

pub fn db_to_amp(db: f32) -> f32 {
    if db <= -80.0 { 0.0 } else { (10.0f32).powf(db / 20.0) }
}

pub fn lerp_color(a: Color32, b: Color32, t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let r = (a.r() as f32 + (b.r() as f32 - a.r() as f32) * t) as u8;
    let g = (a.g() as f32 + (b.g() as f32 - a.g() as f32) * t) as u8;
    let bl = (a.b() as f32 + (b.b() as f32 - a.b() as f32) * t) as u8;
    Color32::from_rgb(r, g, bl)
}

/// `#rrggbb` (leading `#` optional). None on anything else; callers
/// fall back to the default color.
pub fn parse_hex_color(text: &str) -> Option<Color32> {
    let hex = text.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color32::from_rgb(r, g, b))
}

pub fn format_duration(secs: f32) -> String {
    let s = if secs.is_finite() && secs >= 0.0 { secs } else { 0.0 };
    let total = s.round() as u64;
    let m = total / 60;
    let s = total % 60;
    format!("{}:{:02}", m, s)
}

pub fn format_selection(start: f32, end: f32) -> String {
    format!(
        "{} – {} ({:.1} s)",
        format_duration(start),
        format_duration(end),
        (end - start).max(0.0)
    )
}
