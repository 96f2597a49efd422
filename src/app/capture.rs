use std::path::Path;

use anyhow::{Context, Result};

/// Write an egui frame grab to disk as PNG.
pub(super) fn save_color_image_png(path: &Path, image: &egui::ColorImage) -> Result<()> {
    let [w, h] = image.size;
    anyhow::ensure!(w > 0 && h > 0, "empty screenshot image");
    let mut rgba = image::RgbaImage::new(w as u32, h as u32);
    for (i, px) in image.pixels.iter().enumerate() {
        let x = (i % w) as u32;
        let y = (i / w) as u32;
        rgba.put_pixel(x, y, image::Rgba([px.r(), px.g(), px.b(), px.a()]));
    }
    rgba.save(path)
        .with_context(|| format!("write screenshot png: {}", path.display()))
}
