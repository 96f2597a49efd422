//! Accessors for driving the app from `egui_kittest` harnesses. Only
//! compiled with the `kittest` feature; nothing here is part of the
//! normal surface.

use crate::gesture::TrackGeometry;

impl super::TrimApp {
    pub fn test_mode_label(&self) -> &'static str {
        self.supervisor.mode().label()
    }

    pub fn test_notice(&self) -> Option<String> {
        self.supervisor.notice().map(str::to_string)
    }

    pub fn test_region(&self) -> Option<(f32, f32)> {
        self.region.region().map(|r| (r.start, r.end))
    }

    pub fn test_set_region(&mut self, start: f32, end: f32) -> Option<(f32, f32)> {
        self.region.set_region(start, end).map(|r| (r.start, r.end))
    }

    pub fn test_duration(&self) -> f32 {
        self.region.duration()
    }

    pub fn test_has_samples(&self) -> bool {
        self.audio.has_samples()
    }

    pub fn test_is_playing(&self) -> bool {
        self.audio.is_playing()
    }

    pub fn test_position(&self) -> f32 {
        self.audio.position_secs()
    }

    pub fn test_seek(&self, secs: f32) {
        self.audio.seek_secs(secs);
    }

    pub fn test_overview_bins(&self) -> usize {
        self.overview.len()
    }

    pub fn test_drag_active(&self) -> bool {
        self.drag_active()
    }

    pub fn test_begin_drag(&mut self, geom: &TrackGeometry, pixel_x: f32) -> bool {
        self.begin_drag(geom, pixel_x)
    }

    pub fn test_update_drag(&mut self, geom: &TrackGeometry, pixel_x: f32) {
        self.update_drag(geom, pixel_x)
    }

    pub fn test_end_drag(&mut self) {
        self.end_drag()
    }

    pub fn test_click(&mut self, time: f32) {
        self.click_track(time)
    }

    pub fn test_toggle_play(&mut self) {
        self.toggle_play()
    }

    pub fn test_save(&mut self) {
        self.save_trim()
    }
}
