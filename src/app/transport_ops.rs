use super::helpers::db_to_amp;

impl super::TrimApp {
    pub(super) fn toggle_play(&mut self) {
        if !self.audio.has_samples() {
            return;
        }
        let Some(region) = self.region.region() else {
            return;
        };
        self.guard.toggle(&self.audio, region);
    }

    pub(super) fn rewind(&mut self) {
        let Some(region) = self.region.region() else {
            return;
        };
        self.guard.rewind(&self.audio, region);
    }

    /// Confinement poll. Runs every frame; the repaint cadence in
    /// `update` keeps frames frequent enough while playing.
    pub(super) fn tick_playback(&mut self, ctx: &egui::Context) {
        let Some(region) = self.region.region() else {
            return;
        };
        if self.guard.tick(&self.audio, region) {
            self.debug_log(format!("pass ended, rewound to {:.2}s", region.start));
            ctx.request_repaint();
        }
    }

    pub(super) fn set_volume_db(&mut self, db: f32) {
        self.volume_db = db;
        self.audio.set_volume(db_to_amp(db));
    }
}
