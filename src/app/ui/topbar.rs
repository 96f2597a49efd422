use egui::{Align, Color32, RichText};

use crate::audio_io::SUPPORTED_EXTS;
use crate::source::AudioSource;
use crate::supervisor::ComponentMode;

impl crate::app::TrimApp {
    pub(in crate::app) fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal_wrapped(|ui| {
                if ui.button("Open...").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("Audio", SUPPORTED_EXTS)
                        .pick_file()
                    {
                        self.set_source(AudioSource::Path(path));
                    }
                }
                ui.separator();
                let label = self.source_label.clone().unwrap_or_else(|| "no source".into());
                ui.add(
                    egui::Label::new(RichText::new(label).monospace())
                        .truncate()
                        .show_tooltip_when_elided(true),
                );
                let mode = self.mode();
                let color = match mode {
                    ComponentMode::Loading => Color32::GRAY,
                    ComponentMode::Ready => Color32::from_rgb(100, 220, 120),
                    ComponentMode::Degraded => Color32::from_rgb(230, 180, 80),
                    ComponentMode::Error => Color32::from_rgb(230, 110, 110),
                };
                ui.label(RichText::new(mode.label()).color(color).monospace());
                ui.separator();
                ui.label("Volume (dB)");
                let mut db = self.volume_db;
                if ui.add(egui::Slider::new(&mut db, -80.0..=6.0)).changed() {
                    self.set_volume_db(db);
                }
                ui.with_layout(egui::Layout::right_to_left(Align::Center), |ui| {
                    let on = self.debug.show_window;
                    if ui.selectable_label(on, "Debug").clicked() {
                        self.debug.show_window = !on;
                    }
                });
            });
        });
    }
}
