use egui::{Align2, Color32, CursorIcon, RichText, Stroke, TextStyle};

use crate::app::helpers::{format_duration, format_selection, lerp_color};
use crate::app::trim_ops::HANDLE_HIT_TOLERANCE;
use crate::gesture::{hit_test, DragMode, TrackGeometry};
use crate::supervisor::ComponentMode;

const TRACK_HEIGHT: f32 = 160.0;

impl crate::app::TrimApp {
    pub(in crate::app) fn ui_main(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.source_label.is_none() {
                ui.add_space(80.0);
                ui.vertical_centered(|ui| {
                    ui.label(RichText::new("Open an audio file to begin").heading().weak());
                    ui.add_space(8.0);
                    ui.label("The highlighted range is what gets kept. Space toggles playback.");
                });
                return;
            }
            if self.mode() == ComponentMode::Error {
                // no track to paint; the transport row stays, disabled
                // until a decoded buffer exists
                self.ui_error_panel(ui);
                ui.add_space(10.0);
                self.ui_transport_row(ui);
                return;
            }
            if self.mode() == ComponentMode::Degraded {
                if let Some(notice) = self.supervisor.notice().map(str::to_string) {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new("⚠").color(Color32::from_rgb(230, 180, 80)));
                        ui.label(RichText::new(notice).weak());
                    });
                    ui.add_space(4.0);
                }
            }
            self.ui_track(ui, ctx);
            ui.add_space(6.0);
            self.ui_transport_row(ui);
            if self.startup.cfg.show_instructions {
                ui.add_space(8.0);
                self.ui_instructions(ui);
            }
        });
    }

    fn ui_track(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let avail_w = ui.available_width();
        let (resp, painter) =
            ui.allocate_painter(egui::vec2(avail_w, TRACK_HEIGHT), egui::Sense::click_and_drag());
        let rect = resp.rect;
        let duration = self.region.duration();
        let geom = TrackGeometry::new(rect.left(), rect.width(), duration);

        // Interactions first so this frame paints the updated region.
        if self.region.is_ready() && geom.is_valid() {
            if resp.drag_started_by(egui::PointerButton::Primary) {
                if let Some(pos) = resp.interact_pointer_pos() {
                    self.begin_drag(&geom, pos.x);
                }
            }
            if self.drag_active() {
                if resp.dragged_by(egui::PointerButton::Primary) {
                    if let Some(pos) = resp.interact_pointer_pos() {
                        self.update_drag(&geom, pos.x);
                    }
                }
                // release anywhere ends the session, even off-canvas
                let released = resp.drag_stopped_by(egui::PointerButton::Primary)
                    || ctx.input(|i| i.pointer.any_released() || !i.pointer.any_down());
                if released {
                    self.end_drag();
                }
            }
            if resp.clicked_by(egui::PointerButton::Primary) {
                if let (Some(pos), Some(region)) =
                    (resp.interact_pointer_pos(), self.region.region())
                {
                    let on_handle = matches!(
                        hit_test(&geom, region, pos.x, HANDLE_HIT_TOLERANCE),
                        Some(DragMode::Start | DragMode::End)
                    );
                    if !on_handle {
                        if let Some(t) = geom.time_at(pos.x) {
                            self.click_track(t);
                        }
                    }
                }
            }
            self.update_track_cursor_icon(ctx, &resp, &geom);
        }

        painter.rect_filled(rect, 4.0, self.theme.background);
        if self.overview.is_empty() {
            painter.line_segment(
                [
                    egui::pos2(rect.left(), rect.center().y),
                    egui::pos2(rect.right(), rect.center().y),
                ],
                Stroke::new(1.0, self.theme.grid),
            );
            let msg = match self.mode() {
                ComponentMode::Loading => "Loading waveform...",
                ComponentMode::Degraded => "Waveform unavailable",
                _ => "",
            };
            if !msg.is_empty() {
                painter.text(
                    rect.center() - egui::vec2(0.0, 10.0),
                    Align2::CENTER_CENTER,
                    msg,
                    TextStyle::Body.resolve(ui.style()),
                    Color32::from_rgb(140, 140, 150),
                );
            }
            if self.mode() == ComponentMode::Loading {
                let spin = egui::Rect::from_center_size(
                    rect.center() + egui::vec2(0.0, 18.0),
                    egui::vec2(22.0, 22.0),
                );
                ui.put(spin, egui::Spinner::new());
            }
        } else {
            self.paint_waveform(&painter, rect);
        }

        if let Some(region) = self.region.region() {
            self.paint_region(ui, &painter, rect, &geom, region);
        }

        if self.audio.has_samples() && duration > 0.0 {
            let pos = self.audio.position_secs().clamp(0.0, duration);
            if let Some(cx) = geom.x_at(pos) {
                painter.line_segment(
                    [egui::pos2(cx, rect.top()), egui::pos2(cx, rect.bottom())],
                    Stroke::new(2.0, self.theme.cursor),
                );
            }
        }

        painter.rect_stroke(
            rect,
            4.0,
            Stroke::new(1.0, self.theme.grid),
            egui::StrokeKind::Inside,
        );
    }

    fn paint_waveform(&self, painter: &egui::Painter, rect: egui::Rect) {
        let bins = self.overview.len();
        let cols = rect.width().max(1.0) as usize;
        if bins == 0 || cols == 0 {
            return;
        }
        let mid = rect.center().y;
        let half = rect.height() * 0.46;
        for i in 0..cols {
            let b0 = i * bins / cols;
            let b1 = (((i + 1) * bins / cols).max(b0 + 1)).min(bins);
            let mut lo = f32::MAX;
            let mut hi = f32::MIN;
            for b in b0..b1 {
                let (l, h) = self.overview[b];
                lo = lo.min(l);
                hi = hi.max(h);
            }
            if lo > hi {
                continue;
            }
            let amp = lo.abs().max(hi.abs()).clamp(0.0, 1.0);
            let color = lerp_color(self.theme.wave_low, self.theme.wave_high, amp);
            let x = rect.left() + i as f32 + 0.5;
            let y0 = mid - hi.clamp(-1.0, 1.0) * half;
            let y1 = mid - lo.clamp(-1.0, 1.0) * half;
            painter.line_segment(
                [egui::pos2(x, y0), egui::pos2(x, y1)],
                Stroke::new(1.0, color),
            );
        }
    }

    fn paint_region(
        &self,
        ui: &egui::Ui,
        painter: &egui::Painter,
        rect: egui::Rect,
        geom: &TrackGeometry,
        region: crate::region::TrimRegion,
    ) {
        let (Some(sx), Some(ex)) = (geom.x_at(region.start), geom.x_at(region.end)) else {
            return;
        };
        let sel = egui::Rect::from_min_max(
            egui::pos2(sx, rect.top()),
            egui::pos2(ex, rect.bottom()),
        );
        painter.rect_filled(sel, 0.0, self.theme.region_fill);
        for x in [sx, ex] {
            painter.line_segment(
                [egui::pos2(x, rect.top()), egui::pos2(x, rect.bottom())],
                Stroke::new(2.0, self.theme.region_edge),
            );
        }
        let draw_handle = |x: f32| {
            let r = egui::Rect::from_center_size(
                egui::pos2(x, rect.center().y),
                egui::vec2(8.0, 26.0),
            );
            painter.rect_filled(r, 2.0, self.theme.handle);
        };
        draw_handle(sx);
        draw_handle(ex);
        let fid = TextStyle::Monospace.resolve(ui.style());
        painter.text(
            egui::pos2(sx + 6.0, rect.top() + 2.0),
            Align2::LEFT_TOP,
            format_duration(region.start),
            fid.clone(),
            self.theme.region_edge,
        );
        painter.text(
            egui::pos2(ex - 6.0, rect.top() + 2.0),
            Align2::RIGHT_TOP,
            format_duration(region.end),
            fid,
            self.theme.region_edge,
        );
    }

    fn update_track_cursor_icon(
        &self,
        ctx: &egui::Context,
        resp: &egui::Response,
        geom: &TrackGeometry,
    ) {
        let icon = if let Some(session) = self.drag {
            match session.mode {
                DragMode::Start | DragMode::End => Some(CursorIcon::ResizeHorizontal),
                DragMode::Region => Some(CursorIcon::Grabbing),
            }
        } else if let (Some(hover), Some(region)) = (resp.hover_pos(), self.region.region()) {
            match hit_test(geom, region, hover.x, HANDLE_HIT_TOLERANCE) {
                Some(DragMode::Start | DragMode::End) => Some(CursorIcon::ResizeHorizontal),
                Some(DragMode::Region) => Some(CursorIcon::Grab),
                None => None,
            }
        } else {
            None
        };
        if let Some(icon) = icon {
            ctx.output_mut(|o| o.cursor_icon = icon);
        }
    }

    fn ui_transport_row(&mut self, ui: &mut egui::Ui) {
        let enabled = self.audio.has_samples() && self.region.is_ready();
        ui.horizontal(|ui| {
            ui.add_enabled_ui(enabled, |ui| {
                let play_text = if self.audio.is_playing() {
                    "Pause (Space)"
                } else {
                    "Play (Space)"
                };
                if ui.button(play_text).clicked() {
                    self.toggle_play();
                }
                if ui.button("Rewind").clicked() {
                    self.rewind();
                }
                if ui.button("Save Trim").clicked() {
                    self.save_trim();
                }
            });
            ui.separator();
            let pos = self.audio.position_secs();
            ui.label(
                RichText::new(format!(
                    "{} / {}",
                    format_duration(pos),
                    format_duration(self.region.duration())
                ))
                .monospace(),
            );
            if let Some(r) = self.region.region() {
                ui.separator();
                ui.label(RichText::new(format_selection(r.start, r.end)).monospace());
            }
        });
    }

    fn ui_instructions(&mut self, ui: &mut egui::Ui) {
        let min_len = self.region.bounds.min_len;
        let max_len = self.region.bounds.max_len;
        egui::CollapsingHeader::new("How to trim")
            .default_open(true)
            .show(ui, |ui| {
                ui.label("Drag the edge handles to change where the kept range starts and ends.");
                ui.label("Drag the middle of the range to move it without changing its length.");
                ui.label(format!(
                    "The range always stays between {min_len:.0} and {max_len:.0} seconds long."
                ));
                ui.label("Click the track to move the cursor. Playback never leaves the range.");
            });
    }

    fn ui_error_panel(&mut self, ui: &mut egui::Ui) {
        ui.add_space(40.0);
        ui.vertical_centered(|ui| {
            ui.label(RichText::new("Could not load this audio").heading());
            if let Some(notice) = self.supervisor.notice() {
                ui.add_space(6.0);
                ui.label(
                    RichText::new(notice)
                        .monospace()
                        .color(Color32::from_rgb(230, 120, 120)),
                );
            }
            ui.add_space(10.0);
            ui.label("Pick another file with the Open button above.");
        });
    }
}
