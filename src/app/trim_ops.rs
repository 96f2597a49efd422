use crate::gesture::{hit_test, DragSession, TrackGeometry};

use super::types::TrimEvent;

/// Pixel distance within which a pointer-down grabs an edge handle
/// instead of the region body.
pub(super) const HANDLE_HIT_TOLERANCE: f32 = 7.0;

impl super::TrimApp {
    /// Try to start a drag session at `pixel_x`. Returns true when a
    /// session began; only one session exists at a time.
    pub(super) fn begin_drag(&mut self, geom: &TrackGeometry, pixel_x: f32) -> bool {
        if self.drag.is_some() {
            return false;
        }
        let Some(region) = self.region.region() else {
            return false;
        };
        let Some(mode) = hit_test(geom, region, pixel_x, HANDLE_HIT_TOLERANCE) else {
            return false;
        };
        let Some(anchor) = geom.time_at(pixel_x) else {
            return false;
        };
        self.drag = Some(DragSession::begin(mode, anchor, region));
        true
    }

    /// Feed pointer movement into the active session. The proposal is
    /// clamped by the region rules; a clamp that changed the values is
    /// counted as a correction.
    pub(super) fn update_drag(&mut self, geom: &TrackGeometry, pixel_x: f32) {
        let Some(session) = self.drag else {
            return;
        };
        let Some(region) = self.region.region() else {
            return;
        };
        let Some(time) = geom.time_at(pixel_x) else {
            return;
        };
        let (cand_start, cand_end) =
            session.propose(time, region, &self.region.bounds, self.region.duration());
        if let Some(accepted) = self.region.set_region(cand_start, cand_end) {
            if (accepted.start - cand_start).abs() > 1e-4
                || (accepted.end - cand_end).abs() > 1e-4
            {
                self.debug.region_corrections += 1;
            }
        }
    }

    /// Pointer released, or the press ended somewhere else entirely.
    /// The last accepted region stays.
    pub(super) fn end_drag(&mut self) {
        if self.drag.take().is_some() {
            if let Some(r) = self.region.region() {
                self.debug_log(format!("drag ended: {:.2}s – {:.2}s", r.start, r.end));
            }
        }
    }

    pub(super) fn drag_active(&self) -> bool {
        self.drag.is_some()
    }

    /// A plain click on the track: inside the region it is a literal
    /// seek, outside it lands on the region start.
    pub(super) fn click_track(&mut self, time: f32) {
        let Some(region) = self.region.region() else {
            return;
        };
        self.guard.click(&self.audio, region, time);
    }

    /// Commit the current selection: emits the saved range and, when
    /// configured, writes it to disk as JSON.
    pub(super) fn save_trim(&mut self) {
        let Some(region) = self.region.region() else {
            return;
        };
        let duration = self.region.duration();
        self.debug_log(format!(
            "trim saved: {:.2}s – {:.2}s",
            region.start, region.end
        ));
        if let Some(path) = self.startup.cfg.save_json.clone() {
            let doc = serde_json::json!({
                "start": region.start,
                "end": region.end,
                "duration": duration,
            });
            match serde_json::to_string_pretty(&doc) {
                Ok(text) => {
                    if let Err(err) = std::fs::write(&path, text) {
                        eprintln!("failed to write {}: {err}", path.display());
                    } else {
                        self.debug_log(format!("selection written: {}", path.display()));
                    }
                }
                Err(err) => eprintln!("failed to encode selection: {err}"),
            }
        }
        self.push_event(TrimEvent::TrimSaved {
            start: region.start,
            end: region.end,
            duration,
        });
    }
}
