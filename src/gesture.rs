//! Pixel-to-time mapping and drag proposals for the trim handles.

use crate::region::{TrimBounds, TrimRegion};

/// Track placement on screen plus the timeline it maps onto. Rebuilt
/// every frame from the painted rect; a zero-width rect or an unknown
/// duration makes the whole geometry unusable.
#[derive(Clone, Copy, Debug)]
pub struct TrackGeometry {
    pub left: f32,
    pub width: f32,
    pub duration: f32,
}

impl TrackGeometry {
    pub fn new(left: f32, width: f32, duration: f32) -> Self {
        Self {
            left,
            width,
            duration,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.left.is_finite()
            && self.width.is_finite()
            && self.width > 0.0
            && self.duration.is_finite()
            && self.duration > 0.0
    }

    /// Pointer x to timeline seconds. Deliberately unclamped; the region
    /// rules clamp later. None while the geometry is unusable.
    pub fn time_at(&self, pixel_x: f32) -> Option<f32> {
        if !self.is_valid() || !pixel_x.is_finite() {
            return None;
        }
        Some((pixel_x - self.left) / self.width * self.duration)
    }

    /// Timeline seconds to pointer x, for drawing handles and the cursor.
    pub fn x_at(&self, time: f32) -> Option<f32> {
        if !self.is_valid() || !time.is_finite() {
            return None;
        }
        Some(self.left + time / self.duration * self.width)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragMode {
    Start,
    End,
    Region,
}

/// The exclusive drag in progress: one per pointer-down over a handle or
/// the region body, discarded on pointer-up anywhere (or on a source
/// change). While it lives, no other drag may begin.
#[derive(Clone, Copy, Debug)]
pub struct DragSession {
    pub mode: DragMode,
    pub anchor_time: f32,
    pub initial: TrimRegion,
}

impl DragSession {
    pub fn begin(mode: DragMode, anchor_time: f32, initial: TrimRegion) -> Self {
        Self {
            mode,
            anchor_time,
            initial,
        }
    }

    /// Candidate `(start, end)` for the pointer sitting at `time`.
    /// Start/end proposals keep the other edge fixed; a body drag shifts
    /// the initial region rigidly, sliding along the boundary it hits so
    /// the length never changes. Feed the result to
    /// `RegionState::set_region`.
    pub fn propose(
        &self,
        time: f32,
        current: TrimRegion,
        bounds: &TrimBounds,
        duration: f32,
    ) -> (f32, f32) {
        match self.mode {
            DragMode::Start => {
                // max applied last so an inverted range (short clip)
                // resolves to 0 instead of panicking
                let new_start = time.min(current.end - bounds.min_len).max(0.0);
                (new_start, current.end)
            }
            DragMode::End => {
                let new_end = time.max(current.start + bounds.min_len).min(duration);
                (current.start, new_end)
            }
            DragMode::Region => {
                let delta = time - self.anchor_time;
                let len = self.initial.len();
                let mut start = self.initial.start + delta;
                let mut end = self.initial.end + delta;
                if start < 0.0 {
                    start = 0.0;
                    end = start + len;
                }
                if end > duration {
                    end = duration;
                    start = end - len;
                }
                (start, end)
            }
        }
    }
}

/// Which drag a pointer-down at `pixel_x` should begin. Edge handles win
/// within `tolerance_px` (the nearer one when both are in range), the
/// body in between, nothing outside.
pub fn hit_test(
    geom: &TrackGeometry,
    region: TrimRegion,
    pixel_x: f32,
    tolerance_px: f32,
) -> Option<DragMode> {
    let start_x = geom.x_at(region.start)?;
    let end_x = geom.x_at(region.end)?;
    let d_start = (pixel_x - start_x).abs();
    let d_end = (pixel_x - end_x).abs();
    if d_start <= tolerance_px || d_end <= tolerance_px {
        if d_start <= d_end {
            return Some(DragMode::Start);
        }
        return Some(DragMode::End);
    }
    if pixel_x > start_x && pixel_x < end_x {
        return Some(DragMode::Region);
    }
    None
}
