//! Trim-region state and the clamp rules that keep it legal.

/// Two edge values closer than this count as "the same edge" when
/// working out which handle a correction came from.
pub const EDGE_MATCH_EPS: f32 = 0.1;

pub const DEFAULT_MIN_LEN: f32 = 15.0;
pub const DEFAULT_MAX_LEN: f32 = 60.0;

/// What to do with clips shorter than the minimum selection length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShortClipPolicy {
    /// Accept a selection spanning the whole clip even though it is
    /// shorter than `min_len`.
    Allow,
    /// Fail the load with an error naming the minimum.
    Reject,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrimBounds {
    pub min_len: f32,
    pub max_len: f32,
    pub short_clips: ShortClipPolicy,
}

impl Default for TrimBounds {
    fn default() -> Self {
        Self {
            min_len: DEFAULT_MIN_LEN,
            max_len: DEFAULT_MAX_LEN,
            short_clips: ShortClipPolicy::Allow,
        }
    }
}

impl TrimBounds {
    pub fn new(min_len: f32, max_len: f32) -> Self {
        Self {
            min_len,
            max_len,
            short_clips: ShortClipPolicy::Allow,
        }
        .sanitized()
    }

    /// Replace unusable values with defaults and keep `max_len >= min_len`.
    pub fn sanitized(mut self) -> Self {
        if !self.min_len.is_finite() || self.min_len <= 0.0 {
            self.min_len = DEFAULT_MIN_LEN;
        }
        if !self.max_len.is_finite() || self.max_len <= 0.0 {
            self.max_len = DEFAULT_MAX_LEN;
        }
        if self.max_len < self.min_len {
            self.max_len = self.min_len;
        }
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrimRegion {
    pub start: f32,
    pub end: f32,
}

impl TrimRegion {
    pub fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> f32 {
        self.end - self.start
    }

    /// Inclusive on both edges; the click-to-seek rule wants that.
    pub fn contains(&self, t: f32) -> bool {
        t >= self.start && t <= self.end
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovedEdge {
    Start,
    End,
}

/// Holds the accepted region for a known duration. Every mutation path
/// funnels through [`RegionState::set_region`], so the stored region is
/// always the last accepted one and doubles as the reference for
/// moved-edge inference.
#[derive(Debug)]
pub struct RegionState {
    pub bounds: TrimBounds,
    duration: f32,
    region: Option<TrimRegion>,
}

impl RegionState {
    pub fn new(bounds: TrimBounds) -> Self {
        Self {
            bounds: bounds.sanitized(),
            duration: 0.0,
            region: None,
        }
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn region(&self) -> Option<TrimRegion> {
        self.region
    }

    pub fn is_ready(&self) -> bool {
        self.region.is_some() && self.duration.is_finite() && self.duration > 0.0
    }

    /// Forget duration and region, e.g. when the source changes.
    pub fn reset(&mut self) {
        self.duration = 0.0;
        self.region = None;
    }

    /// Called the instant duration becomes known. Seeds the region to
    /// `(0, min(duration, max_len))`.
    pub fn init_for_duration(&mut self, duration: f32) -> Option<TrimRegion> {
        if !duration.is_finite() || duration <= 0.0 {
            self.reset();
            return None;
        }
        self.duration = duration;
        let region = TrimRegion::new(0.0, duration.min(self.bounds.max_len));
        self.region = Some(region);
        Some(region)
    }

    /// Which edge a raw candidate moved, relative to the accepted region.
    /// An end value within [`EDGE_MATCH_EPS`] of the accepted end means
    /// the start handle moved; anything else counts as the end handle.
    fn infer_moved_edge(&self, cand_end: f32) -> MovedEdge {
        match self.region {
            Some(cur) if (cand_end - cur.end).abs() < EDGE_MATCH_EPS => MovedEdge::Start,
            _ => MovedEdge::End,
        }
    }

    /// Accept a candidate region, clamped to the invariants:
    /// both ends inside `[0, duration]`, then length pulled back to
    /// `min_len`/`max_len` by repositioning the moved edge while the
    /// anchor edge stays put. Returns the accepted region; callers
    /// repaint the overlay from it. No-ops (returning the unchanged
    /// accepted region) while duration is unknown or the candidate is
    /// not finite.
    pub fn set_region(&mut self, cand_start: f32, cand_end: f32) -> Option<TrimRegion> {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return self.region;
        }
        if !cand_start.is_finite() || !cand_end.is_finite() {
            return self.region;
        }
        let duration = self.duration;
        let moved = self.infer_moved_edge(cand_end);
        let mut start = cand_start.clamp(0.0, duration);
        let mut end = cand_end.clamp(0.0, duration);
        if end - start < self.bounds.min_len {
            match moved {
                MovedEdge::Start => start = end - self.bounds.min_len,
                MovedEdge::End => end = start + self.bounds.min_len,
            }
            start = start.clamp(0.0, duration);
            end = end.clamp(0.0, duration);
            if end - start < self.bounds.min_len {
                // growth hit a boundary; the anchor edge gives way. Only
                // when both ends sit on the boundaries (clip shorter than
                // min_len) does a short region survive.
                match moved {
                    MovedEdge::Start => end = (start + self.bounds.min_len).min(duration),
                    MovedEdge::End => start = (end - self.bounds.min_len).max(0.0),
                }
            }
        }
        if end - start > self.bounds.max_len {
            match moved {
                MovedEdge::Start => start = end - self.bounds.max_len,
                MovedEdge::End => end = start + self.bounds.max_len,
            }
        }
        let region = TrimRegion::new(start, end);
        self.region = Some(region);
        Some(region)
    }
}
