//! Viewport transform between screen space and world space.
//!
//! The viewport owns the zoom factor and the pan offset. The pan offset is a
//! world-space translation, so the mapping is
//!
//! ```text
//! world  = screen / zoom - pan
//! screen = (world + pan) * zoom
//! ```
//!
//! Every layer (strokes, nodes, connections) renders through the same
//! [`ViewportState`], which keeps them geometrically in agreement.

use crate::constants::{MAX_ZOOM, MIN_ZOOM, WHEEL_ZOOM_IN, WHEEL_ZOOM_OUT};
use crate::geometry::{Point, Rect};

/// Zoom factor and pan offset for the current editor session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    zoom_factor: f32,
    pan_offset: Point,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            zoom_factor: 1.0,
            pan_offset: Point::ZERO,
        }
    }
}

impl ViewportState {
    /// Creates a viewport, clamping `zoom_factor` into the allowed range.
    pub fn new(zoom_factor: f32, pan_offset: Point) -> Self {
        let mut viewport = Self::default();
        if zoom_factor.is_finite() && zoom_factor > 0.0 {
            viewport.zoom_factor = zoom_factor.clamp(MIN_ZOOM, MAX_ZOOM);
        }
        if pan_offset.is_finite() {
            viewport.pan_offset = pan_offset;
        }
        viewport
    }

    /// Current zoom level (1.0 = normal, 2.0 = 2x zoom, 0.5 = 50% zoom).
    pub fn zoom_factor(&self) -> f32 {
        self.zoom_factor
    }

    /// Current pan offset, in world units.
    pub fn pan_offset(&self) -> Point {
        self.pan_offset
    }

    /// Converts screen coordinates to world coordinates.
    ///
    /// # Arguments
    ///
    /// * `screen` - Position relative to the rendering surface origin (pixels)
    ///
    /// # Returns
    ///
    /// The corresponding position in world space
    pub fn to_world(&self, screen: Point) -> Point {
        screen / self.zoom_factor - self.pan_offset
    }

    /// Converts world coordinates to screen coordinates.
    ///
    /// # Arguments
    ///
    /// * `world` - Position in world space
    ///
    /// # Returns
    ///
    /// The corresponding position relative to the rendering surface origin (pixels)
    pub fn to_screen(&self, world: Point) -> Point {
        (world + self.pan_offset) * self.zoom_factor
    }

    /// Converts a screen-space displacement into world units.
    pub fn to_world_delta(&self, screen_delta: Point) -> Point {
        screen_delta / self.zoom_factor
    }

    /// Maps a world rectangle onto the screen.
    pub fn rect_to_screen(&self, world: &Rect) -> Rect {
        Rect {
            min: self.to_screen(world.min),
            max: self.to_screen(world.max),
        }
    }

    /// World-space region covered by a surface of the given pixel size.
    pub fn visible_world_rect(&self, width: f32, height: f32) -> Rect {
        Rect {
            min: self.to_world(Point::ZERO),
            max: self.to_world(Point::new(width, height)),
        }
    }

    /// Zooms while keeping the world point under `screen_anchor` fixed on screen.
    ///
    /// The resulting zoom is clamped to `[MIN_ZOOM, MAX_ZOOM]`. Non-finite or
    /// non-positive factors are ignored.
    ///
    /// # Arguments
    ///
    /// * `screen_anchor` - Pointer position the zoom is centred on
    /// * `delta_factor` - Multiplier applied to the current zoom
    pub fn apply_zoom(&mut self, screen_anchor: Point, delta_factor: f32) {
        if !delta_factor.is_finite() || delta_factor <= 0.0 || !screen_anchor.is_finite() {
            return;
        }

        // Calculate the world position under the anchor before zoom
        let world_before = self.to_world(screen_anchor);

        self.zoom_factor = (self.zoom_factor * delta_factor).clamp(MIN_ZOOM, MAX_ZOOM);

        // Re-solve the pan so that world_before maps back onto the anchor
        self.pan_offset = screen_anchor / self.zoom_factor - world_before;
    }

    /// Applies one wheel event: scrolling up zooms in, scrolling down zooms out.
    ///
    /// A zero delta is ignored.
    pub fn zoom_by_wheel(&mut self, screen_anchor: Point, scroll_delta: f32) {
        if scroll_delta > 0.0 {
            self.apply_zoom(screen_anchor, WHEEL_ZOOM_IN);
        } else if scroll_delta < 0.0 {
            self.apply_zoom(screen_anchor, WHEEL_ZOOM_OUT);
        }
    }

    /// Shifts the view by a screen-space delta.
    pub fn pan(&mut self, screen_delta: Point) {
        if screen_delta.is_finite() {
            self.pan_offset += self.to_world_delta(screen_delta);
        }
    }

    /// Replaces the pan offset. Used by the pan gesture, which computes the
    /// offset from its captured start value rather than accumulating deltas.
    pub fn set_pan_offset(&mut self, pan_offset: Point) {
        if pan_offset.is_finite() {
            self.pan_offset = pan_offset;
        }
    }

    /// Restores zoom 1 and no pan.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Point, b: Point) {
        assert!(
            (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3,
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn round_trip_world_screen() {
        let viewport = ViewportState::new(2.5, Point::new(-40.0, 13.5));
        for (x, y) in [(0.0, 0.0), (123.4, -56.7), (-1000.0, 999.0), (0.5, 0.25)] {
            let p = Point::new(x, y);
            assert_close(viewport.to_screen(viewport.to_world(p)), p);
            assert_close(viewport.to_world(viewport.to_screen(p)), p);
        }
    }

    #[test]
    fn conversions_follow_formula() {
        let viewport = ViewportState::new(2.0, Point::new(10.0, -5.0));
        assert_close(viewport.to_world(Point::new(40.0, 40.0)), Point::new(10.0, 25.0));
        assert_close(viewport.to_screen(Point::new(10.0, 25.0)), Point::new(40.0, 40.0));
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut viewport = ViewportState::new(1.3, Point::new(17.0, -4.0));
        let anchors = [Point::new(0.0, 0.0), Point::new(640.0, 360.0), Point::new(13.0, 900.0)];
        for anchor in anchors {
            for factor in [0.5, 0.9, 1.1, 2.0, 3.0] {
                let before = viewport.to_world(anchor);
                viewport.apply_zoom(anchor, factor);
                assert_close(viewport.to_world(anchor), before);
            }
        }
    }

    #[test]
    fn zoom_scenario_from_identity() {
        let mut viewport = ViewportState::default();
        let anchor = Point::new(50.0, 50.0);
        let before = viewport.to_world(anchor);

        viewport.apply_zoom(anchor, 2.0);

        assert_eq!(viewport.zoom_factor(), 2.0);
        assert_close(viewport.to_world(anchor), before);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut viewport = ViewportState::default();
        viewport.apply_zoom(Point::new(10.0, 10.0), 1000.0);
        assert_eq!(viewport.zoom_factor(), MAX_ZOOM);

        viewport.apply_zoom(Point::new(10.0, 10.0), 1e-6);
        assert_eq!(viewport.zoom_factor(), MIN_ZOOM);

        assert_eq!(ViewportState::new(50.0, Point::ZERO).zoom_factor(), MAX_ZOOM);
    }

    #[test]
    fn invalid_zoom_factor_is_ignored() {
        let mut viewport = ViewportState::default();
        viewport.apply_zoom(Point::new(1.0, 1.0), 0.0);
        viewport.apply_zoom(Point::new(1.0, 1.0), -2.0);
        viewport.apply_zoom(Point::new(1.0, 1.0), f32::NAN);
        assert_eq!(viewport, ViewportState::default());
    }

    #[test]
    fn wheel_zoom_steps() {
        let mut viewport = ViewportState::default();
        viewport.zoom_by_wheel(Point::ZERO, 3.0);
        assert!((viewport.zoom_factor() - WHEEL_ZOOM_IN).abs() < 1e-6);

        let mut viewport = ViewportState::default();
        viewport.zoom_by_wheel(Point::ZERO, -1.0);
        assert!((viewport.zoom_factor() - WHEEL_ZOOM_OUT).abs() < 1e-6);

        let mut viewport = ViewportState::default();
        viewport.zoom_by_wheel(Point::ZERO, 0.0);
        assert_eq!(viewport.zoom_factor(), 1.0);
    }

    #[test]
    fn pan_divides_by_zoom() {
        let mut viewport = ViewportState::new(2.0, Point::ZERO);
        viewport.pan(Point::new(20.0, -10.0));
        assert_close(viewport.pan_offset(), Point::new(10.0, -5.0));
    }

    #[test]
    fn visible_rect_matches_corners() {
        let viewport = ViewportState::new(2.0, Point::new(5.0, 5.0));
        let rect = viewport.visible_world_rect(200.0, 100.0);
        assert_close(rect.min, Point::new(-5.0, -5.0));
        assert_close(rect.max, Point::new(95.0, 45.0));
    }
}
