//! Freehand stroke capture.
//!
//! Strokes are recorded in world space so they survive pan and zoom without
//! being re-derived. Rendering lives in [`crate::render`].

use crate::constants::MIN_STROKE_POINTS;
use crate::geometry::Point;
use crate::mode::InteractionMode;
use log::debug;

/// An ordered polyline in world space.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stroke {
    points: Vec<Point>,
}

impl Stroke {
    /// Points in drawing order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of captured points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the stroke has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Committed stroke history plus the stroke currently being drawn.
#[derive(Debug, Default)]
pub struct StrokeLayer {
    history: Vec<Stroke>,
    current: Option<Stroke>,
}

impl StrokeLayer {
    /// Creates an empty layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed strokes, oldest first. These never change once committed.
    pub fn history(&self) -> &[Stroke] {
        &self.history
    }

    /// The stroke being drawn, if any.
    pub fn current(&self) -> Option<&Stroke> {
        self.current.as_ref()
    }

    /// Starts a new stroke at `point`.
    ///
    /// Ignored unless `mode` is [`InteractionMode::Drawing`]. A stroke left open
    /// from an earlier gesture is dropped.
    ///
    /// # Returns
    ///
    /// `true` if a stroke was started.
    pub fn begin_stroke(&mut self, point: Point, mode: InteractionMode) -> bool {
        if mode != InteractionMode::Drawing {
            return false;
        }
        self.current = Some(Stroke {
            points: vec![point],
        });
        true
    }

    /// Appends `point` to the open stroke. No-op when no stroke is open.
    pub fn extend_stroke(&mut self, point: Point) -> bool {
        match self.current.as_mut() {
            Some(stroke) => {
                stroke.points.push(point);
                true
            }
            None => false,
        }
    }

    /// Closes the open stroke.
    ///
    /// Strokes with fewer than two points are discarded. The current-stroke slot
    /// is always empty afterwards.
    ///
    /// # Returns
    ///
    /// `true` if a stroke was added to the history.
    pub fn commit_stroke(&mut self) -> bool {
        match self.current.take() {
            Some(stroke) if stroke.len() >= MIN_STROKE_POINTS => {
                debug!("stroke committed with {} points", stroke.len());
                self.history.push(stroke);
                true
            }
            Some(_) => {
                debug!("stroke discarded: too few points");
                false
            }
            None => false,
        }
    }

    /// Removes every committed stroke and any open stroke.
    pub fn clear(&mut self) {
        self.history.clear();
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn committed_stroke_keeps_points() {
        let mut layer = StrokeLayer::new();
        assert!(layer.begin_stroke(Point::new(0.0, 0.0), InteractionMode::Drawing));
        layer.extend_stroke(Point::new(10.0, 0.0));
        layer.extend_stroke(Point::new(10.0, 10.0));
        assert!(layer.commit_stroke());

        assert_eq!(layer.history().len(), 1);
        assert_eq!(
            layer.history()[0].points(),
            &[Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)]
        );
        assert!(layer.current().is_none());

        // A single-point stroke is discarded
        layer.begin_stroke(Point::new(5.0, 5.0), InteractionMode::Drawing);
        assert!(!layer.commit_stroke());
        assert_eq!(layer.history().len(), 1);
        assert!(layer.current().is_none());
    }

    #[test]
    fn begin_requires_drawing_mode() {
        let mut layer = StrokeLayer::new();
        assert!(!layer.begin_stroke(Point::ZERO, InteractionMode::Panning));
        assert!(!layer.begin_stroke(Point::ZERO, InteractionMode::AddingNode));
        assert!(layer.current().is_none());
    }

    #[test]
    fn extend_without_open_stroke_is_noop() {
        let mut layer = StrokeLayer::new();
        assert!(!layer.extend_stroke(Point::new(1.0, 1.0)));
        assert!(!layer.commit_stroke());
        assert!(layer.history().is_empty());
    }

    #[test]
    fn clear_drops_everything() {
        let mut layer = StrokeLayer::new();
        layer.begin_stroke(Point::ZERO, InteractionMode::Drawing);
        layer.extend_stroke(Point::new(1.0, 0.0));
        layer.commit_stroke();
        layer.begin_stroke(Point::ZERO, InteractionMode::Drawing);

        layer.clear();

        assert!(layer.history().is_empty());
        assert!(layer.current().is_none());
    }
}
