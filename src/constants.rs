//! Shared application-wide constants.
//! Centralizes tweakable values used across the viewport, the graph store,
//! gesture handling and rendering.

// Viewport
/// Smallest allowed zoom factor.
pub const MIN_ZOOM: f32 = 0.1;
/// Largest allowed zoom factor.
pub const MAX_ZOOM: f32 = 10.0;
/// Zoom multiplier applied for one wheel notch away from the user (zoom in).
pub const WHEEL_ZOOM_IN: f32 = 1.1;
/// Zoom multiplier applied for one wheel notch towards the user (zoom out).
pub const WHEEL_ZOOM_OUT: f32 = 0.9;

// Node dimensions
/// Default node width in world units.
pub const NODE_WIDTH: f32 = 150.0;
/// Default node height in world units.
pub const NODE_HEIGHT: f32 = 100.0;
/// Lower bound for node width and height in world units.
pub const MIN_NODE_SIZE: f32 = 50.0;
/// Content given to freshly placed nodes.
pub const NODE_PLACEHOLDER: &str = "New Node";
/// Inner padding between a node border and its text, in world units.
pub const NODE_PADDING: f32 = 8.0;
/// Node text size in world units.
pub const NODE_FONT_SIZE: f32 = 14.0;
/// Corner radius for node boxes (in screen pixels).
pub const NODE_CORNER_RADIUS: f32 = 4.0;

// Strokes
/// Visual stroke thickness in screen pixels, independent of zoom.
pub const STROKE_SCREEN_WIDTH: f32 = 2.0;
/// A stroke needs at least this many points to be kept.
pub const MIN_STROKE_POINTS: usize = 2;

// Hit testing (all in screen pixels so handles keep their size under zoom)
/// Radius of the connection anchor handles.
pub const ANCHOR_HANDLE_RADIUS: f32 = 6.0;
/// Radius of the corner resize handles.
pub const RESIZE_HANDLE_RADIUS: f32 = 7.0;
/// Distance within which the pointer counts as hovering a connection line.
pub const CONNECTION_HIT_TOLERANCE: f32 = 6.0;

// Connections
/// Width of committed connection lines (in screen pixels).
pub const CONNECTION_STROKE_WIDTH: f32 = 2.0;
/// Length of the arrow head drawn at the target end (in screen pixels).
pub const ARROW_HEAD_LENGTH: f32 = 10.0;

// Grid/drawing
/// Grid cell size in world units.
pub const GRID_SIZE: f32 = 20.0;

// Persistence of UI preferences
/// eframe storage key under which the UI preferences are saved.
pub const PREFERENCES_KEY: &str = "ui_preferences";

// Export
/// Suggested file name for exported stroke images.
pub const EXPORT_FILE_NAME: &str = "whiteboard-strokes.png";
