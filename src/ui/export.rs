//! Export of the stroke layer to PNG.

use super::state::WhiteboardApp;
use crate::constants::EXPORT_FILE_NAME;
use crate::render::{snapshot_strokes_png, SnapshotError};
use log::{info, warn};
use std::path::Path;

impl WhiteboardApp {
    /// Writes the strokes, as currently framed on the canvas, to `path` as a PNG.
    ///
    /// The image has the size of the canvas surface last drawn.
    pub fn export_strokes_png(&self, path: &Path) -> Result<(), SnapshotError> {
        let (width, height) = self.coordinator.size().unwrap_or((0, 0));
        let png = snapshot_strokes_png(self.editor.strokes(), self.editor.viewport(), width, height)?;
        std::fs::write(path, png)?;
        info!("strokes exported to {}", path.display());
        Ok(())
    }

    /// Asks for a destination with a save dialog, then exports the strokes there.
    pub fn export_strokes_with_dialog(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG", &["png"])
            .set_file_name(EXPORT_FILE_NAME)
            .save_file()
        else {
            return;
        };

        self.status = Some(match self.export_strokes_png(&path) {
            Ok(()) => format!("Exported strokes to {}", path.display()),
            Err(err) => {
                warn!("stroke export failed: {err}");
                format!("Export failed: {err}")
            }
        });
    }
}
