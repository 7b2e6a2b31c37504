//! Surface controller — the facade handed to the surrounding UI.
//!
//! DESIGN
//! ======
//! One controller owns one surface and its history stack. Callers paint
//! through [`SurfaceController::apply_action`] (remote actions and local
//! in-progress strokes alike) and commit completed local edits with
//! [`SurfaceController::save_snapshot`] — once per pointer-up that produced
//! a visible change, never per preview frame. Undo/redo restore snapshots
//! bit-identically.

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;

use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use protocol::DrawAction;

use crate::history::HistoryStack;
use crate::raster::{Snapshot, Surface};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("image encoding failed: {0}")]
    Encode(#[from] png::EncodingError),
}

/// Export encodings supported by [`SurfaceController::export_image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
}

impl FromStr for ImageFormat {
    type Err = SurfaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" | "image/png" => Ok(Self::Png),
            other => Err(SurfaceError::UnsupportedFormat(other.to_owned())),
        }
    }
}

// =============================================================================
// CONTROLLER
// =============================================================================

/// Owns a surface and its local history. Constructed alongside the surface
/// and handed to callers; undo/redo/export are methods here, never properties
/// attached to some host object at runtime.
#[derive(Debug)]
pub struct SurfaceController {
    surface: Surface,
    history: HistoryStack,
}

impl SurfaceController {
    /// Create a blank surface with its history seeded on the blank state.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let surface = Surface::new(width, height);
        let history = HistoryStack::new(surface.snapshot());
        Self { surface, history }
    }

    #[must_use]
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    #[must_use]
    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    /// Paint one action onto the surface. Used for both remote actions and
    /// local strokes; does not touch the history.
    pub fn apply_action(&mut self, action: &DrawAction) {
        self.surface.apply(action);
    }

    /// Commit the current pixel state as one history entry.
    pub fn save_snapshot(&mut self) {
        self.history.push(self.surface.snapshot());
    }

    /// Step back one history entry and restore it. Returns `false` when
    /// already at the oldest entry.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        let snapshot = snapshot.clone();
        self.surface.restore(&snapshot);
        true
    }

    /// Step forward one history entry and restore it. Returns `false` when
    /// already at the newest entry.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        let snapshot = snapshot.clone();
        self.surface.restore(&snapshot);
        true
    }

    /// Encode the current surface as a data-URL string.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Encode`] if PNG encoding fails.
    pub fn export_image(&self, format: ImageFormat) -> Result<String, SurfaceError> {
        match format {
            ImageFormat::Png => {
                let bytes = encode_png(&self.surface)?;
                Ok(format!("data:image/png;base64,{}", STANDARD.encode(bytes)))
            }
        }
    }
}

fn encode_png(surface: &Surface) -> Result<Vec<u8>, png::EncodingError> {
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, surface.width(), surface.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(surface.pixels())?;
    }
    Ok(out)
}

/// Capture a standalone snapshot of a surface. Convenience for tests and
/// callers that manage history themselves.
#[must_use]
pub fn capture(surface: &Surface) -> Snapshot {
    surface.snapshot()
}
