//! Pixel buffer and painting primitives.
//!
//! DESIGN
//! ======
//! The surface is a flat RGBA buffer. Strokes are rasterized by stamping a
//! circular brush along Bresenham segments between consecutive path points,
//! so the result depends only on the action payload — the same action
//! produces the same pixels whether it originated locally or arrived from a
//! peer. Conflict resolution is last-applied-wins at the pixel level; there
//! is no blending or merge.

#[cfg(test)]
#[path = "raster_test.rs"]
mod tests;

use std::sync::Arc;

use protocol::{ActionKind, DrawAction, Point};

use crate::consts::{BACKGROUND, DEFAULT_STROKE_COLOR, DEFAULT_STROKE_SIZE};

// =============================================================================
// SNAPSHOT
// =============================================================================

/// A complete, immutable capture of a surface's pixel state at one instant.
///
/// Pixel data sits behind an `Arc`, so history entries clone in O(1).
#[derive(Debug, Clone)]
pub struct Snapshot {
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
}

impl Snapshot {
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height && *self.pixels == *other.pixels
    }
}

// =============================================================================
// SURFACE
// =============================================================================

/// A mutable raster surface.
#[derive(Debug, Clone)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Surface {
    /// Create a blank surface filled with the background color.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width as usize) * (height as usize) * 4;
        let mut pixels = vec![0; len];
        for chunk in pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&BACKGROUND);
        }
        Self { width, height, pixels }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Capture the current pixel state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            width: self.width,
            height: self.height,
            pixels: Arc::from(self.pixels.as_slice()),
        }
    }

    /// Restore a previously captured state. The capture is complete, so this
    /// overwrites dimensions as well as pixels.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.width = snapshot.width;
        self.height = snapshot.height;
        self.pixels.clear();
        self.pixels.extend_from_slice(&snapshot.pixels);
    }

    /// Apply one drawing action.
    ///
    /// `undo` and `redo` kinds are surface no-ops: they exist in the wire
    /// vocabulary but each participant's history is local-only.
    pub fn apply(&mut self, action: &DrawAction) {
        match action.kind {
            ActionKind::Draw => {
                let color = action
                    .color
                    .as_deref()
                    .and_then(parse_hex_color)
                    .unwrap_or(DEFAULT_STROKE_COLOR);
                self.paint_path(action, color);
            }
            ActionKind::Erase => self.paint_path(action, BACKGROUND),
            ActionKind::Clear => self.clear(),
            ActionKind::Undo | ActionKind::Redo => {}
        }
    }

    /// Fill the entire surface with the background color.
    pub fn clear(&mut self) {
        for chunk in self.pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&BACKGROUND);
        }
    }

    /// Read one pixel as RGBA. Returns `None` outside the surface.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let mut out = [0; 4];
        out.copy_from_slice(&self.pixels[offset..offset + 4]);
        Some(out)
    }

    // =========================================================================
    // STROKE RASTERIZATION
    // =========================================================================

    fn paint_path(&mut self, action: &DrawAction, color: [u8; 4]) {
        let Some(points) = action.points.as_deref() else {
            return;
        };
        if points.is_empty() {
            return;
        }

        // Actions arrive off the wire unvalidated: a brush wider than the
        // surface paints the same pixels as one exactly surface-sized, so
        // clamp before rasterizing instead of trusting the sender.
        let max_radius = f64::from(self.width.max(self.height));
        let radius = (action.size.unwrap_or(DEFAULT_STROKE_SIZE).max(1.0) / 2.0).min(max_radius);

        if points.len() == 1 {
            self.stamp(points[0], radius, color);
            return;
        }
        for pair in points.windows(2) {
            self.segment(pair[0], pair[1], radius, color);
        }
    }

    /// Stamp the brush along a Bresenham walk from `a` to `b`.
    fn segment(&mut self, a: Point, b: Point, radius: f64, color: [u8; 4]) {
        let (mut x0, mut y0) = (clamp_coord(a.x, self.width), clamp_coord(a.y, self.height));
        let (x1, y1) = (clamp_coord(b.x, self.width), clamp_coord(b.y, self.height));

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.stamp_at(x0, y0, radius, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    fn stamp(&mut self, center: Point, radius: f64, color: [u8; 4]) {
        self.stamp_at(
            clamp_coord(center.x, self.width),
            clamp_coord(center.y, self.height),
            radius,
            color,
        );
    }

    /// Fill a filled circle of the given radius centered on `(cx, cy)`,
    /// clipped to the surface bounds.
    #[allow(clippy::cast_possible_truncation)]
    fn stamp_at(&mut self, cx: i64, cy: i64, radius: f64, color: [u8; 4]) {
        let r = radius.ceil() as i64;
        let r_sq = radius * radius;
        for oy in -r..=r {
            for ox in -r..=r {
                let dist_sq = (ox * ox + oy * oy) as f64;
                if dist_sq > r_sq {
                    continue;
                }
                let (px, py) = (cx + ox, cy + oy);
                if px < 0 || py < 0 || px >= i64::from(self.width) || py >= i64::from(self.height) {
                    continue;
                }
                let offset = ((py as usize) * (self.width as usize) + (px as usize)) * 4;
                self.pixels[offset..offset + 4].copy_from_slice(&color);
            }
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Round a path coordinate and clamp it to just outside the surface bounds.
///
/// Coordinates arrive off the wire unvalidated; unclamped extremes would make
/// the Bresenham walk effectively unbounded. Everything past the edge clips
/// to the same pixels as the edge itself, so clamping preserves the visible
/// result. NaN saturates to zero through the cast.
#[allow(clippy::cast_possible_truncation)]
fn clamp_coord(value: f64, limit: u32) -> i64 {
    let bound = i64::from(limit) + 1;
    (value.round() as i64).clamp(-bound, bound)
}

/// Parse a `#RRGGBB` hex color into opaque RGBA. Returns `None` for any
/// other shape.
#[must_use]
pub fn parse_hex_color(text: &str) -> Option<[u8; 4]> {
    let hex = text.strip_prefix('#')?;
    // Byte length alone is not enough: multibyte input must not be sliced.
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some([r, g, b, 0xFF])
}
