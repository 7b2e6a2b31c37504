//! Shared constants for the drawing surface.

/// Maximum number of snapshots retained by a history stack. Oldest entries
/// are evicted first once the limit is reached.
pub const HISTORY_CAPACITY: usize = 50;

/// Background color (opaque white). `clear` and `erase` paint this.
pub const BACKGROUND: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];

/// Stroke color used when an action carries none.
pub const DEFAULT_STROKE_COLOR: [u8; 4] = [0x1F, 0x1A, 0x17, 0xFF];

/// Brush diameter in pixels used when an action carries no size.
pub const DEFAULT_STROKE_SIZE: f64 = 5.0;
