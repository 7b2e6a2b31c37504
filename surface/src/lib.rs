//! Raster drawing surface, painting primitives, and local undo/redo.
//!
//! This crate owns everything that touches pixels. Remote and local drawing
//! actions go through the same primitives in [`raster`], so a replayed peer
//! stroke is bit-identical to the same stroke drawn locally. The undo/redo
//! history in [`history`] is a bounded stack of full-surface snapshots and
//! has no knowledge of the network; it is never transmitted.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`raster`] | Pixel buffer, stroke/erase/clear primitives, snapshots |
//! | [`history`] | Bounded, branch-discarding undo/redo stack |
//! | [`controller`] | Facade handed to the surrounding UI |
//! | [`consts`] | Capacities and default paint values |

pub mod consts;
pub mod controller;
pub mod history;
pub mod raster;

pub use controller::{ImageFormat, SurfaceController, SurfaceError};
pub use history::HistoryStack;
pub use raster::{Snapshot, Surface};
