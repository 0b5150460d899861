//! Error types.

use crate::geometry::{Bounds, Point};
use std::io;
use thiserror::Error;

/// Reasons a rasterization is rejected.
///
/// Degenerate lines (vertical, horizontal, single point) are not errors, see
/// [`LineKind`](crate::geometry::LineKind).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RasterError {
    /// The grid cannot hold the segment's bounding box. Reported before anything is written.
    #[error(
        "grid of {width}x{height} cannot hold segment bounds x {}..={}, y {}..={}",
        .required.min_x, .required.max_x, .required.min_y, .required.max_y
    )]
    InvalidGrid {
        required: Bounds,
        width: usize,
        height: usize,
    },
    /// The grid needed for a segment has more cells than can be addressed or allocated.
    #[error("a {width}x{height} grid is too large to allocate")]
    GridTooLarge { width: u64, height: u64 },
    /// `end - start` does not fit in `i64`.
    #[error("segment {start} -> {end} spans more than i64 can represent")]
    SpanOverflow { start: Point, end: Point },
    /// Multiplying a point by the resolution multiplier overflowed.
    #[error("scaling {point} by {scale} overflows")]
    ScaleOverflow { point: Point, scale: i64 },
    /// A fragment fell outside the grid. Cells written before it stay written.
    #[error("fragment ({x}, {y}) is outside of the {width}x{height} grid")]
    OutOfBounds {
        x: i64,
        y: i64,
        width: usize,
        height: usize,
    },
}

/// Errors reading or writing a [`Grid`](crate::grid::Grid) file.
#[derive(Debug, Error)]
pub enum GridFileError {
    #[error("IO Error")]
    Io(#[from] io::Error),
    #[error("Encoding Error")]
    Encoding(#[from] bincode::Error),
    #[error("grid file holds {cells} cells, expected {width}x{height}")]
    Corrupt {
        width: usize,
        height: usize,
        cells: usize,
    },
}
