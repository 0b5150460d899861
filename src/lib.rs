#![doc = include_str!("../README.md")]

pub mod error;
pub mod geometry;
pub mod grid;
pub mod rasterizer;

pub use crate::error::{GridFileError, RasterError};
pub use crate::geometry::{Axis, Bounds, LineKind, Point, Segment};
pub use crate::grid::Grid;
pub use crate::rasterizer::{rasterize, FragmentPolicy, Rasterizer};
