//! Slope-driven line rasterization.
//!
//! The [`Rasterizer`] walks the dominant axis of a [`Segment`] one integer step at a time,
//! evaluates the line equation for the other coordinate and marks the resulting cell in a
//! [`Grid`]. Exactly `max(|dx|, |dy|) + 1` cells are marked and every one of them lies inside
//! the segment's bounding box.
//!
//! This is a plain digital differential analyzer. It makes no connectivity promise beyond what
//! stepping the dominant axis gives, and it does no error accumulation like Bresenham.

use crate::error::RasterError;
use crate::geometry::{Point, Segment};
use crate::grid::Grid;
use log::{debug, trace, warn};

/// How a real-valued coordinate on the line is turned into an integer cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FragmentPolicy {
    /// `floor(v)`: the cell whose lower-left corner is at or below the value.
    #[default]
    Floor,
    /// `floor(v + 0.5)`: the cell whose center is nearest to the value, rounding halves up.
    PixelCenter,
}

impl FragmentPolicy {
    /// Maps the exact value `numerator / denominator` to a cell coordinate.
    ///
    /// `denominator` must be non-zero.
    pub(crate) fn snap(self, numerator: i128, denominator: i128) -> i128 {
        let (numerator, denominator) = if denominator < 0 {
            (-numerator, -denominator)
        } else {
            (numerator, denominator)
        };
        let floor = numerator.div_euclid(denominator);
        match self {
            FragmentPolicy::Floor => floor,
            // floor(n / d + 1 / 2) without forming 2 * n
            FragmentPolicy::PixelCenter => {
                let remainder = numerator.rem_euclid(denominator);
                floor + i128::from(2 * remainder >= denominator)
            }
        }
    }
}

/// Writes segments into occupancy grids.
///
/// A `Rasterizer` only carries its [`FragmentPolicy`]; every call is independent, so one value can
/// be shared freely. Rasterizing into the same grid from several threads requires the caller to
/// serialize the calls, which `&mut Grid` already enforces.
///
/// # Example
///
/// ```rust
/// use rasterline::geometry::{Point, Segment};
/// use rasterline::grid::Grid;
/// use rasterline::rasterizer::Rasterizer;
///
/// let segment = Segment::new(Point::new(0, 0), Point::new(9, 3));
/// let mut grid = Grid::for_segment(&segment).unwrap();
/// Rasterizer::new().rasterize(&segment, &mut grid).unwrap();
///
/// assert_eq!(grid.count_marked(), 10);
/// assert!(grid.is_marked(3, 1));
/// assert!(grid.is_marked(9, 3));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rasterizer {
    policy: FragmentPolicy,
}

impl Rasterizer {
    /// Creates a rasterizer using [`FragmentPolicy::Floor`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a rasterizer with the same settings as `self`, but with a new fragment policy.
    pub fn with_policy(self, policy: FragmentPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> FragmentPolicy {
        self.policy
    }

    /// Marks the cells approximating `segment` in `grid`.
    ///
    /// Fails with [`RasterError::InvalidGrid`] before touching the grid if it cannot hold the
    /// segment's bounding box. A fragment that still lands outside the grid aborts with
    /// [`RasterError::OutOfBounds`]; cells marked up to that point are kept.
    pub fn rasterize(&self, segment: &Segment, grid: &mut Grid) -> Result<(), RasterError> {
        if let Err(err) = check_fits(segment, grid) {
            warn!("rejecting segment {} -> {}: {err}", segment.start(), segment.end());
            return Err(err);
        }

        debug!(
            "rasterizing {} -> {}: dx = {}, dy = {}, m = {:?}, b = {:?}, {:?} scanned along {:?}",
            segment.start(),
            segment.end(),
            segment.dx(),
            segment.dy(),
            segment.slope(),
            segment.intercept(),
            segment.kind(),
            segment.dominant_axis(),
        );

        for fragment in segment.fragments(self.policy) {
            trace!("fragment {fragment}");
            grid.mark_point(fragment)?;
        }
        Ok(())
    }

    /// Allocates a grid sized by [`Grid::for_segment`] and rasterizes `segment` into it.
    pub fn trace(&self, segment: &Segment) -> Result<Grid, RasterError> {
        let mut grid = Grid::for_segment(segment)?;
        self.rasterize(segment, &mut grid)?;
        Ok(grid)
    }

    /// Rasterizes the segment from `start` to `end` after multiplying both by `scale`.
    ///
    /// Fails with [`RasterError::ScaleOverflow`] if a scaled coordinate overflows.
    ///
    /// ```rust
    /// use rasterline::geometry::Point;
    /// use rasterline::rasterizer::Rasterizer;
    ///
    /// let grid = Rasterizer::new().trace_scaled(Point::new(0, 0), Point::new(3, 1), 10).unwrap();
    /// assert_eq!((grid.width(), grid.height()), (31, 11));
    /// assert_eq!(grid.count_marked(), 31);
    /// ```
    pub fn trace_scaled(&self, start: Point, end: Point, scale: i64) -> Result<Grid, RasterError> {
        self.trace(&Segment::scaled(start, end, scale)?)
    }
}

/// Rasterizes with the default [`Rasterizer`].
pub fn rasterize(segment: &Segment, grid: &mut Grid) -> Result<(), RasterError> {
    Rasterizer::new().rasterize(segment, grid)
}

fn check_fits(segment: &Segment, grid: &Grid) -> Result<(), RasterError> {
    let required = segment.bounds();
    let fits = required.min_x >= 0
        && required.min_y >= 0
        && (required.max_x as u64) < grid.width() as u64
        && (required.max_y as u64) < grid.height() as u64;
    if fits {
        Ok(())
    } else {
        Err(RasterError::InvalidGrid {
            required,
            width: grid.width(),
            height: grid.height(),
        })
    }
}
