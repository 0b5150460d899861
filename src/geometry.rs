//! Integer geometry for line rasterization.
//!
//! This module defines the value types the rasterizer works on:
//!
//! *   [`Point`]: an integer lattice point, scalable by an integer resolution multiplier.
//! *   [`Bounds`]: an inclusive axis-aligned bounding box.
//! *   [`Segment`]: an ordered pair of points together with its precomputed line parameters.
//! *   [`Fragments`]: the iterator producing the cells that approximate a segment.
//!
//! A `Segment` computes everything it needs once, at construction. Degenerate lines are tagged
//! explicitly through [`LineKind`] instead of being inferred from an infinite slope.

use crate::error::RasterError;
use crate::rasterizer::FragmentPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Div, Mul};

/// An integer point on the rasterization lattice.
///
/// # Example
///
/// ```rust
/// use rasterline::geometry::Point;
///
/// let p = Point::new(3, 4);
/// assert_eq!(p * 10, Point::new(30, 40));
/// assert_eq!(Point::new(30, 41) / 10, Point::new(3, 4));
/// println!("{p}"); // prints "(3, 4)"
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Scales both coordinates by `factor`, or `None` if either overflows.
    pub fn checked_scale(self, factor: i64) -> Option<Point> {
        Some(Point {
            x: self.x.checked_mul(factor)?,
            y: self.y.checked_mul(factor)?,
        })
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i64, i64)> for Point {
    fn from((x, y): (i64, i64)) -> Self {
        Self { x, y }
    }
}

/// Scales both coordinates by a resolution multiplier.
///
/// Overflows like `i64` multiplication; use [`Point::checked_scale`] for untrusted factors.
impl Mul<i64> for Point {
    type Output = Point;

    fn mul(self, factor: i64) -> Self::Output {
        Point {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

/// Integer division of both coordinates, truncating towards zero like `i64` division.
impl Div<i64> for Point {
    type Output = Point;

    fn div(self, factor: i64) -> Self::Output {
        Point {
            x: self.x / factor,
            y: self.y / factor,
        }
    }
}

/// An inclusive bounding box on the lattice.
///
/// *   `x` values range from `min_x..=max_x`
/// *   `y` values range from `min_y..=max_y`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: i64,
    pub max_x: i64,
    pub min_y: i64,
    pub max_y: i64,
}

impl Bounds {
    /// The smallest bounds containing both points.
    pub fn spanning(a: Point, b: Point) -> Self {
        Self {
            min_x: a.x.min(b.x),
            max_x: a.x.max(b.x),
            min_y: a.y.min(b.y),
            max_y: a.y.max(b.y),
        }
    }

    /// Checks if the given coordinates `(x, y)` are contained within `self`.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Checks if `self` fully contains another `Bounds`.
    pub fn contains_bounds(&self, other: Bounds) -> bool {
        self.contains(other.min_x, other.min_y) && self.contains(other.max_x, other.max_y)
    }

    /// Number of integer columns covered.
    pub fn width(&self) -> u64 {
        self.max_x.abs_diff(self.min_x) + 1
    }

    /// Number of integer rows covered.
    pub fn height(&self) -> u64 {
        self.max_y.abs_diff(self.min_y) + 1
    }
}

/// The shape class of a segment, decided once from its deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineKind {
    /// `start == end`.
    Point,
    /// `dy == 0`, `dx != 0`.
    Horizontal,
    /// `dx == 0`, `dy != 0`.
    Vertical,
    /// Both deltas are non-zero.
    General,
}

/// The axis a segment is scanned along, one sample per integer step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

/// A straight segment between two lattice points.
///
/// All derived quantities are computed in [`Segment::new`] and never change afterwards.
///
/// # Example
///
/// ```rust
/// use rasterline::geometry::{Axis, LineKind, Point, Segment};
///
/// let segment = Segment::new(Point::new(0, 0), Point::new(9, 3));
/// assert_eq!(segment.kind(), LineKind::General);
/// assert_eq!(segment.dominant_axis(), Axis::X);
/// assert_eq!(segment.slope(), Some(1.0 / 3.0));
/// assert_eq!(segment.intercept(), Some(0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Segment {
    start: Point,
    end: Point,
    dx: i64,
    dy: i64,
    slope: Option<f64>,
    intercept: Option<f64>,
    kind: LineKind,
    axis: Axis,
    bounds: Bounds,
}

impl Segment {
    /// Creates a segment from `start` to `end`. `start == end` is allowed.
    ///
    /// # Panics
    ///
    /// Panics if `end - start` does not fit in `i64`. See [`Segment::try_new`].
    pub fn new(start: Point, end: Point) -> Self {
        match Self::try_new(start, end) {
            Ok(segment) => segment,
            Err(err) => panic!("{err}"),
        }
    }

    /// Creates a segment from `start` to `end`, failing with [`RasterError::SpanOverflow`] if
    /// `dx` or `dy` does not fit in `i64`.
    ///
    /// ```rust
    /// use rasterline::geometry::{Point, Segment};
    ///
    /// assert!(Segment::try_new(Point::new(0, 0), Point::new(3, 4)).is_ok());
    /// assert!(Segment::try_new(Point::new(i64::MIN, 0), Point::new(i64::MAX, 0)).is_err());
    /// ```
    pub fn try_new(start: Point, end: Point) -> Result<Self, RasterError> {
        let (Some(dx), Some(dy)) = (end.x.checked_sub(start.x), end.y.checked_sub(start.y)) else {
            return Err(RasterError::SpanOverflow { start, end });
        };

        let kind = match (dx, dy) {
            (0, 0) => LineKind::Point,
            (_, 0) => LineKind::Horizontal,
            (0, _) => LineKind::Vertical,
            _ => LineKind::General,
        };

        let (slope, intercept) = if dx == 0 {
            (None, None)
        } else {
            let slope = dy as f64 / dx as f64;
            (Some(slope), Some(end.y as f64 - slope * end.x as f64))
        };

        let axis = if dx.unsigned_abs() >= dy.unsigned_abs() {
            Axis::X
        } else {
            Axis::Y
        };

        Ok(Self {
            start,
            end,
            dx,
            dy,
            slope,
            intercept,
            kind,
            axis,
            bounds: Bounds::spanning(start, end),
        })
    }

    /// Creates a segment whose endpoints are both multiplied by the resolution multiplier `scale`.
    ///
    /// ```rust
    /// use rasterline::geometry::{Point, Segment};
    ///
    /// let segment = Segment::scaled(Point::new(1, 2), Point::new(3, 3), 4).unwrap();
    /// assert_eq!(segment.start(), Point::new(4, 8));
    /// assert_eq!(segment.end(), Point::new(12, 12));
    ///
    /// assert!(Segment::scaled(Point::new(1, 2), Point::new(3, 3), i64::MAX).is_err());
    /// ```
    pub fn scaled(start: Point, end: Point, scale: i64) -> Result<Self, RasterError> {
        let scale_point = |point: Point| {
            point
                .checked_scale(scale)
                .ok_or(RasterError::ScaleOverflow { point, scale })
        };
        Self::try_new(scale_point(start)?, scale_point(end)?)
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn dx(&self) -> i64 {
        self.dx
    }

    pub fn dy(&self) -> i64 {
        self.dy
    }

    /// `dy / dx`, or `None` when the segment has no finite slope (vertical or a single point).
    pub fn slope(&self) -> Option<f64> {
        self.slope
    }

    /// `b` in `y = m * x + b`, present exactly when [`Segment::slope`] is.
    pub fn intercept(&self) -> Option<f64> {
        self.intercept
    }

    pub fn kind(&self) -> LineKind {
        self.kind
    }

    /// The axis with the larger extent. Ties go to `x`.
    pub fn dominant_axis(&self) -> Axis {
        self.axis
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Number of samples along the dominant axis, `max(|dx|, |dy|) + 1`.
    pub fn steps(&self) -> u64 {
        self.dx.unsigned_abs().max(self.dy.unsigned_abs()) + 1
    }

    /// Evaluates `y = m * x + b` in floating point, `None` without a finite slope.
    pub fn y_at(&self, x: f64) -> Option<f64> {
        Some(self.slope? * x + self.intercept?)
    }

    /// Evaluates `x = (y - b) / m` in floating point, `None` for vertical, horizontal and
    /// single-point segments.
    pub fn x_at(&self, y: f64) -> Option<f64> {
        match self.kind {
            LineKind::General => Some((y - self.intercept?) / self.slope?),
            _ => None,
        }
    }

    /// Returns the cells approximating this segment, one per step along the dominant axis,
    /// in increasing order of the dominant coordinate.
    ///
    /// ```rust
    /// use rasterline::geometry::{Point, Segment};
    /// use rasterline::rasterizer::FragmentPolicy;
    ///
    /// let segment = Segment::new(Point::new(0, 0), Point::new(4, 2));
    /// let cells: Vec<_> = segment.fragments(FragmentPolicy::Floor).map(|p| (p.x, p.y)).collect();
    /// assert_eq!(cells, vec![(0, 0), (1, 0), (2, 1), (3, 1), (4, 2)]);
    /// ```
    pub fn fragments(&self, policy: FragmentPolicy) -> Fragments {
        let (first, last) = match self.axis {
            Axis::X => (self.bounds.min_x, self.bounds.max_x),
            Axis::Y => (self.bounds.min_y, self.bounds.max_y),
        };
        Fragments {
            segment: *self,
            policy,
            next: first,
            last,
            done: false,
        }
    }
}

/// Iterator over the fragments of a [`Segment`]. See [`Segment::fragments`].
#[derive(Debug, Clone)]
pub struct Fragments {
    segment: Segment,
    policy: FragmentPolicy,
    next: i64,
    last: i64,
    done: bool,
}

impl Fragments {
    /// The fragment for the sample `t` on the dominant axis.
    ///
    /// The line value is evaluated as the exact fraction
    /// `minor(t) = start_minor + d_minor * (t - start_major) / d_major`,
    /// which is `m * x + b` (or `(y - b) / m`) without rounding error. The product is taken in
    /// `i128`; the snapped result lies between the endpoints and so fits back into `i64`.
    fn sample(&self, t: i64) -> Point {
        let Segment {
            start, dx, dy, kind, axis, ..
        } = self.segment;
        let offset = |d_minor: i64, along: i128, d_major: i64| {
            self.policy.snap(d_minor as i128 * along, d_major as i128) as i64
        };
        match kind {
            LineKind::Point => start,
            LineKind::Horizontal => Point::new(t, start.y),
            LineKind::Vertical => Point::new(start.x, t),
            LineKind::General => match axis {
                Axis::X => {
                    let along = t as i128 - start.x as i128;
                    Point::new(t, start.y + offset(dy, along, dx))
                }
                Axis::Y => {
                    let along = t as i128 - start.y as i128;
                    Point::new(start.x + offset(dx, along, dy), t)
                }
            },
        }
    }
}

impl Iterator for Fragments {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.done {
            return None;
        }
        let t = self.next;
        if t == self.last {
            self.done = true;
        } else {
            self.next += 1;
        }
        Some(self.sample(t))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.done {
            0
        } else {
            self.last.abs_diff(self.next) as usize + 1
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Fragments {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let p = Point::new(2, 5);
        assert_eq!(Segment::new(p, p).kind(), LineKind::Point);
        assert_eq!(Segment::new(p, Point::new(7, 5)).kind(), LineKind::Horizontal);
        assert_eq!(Segment::new(p, Point::new(2, 0)).kind(), LineKind::Vertical);
        assert_eq!(Segment::new(p, Point::new(3, 9)).kind(), LineKind::General);
    }

    #[test]
    fn test_parameters() {
        let vertical = Segment::new(Point::new(0, 0), Point::new(0, 10));
        assert_eq!(vertical.slope(), None);
        assert_eq!(vertical.intercept(), None);
        assert_eq!(vertical.dominant_axis(), Axis::Y);

        // horizontal lines have a finite zero slope
        let horizontal = Segment::new(Point::new(1, 4), Point::new(8, 4));
        assert_eq!(horizontal.slope(), Some(0.0));
        assert_eq!(horizontal.intercept(), Some(4.0));
        assert_eq!(horizontal.x_at(4.0), None);

        let diagonal = Segment::new(Point::new(0, 0), Point::new(100, 100));
        assert_eq!(diagonal.slope(), Some(1.0));
        assert_eq!(diagonal.intercept(), Some(0.0));
        assert_eq!(diagonal.y_at(42.0), Some(42.0));
        assert_eq!(diagonal.x_at(17.0), Some(17.0));

        let falling = Segment::new(Point::new(0, 6), Point::new(3, 0));
        assert_eq!(falling.dx(), 3);
        assert_eq!(falling.dy(), -6);
        assert_eq!(falling.slope(), Some(-2.0));
        assert_eq!(falling.intercept(), Some(6.0));
        assert_eq!(falling.dominant_axis(), Axis::Y);
    }

    #[test]
    fn test_ties_scan_x() {
        let segment = Segment::new(Point::new(5, 0), Point::new(0, 5));
        assert_eq!(segment.dominant_axis(), Axis::X);
        assert_eq!(segment.steps(), 6);
    }

    #[test]
    fn test_bounds() {
        let segment = Segment::new(Point::new(7, 1), Point::new(2, 9));
        let bounds = segment.bounds();
        assert_eq!(
            bounds,
            Bounds {
                min_x: 2,
                max_x: 7,
                min_y: 1,
                max_y: 9
            }
        );
        assert_eq!(bounds.width(), 6);
        assert_eq!(bounds.height(), 9);
        assert!(bounds.contains(2, 9));
        assert!(!bounds.contains(1, 9));
        assert!(bounds.contains_bounds(Bounds::spanning(Point::new(3, 3), Point::new(7, 9))));
        assert!(!bounds.contains_bounds(Bounds::spanning(Point::new(3, 3), Point::new(8, 9))));
    }

    #[test]
    fn test_point_scaling() {
        let p = Point::new(3, 7);
        assert_eq!(p * 3, Point::new(9, 21));
        assert_eq!((p * 3) / 3, p);
        assert_eq!(Point::new(9, 22) / 3, Point::new(3, 7));
        assert_eq!(Point::from((1, 2)), Point::new(1, 2));
        assert_eq!(p.to_string(), "(3, 7)");
    }

    #[test]
    fn test_fragments_exact_size() {
        let segment = Segment::new(Point::new(10, 3), Point::new(0, 0));
        let mut fragments = segment.fragments(FragmentPolicy::Floor);
        assert_eq!(fragments.len(), 11);
        fragments.next();
        assert_eq!(fragments.len(), 10);
        assert_eq!(fragments.count(), 10);
    }

    #[test]
    fn test_single_point_fragments() {
        let p = Point::new(4, 4);
        let cells: Vec<_> = Segment::new(p, p).fragments(FragmentPolicy::Floor).collect();
        assert_eq!(cells, vec![p]);
    }

    #[test]
    fn test_steep_fragments() {
        // x = floor(y / 3) for y in 0..=9
        let segment = Segment::new(Point::new(3, 9), Point::new(0, 0));
        let cells: Vec<_> = segment
            .fragments(FragmentPolicy::Floor)
            .map(|p| (p.x, p.y))
            .collect();
        assert_eq!(
            cells,
            vec![
                (0, 0),
                (0, 1),
                (0, 2),
                (1, 3),
                (1, 4),
                (1, 5),
                (2, 6),
                (2, 7),
                (2, 8),
                (3, 9)
            ]
        );
    }

    #[test]
    fn test_scale_overflow() {
        let p = Point::new(3, -4);
        assert_eq!(p.checked_scale(5), Some(Point::new(15, -20)));
        assert_eq!(p.checked_scale(i64::MAX), None);

        assert_eq!(
            Segment::scaled(Point::new(0, 0), p, i64::MAX / 2),
            Err(RasterError::ScaleOverflow {
                point: p,
                scale: i64::MAX / 2
            })
        );
    }

    #[test]
    fn test_span_overflow() {
        let start = Point::new(i64::MIN, 0);
        let end = Point::new(i64::MAX, 0);
        assert_eq!(
            Segment::try_new(start, end),
            Err(RasterError::SpanOverflow { start, end })
        );

        // the widest span that still fits
        let segment = Segment::try_new(Point::new(0, i64::MIN), Point::new(0, -1)).unwrap();
        assert_eq!(segment.dy(), i64::MAX);
        assert_eq!(segment.steps(), 1 << 63);
        assert_eq!(segment.bounds().height(), 1 << 63);
    }

    #[test]
    fn test_large_coordinate_fragments() {
        // dy * (t - start.x) is far past i64 here
        let end = Point::new(i64::MAX - 1, 4);
        let segment = Segment::new(Point::new(0, 0), end);
        let half = end.x / 2;
        for policy in [FragmentPolicy::Floor, FragmentPolicy::PixelCenter] {
            let fragments = segment.fragments(policy);
            assert_eq!(fragments.len(), (end.x as usize) + 1);
            assert_eq!(fragments.sample(0), Point::new(0, 0));
            assert_eq!(fragments.sample(half), Point::new(half, 2));
            assert_eq!(fragments.sample(end.x), end);
        }
        assert_eq!(
            segment.fragments(FragmentPolicy::Floor).sample(end.x - 1),
            Point::new(end.x - 1, 3)
        );
        assert_eq!(
            segment.fragments(FragmentPolicy::PixelCenter).sample(end.x - 1),
            Point::new(end.x - 1, 4)
        );

        // same line walked from the other end, steep and negative
        let steep = Segment::new(Point::new(4, i64::MAX), Point::new(0, 1));
        let fragments = steep.fragments(FragmentPolicy::Floor);
        assert_eq!(fragments.sample(1), Point::new(0, 1));
        assert_eq!(fragments.sample(i64::MAX), Point::new(4, i64::MAX));
    }
}
