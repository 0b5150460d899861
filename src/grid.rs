//! 2D occupancy grid that rasterized lines are written into.
//!
//! The [`Grid`] is a fixed-size buffer of `0`/`1` cells. It is allocated once, usually with
//! [`Grid::for_segment`], handed to the [`Rasterizer`](crate::rasterizer::Rasterizer) as
//! `&mut Grid`, and afterwards read by whatever displays it.
//!
//! Cells are addressed as `(x, y)` with `x` as the first axis, matching the `[x][y]` nested
//! matrix returned by [`Grid::columns`].

use crate::error::{GridFileError, RasterError};
use crate::geometry::{Point, Segment};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::ops::Index;
use std::path::Path;

/// Value of an empty cell.
pub const EMPTY: u8 = 0;
/// Value of a cell covered by a fragment.
pub const OCCUPIED: u8 = 1;

/// A 2D occupancy buffer with a fixed `width` and `height`.
///
/// # Example
///
/// ```rust
/// use rasterline::grid::Grid;
///
/// let mut grid = Grid::new(4, 3);
/// grid.mark(2, 1).unwrap();
///
/// assert_eq!(grid[(2, 1)], 1);
/// assert_eq!(grid.get(0, 0), Some(0));
/// assert_eq!(grid.get(4, 0), None);
/// assert!(grid.mark(4, 0).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl Grid {
    /// Creates an empty grid of the given size.
    ///
    /// # Panics
    ///
    /// Panics if `width * height` cells cannot be allocated. See [`Grid::try_new`].
    pub fn new(width: usize, height: usize) -> Self {
        match Self::try_new(width, height) {
            Ok(grid) => grid,
            Err(err) => panic!("{err}"),
        }
    }

    /// Creates an empty grid of the given size, failing with [`RasterError::GridTooLarge`] if
    /// `width * height` overflows or the allocation fails.
    pub fn try_new(width: usize, height: usize) -> Result<Self, RasterError> {
        let too_large = || RasterError::GridTooLarge {
            width: width as u64,
            height: height as u64,
        };
        let len = width.checked_mul(height).ok_or_else(too_large)?;
        let mut cells = Vec::new();
        cells.try_reserve_exact(len).map_err(|_| too_large())?;
        cells.resize(len, EMPTY);
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Creates an empty grid just large enough for `segment`:
    /// `max(start.x, end.x) + 1` by `max(start.y, end.y) + 1`.
    ///
    /// Segments reaching into negative coordinates get a grid that cannot hold them, which the
    /// rasterizer reports as [`RasterError::InvalidGrid`]. Segments too large to allocate a grid
    /// for fail with [`RasterError::GridTooLarge`].
    ///
    /// ```rust
    /// use rasterline::geometry::{Point, Segment};
    /// use rasterline::grid::Grid;
    ///
    /// let grid = Grid::for_segment(&Segment::new(Point::new(0, 0), Point::new(9, 3))).unwrap();
    /// assert_eq!((grid.width(), grid.height()), (10, 4));
    /// ```
    pub fn for_segment(segment: &Segment) -> Result<Self, RasterError> {
        let bounds = segment.bounds();
        let extent = |max: i64| u64::try_from(max).map_or(0, |max| max + 1);
        let (width, height) = (extent(bounds.max_x), extent(bounds.max_y));
        match (usize::try_from(width), usize::try_from(height)) {
            (Ok(w), Ok(h)) => Self::try_new(w, h),
            _ => Err(RasterError::GridTooLarge { width, height }),
        }
    }

    /// Gets the width of the grid (extent of the x axis).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Gets the height of the grid (extent of the y axis).
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn get_index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// Gets the cell at `(x, y)`, or `None` if the coordinates are out of bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        self.get_index(x, y).map(|idx| self.cells[idx])
    }

    /// Returns `true` if `(x, y)` is inside the grid and occupied.
    pub fn is_marked(&self, x: usize, y: usize) -> bool {
        self.get(x, y) == Some(OCCUPIED)
    }

    /// Marks the cell at `(x, y)` as occupied.
    ///
    /// Coordinates outside of `[0, width) x [0, height)` are rejected instead of clipped.
    pub fn mark(&mut self, x: i64, y: i64) -> Result<(), RasterError> {
        let idx = usize::try_from(x)
            .ok()
            .zip(usize::try_from(y).ok())
            .and_then(|(ux, uy)| self.get_index(ux, uy))
            .ok_or(RasterError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            })?;
        self.cells[idx] = OCCUPIED;
        Ok(())
    }

    /// Marks the cell at `point`, see [`Grid::mark`].
    pub fn mark_point(&mut self, point: Point) -> Result<(), RasterError> {
        self.mark(point.x, point.y)
    }

    /// Resets every cell to empty.
    pub fn clear(&mut self) {
        self.cells.fill(EMPTY);
    }

    /// Returns an iterator over the occupied cells, row by row from `y = 0`.
    pub fn marked(&self) -> impl Iterator<Item = Point> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &cell)| cell == OCCUPIED)
            .map(|(idx, _)| Point::new((idx % self.width) as i64, (idx / self.width) as i64))
    }

    pub fn count_marked(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell == OCCUPIED).count()
    }

    /// Returns the cells as a nested matrix indexed `[x][y]`.
    ///
    /// ```rust
    /// use rasterline::grid::Grid;
    ///
    /// let mut grid = Grid::new(2, 3);
    /// grid.mark(1, 2).unwrap();
    /// assert_eq!(grid.columns(), vec![vec![0, 0, 0], vec![0, 0, 1]]);
    /// ```
    pub fn columns(&self) -> Vec<Vec<u8>> {
        (0..self.width)
            .map(|x| (0..self.height).map(|y| self[(x, y)]).collect())
            .collect()
    }

    /// Reads a grid previously stored with [`Grid::write_to_file`].
    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, GridFileError> {
        let file = File::open(path)?;
        let grid: Grid = bincode::deserialize_from(BufReader::new(file))?;
        if grid.width.checked_mul(grid.height) != Some(grid.cells.len()) {
            return Err(GridFileError::Corrupt {
                width: grid.width,
                height: grid.height,
                cells: grid.cells.len(),
            });
        }
        Ok(grid)
    }

    /// Stores the grid in bincode format, creating parent directories as needed.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), GridFileError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}

impl Index<(usize, usize)> for Grid {
    type Output = u8;

    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        let idx = self
            .get_index(x, y)
            .unwrap_or_else(|| panic!("cell ({x}, {y}) out of bounds"));
        &self.cells[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid() {
        let mut grid = Grid::new(3, 2);
        assert_eq!(grid.count_marked(), 0);

        grid.mark(2, 1).unwrap();
        grid.mark(0, 1).unwrap();
        // marking twice is idempotent
        grid.mark(0, 1).unwrap();

        assert!(grid.is_marked(2, 1));
        assert!(!grid.is_marked(1, 1));
        assert_eq!(grid.count_marked(), 2);
        assert_eq!(
            grid.marked().collect::<Vec<_>>(),
            vec![Point::new(0, 1), Point::new(2, 1)]
        );

        grid.clear();
        assert_eq!(grid.count_marked(), 0);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut grid = Grid::new(3, 2);
        for (x, y) in [(3, 0), (0, 2), (-1, 0), (0, -1)] {
            assert_eq!(
                grid.mark(x, y),
                Err(RasterError::OutOfBounds {
                    x,
                    y,
                    width: 3,
                    height: 2
                })
            );
        }
        // x past the width must not wrap into the next row
        assert_eq!(grid.get(3, 0), None);
        assert_eq!(grid.count_marked(), 0);
    }

    #[test]
    fn test_for_segment() {
        let segment = Segment::new(Point::new(5, 0), Point::new(2, 7));
        let grid = Grid::for_segment(&segment).unwrap();
        assert_eq!(grid.width(), 6);
        assert_eq!(grid.height(), 8);

        let negative = Segment::new(Point::new(-5, -2), Point::new(-1, -1));
        let grid = Grid::for_segment(&negative).unwrap();
        assert_eq!((grid.width(), grid.height()), (0, 0));
    }

    #[test]
    fn test_grid_too_large() {
        let huge = Segment::new(Point::new(0, 0), Point::new(5_000_000_000, 5_000_000_000));
        assert_eq!(
            Grid::for_segment(&huge),
            Err(RasterError::GridTooLarge {
                width: 5_000_000_001,
                height: 5_000_000_001
            })
        );

        let widest = Segment::new(Point::new(0, 0), Point::new(i64::MAX, 1));
        assert!(matches!(
            Grid::for_segment(&widest),
            Err(RasterError::GridTooLarge { .. })
        ));

        // product overflows
        assert!(Grid::try_new(usize::MAX, 2).is_err());
        // product fits but is past what a Vec can hold
        assert!(Grid::try_new(usize::MAX / 2, 2).is_err());
    }

    #[test]
    fn test_file_roundtrip() {
        let path = std::env::temp_dir()
            .join(format!("rasterline-{}", std::process::id()))
            .join("grid.bin");

        let mut grid = Grid::new(5, 4);
        grid.mark(1, 3).unwrap();
        grid.mark(4, 0).unwrap();
        grid.write_to_file(&path).unwrap();

        let read = Grid::read_from_file(&path).unwrap();
        assert_eq!(read, grid);

        std::fs::remove_file(&path).unwrap();
        std::fs::remove_dir(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_corrupt_file() {
        let dir = std::env::temp_dir().join(format!("rasterline-corrupt-{}", std::process::id()));

        let short = Grid {
            width: 3,
            height: 3,
            cells: vec![EMPTY; 4],
        };
        let overflowing = Grid {
            width: usize::MAX / 2,
            height: 4,
            cells: Vec::new(),
        };
        for (name, grid) in [("short.bin", short), ("overflowing.bin", overflowing)] {
            let path = dir.join(name);
            grid.write_to_file(&path).unwrap();
            let result = Grid::read_from_file(&path);
            assert!(
                matches!(result, Err(GridFileError::Corrupt { width, height, .. })
                    if width == grid.width && height == grid.height),
                "{name}"
            );
            std::fs::remove_file(&path).unwrap();
        }
        std::fs::remove_dir(&dir).unwrap();
    }

    #[test]
    fn test_missing_file() {
        let result = Grid::read_from_file("this/path/does/not/exist.bin");
        assert!(matches!(result, Err(GridFileError::Io(_))));
    }
}
