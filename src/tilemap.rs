//! Dense 2D layers for the world grid.
//!
//! Cells are stored column-major (`x * height + y`) so that a range of columns
//! is one contiguous slice. That lets the scheduler hand every worker its own
//! `&mut` band of a layer without locks or copying.

use std::ops::Range;

/// A 2D tilemap grid with hard (non-wrapping) edges.
#[derive(Clone, Debug, PartialEq)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Fill the entire map with a value.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl<T> Tilemap<T> {
    /// Get the index into the data array. Out-of-range coordinates are a bug.
    fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "({}, {}) is outside a {}x{} tilemap",
            x,
            y,
            self.width,
            self.height
        );
        x * self.height + y
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Whether signed coordinates land inside the map.
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Bounds-checked lookup for signed coordinates; `None` past any edge.
    pub fn get_checked(&self, x: i64, y: i64) -> Option<&T> {
        if self.in_bounds(x, y) {
            Some(self.get(x as usize, y as usize))
        } else {
            None
        }
    }

    /// Iterate over all cells with their coordinates, column by column.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let height = self.height;
        self.data.iter().enumerate().map(move |(idx, val)| {
            let x = idx / height;
            let y = idx % height;
            (x, y, val)
        })
    }

    /// Split the map into disjoint writable column bands.
    ///
    /// `ranges` must be ascending, non-overlapping and inside `0..width`.
    /// Columns not covered by any range are simply not handed out.
    pub fn column_bands_mut(&mut self, ranges: &[Range<usize>]) -> Vec<ColumnBand<'_, T>> {
        let height = self.height;
        let width = self.width;
        let mut bands = Vec::with_capacity(ranges.len());
        let mut rest: &mut [T] = &mut self.data;
        let mut consumed = 0;

        for range in ranges {
            assert!(
                range.start >= consumed && range.start <= range.end && range.end <= width,
                "column range {:?} overlaps or leaves a {}-wide map",
                range,
                width
            );
            let tail = std::mem::take(&mut rest);
            let (_, tail) = tail.split_at_mut((range.start - consumed) * height);
            let (band, tail) = tail.split_at_mut(range.len() * height);
            bands.push(ColumnBand {
                columns: range.clone(),
                height,
                data: band,
            });
            rest = tail;
            consumed = range.end;
        }

        bands
    }
}

/// A writable run of whole columns borrowed from a [`Tilemap`].
///
/// Coordinates are absolute map coordinates. Touching a column outside the
/// band panics, so a worker can never write into a neighbour's range.
pub struct ColumnBand<'a, T> {
    columns: Range<usize>,
    height: usize,
    data: &'a mut [T],
}

impl<'a, T> ColumnBand<'a, T> {
    /// The absolute columns this band covers.
    pub fn columns(&self) -> Range<usize> {
        self.columns.clone()
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            self.columns.contains(&x) && y < self.height,
            "({}, {}) is outside band {:?} of height {}",
            x,
            y,
            self.columns,
            self.height
        );
        (x - self.columns.start) * self.height + y
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }
}
