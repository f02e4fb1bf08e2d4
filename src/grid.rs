use std::fmt;

use serde::{Deserialize, Serialize};

/// Row-major flat grid. Fixed size, no resizing.
/// Out-of-range access is a caller bug and panics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    data: Vec<T>,
    w: usize,
    h: usize,
}

impl<T: Copy + Default> Grid<T> {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            data: vec![T::default(); w * h],
            w,
            h,
        }
    }
}

impl<T: Copy> Grid<T> {
    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.w && y < self.h,
            "grid access ({x}, {y}) outside {}x{}",
            self.w,
            self.h
        );
        y * self.w + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.data[self.idx(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: T) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    #[inline]
    pub fn geti(&self, i: usize) -> T {
        self.data[i]
    }

    #[inline]
    pub fn seti(&mut self, i: usize, v: T) {
        self.data[i] = v;
    }

    pub fn fill(&mut self, v: T) {
        self.data.fill(v);
    }

    /// Signed bounds check, so callers can test neighbors of edge cells.
    #[inline]
    pub fn within_bounds(&self, x: i32, y: i32) -> bool {
        clip_xy(x, y, self.w, self.h).is_some()
    }

    /// Read-only view of the backing store.
    pub fn elements(&self) -> &[T] {
        &self.data
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    /// Value at `p`, or `None` if `p` lies outside the grid.
    #[inline]
    pub fn get_at(&self, p: Vec2) -> Option<T> {
        clip_xy(p.x, p.y, self.w, self.h).map(|(x, y)| self.get(x, y))
    }
}

/// Integer grid coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

impl Vec2 {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn offset(self, (dx, dy): (i32, i32)) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// True if `other` is one orthogonal step away.
    pub fn is_orthogonal_neighbor(self, other: Vec2) -> bool {
        (self.x - other.x).abs() + (self.y - other.y).abs() == 1
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Moore neighborhood, scanned top row first.
pub const MOORE: [(i32, i32); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0),           (1, 0),
    (-1, 1),  (0, 1),  (1, 1),
];

/// Von Neumann neighborhood in the fixed up, left, right, down order.
pub const VON_NEUMANN: [(i32, i32); 4] = [
              (0, -1),
    (-1, 0),           (1, 0),
              (0, 1),
];

/// Returns None if (x, y) is outside a `w`x`h` grid. No wrapping.
#[inline]
pub fn clip_xy(x: i32, y: i32, w: usize, h: usize) -> Option<(usize, usize)> {
    if x < 0 || y < 0 || x as usize >= w || y as usize >= h {
        return None;
    }
    Some((x as usize, y as usize))
}

/// In-bounds 8-connected neighbors, in `MOORE` order.
pub fn neighbors8(x: usize, y: usize, w: usize, h: usize) -> impl Iterator<Item = (usize, usize)> {
    let mut out = [(0usize, 0usize); 8];
    let mut n = 0;
    for (dx, dy) in MOORE {
        if let Some(pos) = clip_xy(x as i32 + dx, y as i32 + dy, w, h) {
            out[n] = pos;
            n += 1;
        }
    }
    out.into_iter().take(n)
}

/// In-bounds 4-connected neighbors of `p`, in `VON_NEUMANN` order.
pub fn neighbors4(p: Vec2, w: usize, h: usize) -> impl Iterator<Item = Vec2> {
    let mut out = [Vec2::default(); 4];
    let mut n = 0;
    for d in VON_NEUMANN {
        let q = p.offset(d);
        if clip_xy(q.x, q.y, w, h).is_some() {
            out[n] = q;
            n += 1;
        }
    }
    out.into_iter().take(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_is_row_major() {
        let mut g = Grid::<i32>::new(4, 3);
        g.set(1, 2, 7);
        assert_eq!(g.idx(1, 2), 9);
        assert_eq!(g.geti(9), 7);
        g.seti(3, 5);
        assert_eq!(g.get(3, 0), 5);
    }

    #[test]
    fn fill_sets_every_cell() {
        let mut g = Grid::<i32>::new(3, 3);
        g.fill(2);
        assert!(g.elements().iter().all(|&v| v == 2));
        assert_eq!(g.elements().len(), 9);
    }

    #[test]
    fn within_bounds_rejects_negative_and_overflow() {
        let g = Grid::<u8>::new(5, 2);
        assert!(g.within_bounds(0, 0));
        assert!(g.within_bounds(4, 1));
        assert!(!g.within_bounds(-1, 0));
        assert!(!g.within_bounds(5, 0));
        assert!(!g.within_bounds(0, 2));
    }

    #[test]
    #[should_panic]
    fn out_of_range_x_does_not_alias_next_row() {
        let g = Grid::<u8>::new(4, 4);
        g.get(4, 0);
    }

    #[test]
    fn edge_neighbors_are_clipped() {
        let corner: Vec<_> = neighbors8(0, 0, 3, 3).collect();
        assert_eq!(corner, vec![(1, 0), (0, 1), (1, 1)]);

        let side: Vec<_> = neighbors4(Vec2::new(0, 1), 3, 3).collect();
        assert_eq!(side, vec![Vec2::new(0, 0), Vec2::new(1, 1), Vec2::new(0, 2)]);
    }
}
