use crate::error::GenError;
use crate::grid::{Grid, Vec2, clip_xy, neighbors8};
use crate::rng::RandomSource;

/// Cell tags.
pub const EMPTY: i32 = 0;
pub const FLOOR: i32 = 1;

/// Linear remap of `n` from [src_min, src_max] onto [dst_min, dst_max].
/// Not clamped: values outside the source range extrapolate.
#[inline]
fn linear_scale(n: f64, src_min: f64, src_max: f64, dst_min: f64, dst_max: f64) -> f64 {
    (n - src_min) / (src_max - src_min) * (dst_max - dst_min) + dst_min
}

/// Double-buffered cellular automaton over integer cells.
///
/// Every operator computes into the write buffer from the read buffer and then
/// swaps the two, so no operator ever sees its own partial output. Callers only
/// ever see the read buffer.
#[derive(Clone, Debug)]
pub struct Automaton {
    read: Grid<i32>,
    write: Grid<i32>,
}

impl Automaton {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            read: Grid::new(w, h),
            write: Grid::new(w, h),
        }
    }

    pub fn width(&self) -> usize {
        self.read.width()
    }

    pub fn height(&self) -> usize {
        self.read.height()
    }

    /// Current cell values.
    pub fn read(&self) -> &Grid<i32> {
        &self.read
    }

    pub(crate) fn read_mut(&mut self) -> &mut Grid<i32> {
        &mut self.read
    }

    fn swap_buffers(&mut self) {
        std::mem::swap(&mut self.read, &mut self.write);
    }

    /// Operators that only touch some cells start from the current state.
    fn seed_write(&mut self) {
        self.write.clone_from(&self.read);
    }

    /// Set both buffers to `value`.
    pub fn fill(&mut self, value: i32) {
        self.read.fill(value);
        self.write.fill(value);
    }

    /// Fill every in-bounds cell within distance |r| of (cx, cy). Returns cells filled.
    pub fn circle_fill(&mut self, cx: i32, cy: i32, r: i32, fill_value: i32) -> usize {
        let r = r.abs();
        if r == 0 {
            return 0;
        }

        self.seed_write();
        let (w, h) = (self.width(), self.height());
        let r2 = r * r;
        let mut num_filled = 0;

        for ox in -r..=r {
            for oy in -r..=r {
                if ox * ox + oy * oy > r2 {
                    continue;
                }
                if let Some((x, y)) = clip_xy(cx + ox, cy + oy, w, h) {
                    self.write.set(x, y, fill_value);
                    num_filled += 1;
                }
            }
        }

        self.swap_buffers();
        num_filled
    }

    /// Randomly fill the bounding square of radius |r| around (cx, cy).
    ///
    /// Fill probability is `p0` at the center and `p1` at distance `r`, linear in
    /// between and extrapolated beyond `r` (square corners). One draw per square
    /// cell in x-major order, including cells that fall off the grid, so the draw
    /// sequence depends only on `r`.
    pub fn noisy_circle<R: RandomSource + ?Sized>(
        &mut self,
        rng: &mut R,
        cx: i32,
        cy: i32,
        r: i32,
        p0: f64,
        p1: f64,
        fill_value: i32,
    ) -> usize {
        let r = r.abs();
        if r == 0 {
            return 0;
        }

        self.seed_write();
        let (w, h) = (self.width(), self.height());
        let rf = r as f64;
        let mut num_filled = 0;

        for ox in -r..=r {
            for oy in -r..=r {
                let dist = ((ox * ox + oy * oy) as f64).sqrt();
                let delta = rf - dist;
                let p = linear_scale(delta, rf, 0.0, p0, p1);
                if rng.next_unit() >= p {
                    continue;
                }
                if let Some((x, y)) = clip_xy(cx + ox, cy + oy, w, h) {
                    self.write.set(x, y, fill_value);
                    num_filled += 1;
                }
            }
        }

        self.swap_buffers();
        num_filled
    }

    /// One step of 8-neighbor dilation.
    ///
    /// Each live cell paints its value onto every neighbor holding a different
    /// value. Scan is x-major; when two live cells claim the same neighbor the
    /// later one wins. Returns the number of writes, not distinct cells.
    pub fn rule_grow(&mut self, dead_value: i32) -> usize {
        self.seed_write();
        let (w, h) = (self.width(), self.height());
        let mut num_grew = 0;

        for x in 0..w {
            for y in 0..h {
                let cell = self.read.get(x, y);
                if cell == dead_value {
                    continue;
                }
                for (nx, ny) in neighbors8(x, y, w, h) {
                    if self.read.get(nx, ny) != cell {
                        self.write.set(nx, ny, cell);
                        num_grew += 1;
                    }
                }
            }
        }

        self.swap_buffers();
        num_grew
    }

    /// Bitwise XOR every cell with `xor_rhs`. With 1 this toggles empty/floor.
    pub fn rule_xor(&mut self, xor_rhs: i32) {
        for (i, &v) in self.read.elements().iter().enumerate() {
            self.write.seti(i, v ^ xor_rhs);
        }
        self.swap_buffers();
    }

    /// Majority smoothing over the Moore neighborhood.
    ///
    /// Dead cells come alive with 5+ live neighbors, live cells survive with 4+.
    /// Off-grid neighbors count as neither.
    pub fn rule_smooth(&mut self, dead_value: i32, alive_value: i32) {
        let (w, h) = (self.width(), self.height());

        for x in 0..w {
            for y in 0..h {
                let cell = self.read.get(x, y);
                let alive = neighbors8(x, y, w, h)
                    .filter(|&(nx, ny)| self.read.get(nx, ny) != dead_value)
                    .count();

                let next = if (cell == dead_value && alive >= 5) || (cell != dead_value && alive >= 4) {
                    alive_value
                } else {
                    dead_value
                };
                self.write.set(x, y, next);
            }
        }

        self.swap_buffers();
    }

    /// Cell-wise `read - rhs`, unclamped.
    pub fn subtract(&mut self, rhs: &[i32]) -> Result<(), GenError> {
        let expected = self.width() * self.height();
        if rhs.len() != expected {
            return Err(GenError::OperandSize {
                expected,
                got: rhs.len(),
            });
        }

        for (i, &v) in rhs.iter().enumerate() {
            self.write.seti(i, self.read.geti(i) - v);
        }

        self.swap_buffers();
        Ok(())
    }

    /// First cell equal to `needle` along a square spiral out of (cx, cy).
    ///
    /// Runs alternate between the y and x axis; every second run flips direction
    /// and lengthens by one. Gives up after `max_runs` runs past the first.
    pub fn find_nearest(&self, cx: i32, cy: i32, needle: i32, max_runs: usize) -> Result<Vec2, GenError> {
        let mut coords = [cx, cy];
        let mut step = 0;
        let mut dir = 1;

        for run in 0..=max_runs {
            let axis = if run % 2 == 0 {
                dir = -dir;
                step += 1;
                1
            } else {
                0
            };

            let end = coords[axis] + step * dir;
            while coords[axis] != end {
                let p = Vec2::new(coords[0], coords[1]);
                if self.read.get_at(p) == Some(needle) {
                    return Ok(p);
                }
                coords[axis] += dir;
            }
        }

        Err(GenError::SearchBoundExceeded {
            origin: Vec2::new(cx, cy),
            needle,
            runs: max_runs,
        })
    }

    /// Snapshot of the read buffer.
    pub fn copy_values(&self) -> Vec<i32> {
        self.read.elements().to_vec()
    }

    /// Live cells under `dead_value`.
    pub fn count_alive(&self, dead_value: i32) -> usize {
        self.read.elements().iter().filter(|&&v| v != dead_value).count()
    }
}
