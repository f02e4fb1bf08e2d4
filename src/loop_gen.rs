use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::automaton::{Automaton, EMPTY, FLOOR};
use crate::config::Params;
use crate::error::GenError;
use crate::grid::{Grid, VON_NEUMANN, Vec2, neighbors4};
use crate::rng::RandomSource;
use crate::tile::{BuildingKind, TerrainKind, Tile};

/// Output of one generation pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoopResult {
    pub tiles: Grid<Tile>,
    /// Closed traversal order. Starts at `loop_start`; the last entry is
    /// orthogonally adjacent to the first.
    pub path: Vec<Vec2>,
    pub loop_start: Vec2,
}

/// Carves a one-tile ring into a square grid and orders it into a cycle.
pub struct LoopMapGen {
    size: usize,
    inner_size: usize,
    params: Params,
    automaton: Automaton,
}

impl LoopMapGen {
    pub fn new(size: usize, params: Params) -> Result<Self, GenError> {
        let config_err = GenError::Configuration {
            size,
            padding: params.padding,
        };
        if i32::try_from(size).is_err() {
            return Err(config_err);
        }
        let inner_size = match params.padding.checked_mul(2).and_then(|pad| size.checked_sub(pad)) {
            Some(inner) if inner / 2 >= 1 => inner,
            _ => return Err(config_err),
        };

        Ok(Self {
            size,
            inner_size,
            params,
            automaton: Automaton::new(size, size),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Current automaton state. After `generate` this holds only the path.
    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    pub fn generate<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> Result<LoopResult, GenError> {
        self.carve_ring(rng)?;
        self.close_loop(rng)
    }

    /// Retry loop over the carved ring: random start, walk, length check.
    fn close_loop<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> Result<LoopResult, GenError> {
        for attempt in 1..=self.params.max_attempts {
            let rx = rng.below(self.size) as i32;
            let ry = rng.below(self.size) as i32;
            let loop_start = self
                .automaton
                .find_nearest(rx, ry, FLOOR, self.params.spiral_runs)?;

            match self.trace_loop(loop_start)? {
                Some(path) if path.len() >= self.size => {
                    info!(attempt, len = path.len(), %loop_start, "loop closed");
                    return Ok(self.finish(loop_start, path));
                }
                Some(path) => debug!(attempt, %loop_start, len = path.len(), "loop closed too short"),
                None => debug!(attempt, %loop_start, "loop did not close"),
            }
        }

        warn!(attempts = self.params.max_attempts, size = self.size, "no closed loop found");
        Err(GenError::MalformedLoop {
            attempts: self.params.max_attempts,
            min_len: self.size,
        })
    }

    /// Noisy disk, smoothed, dilated by one, minus itself: a one-tile ring.
    pub fn carve_ring<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> Result<(), GenError> {
        let c = (self.size / 2) as i32;
        let r = (self.inner_size / 2) as i32;

        self.automaton.fill(EMPTY);
        let filled = self.automaton.noisy_circle(
            rng,
            c,
            c,
            r,
            self.params.center_fill_p,
            self.params.rim_fill_p,
            FLOOR,
        );

        let passes = Params::smooth_passes(self.size);
        for _ in 0..passes {
            self.automaton.rule_smooth(EMPTY, FLOOR);
        }

        let cut_shape = self.automaton.copy_values();
        self.automaton.rule_grow(EMPTY);
        self.automaton.subtract(&cut_shape)?;

        debug!(
            filled,
            passes,
            ring = self.automaton.count_alive(EMPTY),
            "ring carved"
        );
        Ok(())
    }

    fn is_floor(&self, p: Vec2) -> bool {
        self.automaton.read().get_at(p) == Some(FLOOR)
    }

    /// Walks the ring from `loop_start` with an explicit stack.
    ///
    /// A cell closes the loop when it discovers nothing new and touches the
    /// start. Popped cells are not re-checked against later discoveries.
    /// Returns the path on closure, `None` if the stack runs dry.
    fn trace_loop(&self, loop_start: Vec2) -> Result<Option<Vec<Vec2>>, GenError> {
        let (w, h) = (self.automaton.width(), self.automaton.height());
        let mut came_from: HashMap<Vec2, Option<Vec2>> = HashMap::new();
        came_from.insert(loop_start, None);

        let first = VON_NEUMANN
            .into_iter()
            .map(|d| loop_start.offset(d))
            .find(|&p| self.is_floor(p))
            .ok_or(GenError::IsolatedStart { start: loop_start })?;
        came_from.insert(first, Some(loop_start));

        let mut frontier: Vec<Vec2> = Vec::new();
        let mut cur = Some(first);
        let mut closing = None;

        while let Some(c) = cur {
            let mut num_unvisited = 0;
            let mut neighboring_start = false;

            for n in neighbors4(c, w, h) {
                if !self.is_floor(n) {
                    continue;
                }
                if !came_from.contains_key(&n) {
                    frontier.push(n);
                    came_from.insert(n, Some(c));
                    num_unvisited += 1;
                }
                if n == loop_start {
                    neighboring_start = true;
                }
            }

            if num_unvisited == 0 && neighboring_start {
                closing = Some(c);
                break;
            }
            cur = frontier.pop();
        }

        let Some(last) = closing else {
            return Ok(None);
        };

        let mut path = vec![loop_start];
        let mut node = last;
        loop {
            path.push(node);
            match came_from.get(&node).copied().flatten() {
                Some(parent) if parent == loop_start => break,
                Some(parent) => node = parent,
                None => return Ok(None),
            }
        }
        Ok(Some(path))
    }

    /// Repaint the grid with only the path and build the tile grid.
    fn finish(&mut self, loop_start: Vec2, path: Vec<Vec2>) -> LoopResult {
        self.automaton.fill(EMPTY);
        let grid = self.automaton.read_mut();
        for p in &path {
            grid.set(p.x as usize, p.y as usize, FLOOR);
        }

        let mut tiles = Grid::new(self.size, self.size);
        for x in 0..self.size {
            for y in 0..self.size {
                let kind = TerrainKind::from_cell(grid.get(x, y));
                tiles.set(x, y, Tile::new(x as i32, y as i32, kind));
            }
        }
        tiles.set(
            loop_start.x as usize,
            loop_start.y as usize,
            Tile::new(loop_start.x, loop_start.y, TerrainKind::Floor).with_building(BuildingKind::Camp),
        );

        LoopResult {
            tiles,
            path,
            loop_start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    /// Every draw is zero: the disk fills its whole bounding square.
    struct Zeros;

    impl RngCore for Zeros {
        fn next_u32(&mut self) -> u32 {
            0
        }
        fn next_u64(&mut self) -> u64 {
            0
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }
        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            dest.fill(0);
            Ok(())
        }
    }

    #[test]
    fn rejects_grid_without_room_for_a_radius() {
        for size in [0, 3, 4, 5] {
            assert!(
                matches!(
                    LoopMapGen::new(size, Params::default()),
                    Err(GenError::Configuration { .. })
                ),
                "size {size} should be rejected"
            );
        }
        assert!(LoopMapGen::new(6, Params::default()).is_ok());
    }

    #[test]
    fn oversized_padding_is_a_configuration_error() {
        for padding in [usize::MAX, 1 << 62, 7] {
            let params = Params {
                padding,
                ..Params::default()
            };
            assert_eq!(
                LoopMapGen::new(13, params).err(),
                Some(GenError::Configuration { size: 13, padding }),
                "padding {padding} should be rejected"
            );
        }
    }

    fn painted(size: usize, cells: &[(usize, usize)], max_attempts: usize) -> LoopMapGen {
        let params = Params {
            max_attempts,
            ..Params::default()
        };
        let mut g = LoopMapGen::new(size, params).unwrap();
        g.automaton.fill(EMPTY);
        for &(x, y) in cells {
            g.automaton.read_mut().set(x, y, FLOOR);
        }
        g
    }

    #[test]
    fn lone_floor_cell_is_an_isolated_start() {
        let g = painted(13, &[(4, 4)], 10);
        assert_eq!(
            g.trace_loop(Vec2::new(4, 4)),
            Err(GenError::IsolatedStart { start: Vec2::new(4, 4) })
        );
    }

    #[test]
    fn dead_end_strip_never_closes() {
        let g = painted(13, &[(3, 3), (4, 3), (5, 3)], 10);
        assert_eq!(g.trace_loop(Vec2::new(3, 3)), Ok(None));
    }

    #[test]
    fn short_cycle_is_retried_until_budget_runs_out() {
        let square = [(5, 5), (6, 5), (5, 6), (6, 6)];
        let mut g = painted(13, &square, 5);

        let closed = g.trace_loop(Vec2::new(5, 5)).unwrap();
        assert_eq!(
            closed,
            Some(vec![Vec2::new(5, 5), Vec2::new(5, 6), Vec2::new(6, 6), Vec2::new(6, 5)]),
            "2x2 block closes as a four-cell cycle"
        );

        let err = g.close_loop(&mut Zeros).unwrap_err();
        assert_eq!(err, GenError::MalformedLoop { attempts: 5, min_len: 13 });
        assert_eq!(g.automaton().count_alive(EMPTY), 4, "failed attempts leave the ring intact");
    }

    #[test]
    fn ring_hugs_the_disk_and_excludes_center() {
        let mut g = LoopMapGen::new(13, Params::default()).unwrap();
        g.carve_ring(&mut Zeros).unwrap();
        let ring = g.automaton();
        assert_eq!(ring.read().get(6, 6), EMPTY, "center is interior");
        assert_eq!(ring.read().get(6, 2), EMPTY, "disk rim is subtracted");
        assert_eq!(ring.find_nearest(6, 2, FLOOR, 100), Ok(Vec2::new(6, 1)));
        assert_eq!(ring.count_alive(EMPTY), 40);
    }

    #[test]
    fn square_disk_yields_full_perimeter_loop() {
        let mut g = LoopMapGen::new(13, Params::default()).unwrap();
        let result = g.generate(&mut Zeros).unwrap();

        // 9x9 block with clipped corners, dilated: 40 ring cells
        assert_eq!(result.path.len(), 40);
        // spiral from (0, 0) meets the left ring column before the clipped corner
        assert_eq!(result.loop_start, Vec2::new(1, 2));
        assert_eq!(result.path[0], result.loop_start);
        assert_eq!(result.path[1], Vec2::new(1, 3));
        assert_eq!(result.path[39], Vec2::new(2, 2));
        assert_eq!(g.automaton().count_alive(EMPTY), result.path.len());
    }

    #[test]
    fn exhausted_budget_is_malformed_loop() {
        let params = Params {
            max_attempts: 0,
            ..Params::default()
        };
        let mut g = LoopMapGen::new(13, params).unwrap();
        let err = g.generate(&mut Zeros).unwrap_err();
        assert_eq!(err, GenError::MalformedLoop { attempts: 0, min_len: 13 });
    }
}
