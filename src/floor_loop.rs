use crate::grid::{Grid, Vec2, clip_xy};
use crate::loop_gen::LoopResult;
use crate::rng::RandomSource;
use crate::tile::Tile;

/// Traversal state over a generated loop: where the player stands, how many
/// laps they have run, and which path cells are still free for spawns.
pub struct FloorLoop {
    tiles: Grid<Tile>,
    path: Vec<Vec2>,
    loop_start: Vec2,
    open_cells: Vec<Vec2>,
    player_index: usize,
    loop_count: u32,
}

impl FloorLoop {
    /// The player starts on the camp.
    ///
    /// # Panics
    ///
    /// Debug builds panic on an empty path. `generate` never produces one, but a
    /// hand-built or deserialized `LoopResult` can.
    pub fn new(result: LoopResult) -> Self {
        let LoopResult {
            tiles,
            path,
            loop_start,
        } = result;
        debug_assert!(!path.is_empty(), "a floor loop needs at least one path cell");
        let open_cells = path.iter().copied().filter(|&p| p != loop_start).collect();

        Self {
            tiles,
            path,
            loop_start,
            open_cells,
            player_index: 0,
            loop_count: 0,
        }
    }

    pub fn path(&self) -> &[Vec2] {
        &self.path
    }

    pub fn loop_start(&self) -> Vec2 {
        self.loop_start
    }

    pub fn tiles(&self) -> &Grid<Tile> {
        &self.tiles
    }

    pub fn player_position(&self) -> Vec2 {
        self.path[self.player_index]
    }

    pub fn player_tile(&self) -> Tile {
        let p = self.player_position();
        self.tiles.get(p.x as usize, p.y as usize)
    }

    /// Move one step along the path. Returns true when this completed a lap.
    pub fn advance_player(&mut self) -> bool {
        self.player_index += 1;
        let did_loop = self.player_index >= self.path.len();
        if did_loop {
            self.player_index = 0;
            self.loop_count += 1;
        }
        did_loop
    }

    pub fn loop_count(&self) -> u32 {
        self.loop_count
    }

    pub fn tile_at(&self, x: i32, y: i32) -> Option<&Tile> {
        let (x, y) = clip_xy(x, y, self.tiles.width(), self.tiles.height())?;
        self.tiles.elements().get(self.tiles.idx(x, y))
    }

    /// Take a random free path cell, never the camp and never the player's cell.
    pub fn claim_spawn_location<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> Option<Vec2> {
        let player = self.player_position();
        let eligible: Vec<usize> = (0..self.open_cells.len())
            .filter(|&i| self.open_cells[i] != player)
            .collect();
        if eligible.is_empty() {
            return None;
        }

        let i = eligible[rng.below(eligible.len())];
        Some(self.open_cells.swap_remove(i))
    }

    /// Hand a claimed cell back to the free set.
    pub fn release_location(&mut self, loc: Vec2) {
        if loc != self.loop_start && self.path.contains(&loc) && !self.open_cells.contains(&loc) {
            self.open_cells.push(loc);
        }
    }

    pub fn open_cell_count(&self) -> usize {
        self.open_cells.len()
    }
}
