pub mod automaton;
pub mod config;
pub mod error;
pub mod floor_loop;
pub mod grid;
pub mod loop_gen;
pub mod render;
pub mod rng;
pub mod tile;

use config::Params;
use error::GenError;
use loop_gen::{LoopMapGen, LoopResult};
use rng::{RandomSource, Rng};

pub use floor_loop::FloorLoop;
pub use grid::{Grid, Vec2};
pub use tile::{BuildingKind, TerrainKind, Tile};

/// Generate a `size`x`size` loop floor from a seed. Same seed, same floor.
pub fn generate(seed: u64, size: usize, params: &Params) -> Result<LoopResult, GenError> {
    generate_with(size, params, &mut Rng::new(seed))
}

/// Generate with a caller-supplied random source.
pub fn generate_with<R: RandomSource + ?Sized>(
    size: usize,
    params: &Params,
    rng: &mut R,
) -> Result<LoopResult, GenError> {
    LoopMapGen::new(size, params.clone())?.generate(rng)
}
