use std::collections::HashSet;

use loopgen::config::Params;
use loopgen::error::GenError;
use loopgen::loop_gen::LoopResult;
use loopgen::{BuildingKind, FloorLoop, TerrainKind, Vec2};

/// Asserts every output invariant of a successful generation.
fn assert_valid_loop(result: &LoopResult, size: usize) {
    let path = &result.path;
    assert!(path.len() >= size, "path of {} is shorter than size {size}", path.len());
    assert!(path.len() < size * size, "path cannot cover the whole grid");
    assert_eq!(path[0], result.loop_start, "path must start at the camp");

    let unique: HashSet<Vec2> = path.iter().copied().collect();
    assert_eq!(unique.len(), path.len(), "path repeats a cell");

    for (i, p) in path.iter().enumerate() {
        let next = path[(i + 1) % path.len()];
        assert!(
            p.is_orthogonal_neighbor(next),
            "step {i}: {p} -> {next} is not a 4-connected move"
        );
    }

    assert_eq!(result.tiles.width(), size);
    assert_eq!(result.tiles.height(), size);
    let mut camps = 0;
    for tile in result.tiles.elements() {
        let here = Vec2::new(tile.x, tile.y);
        let on_path = unique.contains(&here);
        let expected = if on_path { TerrainKind::Floor } else { TerrainKind::Empty };
        assert_eq!(tile.terrain, expected, "tile {here} terrain disagrees with path");
        if tile.building == BuildingKind::Camp {
            camps += 1;
            assert_eq!(here, result.loop_start, "camp must sit on the loop start");
        }
    }
    assert_eq!(camps, 1, "exactly one camp");
}

fn is_fatal_generation_error(e: &GenError) -> bool {
    matches!(
        e,
        GenError::IsolatedStart { .. }
            | GenError::SearchBoundExceeded { .. }
            | GenError::MalformedLoop { .. }
    )
}

#[test]
fn seeded_generation_yields_closed_cycles() {
    for size in [13, 21, 31] {
        let mut successes = 0;
        for seed in 0..10 {
            match loopgen::generate(seed, size, &Params::default()) {
                Ok(result) => {
                    assert_valid_loop(&result, size);
                    successes += 1;
                }
                Err(e) => assert!(
                    is_fatal_generation_error(&e),
                    "size {size} seed {seed}: unexpected error {e}"
                ),
            }
        }
        assert!(successes > 0, "no seed produced a loop for size {size}");
    }
}

#[test]
fn same_seed_same_loop() {
    let a = loopgen::generate(42, 21, &Params::default());
    let b = loopgen::generate(42, 21, &Params::default());
    assert_eq!(a, b, "generation must be reproducible from the seed");
}

#[test]
fn undersized_grid_is_a_configuration_error() {
    let err = loopgen::generate(0, 3, &Params::default()).unwrap_err();
    assert_eq!(err, GenError::Configuration { size: 3, padding: 2 });
}

#[test]
fn injected_thread_rng_works() {
    let mut rng = rand::thread_rng();
    match loopgen::generate_with(17, &Params::default(), &mut rng) {
        Ok(result) => assert_valid_loop(&result, 17),
        Err(e) => assert!(is_fatal_generation_error(&e), "unexpected error {e}"),
    }
}

#[test]
fn result_round_trips_through_json() {
    let result = (0..10)
        .find_map(|seed| loopgen::generate(seed, 15, &Params::default()).ok())
        .expect("some seed generates a loop");

    let json = serde_json::to_string(&result).unwrap();
    let back: LoopResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, result, "tiles, path order and camp must survive serialization");
}

#[test]
fn walking_the_path_returns_to_camp() {
    let result = (0..10)
        .find_map(|seed| loopgen::generate(seed, 13, &Params::default()).ok())
        .expect("some seed generates a loop");
    let len = result.path.len();
    let mut floor = FloorLoop::new(result);

    assert_eq!(floor.player_tile().building, BuildingKind::Camp);
    let mut laps = 0;
    for _ in 0..len {
        if floor.advance_player() {
            laps += 1;
        }
    }
    assert_eq!(laps, 1);
    assert_eq!(floor.loop_count(), 1);
    assert_eq!(floor.player_position(), floor.loop_start());
    assert_eq!(floor.open_cell_count(), len - 1, "every path cell but the camp is open");
}
