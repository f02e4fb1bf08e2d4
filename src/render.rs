use rayon::prelude::*;

use crate::grid::{Grid, Vec2};
use crate::tile::{BuildingKind, TerrainKind, Tile};

const VOID: [u8; 4] = [18, 20, 28, 255];
const FLOOR: [u8; 4] = [196, 176, 128, 255];
const ERROR: [u8; 4] = [255, 0, 255, 255];
const CAMP: [u8; 4] = [200, 60, 40, 255];
const PATH_HEAD: [u8; 4] = [250, 230, 90, 255];
const PATH_TAIL: [u8; 4] = [40, 90, 200, 255];

#[inline]
fn lerp_color(a: [u8; 4], b: [u8; 4], t: f32) -> [u8; 4] {
    let t = t.clamp(0.0, 1.0);
    [
        (a[0] as f32 + (b[0] as f32 - a[0] as f32) * t).round() as u8,
        (a[1] as f32 + (b[1] as f32 - a[1] as f32) * t).round() as u8,
        (a[2] as f32 + (b[2] as f32 - a[2] as f32) * t).round() as u8,
        255,
    ]
}

fn tile_color(tile: &Tile) -> [u8; 4] {
    if tile.building == BuildingKind::Camp {
        return CAMP;
    }
    match tile.terrain {
        TerrainKind::Empty => VOID,
        TerrainKind::Floor => FLOOR,
        TerrainKind::Error => ERROR,
    }
}

/// Paint a per-cell color grid at `scale` pixels per cell.
fn rasterize(colors: &Grid<[u8; 4]>, scale: usize) -> Vec<u8> {
    let scale = scale.max(1);
    let w = colors.width() * scale;
    let h = colors.height() * scale;
    let mut rgba = vec![0u8; w * h * 4];

    rgba.par_chunks_mut(w * 4).enumerate().for_each(|(py, row)| {
        let y = py / scale;
        for px in 0..w {
            let color = colors.get(px / scale, y);
            row[px * 4..px * 4 + 4].copy_from_slice(&color);
        }
    });

    rgba
}

/// Terrain and camp, as the game sees them.
pub fn render_tiles(tiles: &Grid<Tile>, scale: usize) -> Vec<u8> {
    let mut colors = Grid::new(tiles.width(), tiles.height());
    for (i, tile) in tiles.elements().iter().enumerate() {
        colors.seti(i, tile_color(tile));
    }
    rasterize(&colors, scale)
}

/// Diagnostic: path cells shaded by traversal order, camp on top.
pub fn render_path(tiles: &Grid<Tile>, path: &[Vec2], scale: usize) -> Vec<u8> {
    let mut colors = Grid::new(tiles.width(), tiles.height());
    colors.fill(VOID);

    let last = path.len().saturating_sub(1).max(1) as f32;
    for (i, p) in path.iter().enumerate() {
        colors.set(p.x as usize, p.y as usize, lerp_color(PATH_HEAD, PATH_TAIL, i as f32 / last));
    }
    if let Some(start) = path.first() {
        colors.set(start.x as usize, start.y as usize, CAMP);
    }

    rasterize(&colors, scale)
}
