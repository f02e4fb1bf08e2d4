use serde::{Deserialize, Serialize};

use crate::automaton::{EMPTY, FLOOR};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainKind {
    #[default]
    Empty,
    Floor,
    /// Automaton value outside the known tags.
    Error,
}

impl TerrainKind {
    pub fn from_cell(value: i32) -> Self {
        match value {
            EMPTY => TerrainKind::Empty,
            FLOOR => TerrainKind::Floor,
            _ => TerrainKind::Error,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingKind {
    #[default]
    None,
    Camp,
}

/// One cell of a generated floor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub x: i32,
    pub y: i32,
    pub terrain: TerrainKind,
    pub building: BuildingKind,
}

impl Tile {
    pub fn new(x: i32, y: i32, terrain: TerrainKind) -> Self {
        Self {
            x,
            y,
            terrain,
            building: BuildingKind::None,
        }
    }

    pub fn with_building(mut self, building: BuildingKind) -> Self {
        self.building = building;
        self
    }

    pub fn is_walkable(&self) -> bool {
        self.terrain == TerrainKind::Floor
    }

    /// Flavor text shown when the tile is inspected.
    pub fn description(&self) -> &'static str {
        match (self.building, self.terrain) {
            (BuildingKind::Camp, _) => "This is your camp.",
            (BuildingKind::None, TerrainKind::Floor) => "The floor. You can walk on this.",
            (BuildingKind::None, TerrainKind::Error) => "!!ERROR!!",
            (BuildingKind::None, TerrainKind::Empty) => "",
        }
    }
}
