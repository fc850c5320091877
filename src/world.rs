use serde::Serialize;

use crate::hydrology::RiverPath;
use crate::settlement::Settlement;
use crate::terrain::{Levels, TerrainCensus};
use crate::tilemap::{MapView, TileMap};

/// What one pipeline stage produced.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum StageReport {
    Heightfield {
        dimension: usize,
        feature_size: usize,
        min_elevation: f64,
        max_elevation: f64,
    },
    OceanFill {
        sea_level: f64,
        ocean_tiles: usize,
    },
    Rivers {
        rivers: Vec<RiverPath>,
    },
    Settlements {
        settlements: Vec<Settlement>,
        retries: usize,
    },
}

impl StageReport {
    pub fn name(&self) -> &'static str {
        match self {
            StageReport::Heightfield { .. } => "heightfield",
            StageReport::OceanFill { .. } => "ocean_fill",
            StageReport::Rivers { .. } => "rivers",
            StageReport::Settlements { .. } => "settlements",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RiverSummary {
    pub count: usize,
    pub carved_tiles: usize,
    pub longest: usize,
}

#[derive(Debug, Serialize)]
pub struct MapSummary {
    pub scenario: String,
    pub seed: u64,
    pub dimension: usize,
    pub min_elevation: f64,
    pub max_elevation: f64,
    pub terrain: TerrainCensus,
    pub rivers: RiverSummary,
    pub settlements: Vec<Settlement>,
}

/// A finished map. Collaborators only get read access to the tiles.
pub struct GeneratedMap {
    scenario: String,
    seed: u64,
    levels: Levels,
    map: TileMap,
    reports: Vec<StageReport>,
}

impl GeneratedMap {
    pub(crate) fn new(
        scenario: String,
        seed: u64,
        levels: Levels,
        map: TileMap,
        reports: Vec<StageReport>,
    ) -> Self {
        Self {
            scenario,
            seed,
            levels,
            map,
            reports,
        }
    }

    pub fn map(&self) -> &TileMap {
        &self.map
    }

    pub fn view(&self) -> &dyn MapView {
        &self.map
    }

    pub fn into_map(self) -> TileMap {
        self.map
    }

    pub fn levels(&self) -> &Levels {
        &self.levels
    }

    pub fn reports(&self) -> &[StageReport] {
        &self.reports
    }

    pub fn rivers(&self) -> impl Iterator<Item = &RiverPath> {
        self.reports.iter().flat_map(|report| match report {
            StageReport::Rivers { rivers } => rivers.as_slice(),
            _ => &[],
        })
    }

    pub fn settlements(&self) -> impl Iterator<Item = &Settlement> {
        self.reports.iter().flat_map(|report| match report {
            StageReport::Settlements { settlements, .. } => settlements.as_slice(),
            _ => &[],
        })
    }

    pub fn summary(&self) -> MapSummary {
        let (min_elevation, max_elevation) = self.map.heights().min_max();
        MapSummary {
            scenario: self.scenario.clone(),
            seed: self.seed,
            dimension: self.map.dimension(),
            min_elevation,
            max_elevation,
            terrain: self.map.census(&self.levels),
            rivers: RiverSummary {
                count: self.rivers().count(),
                carved_tiles: self.rivers().map(|r| r.carved).sum(),
                longest: self.rivers().map(|r| r.cells.len()).max().unwrap_or(0),
            },
            settlements: self.settlements().cloned().collect(),
        }
    }
}
