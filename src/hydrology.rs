//! Ocean flooding and river carving.

use std::collections::HashSet;

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::heightfield::HeightField;
use crate::tilemap::{Coord, TileMap, WaterKind};

fn default_source_height() -> f64 {
    0.75
}

fn default_source_probability() -> f64 {
    0.001
}

fn default_erosion_depth() -> f64 {
    0.05
}

fn default_peak_height() -> f64 {
    0.9
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiverSettings {
    /// Cells strictly above this elevation are candidate sources.
    #[serde(default = "default_source_height")]
    pub source_height: f64,
    /// Independent chance that a candidate source spawns a river.
    #[serde(default = "default_source_probability")]
    pub source_probability: f64,
    #[serde(default = "default_erosion_depth")]
    pub erosion_depth: f64,
    /// Path cells at or above this elevation are left uncarved.
    #[serde(default = "default_peak_height")]
    pub peak_height: f64,
}

impl Default for RiverSettings {
    fn default() -> Self {
        Self {
            source_height: default_source_height(),
            source_probability: default_source_probability(),
            erosion_depth: default_erosion_depth(),
            peak_height: default_peak_height(),
        }
    }
}

impl RiverSettings {
    pub fn validate(&self) -> Result<(), GenerationError> {
        if !self.source_height.is_finite() || !self.peak_height.is_finite() {
            return Err(GenerationError::InvalidConfig(format!(
                "river source height {} and peak height {} must be finite",
                self.source_height, self.peak_height
            )));
        }
        if !(0.0..=1.0).contains(&self.source_probability) {
            return Err(GenerationError::InvalidConfig(format!(
                "river source probability {} is outside [0, 1]",
                self.source_probability
            )));
        }
        if !self.erosion_depth.is_finite() || self.erosion_depth < 0.0 {
            return Err(GenerationError::InvalidConfig(format!(
                "river erosion depth {} must be a non-negative number",
                self.erosion_depth
            )));
        }
        Ok(())
    }
}

/// Cells strictly below `sea_level`, row-major.
pub fn ocean_mask(heights: &HeightField, sea_level: f64) -> Vec<bool> {
    heights.values().iter().map(|&h| h < sea_level).collect()
}

/// Marks every cell below `sea_level` as ocean. River water is never cleared.
///
/// Returns the number of ocean cells.
pub fn apply_ocean_fill(map: &mut TileMap, sea_level: f64) -> Result<usize, GenerationError> {
    let dimension = map.dimension() as i64;
    let mask = ocean_mask(map.heights(), sea_level);
    let mut flooded = 0;
    for (idx, _) in mask.iter().enumerate().filter(|(_, &wet)| wet) {
        let coord = Coord::new(idx as i64 / dimension, idx as i64 % dimension);
        map.set_water(coord, WaterKind::Ocean)?;
        flooded += 1;
    }
    Ok(flooded)
}

/// Where a river walk stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mouth {
    /// Reached a cell at or below sea level.
    Sea(Coord),
    /// Selected a candidate beyond the map edge.
    OffMap(Coord),
    /// Ran out of candidates.
    Enclosed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiverPath {
    pub source: Coord,
    /// Visited cells in walk order; the mouth is not included.
    pub cells: Vec<Coord>,
    pub mouth: Mouth,
    /// Cells that were lowered and flagged as river.
    pub carved: usize,
}

/// Walks greedily downhill from `source` and carves the visited cells.
///
/// Each step moves to the lowest cell on the whole frontier, not only the
/// current cell's neighbours, so a river can back out of a pit. Off-map
/// frontier entries draw a fresh random key in `[0, 1)` each step and
/// compete with on-map elevations on that key.
pub fn carve_river<R: Rng + ?Sized>(
    map: &mut TileMap,
    source: Coord,
    sea_level: f64,
    settings: &RiverSettings,
    rng: &mut R,
) -> Result<RiverPath, GenerationError> {
    map.tile_checked(source)?;

    let mut cells = Vec::new();
    let mut seen: HashSet<u64> = HashSet::from([source.packed()]);
    let mut frontier: Vec<Coord> = Vec::new();
    let mut current = source;

    let mouth = loop {
        match map.elevation_at(current) {
            Some(elevation) if elevation > sea_level => {}
            Some(_) => break Mouth::Sea(current),
            None => break Mouth::OffMap(current),
        }

        cells.push(current);
        // Off-map neighbours join the frontier too and can end the walk.
        for neighbor in current.orthogonal() {
            if seen.insert(neighbor.packed()) {
                frontier.push(neighbor);
            }
        }

        match lowest_candidate(map, &frontier, rng) {
            Some(idx) => current = frontier.remove(idx),
            None => break Mouth::Enclosed,
        }
    };

    let mut carved = 0;
    for &cell in &cells {
        let Some(elevation) = map.elevation_at(cell) else {
            continue;
        };
        if elevation >= settings.peak_height {
            continue;
        }
        map.lower_elevation(cell, settings.erosion_depth)?;
        if !map.is_water(cell) {
            map.set_water(cell, WaterKind::River)?;
        }
        carved += 1;
    }

    debug!(
        "river from ({}, {}) ran {} cells, carved {}, mouth {:?}",
        source.row,
        source.col,
        cells.len(),
        carved,
        mouth
    );

    Ok(RiverPath {
        source,
        cells,
        mouth,
        carved,
    })
}

/// Earliest frontier entry with the smallest key wins ties.
fn lowest_candidate<R: Rng + ?Sized>(
    map: &TileMap,
    frontier: &[Coord],
    rng: &mut R,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &coord) in frontier.iter().enumerate() {
        let key = match map.elevation_at(coord) {
            Some(elevation) => elevation,
            None => rng.gen::<f64>(),
        };
        if best.map_or(true, |(_, lowest)| key.total_cmp(&lowest).is_lt()) {
            best = Some((idx, key));
        }
    }
    best.map(|(idx, _)| idx)
}

/// Cells strictly above `threshold`, row-major.
pub fn high_points(heights: &HeightField, threshold: f64) -> Vec<Coord> {
    let dimension = heights.dimension() as i64;
    heights
        .values()
        .iter()
        .enumerate()
        .filter(|(_, &h)| h > threshold)
        .map(|(idx, _)| Coord::new(idx as i64 / dimension, idx as i64 % dimension))
        .collect()
}

/// Rolls every high point once and carves a river from the ones that hit.
///
/// Sources are collected before any carving, so a cell eroded by an earlier
/// river is still rolled.
pub fn generate_rivers<R: Rng + ?Sized>(
    map: &mut TileMap,
    sea_level: f64,
    settings: &RiverSettings,
    rng: &mut R,
) -> Result<Vec<RiverPath>, GenerationError> {
    settings.validate()?;
    let sources = high_points(map.heights(), settings.source_height);
    debug!(
        "{} candidate river sources above {}",
        sources.len(),
        settings.source_height
    );

    let mut rivers = Vec::new();
    for source in sources {
        if rng.gen_bool(settings.source_probability) {
            rivers.push(carve_river(map, source, sea_level, settings, rng)?);
        }
    }
    Ok(rivers)
}
