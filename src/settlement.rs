//! Shoreline detection and settlement siting.

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::tilemap::{Coord, OccupantId, OccupantKind, Tile, TileMap};

/// Far wider than any map a 2^k + 1 grid can hold in memory.
pub const MAX_HALF_WIDTH: usize = 1 << 20;

fn default_band_low() -> f64 {
    0.4
}

fn default_band_high() -> f64 {
    0.7
}

fn default_settlement_count() -> usize {
    3
}

fn default_half_width() -> usize {
    8
}

fn default_max_attempts() -> usize {
    8
}

fn default_humans() -> OccupantCount {
    OccupantCount::Exact(2)
}

/// Open elevation interval a settlement centre must fall in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightBand {
    #[serde(default = "default_band_low")]
    pub low: f64,
    #[serde(default = "default_band_high")]
    pub high: f64,
}

impl Default for HeightBand {
    fn default() -> Self {
        Self {
            low: default_band_low(),
            high: default_band_high(),
        }
    }
}

impl HeightBand {
    pub fn contains(&self, elevation: f64) -> bool {
        self.low < elevation && elevation < self.high
    }
}

/// Either a fixed number of occupants or a fraction of the tiles still free
/// in the candidate pool when that group is placed (rounded down).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OccupantCount {
    Exact(usize),
    Fraction(f64),
}

impl OccupantCount {
    fn resolve(self, free: usize) -> usize {
        match self {
            OccupantCount::Exact(count) => count,
            OccupantCount::Fraction(fraction) => (free as f64 * fraction).floor() as usize,
        }
    }

    fn validate(self, label: &str) -> Result<(), GenerationError> {
        match self {
            OccupantCount::Fraction(fraction) if !(0.0..=1.0).contains(&fraction) => {
                Err(GenerationError::InvalidConfig(format!(
                    "{label} fraction {fraction} is outside [0, 1]"
                )))
            }
            _ => Ok(()),
        }
    }
}

/// One house is always placed first; these are placed after it, houses first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OccupantCounts {
    #[serde(default = "OccupantCounts::no_extra_houses")]
    pub extra_houses: OccupantCount,
    #[serde(default = "default_humans")]
    pub humans: OccupantCount,
}

impl OccupantCounts {
    fn no_extra_houses() -> OccupantCount {
        OccupantCount::Exact(0)
    }
}

impl Default for OccupantCounts {
    fn default() -> Self {
        Self {
            extra_houses: Self::no_extra_houses(),
            humans: default_humans(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SettlementSettings {
    #[serde(default = "default_settlement_count")]
    pub count: usize,
    #[serde(default)]
    pub band: HeightBand,
    #[serde(default = "default_half_width")]
    pub half_width: usize,
    #[serde(default)]
    pub occupants: OccupantCounts,
    /// Tries per settlement when the chosen site has too little land.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

impl Default for SettlementSettings {
    fn default() -> Self {
        Self {
            count: default_settlement_count(),
            band: HeightBand::default(),
            half_width: default_half_width(),
            occupants: OccupantCounts::default(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl SettlementSettings {
    pub fn validate(&self) -> Result<(), GenerationError> {
        if !(self.band.low.is_finite() && self.band.high.is_finite())
            || self.band.low >= self.band.high
        {
            return Err(GenerationError::InvalidConfig(format!(
                "settlement band ({}, {}) is empty",
                self.band.low, self.band.high
            )));
        }
        if self.half_width > MAX_HALF_WIDTH {
            return Err(GenerationError::InvalidConfig(format!(
                "settlement half_width {} exceeds {}",
                self.half_width, MAX_HALF_WIDTH
            )));
        }
        if self.max_attempts == 0 {
            return Err(GenerationError::InvalidConfig(
                "settlement max_attempts must be at least 1".into(),
            ));
        }
        self.occupants.extra_houses.validate("extra_houses")?;
        self.occupants.humans.validate("humans")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub id: OccupantId,
    pub kind: OccupantKind,
    pub coord: Coord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settlement {
    pub center: Coord,
    pub placements: Vec<Placement>,
}

/// A dry tile with at least one orthogonal water neighbour.
pub fn is_shore(map: &TileMap, coord: Coord) -> bool {
    match map.tile(coord) {
        Some(tile) if !tile.is_water() => map.neighbors(coord).any(Tile::is_water),
        _ => false,
    }
}

pub fn shoreline(map: &TileMap) -> Vec<Coord> {
    map.tiles()
        .map(|tile| tile.coord())
        .filter(|&coord| is_shore(map, coord))
        .collect()
}

/// Picks a shoreline tile strictly inside `band`, uniformly at random.
pub fn select_center<R: Rng + ?Sized>(
    map: &TileMap,
    shoreline: &[Coord],
    band: HeightBand,
    rng: &mut R,
) -> Result<Coord, GenerationError> {
    let qualifying: Vec<Coord> = shoreline
        .iter()
        .copied()
        .filter(|&coord| map.elevation_at(coord).is_some_and(|h| band.contains(h)))
        .collect();
    qualifying
        .choose(rng)
        .copied()
        .ok_or(GenerationError::NoQualifyingSite {
            low: band.low,
            high: band.high,
        })
}

/// Free land tiles in the square `[c - half_width, c + half_width]` on both axes.
pub fn candidate_pool(map: &TileMap, center: Coord, half_width: usize) -> Vec<Coord> {
    let last = map.dimension() as i64 - 1;
    let reach = i64::try_from(half_width).unwrap_or(i64::MAX);
    let span = |c: i64| c.saturating_sub(reach).max(0)..=c.saturating_add(reach).min(last);
    let mut pool = Vec::new();
    for row in span(center.row) {
        for col in span(center.col) {
            if let Some(tile) = map.tile(Coord::new(row, col)) {
                if !tile.is_water() && tile.occupant().is_none() {
                    pool.push(tile.coord());
                }
            }
        }
    }
    pool
}

/// Places one house, then the extra houses, then the humans, each on a
/// distinct tile drawn from the pool without replacement.
///
/// Nothing is written to the map unless every occupant fits.
pub fn place_structures<R: Rng + ?Sized>(
    map: &mut TileMap,
    center: Coord,
    half_width: usize,
    counts: OccupantCounts,
    rng: &mut R,
) -> Result<Vec<Placement>, GenerationError> {
    let mut pool = candidate_pool(map, center, half_width);
    if pool.is_empty() {
        return Err(GenerationError::InsufficientCandidates {
            needed: 1,
            available: 0,
        });
    }

    let extra_houses = counts.extra_houses.resolve(pool.len() - 1);
    let free_after_houses = (pool.len() - 1).saturating_sub(extra_houses);
    let humans = counts.humans.resolve(free_after_houses);
    let needed = extra_houses.saturating_add(humans).saturating_add(1);
    if needed > pool.len() {
        return Err(GenerationError::InsufficientCandidates {
            needed,
            available: pool.len(),
        });
    }

    let kinds = std::iter::repeat(OccupantKind::House)
        .take(1 + extra_houses)
        .chain(std::iter::repeat(OccupantKind::Human).take(humans));
    let mut placements = Vec::with_capacity(needed);
    for kind in kinds {
        let coord = pool.swap_remove(rng.gen_range(0..pool.len()));
        let id = map.place_occupant(coord, kind)?;
        placements.push(Placement { id, kind, coord });
    }
    Ok(placements)
}

/// Sites one settlement on the coast and populates it.
pub fn plan_settlement<R: Rng + ?Sized>(
    map: &mut TileMap,
    band: HeightBand,
    half_width: usize,
    counts: OccupantCounts,
    rng: &mut R,
) -> Result<Settlement, GenerationError> {
    let shore = shoreline(map);
    let center = select_center(map, &shore, band, rng)?;
    let placements = place_structures(map, center, half_width, counts, rng)?;
    debug!(
        "settlement at ({}, {}) with {} occupants from {} shoreline tiles",
        center.row,
        center.col,
        placements.len(),
        shore.len()
    );
    Ok(Settlement { center, placements })
}
