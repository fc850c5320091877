use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::tilemap::TileMap;

fn default_sea() -> f64 {
    0.4
}

fn default_sand() -> f64 {
    0.42
}

fn default_tree() -> f64 {
    0.7
}

fn default_glacier() -> f64 {
    0.85
}

/// Elevation thresholds that split the map into terrain bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Levels {
    #[serde(default = "default_sea")]
    pub sea: f64,
    #[serde(default = "default_sand")]
    pub sand: f64,
    #[serde(default = "default_tree")]
    pub tree: f64,
    #[serde(default = "default_glacier")]
    pub glacier: f64,
}

impl Default for Levels {
    fn default() -> Self {
        Self {
            sea: default_sea(),
            sand: default_sand(),
            tree: default_tree(),
            glacier: default_glacier(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainClass {
    Structure,
    Water,
    Sand,
    Forest,
    Rock,
    Glacier,
}

impl Levels {
    pub fn validate(&self) -> Result<(), GenerationError> {
        let ordered = [self.sea, self.sand, self.tree, self.glacier];
        if ordered.iter().any(|v| !v.is_finite()) {
            return Err(GenerationError::InvalidConfig(
                "terrain levels must be finite".into(),
            ));
        }
        if ordered.windows(2).any(|pair| pair[0] > pair[1]) {
            return Err(GenerationError::InvalidConfig(format!(
                "terrain levels must satisfy sea <= sand <= tree <= glacier (got {} / {} / {} / {})",
                self.sea, self.sand, self.tree, self.glacier
            )));
        }
        Ok(())
    }

    /// Elevation is unbounded, so the lowest and highest bands are open-ended.
    pub fn classify(&self, elevation: f64, water: bool, occupied: bool) -> TerrainClass {
        if occupied {
            TerrainClass::Structure
        } else if water {
            TerrainClass::Water
        } else if elevation < self.sand {
            TerrainClass::Sand
        } else if elevation < self.tree {
            TerrainClass::Forest
        } else if elevation < self.glacier {
            TerrainClass::Rock
        } else {
            TerrainClass::Glacier
        }
    }
}

/// Tile counts per terrain class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TerrainCensus {
    pub structure: usize,
    pub water: usize,
    pub sand: usize,
    pub forest: usize,
    pub rock: usize,
    pub glacier: usize,
}

impl TerrainCensus {
    pub fn total(&self) -> usize {
        self.structure + self.water + self.sand + self.forest + self.rock + self.glacier
    }

    fn record(&mut self, class: TerrainClass) {
        match class {
            TerrainClass::Structure => self.structure += 1,
            TerrainClass::Water => self.water += 1,
            TerrainClass::Sand => self.sand += 1,
            TerrainClass::Forest => self.forest += 1,
            TerrainClass::Rock => self.rock += 1,
            TerrainClass::Glacier => self.glacier += 1,
        }
    }
}

impl TileMap {
    pub fn census(&self, levels: &Levels) -> TerrainCensus {
        let mut census = TerrainCensus::default();
        for tile in self.tiles() {
            let elevation = self.elevation_at(tile.coord()).unwrap_or(f64::NAN);
            census.record(levels.classify(
                elevation,
                tile.is_water(),
                tile.occupant().is_some(),
            ));
        }
        census
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heightfield::HeightField;
    use crate::tilemap::{Coord, WaterKind};

    #[test]
    fn classify_follows_band_cascade() {
        let levels = Levels::default();
        assert_eq!(levels.classify(0.41, false, false), TerrainClass::Sand);
        assert_eq!(levels.classify(0.5, false, false), TerrainClass::Forest);
        assert_eq!(levels.classify(0.8, false, false), TerrainClass::Rock);
        assert_eq!(levels.classify(1.3, false, false), TerrainClass::Glacier);
        assert_eq!(levels.classify(-0.2, false, false), TerrainClass::Sand);
        assert_eq!(levels.classify(0.8, true, false), TerrainClass::Water);
        assert_eq!(levels.classify(0.8, true, true), TerrainClass::Structure);
    }

    #[test]
    fn rejects_unordered_levels() {
        let levels = Levels {
            sea: 0.5,
            sand: 0.45,
            ..Levels::default()
        };
        assert!(levels.validate().is_err());
        assert!(Levels::default().validate().is_ok());
    }

    #[test]
    fn census_covers_every_tile() {
        let heights = HeightField::from_fn(3, |row, _| row as f64 * 0.45).unwrap();
        let mut map = TileMap::new(heights);
        map.set_water(Coord::new(0, 0), WaterKind::Ocean).unwrap();

        let census = map.census(&Levels::default());
        assert_eq!(census.total(), 9);
        assert_eq!(census.water, 1);
        assert_eq!(census.sand, 2);
        assert_eq!(census.forest, 3);
        assert_eq!(census.glacier, 3);
    }
}
