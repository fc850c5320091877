use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    engine::{Engine, EngineBuilder, EngineSettings},
    error::GenerationError,
    heightfield::validate_dimensions,
    hydrology::RiverSettings,
    settlement::SettlementSettings,
    stages::{OceanFillStage, RiverStage, SettlementStage},
    terrain::Levels,
};

fn default_dimension() -> usize {
    257
}

fn default_feature_size() -> usize {
    128
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSettings {
    #[serde(default = "default_dimension")]
    pub dimension: usize,
    #[serde(default = "default_feature_size")]
    pub feature_size: usize,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            dimension: default_dimension(),
            feature_size: default_feature_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub seed: u64,
    #[serde(default)]
    pub map: MapSettings,
    #[serde(default)]
    pub levels: Levels,
    #[serde(default)]
    pub rivers: RiverSettings,
    #[serde(default)]
    pub settlements: SettlementSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Scenario {
    /// The coastal mountains preset: a 257×257 map with three settlements.
    pub fn coastal_mountains(seed: u64) -> Self {
        Self {
            name: "coastal_mountains".to_string(),
            description: None,
            seed,
            map: MapSettings::default(),
            levels: Levels::default(),
            rivers: RiverSettings::default(),
            settlements: SettlementSettings::default(),
            logging: LoggingConfig::default(),
        }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let scenario: Scenario = serde_yaml::from_str(text).context("Failed to parse scenario")?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<(), GenerationError> {
        validate_dimensions(self.map.dimension, self.map.feature_size)?;
        self.levels.validate()?;
        self.rivers.validate()?;
        self.settlements.validate()?;
        Ok(())
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            scenario_name: self.name.clone(),
            seed: self.seed,
            dimension: self.map.dimension,
            feature_size: self.map.feature_size,
            levels: self.levels,
        }
    }

    /// Ocean fill, then rivers, then settlements.
    pub fn build_engine(&self) -> Engine {
        EngineBuilder::new(self.engine_settings())
            .with_stage(OceanFillStage::new())
            .with_stage(RiverStage::new(self.rivers))
            .with_stage(SettlementStage::new(self.settlements))
            .build()
    }
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        scenario
            .validate()
            .with_context(|| format!("Invalid scenario {}", path.display()))?;
        Ok(scenario)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settlement::OccupantCount;

    #[test]
    fn minimal_yaml_takes_preset_defaults() {
        let scenario = Scenario::from_yaml_str("name: bare\nseed: 3\n").unwrap();
        let preset = Scenario::coastal_mountains(3);

        assert_eq!(scenario.map, preset.map);
        assert_eq!(scenario.levels, preset.levels);
        assert_eq!(scenario.rivers, preset.rivers);
        assert_eq!(scenario.settlements, preset.settlements);
        assert_eq!(scenario.logging.level, "info");
    }

    #[test]
    fn occupant_counts_accept_numbers_and_fractions() {
        let yaml = "
name: village
seed: 1
settlements:
  occupants:
    extra_houses: 0.25
    humans: 0
";
        let scenario = Scenario::from_yaml_str(yaml).unwrap();
        assert_eq!(
            scenario.settlements.occupants.extra_houses,
            OccupantCount::Fraction(0.25)
        );
        assert_eq!(scenario.settlements.occupants.humans, OccupantCount::Exact(0));
    }

    #[test]
    fn rejects_invalid_dimension() {
        let yaml = "name: broken\nseed: 1\nmap:\n  dimension: 100\n";
        let err = Scenario::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GenerationError>(),
            Some(GenerationError::InvalidDimension { dimension: 100 })
        ));
    }

    #[test]
    fn rejects_oversized_feature() {
        let yaml = "name: broken\nseed: 1\nmap:\n  dimension: 33\n  feature_size: 64\n";
        assert!(Scenario::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn rejects_unbounded_half_width() {
        let yaml = "name: sprawl\nseed: 1\nsettlements:\n  half_width: 9223372036854775807\n";
        let err = Scenario::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<GenerationError>(),
            Some(GenerationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_empty_band() {
        let mut scenario = Scenario::coastal_mountains(1);
        scenario.settlements.band.low = 0.7;
        assert!(matches!(
            scenario.validate(),
            Err(GenerationError::InvalidConfig(_))
        ));
    }
}
