use log::info;

use crate::{
    error::GenerationError,
    heightfield::{synthesize, validate_dimensions},
    rng::{RngManager, StreamRng},
    terrain::Levels,
    tilemap::TileMap,
    world::{GeneratedMap, StageReport},
};

const HEIGHTFIELD_STREAM: &str = "heightfield";

pub struct EngineSettings {
    pub scenario_name: String,
    pub seed: u64,
    pub dimension: usize,
    pub feature_size: usize,
    pub levels: Levels,
}

pub struct EngineBuilder {
    settings: EngineSettings,
    stages: Vec<Box<dyn Stage>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            stages: Vec::new(),
        }
    }

    pub fn with_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            stages: self.stages,
            settings: self.settings,
        }
    }
}

/// Synthesizes a height field, wraps it in a tile map and runs every stage
/// over it in order.
pub struct Engine {
    stages: Vec<Box<dyn Stage>>,
    settings: EngineSettings,
}

impl Engine {
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn generate(&mut self) -> Result<GeneratedMap, GenerationError> {
        self.generate_with_hook(|_| {})
    }

    /// Runs the pipeline, calling `hook` after each stage completes.
    ///
    /// Random streams are re-derived from the seed on every call, so repeated
    /// calls produce the same map.
    pub fn generate_with_hook<F>(&mut self, mut hook: F) -> Result<GeneratedMap, GenerationError>
    where
        F: FnMut(&StageReport),
    {
        let settings = &self.settings;
        settings
            .levels
            .validate()
            .and_then(|_| validate_dimensions(settings.dimension, settings.feature_size))
            .map_err(|err| err.in_stage(HEIGHTFIELD_STREAM))?;

        let mut rng = RngManager::new(settings.seed);
        info!(
            "generating '{}' ({}x{}, feature size {}, seed {})",
            settings.scenario_name,
            settings.dimension,
            settings.dimension,
            settings.feature_size,
            settings.seed
        );

        let heights = synthesize(
            settings.dimension,
            settings.feature_size,
            &mut rng.stream(HEIGHTFIELD_STREAM),
        )
        .map_err(|err| err.in_stage(HEIGHTFIELD_STREAM))?;
        let (min_elevation, max_elevation) = heights.min_max();
        let mut reports = vec![StageReport::Heightfield {
            dimension: settings.dimension,
            feature_size: settings.feature_size,
            min_elevation,
            max_elevation,
        }];
        hook(&reports[0]);

        let mut map = TileMap::new(heights);
        let ctx = StageContext {
            scenario_name: &settings.scenario_name,
            levels: &settings.levels,
        };
        for stage in self.stages.iter_mut() {
            let mut stream = rng.stream(stage.name());
            let report = stage
                .run(&ctx, &mut map, &mut stream)
                .map_err(|err| err.in_stage(stage.name()))?;
            info!("stage '{}' complete", stage.name());
            hook(&report);
            reports.push(report);
        }

        Ok(GeneratedMap::new(
            settings.scenario_name.clone(),
            settings.seed,
            settings.levels,
            map,
            reports,
        ))
    }
}

pub struct StageContext<'a> {
    pub scenario_name: &'a str,
    pub levels: &'a Levels,
}

pub trait Stage {
    fn name(&self) -> &str;
    fn run(
        &mut self,
        ctx: &StageContext,
        map: &mut TileMap,
        rng: &mut StreamRng<'_>,
    ) -> Result<StageReport, GenerationError>;
}
