use log::info;

use crate::{
    engine::{Stage, StageContext},
    error::GenerationError,
    hydrology::apply_ocean_fill,
    rng::StreamRng,
    tilemap::TileMap,
    world::StageReport,
};

pub struct OceanFillStage;

impl OceanFillStage {
    pub fn new() -> Self {
        Self
    }
}

impl Default for OceanFillStage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for OceanFillStage {
    fn name(&self) -> &str {
        "ocean_fill"
    }

    fn run(
        &mut self,
        ctx: &StageContext,
        map: &mut TileMap,
        _rng: &mut StreamRng<'_>,
    ) -> Result<StageReport, GenerationError> {
        let sea_level = ctx.levels.sea;
        let ocean_tiles = apply_ocean_fill(map, sea_level)?;
        info!(
            "{}: {} of {} tiles below sea level {}",
            ctx.scenario_name,
            ocean_tiles,
            map.dimension() * map.dimension(),
            sea_level
        );
        Ok(StageReport::OceanFill {
            sea_level,
            ocean_tiles,
        })
    }
}
