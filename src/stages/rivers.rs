use log::info;

use crate::{
    engine::{Stage, StageContext},
    error::GenerationError,
    hydrology::{generate_rivers, RiverSettings},
    rng::StreamRng,
    tilemap::TileMap,
    world::StageReport,
};

pub struct RiverStage {
    settings: RiverSettings,
}

impl RiverStage {
    pub fn new(settings: RiverSettings) -> Self {
        Self { settings }
    }
}

impl Default for RiverStage {
    fn default() -> Self {
        Self::new(RiverSettings::default())
    }
}

impl Stage for RiverStage {
    fn name(&self) -> &str {
        "rivers"
    }

    fn run(
        &mut self,
        ctx: &StageContext,
        map: &mut TileMap,
        rng: &mut StreamRng<'_>,
    ) -> Result<StageReport, GenerationError> {
        let rivers = generate_rivers(map, ctx.levels.sea, &self.settings, rng)?;
        info!(
            "{}: carved {} rivers ({} tiles)",
            ctx.scenario_name,
            rivers.len(),
            rivers.iter().map(|r| r.carved).sum::<usize>()
        );
        Ok(StageReport::Rivers { rivers })
    }
}
