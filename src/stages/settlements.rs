use log::{info, warn};

use crate::{
    engine::{Stage, StageContext},
    error::GenerationError,
    rng::StreamRng,
    settlement::{plan_settlement, SettlementSettings},
    tilemap::TileMap,
    world::StageReport,
};

pub struct SettlementStage {
    settings: SettlementSettings,
}

impl SettlementStage {
    pub fn new(settings: SettlementSettings) -> Self {
        Self { settings }
    }
}

impl Default for SettlementStage {
    fn default() -> Self {
        Self::new(SettlementSettings::default())
    }
}

impl Stage for SettlementStage {
    fn name(&self) -> &str {
        "settlements"
    }

    /// A site with too little land is redrawn up to `max_attempts` times.
    /// An empty band fails at once since redrawing cannot help.
    fn run(
        &mut self,
        ctx: &StageContext,
        map: &mut TileMap,
        rng: &mut StreamRng<'_>,
    ) -> Result<StageReport, GenerationError> {
        let settings = self.settings;
        settings.validate()?;

        let mut settlements = Vec::with_capacity(settings.count);
        let mut retries = 0;
        for index in 0..settings.count {
            let mut attempt = 1;
            let settlement = loop {
                match plan_settlement(
                    map,
                    settings.band,
                    settings.half_width,
                    settings.occupants,
                    rng,
                ) {
                    Ok(settlement) => break settlement,
                    Err(err @ GenerationError::InsufficientCandidates { .. })
                        if attempt < settings.max_attempts =>
                    {
                        warn!(
                            "{}: settlement {} attempt {} failed: {}",
                            ctx.scenario_name, index, attempt, err
                        );
                        attempt += 1;
                        retries += 1;
                    }
                    Err(err) => return Err(err),
                }
            };
            settlements.push(settlement);
        }

        info!(
            "{}: placed {} settlements ({} occupants, {} retries)",
            ctx.scenario_name,
            settlements.len(),
            map.occupant_count(),
            retries
        );
        Ok(StageReport::Settlements {
            settlements,
            retries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heightfield::HeightField;
    use crate::hydrology::apply_ocean_fill;
    use crate::rng::RngManager;
    use crate::settlement::{OccupantCount, OccupantCounts};
    use crate::terrain::Levels;
    use crate::tilemap::Coord;

    const CRAMPED: Coord = Coord { row: 1, col: 1 };
    const ROOMY: Coord = Coord { row: 6, col: 6 };

    /// Two qualifying shore sites. With a half width of 1 the cove at
    /// (1, 1) has two free land tiles and the bay at (6, 6) has eight.
    fn two_site_map() -> TileMap {
        let heights = HeightField::from_fn(9, |row, col| match (row, col) {
            (1, 1) | (6, 6) => 0.5,
            (0, _) | (2, 0..=2) | (1, 0) | (6, 7) => 0.1,
            _ => 0.9,
        })
        .unwrap();
        let mut map = TileMap::new(heights);
        apply_ocean_fill(&mut map, Levels::default().sea).unwrap();
        map
    }

    fn stage_with_humans(humans: usize, max_attempts: usize) -> SettlementStage {
        SettlementStage::new(SettlementSettings {
            count: 1,
            half_width: 1,
            occupants: OccupantCounts {
                extra_houses: OccupantCount::Exact(0),
                humans: OccupantCount::Exact(humans),
            },
            max_attempts,
            ..SettlementSettings::default()
        })
    }

    fn run_stage(
        stage: &mut SettlementStage,
        map: &mut TileMap,
        seed: u64,
    ) -> Result<StageReport, GenerationError> {
        let levels = Levels::default();
        let ctx = StageContext {
            scenario_name: "two_sites",
            levels: &levels,
        };
        let mut rng = RngManager::new(seed);
        stage.run(&ctx, map, &mut rng.stream("settlements"))
    }

    #[test]
    fn cramped_site_is_redrawn_until_one_fits() {
        let mut saw_retry = false;
        for seed in 0..32 {
            let mut map = two_site_map();
            let mut stage = stage_with_humans(3, 64);
            let report = run_stage(&mut stage, &mut map, seed).unwrap();
            let (settlements, retries) = match report {
                StageReport::Settlements {
                    settlements,
                    retries,
                } => (settlements, retries),
                other => panic!("settlement stage produced {other:?}"),
            };
            assert_eq!(settlements.len(), 1);
            assert_eq!(settlements[0].center, ROOMY);
            assert_eq!(settlements[0].placements.len(), 4);
            assert_eq!(map.occupant_count(), 4);
            saw_retry |= retries > 0;
        }
        assert!(saw_retry, "no seed ever drew the cramped site first");
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let mut map = two_site_map();
        assert!(map.tile(CRAMPED).is_some_and(|t| !t.is_water()));

        let mut stage = stage_with_humans(10, 3);
        let err = run_stage(&mut stage, &mut map, 5).unwrap_err();
        assert!(matches!(
            err,
            GenerationError::InsufficientCandidates { needed: 11, .. }
        ));
        assert_eq!(map.occupant_count(), 0);
    }
}
