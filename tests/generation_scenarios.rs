//! End-to-end checks of the generation building blocks through the public API.

use cartoglyph::{
    heightfield::{synthesize, HeightField},
    hydrology::{apply_ocean_fill, carve_river, generate_rivers, ocean_mask, Mouth, RiverSettings},
    settlement::{plan_settlement, select_center, shoreline, HeightBand, OccupantCounts},
    tilemap::{Coord, OccupantKind, TileMap},
    GenerationError,
};
use rand::rngs::mock::StepRng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

#[test]
fn flat_random_source_gives_hand_computable_field() {
    // Every draw is exactly 0.5, so every perturbation is zero.
    let mut rng = StepRng::new(1 << 63, 0);
    let field = synthesize(5, 4, &mut rng).unwrap();
    for row in 0..5 {
        for col in 0..5 {
            assert_eq!(field.get(row, col), Some(0.5));
        }
    }
}

#[test]
fn synthesis_fills_grids_of_every_valid_size() {
    for k in 1..=7 {
        let dimension = (1 << k) + 1;
        let field = synthesize(dimension, 1 << (k - 1), &mut ChaCha8Rng::seed_from_u64(k)).unwrap();
        assert_eq!(field.values().len(), dimension * dimension);
        assert!(field.values().iter().all(|v| v.is_finite()));
    }
}

#[test]
fn perturbation_stays_within_its_bound() {
    // Corners pinned at 0.5: a square-pass cell can move at most 0.5 * step / n.
    let mut rng = ChaCha8Rng::seed_from_u64(31);
    let field = synthesize(3, 2, &mut rng).unwrap();
    let corners = [(0, 0), (0, 2), (2, 0), (2, 2)].map(|(r, c)| field.get(r, c).unwrap());
    let mean = corners.iter().sum::<f64>() / 4.0;
    let centre = field.get(1, 1).unwrap();
    assert!((centre - mean).abs() <= 0.5 * 2.0 / 3.0);
}

#[test]
fn ocean_fill_counts_thirty_cells() {
    let heights = HeightField::from_fn(10, |row, col| {
        if (row + col) % 3 == 0 && row * 10 + col < 90 {
            0.2
        } else {
            0.8
        }
    })
    .unwrap();
    let expected = ocean_mask(&heights, 0.4).iter().filter(|w| **w).count();
    assert_eq!(expected, 30);

    let mut map = TileMap::new(heights);
    assert_eq!(apply_ocean_fill(&mut map, 0.4).unwrap(), 30);
    assert_eq!(apply_ocean_fill(&mut map, 0.4).unwrap(), 30);
    assert_eq!(map.tiles().filter(|t| t.is_water()).count(), 30);
}

#[test]
fn river_down_a_ramp_is_a_straight_line() {
    // Rows fall from 0.9 at column 9 to 0.0 at column 0.
    let heights = HeightField::from_fn(11, |_, col| col as f64 / 10.0).unwrap();
    let mut map = TileMap::new(heights.clone());
    let river = carve_river(
        &mut map,
        Coord::new(5, 9),
        0.0,
        &RiverSettings::default(),
        &mut ChaCha8Rng::seed_from_u64(0),
    )
    .unwrap();

    assert_eq!(river.cells.len(), 9);
    assert_eq!(river.mouth, Mouth::Sea(Coord::new(5, 0)));
    for pair in river.cells.windows(2) {
        assert_eq!(pair[0].row, pair[1].row);
        assert_eq!(pair[0].col, pair[1].col + 1);
    }
    for &cell in &river.cells {
        let before = heights.get(cell.row, cell.col).unwrap();
        let after = map.elevation_at(cell).unwrap();
        if before < 0.9 {
            assert_eq!(after, before - 0.05);
            assert!(map.is_water(cell));
        } else {
            assert_eq!(after, before);
        }
    }
}

#[test]
fn random_terrain_rivers_respect_carving_rules() {
    let heights = synthesize(65, 32, &mut ChaCha8Rng::seed_from_u64(77)).unwrap();
    let mut map = TileMap::new(heights.clone());
    apply_ocean_fill(&mut map, 0.4).unwrap();
    let settings = RiverSettings {
        source_height: 0.6,
        source_probability: 0.05,
        ..RiverSettings::default()
    };
    let rivers =
        generate_rivers(&mut map, 0.4, &settings, &mut ChaCha8Rng::seed_from_u64(78)).unwrap();

    for river in &rivers {
        for (i, cell) in river.cells.iter().enumerate().skip(1) {
            assert!(
                river.cells[..i].iter().any(|prev| prev.manhattan(*cell) == 1),
                "river cell {cell:?} is detached"
            );
        }
    }
    // Cells touched by one river only: exactly one erosion step, or none at peaks.
    let mut touched = std::collections::HashMap::new();
    for river in &rivers {
        for &cell in &river.cells {
            *touched.entry(cell).or_insert(0usize) += 1;
        }
    }
    for (cell, times) in touched {
        if times != 1 {
            continue;
        }
        let before = heights.get(cell.row, cell.col).unwrap();
        let after = map.elevation_at(cell).unwrap();
        if before < 0.9 {
            assert_eq!(after, before - 0.05);
            assert!(map.is_water(cell));
        } else {
            assert_eq!(after, before);
        }
    }
}

#[test]
fn lone_water_cell_makes_a_plus_shaped_shore() {
    let heights = HeightField::from_rows(vec![
        vec![0.5, 0.5, 0.5],
        vec![0.5, 0.1, 0.5],
        vec![0.5, 0.5, 0.5],
    ])
    .unwrap();
    let mut map = TileMap::new(heights);
    apply_ocean_fill(&mut map, 0.4).unwrap();

    let mut shore = shoreline(&map);
    shore.sort();
    assert_eq!(
        shore,
        vec![
            Coord::new(0, 1),
            Coord::new(1, 0),
            Coord::new(1, 2),
            Coord::new(2, 1)
        ]
    );
}

#[test]
fn only_qualifying_shore_tile_wins_regardless_of_draws() {
    let heights = HeightField::from_rows(vec![
        vec![0.9, 0.8, 0.9, 0.9, 0.9],
        vec![0.9, 0.2, 0.6, 0.9, 0.9],
        vec![0.9, 0.75, 0.9, 0.9, 0.9],
        vec![0.9, 0.9, 0.9, 0.9, 0.9],
        vec![0.9, 0.9, 0.9, 0.9, 0.9],
    ])
    .unwrap();
    let mut map = TileMap::new(heights);
    apply_ocean_fill(&mut map, 0.4).unwrap();
    let shore = shoreline(&map);

    for seed in 0..10 {
        let centre = select_center(
            &map,
            &shore,
            HeightBand::default(),
            &mut ChaCha8Rng::seed_from_u64(seed),
        )
        .unwrap();
        assert_eq!(centre, Coord::new(1, 2));
    }
}

#[test]
fn settlement_failure_leaves_map_untouched() {
    let heights = HeightField::from_fn(9, |_, _| 0.5).unwrap();
    let mut map = TileMap::new(heights);
    let err = plan_settlement(
        &mut map,
        HeightBand::default(),
        8,
        OccupantCounts::default(),
        &mut ChaCha8Rng::seed_from_u64(1),
    )
    .unwrap_err();
    assert!(matches!(err, GenerationError::NoQualifyingSite { .. }));
    assert_eq!(map.occupant_count(), 0);
}

#[test]
fn settlement_places_house_then_humans() {
    let heights = HeightField::from_fn(17, |_, col| 0.32 + col as f64 * 0.04).unwrap();
    let mut map = TileMap::new(heights);
    apply_ocean_fill(&mut map, 0.4).unwrap();

    let settlement = plan_settlement(
        &mut map,
        HeightBand::default(),
        8,
        OccupantCounts::default(),
        &mut ChaCha8Rng::seed_from_u64(2),
    )
    .unwrap();
    let kinds: Vec<OccupantKind> = settlement.placements.iter().map(|p| p.kind).collect();
    assert_eq!(
        kinds,
        [OccupantKind::House, OccupantKind::Human, OccupantKind::Human]
    );
}
