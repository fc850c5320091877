//! Tile grid wrapped around a height field.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::heightfield::HeightField;

/// Grid coordinate. Signed so that off-map neighbours can be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: i64,
    pub col: i64,
}

impl Coord {
    pub const fn new(row: i64, col: i64) -> Self {
        Self { row, col }
    }

    /// Up, down, left, right. Entries may lie off the map.
    pub fn orthogonal(self) -> [Coord; 4] {
        [
            Coord::new(self.row - 1, self.col),
            Coord::new(self.row + 1, self.col),
            Coord::new(self.row, self.col - 1),
            Coord::new(self.row, self.col + 1),
        ]
    }

    pub fn surrounding(self) -> [Coord; 8] {
        [
            Coord::new(self.row - 1, self.col - 1),
            Coord::new(self.row - 1, self.col),
            Coord::new(self.row - 1, self.col + 1),
            Coord::new(self.row, self.col - 1),
            Coord::new(self.row, self.col + 1),
            Coord::new(self.row + 1, self.col - 1),
            Coord::new(self.row + 1, self.col),
            Coord::new(self.row + 1, self.col + 1),
        ]
    }

    /// Packs both axes into one key for hash-set membership.
    pub fn packed(self) -> u64 {
        ((self.row as i32 as u32 as u64) << 32) | (self.col as i32 as u32 as u64)
    }

    pub fn manhattan(self, other: Coord) -> u64 {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterKind {
    #[default]
    Dry,
    Ocean,
    River,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OccupantId(u64);

impl OccupantId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccupantKind {
    House,
    Human,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Occupant {
    pub id: OccupantId,
    pub kind: OccupantKind,
}

#[derive(Debug, Clone)]
pub struct Tile {
    coord: Coord,
    water: WaterKind,
    occupant: Option<Occupant>,
}

impl Tile {
    pub fn coord(&self) -> Coord {
        self.coord
    }

    pub fn water(&self) -> WaterKind {
        self.water
    }

    pub fn is_water(&self) -> bool {
        self.water != WaterKind::Dry
    }

    pub fn occupant(&self) -> Option<Occupant> {
        self.occupant
    }
}

/// Read-only view handed to rendering and simulation collaborators.
pub trait MapView {
    fn dimension(&self) -> usize;
    fn elevation(&self, coord: Coord) -> Option<f64>;
    fn water(&self, coord: Coord) -> Option<WaterKind>;
    fn occupant(&self, coord: Coord) -> Option<Occupant>;
}

/// Owns the height field and one tile per cell.
#[derive(Debug, Clone)]
pub struct TileMap {
    heights: HeightField,
    tiles: Vec<Tile>,
    next_occupant: u64,
    locations: HashMap<OccupantId, Coord>,
}

impl TileMap {
    pub fn new(heights: HeightField) -> Self {
        let n = heights.dimension() as i64;
        let mut tiles = Vec::with_capacity((n * n) as usize);
        for row in 0..n {
            for col in 0..n {
                tiles.push(Tile {
                    coord: Coord::new(row, col),
                    water: WaterKind::Dry,
                    occupant: None,
                });
            }
        }
        Self {
            heights,
            tiles,
            next_occupant: 0,
            locations: HashMap::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.heights.dimension()
    }

    pub fn heights(&self) -> &HeightField {
        &self.heights
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.heights.contains(coord.row, coord.col)
    }

    pub fn tile(&self, coord: Coord) -> Option<&Tile> {
        self.index(coord).map(|idx| &self.tiles[idx])
    }

    pub fn tile_checked(&self, coord: Coord) -> Result<&Tile, GenerationError> {
        self.tile(coord).ok_or_else(|| self.out_of_bounds(coord))
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn elevation_at(&self, coord: Coord) -> Option<f64> {
        self.heights.get(coord.row, coord.col)
    }

    /// Off-map coordinates are never water.
    pub fn is_water(&self, coord: Coord) -> bool {
        self.tile(coord).is_some_and(Tile::is_water)
    }

    /// In-bounds orthogonal neighbours.
    pub fn neighbors(&self, coord: Coord) -> impl Iterator<Item = &Tile> + '_ {
        coord
            .orthogonal()
            .into_iter()
            .filter_map(move |c| self.tile(c))
    }

    /// In-bounds neighbours including diagonals.
    pub fn neighbors8(&self, coord: Coord) -> impl Iterator<Item = &Tile> + '_ {
        coord
            .surrounding()
            .into_iter()
            .filter_map(move |c| self.tile(c))
    }

    pub fn occupants(&self) -> impl Iterator<Item = (Occupant, Coord)> + '_ {
        self.tiles
            .iter()
            .filter_map(|tile| tile.occupant.map(|occupant| (occupant, tile.coord)))
    }

    pub fn occupant_count(&self) -> usize {
        self.locations.len()
    }

    pub fn location_of(&self, id: OccupantId) -> Option<Coord> {
        self.locations.get(&id).copied()
    }

    /// Moves an occupant, clearing its previous tile first.
    pub fn relocate_occupant(&mut self, id: OccupantId, to: Coord) -> Result<(), GenerationError> {
        let target = self.index(to).ok_or_else(|| self.out_of_bounds(to))?;
        let from = self
            .locations
            .get(&id)
            .copied()
            .ok_or(GenerationError::UnknownOccupant { id: id.raw() })?;
        if from == to {
            return Ok(());
        }
        if self.tiles[target].occupant.is_some() {
            return Err(GenerationError::TileOccupied {
                row: to.row,
                col: to.col,
            });
        }
        let source = self.index(from).ok_or_else(|| self.out_of_bounds(from))?;
        let occupant = self.tiles[source].occupant.take();
        self.tiles[target].occupant = occupant;
        self.locations.insert(id, to);
        Ok(())
    }

    pub(crate) fn set_water(
        &mut self,
        coord: Coord,
        water: WaterKind,
    ) -> Result<(), GenerationError> {
        let idx = self.index(coord).ok_or_else(|| self.out_of_bounds(coord))?;
        self.tiles[idx].water = water;
        Ok(())
    }

    pub(crate) fn lower_elevation(
        &mut self,
        coord: Coord,
        depth: f64,
    ) -> Result<(), GenerationError> {
        let current = self
            .elevation_at(coord)
            .ok_or_else(|| self.out_of_bounds(coord))?;
        self.heights.set(coord.row, coord.col, current - depth)
    }

    pub(crate) fn place_occupant(
        &mut self,
        coord: Coord,
        kind: OccupantKind,
    ) -> Result<OccupantId, GenerationError> {
        let idx = self.index(coord).ok_or_else(|| self.out_of_bounds(coord))?;
        if self.tiles[idx].occupant.is_some() {
            return Err(GenerationError::TileOccupied {
                row: coord.row,
                col: coord.col,
            });
        }
        let id = OccupantId(self.next_occupant);
        self.next_occupant += 1;
        self.tiles[idx].occupant = Some(Occupant { id, kind });
        self.locations.insert(id, coord);
        Ok(id)
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        if self.contains(coord) {
            Some(coord.row as usize * self.dimension() + coord.col as usize)
        } else {
            None
        }
    }

    fn out_of_bounds(&self, coord: Coord) -> GenerationError {
        GenerationError::OutOfBoundsAccess {
            row: coord.row,
            col: coord.col,
            dimension: self.dimension(),
        }
    }
}

impl MapView for TileMap {
    fn dimension(&self) -> usize {
        TileMap::dimension(self)
    }

    fn elevation(&self, coord: Coord) -> Option<f64> {
        self.elevation_at(coord)
    }

    fn water(&self, coord: Coord) -> Option<WaterKind> {
        self.tile(coord).map(Tile::water)
    }

    fn occupant(&self, coord: Coord) -> Option<Occupant> {
        self.tile(coord).and_then(Tile::occupant)
    }
}
