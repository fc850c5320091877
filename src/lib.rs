pub mod engine;
pub mod error;
pub mod heightfield;
pub mod hydrology;
pub mod rng;
pub mod scenario;
pub mod settlement;
pub mod stages;
pub mod terrain;
pub mod tilemap;
pub mod world;

pub use engine::{Engine, EngineBuilder, EngineSettings};
pub use error::GenerationError;
pub use heightfield::{synthesize, HeightField};
pub use scenario::{Scenario, ScenarioLoader};
pub use tilemap::{Coord, MapView, TileMap};
pub use world::{GeneratedMap, MapSummary, StageReport};
