use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("map dimension {dimension} is not of the form 2^k + 1 (k >= 1)")]
    InvalidDimension { dimension: usize },

    #[error("feature size {feature_size} must be a power of two no larger than {}", .dimension.saturating_sub(1))]
    InvalidFeatureSize {
        feature_size: usize,
        dimension: usize,
    },

    #[error("no shoreline tile with elevation strictly between {low} and {high}")]
    NoQualifyingSite { low: f64, high: f64 },

    #[error("settlement needs {needed} land tiles but only {available} are available")]
    InsufficientCandidates { needed: usize, available: usize },

    #[error("coordinate ({row}, {col}) is outside the {dimension}x{dimension} map")]
    OutOfBoundsAccess {
        row: i64,
        col: i64,
        dimension: usize,
    },

    #[error("tile ({row}, {col}) already has an occupant")]
    TileOccupied { row: i64, col: i64 },

    #[error("occupant {id} is not on the map")]
    UnknownOccupant { id: u64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("stage '{stage}' failed: {source}")]
    Stage {
        stage: String,
        #[source]
        source: Box<GenerationError>,
    },
}

impl GenerationError {
    pub fn in_stage(self, stage: impl Into<String>) -> Self {
        GenerationError::Stage {
            stage: stage.into(),
            source: Box::new(self),
        }
    }

    /// Siting failures can be retried with another draw or a relaxed band.
    pub fn is_recoverable(&self) -> bool {
        match self {
            GenerationError::NoQualifyingSite { .. }
            | GenerationError::InsufficientCandidates { .. } => true,
            GenerationError::Stage { source, .. } => source.is_recoverable(),
            _ => false,
        }
    }

    pub fn stage(&self) -> Option<&str> {
        match self {
            GenerationError::Stage { stage, .. } => Some(stage),
            _ => None,
        }
    }
}
