//! Error types for the stability assessment.

use crate::geometry::GeometryError;
use crate::model::ItemId;
use crate::statics::linear_system::LinearSystemError;
use crate::types::UnitError;

/// Input validation failures; fatal for the arrangement being assessed
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Center of mass is outside of item {label}")]
    CenterOfMassOutside { label: String },

    #[error("Item label must not be empty (sequence {sequence})")]
    EmptyLabel { sequence: usize },

    #[error("Duplicate item label: {0}")]
    DuplicateLabel(String),

    #[error("Duplicate placement sequence {sequence} (items {first} and {second})")]
    DuplicateSequence {
        sequence: usize,
        first: String,
        second: String,
    },
}

/// Unified error type of the crate
#[derive(Debug, thiserror::Error)]
pub enum StaticsError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Linear system error: {0}")]
    LinearSystem(#[from] LinearSystemError),

    #[error("Unit error: {0}")]
    Unit(#[from] UnitError),

    /// A force item was requested before the items resting on it were built
    #[error("Force item of {item:?} requested before its dependencies were built")]
    InternalConsistency { item: ItemId },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl StaticsError {
    /// Whether the error means the arrangement can't be scored (sentinel -1)
    /// rather than a broken caller contract
    pub fn is_not_assessable(&self) -> bool {
        matches!(self, StaticsError::Validation(_) | StaticsError::Geometry(_))
    }
}
