pub mod types;
pub mod error;
pub mod config;
pub mod geometry;
pub mod model;
pub mod statics;
pub mod assessment;

pub use types::*;
pub use error::{StaticsError, ValidationError};
pub use config::StaticsConfig;
pub use assessment::{Assessment, ScienceOfStatics, StabilityCriterion, NOT_ASSESSABLE};
