//! Stability criteria over complete arrangements
//!
//! [`ScienceOfStatics`] walks the items in placement order, builds their
//! force items and collects the per-sequence stability into a
//! [`StabilityMatrix`] which a scorer reduces to a single number.

pub mod matrix;
pub mod scoring;

pub use matrix::*;
pub use scoring::*;

use crate::config::StaticsConfig;
use crate::error::StaticsError;
use crate::geometry::{BoundingBox, ContactGeometry, CuboidGeometry, GeometryError, Shape};
use crate::model::Arrangement;
use crate::statics::{CalculationContext, ForceItemStore, SupportGraph};
use crate::types::{kilogram, DisplayWeight, Weight};

/// Score reported for an arrangement that can't be assessed
pub const NOT_ASSESSABLE: f64 = -1.0;

/// A way of judging the stability of a finished arrangement
pub trait StabilityCriterion {
    fn name(&self) -> &'static str;

    /// Score in [0, 1], or [`NOT_ASSESSABLE`]
    fn assess(&self, arrangement: &Arrangement) -> f64;
}

/// Outcome of one force assessment
#[derive(Debug, Clone)]
pub struct Assessment {
    pub score: f64,
    pub matrix: StabilityMatrix,
    pub first_unstable: Option<usize>,
    pub forces: ForceItemStore,
}

/// Force-balance stability assessment
pub struct ScienceOfStatics {
    config: StaticsConfig,
    geometry: Box<dyn ContactGeometry>,
    scorer: Box<dyn AssessmentScorer>,
}

impl Default for ScienceOfStatics {
    fn default() -> Self {
        Self::new(StaticsConfig::default())
    }
}

impl ScienceOfStatics {
    pub fn new(config: StaticsConfig) -> Self {
        Self {
            config,
            geometry: Box::new(CuboidGeometry::new()),
            scorer: Box::new(LowestSequenceScorer),
        }
    }

    pub fn with_geometry(mut self, geometry: impl ContactGeometry + 'static) -> Self {
        self.geometry = Box::new(geometry);
        self
    }

    pub fn with_scorer(mut self, scorer: impl AssessmentScorer + 'static) -> Self {
        self.scorer = Box::new(scorer);
        self
    }

    pub fn config(&self) -> &StaticsConfig {
        &self.config
    }

    /// Assess and keep every intermediate result
    ///
    /// Validation and geometry failures abort the run; an arrangement with
    /// an unstable item is a regular result.
    pub fn try_assess(&self, arrangement: &Arrangement) -> Result<Assessment, StaticsError> {
        let n = arrangement.len();

        for item in arrangement.items() {
            if !matches!(item.shape, Shape::Cuboid { .. }) {
                return Err(GeometryError::NotEvaluable(item.shape.kind()).into());
            }
        }

        let boxes = arrangement
            .items()
            .iter()
            .map(|item| self.geometry.bounding_box(&item.shape))
            .collect::<Result<Vec<BoundingBox>, _>>()?;

        for (item, bbox) in arrangement.items().iter().zip(&boxes) {
            item.validate_center_of_mass(bbox)?;
        }

        let total_weight = arrangement
            .items()
            .iter()
            .fold(Weight::new::<kilogram>(0.0), |total, item| total + item.weight);
        log::debug!("Assessing {} items, {} in total", n, DisplayWeight(total_weight));

        let graph = SupportGraph::build(arrangement, &boxes, self.geometry.as_ref())?;
        let ctx = CalculationContext {
            arrangement,
            boxes: &boxes,
            graph: &graph,
            geometry: self.geometry.as_ref(),
            config: &self.config,
        };

        let mut store = ForceItemStore::new(n);
        let mut matrix = StabilityMatrix::new(arrangement.labels());

        if self.config.optimize_horizon && self.scorer.should_optimize() {
            for id in arrangement.ids() {
                if id.index() >= store.max_sequence() {
                    break;
                }

                let row = store.get_or_create(&ctx, id)?.stability_vector(n);
                let horizon = self.scorer.optimize_max_sequence(&row, store.max_sequence());
                if horizon < store.max_sequence() {
                    log::debug!("Horizon shrunk to {} after {:?}", horizon, id);
                    store.set_max_sequence(horizon);
                }
                matrix.set_row(id, &row);
            }
        } else {
            store.build_all(&ctx)?;
            for id in arrangement.ids() {
                let row = store.dependency(id)?.stability_vector(n);
                matrix.set_row(id, &row);
            }
        }

        let score = if n == 0 { 1.0 } else { self.scorer.score(&matrix) };

        Ok(Assessment {
            score,
            first_unstable: matrix.first_unstable_sequence(),
            matrix,
            forces: store,
        })
    }
}

impl StabilityCriterion for ScienceOfStatics {
    fn name(&self) -> &'static str {
        "ScienceOfStatics"
    }

    fn assess(&self, arrangement: &Arrangement) -> f64 {
        match self.try_assess(arrangement) {
            Ok(assessment) => assessment.score,
            Err(e) if e.is_not_assessable() => {
                log::warn!("Arrangement not assessable by {}: {}", self.name(), e);
                NOT_ASSESSABLE
            }
            Err(e) => {
                log::error!("Assessment by {} failed: {}", self.name(), e);
                NOT_ASSESSABLE
            }
        }
    }
}
