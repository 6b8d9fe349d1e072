//! Numeric policy of the force assessor
//!
//! Every constant the calculation depends on lives here so tolerances can be
//! tuned and tested independently. Loadable from TOML; missing keys fall back
//! to the defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StaticsError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticsConfig {
    /// Gravitational acceleration (m/s²)
    pub gravity: f64,

    /// Decimals kept on gravitation, resultant points and right-hand sides
    pub force_decimals: u32,

    /// Rounding factor applied during elimination and back-substitution
    /// (10000.0 keeps 4 decimals)
    pub elimination_rounding_factor: f64,

    /// Relative zero threshold: a coefficient counts as zero below
    /// `max(|column|) * rank_epsilon`
    pub rank_epsilon: f64,

    /// Allowed gap between summed reaction magnitudes and the resultant
    pub conservation_tolerance: f64,

    /// Upper bound on triples tried for a statically indeterminate support
    pub max_triple_candidates: usize,

    /// Split the load equally when the resultant sits on the centroid of an
    /// indeterminate support
    pub equal_share_when_centered: bool,

    /// Let the scorer shrink the computed sequence horizon
    pub optimize_horizon: bool,
}

impl Default for StaticsConfig {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            force_decimals: 2,
            elimination_rounding_factor: 10000.0,
            rank_epsilon: 0.01,
            conservation_tolerance: 0.01,
            max_triple_candidates: 10_000,
            equal_share_when_centered: true,
            optimize_horizon: true,
        }
    }
}

impl StaticsConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, StaticsError> {
        let config = toml::from_str(source)?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, StaticsError> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    /// Tolerances handed to the linear solver
    pub fn solver_tolerances(&self) -> SolverTolerances {
        SolverTolerances {
            rank_epsilon: self.rank_epsilon,
            rounding_factor: self.elimination_rounding_factor,
        }
    }
}

/// Subset of the configuration the linear solver needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverTolerances {
    pub rank_epsilon: f64,
    pub rounding_factor: f64,
}

impl Default for SolverTolerances {
    fn default() -> Self {
        StaticsConfig::default().solver_tolerances()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = StaticsConfig::from_toml_str(
            "gravity = 9.80665\nmax_triple_candidates = 64\n",
        )
        .unwrap();

        assert_eq!(config.gravity, 9.80665);
        assert_eq!(config.max_triple_candidates, 64);
        assert_eq!(config.force_decimals, 2);
        assert!(config.equal_share_when_centered);
    }

    #[test]
    fn test_invalid_toml() {
        let err = StaticsConfig::from_toml_str("gravity = \"down\"").unwrap_err();
        assert!(matches!(err, StaticsError::Toml(_)));
    }
}
