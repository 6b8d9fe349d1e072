use crate::assessment::matrix::StabilityMatrix;

/// Reduces a stability matrix to a single score in [0, 1]
pub trait AssessmentScorer {
    fn score(&self, matrix: &StabilityMatrix) -> f64;

    /// Whether `optimize_max_sequence` may shrink the computed horizon
    fn should_optimize(&self) -> bool {
        false
    }

    /// New horizon after one item's row was computed
    fn optimize_max_sequence(&self, _row: &[Option<bool>], current: usize) -> usize {
        current
    }
}

/// Fraction of the placement sequence before the first instability
#[derive(Debug, Clone, Copy, Default)]
pub struct LowestSequenceScorer;

impl AssessmentScorer for LowestSequenceScorer {
    fn score(&self, matrix: &StabilityMatrix) -> f64 {
        match matrix.first_unstable_sequence() {
            Some(sequence) => sequence as f64 / matrix.len() as f64,
            None => 1.0,
        }
    }

    fn should_optimize(&self) -> bool {
        true
    }

    // Sequences after the first failure can't lower the score any further
    fn optimize_max_sequence(&self, row: &[Option<bool>], current: usize) -> usize {
        row.iter()
            .position(|&cell| cell == Some(false))
            .map_or(current, |sequence| sequence.min(current))
    }
}

/// Share of stable cells among all placed (item, sequence) cells
#[derive(Debug, Clone, Copy, Default)]
pub struct StableFractionScorer;

impl AssessmentScorer for StableFractionScorer {
    fn score(&self, matrix: &StabilityMatrix) -> f64 {
        let (stable, placed) = matrix.counts();
        if placed == 0 {
            return 1.0;
        }
        stable as f64 / placed as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemId;
    use approx::assert_relative_eq;

    fn matrix() -> StabilityMatrix {
        let mut matrix = StabilityMatrix::new(vec!["a".into(), "b".into(), "c".into(), "d".into()]);
        matrix.set_row(ItemId(0), &[Some(true); 4]);
        matrix.set_row(ItemId(1), &[None, Some(true), Some(true), Some(true)]);
        matrix.set_row(ItemId(2), &[None, None, Some(false), Some(true)]);
        matrix.set_row(ItemId(3), &[None, None, None, Some(true)]);
        matrix
    }

    #[test]
    fn test_lowest_sequence() {
        assert_relative_eq!(LowestSequenceScorer.score(&matrix()), 0.5);
        assert_relative_eq!(
            LowestSequenceScorer.score(&StabilityMatrix::new(vec!["x".into()])),
            1.0
        );
    }

    #[test]
    fn test_horizon_shrink() {
        let scorer = LowestSequenceScorer;
        let row = [None, None, Some(false), Some(false)];

        assert!(scorer.should_optimize());
        assert_eq!(scorer.optimize_max_sequence(&row, 4), 2);
        assert_eq!(scorer.optimize_max_sequence(&row, 1), 1);
        assert_eq!(scorer.optimize_max_sequence(&[Some(true); 4], 4), 4);
    }

    #[test]
    fn test_stable_fraction() {
        let scorer = StableFractionScorer;

        assert_relative_eq!(scorer.score(&matrix()), 9.0 / 10.0);
        assert!(!scorer.should_optimize());
        assert_eq!(scorer.optimize_max_sequence(&[Some(false)], 3), 3);
    }
}
