//! Rank-aware Gaussian elimination
//!
//! The solver classifies a system as uniquely solvable, underdetermined or
//! inconsistent by comparing the rank of the coefficient block with the rank
//! of the augmented block. Coefficients are compared against a relative zero
//! threshold (`max(|column|) * rank_epsilon` of the original matrix) so that
//! elimination round-off does not inflate the rank.
//!
//! After solving, the first `rank` rows of the echelon form stay available as
//! a reduced system. Callers use it to re-solve column subsets of an
//! underdetermined system without rebuilding the rows.

use nalgebra as na;

use crate::config::SolverTolerances;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Solubility {
    UniqueSolution,
    InfiniteSolutions,
    NoSolution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemState {
    Built,
    EchelonFormed,
    Solved(Solubility),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LinearSystemError {
    #[error("Right-hand side has {rhs} entries but the system has {rows} rows")]
    DimensionMismatch { rows: usize, rhs: usize },

    #[error("System has no unknowns")]
    NoUnknowns,

    #[error("{rows} equations can't determine {columns} unknowns")]
    Underdetermined { rows: usize, columns: usize },

    #[error("Reduced system requested before elimination")]
    NotReduced,

    #[error("Column {column} out of range for {columns} unknowns")]
    ColumnOutOfRange { column: usize, columns: usize },
}

#[derive(Debug, Clone)]
pub struct LinearEquationSystem {
    lhs: na::DMatrix<f64>,
    rhs: na::DVector<f64>,
    tolerances: SolverTolerances,
    column_thresholds: Vec<f64>,
    rhs_threshold: f64,
    state: SystemState,
    rank_coefficients: usize,
    rank_augmented: usize,
    solution: Option<na::DVector<f64>>,
}

impl LinearEquationSystem {
    pub fn new(
        lhs: na::DMatrix<f64>,
        rhs: na::DVector<f64>,
        tolerances: SolverTolerances,
    ) -> Result<Self, LinearSystemError> {
        let (rows, columns) = lhs.shape();

        if rhs.len() != rows {
            return Err(LinearSystemError::DimensionMismatch { rows, rhs: rhs.len() });
        }
        if columns == 0 {
            return Err(LinearSystemError::NoUnknowns);
        }
        if columns > rows {
            return Err(LinearSystemError::Underdetermined { rows, columns });
        }

        let column_thresholds = lhs
            .column_iter()
            .map(|column| column.amax() * tolerances.rank_epsilon)
            .collect();
        let rhs_threshold = rhs.amax() * tolerances.rank_epsilon;

        Ok(Self {
            lhs,
            rhs,
            tolerances,
            column_thresholds,
            rhs_threshold,
            state: SystemState::Built,
            rank_coefficients: 0,
            rank_augmented: 0,
            solution: None,
        })
    }

    pub fn state(&self) -> SystemState {
        self.state
    }

    pub fn rows(&self) -> usize {
        self.lhs.nrows()
    }

    pub fn columns(&self) -> usize {
        self.lhs.ncols()
    }

    pub fn rank_coefficients(&self) -> usize {
        self.rank_coefficients
    }

    pub fn rank_augmented(&self) -> usize {
        self.rank_augmented
    }

    /// Solution vector, present only for a unique solution
    pub fn solution(&self) -> Option<&na::DVector<f64>> {
        self.solution.as_ref()
    }

    /// Eliminate and classify; repeated calls return the first result
    pub fn solve(&mut self) -> Solubility {
        if let SystemState::Solved(solubility) = self.state {
            return solubility;
        }

        if self.state == SystemState::Built {
            self.form_echelon();
        }

        let columns = self.columns();
        let solubility = if self.rank_coefficients != self.rank_augmented {
            Solubility::NoSolution
        } else if self.rank_coefficients == columns {
            Solubility::UniqueSolution
        } else {
            Solubility::InfiniteSolutions
        };

        if solubility == Solubility::UniqueSolution {
            self.back_substitute();
        }

        log::trace!(
            "{}x{} system: rank {} / augmented {} -> {:?}",
            self.rows(),
            columns,
            self.rank_coefficients,
            self.rank_augmented,
            solubility
        );

        self.state = SystemState::Solved(solubility);
        solubility
    }

    /// Leading `rank` rows of the echelon form
    pub fn reduced_lhs(&self) -> Option<na::DMatrix<f64>> {
        if self.state == SystemState::Built {
            return None;
        }
        Some(self.lhs.rows(0, self.rank_coefficients).into_owned())
    }

    /// Right-hand side matching `reduced_lhs`
    pub fn reduced_rhs(&self) -> Option<na::DVector<f64>> {
        if self.state == SystemState::Built {
            return None;
        }
        Some(self.rhs.rows(0, self.rank_coefficients).into_owned())
    }

    /// Reduced coefficient matrix restricted to the given columns
    pub fn select_reduced_columns(&self, columns: &[usize]) -> Result<na::DMatrix<f64>, LinearSystemError> {
        if let Some(&column) = columns.iter().find(|&&c| c >= self.columns()) {
            return Err(LinearSystemError::ColumnOutOfRange { column, columns: self.columns() });
        }
        let reduced = self.reduced_lhs().ok_or(LinearSystemError::NotReduced)?;
        Ok(reduced.select_columns(columns.iter()))
    }

    /// New system over a subset of the unknowns, built from the reduced rows
    pub fn subsystem(&self, columns: &[usize]) -> Result<Self, LinearSystemError> {
        let lhs = self.select_reduced_columns(columns)?;
        let rhs = self.reduced_rhs().ok_or(LinearSystemError::NotReduced)?;
        Self::new(lhs, rhs, self.tolerances)
    }

    fn round(&self, value: f64) -> f64 {
        let factor = self.tolerances.rounding_factor;
        (value * factor).round() / factor
    }

    fn is_significant_coefficient(&self, value: f64, column: usize) -> bool {
        value != 0.0 && value.abs() > self.column_thresholds[column]
    }

    fn is_significant_rhs(&self, value: f64) -> bool {
        value != 0.0 && value.abs() > self.rhs_threshold
    }

    fn form_echelon(&mut self) {
        let (rows, columns) = self.lhs.shape();
        let mut pivot_row = 0;

        for column in 0..columns {
            if pivot_row == rows {
                break;
            }

            let mut best = pivot_row;
            for row in (pivot_row + 1)..rows {
                if self.lhs[(row, column)].abs() > self.lhs[(best, column)].abs() {
                    best = row;
                }
            }

            // free column
            if !self.is_significant_coefficient(self.lhs[(best, column)], column) {
                continue;
            }

            self.lhs.swap_rows(best, pivot_row);
            self.rhs.swap_rows(best, pivot_row);

            let pivot = self.lhs[(pivot_row, column)];
            for row in (pivot_row + 1)..rows {
                let factor = self.lhs[(row, column)] / pivot;
                if factor == 0.0 {
                    continue;
                }

                for c in (column + 1)..columns {
                    let value = self.lhs[(row, c)] - factor * self.lhs[(pivot_row, c)];
                    self.lhs[(row, c)] = self.round(value);
                }
                self.lhs[(row, column)] = 0.0;

                let value = self.rhs[row] - factor * self.rhs[pivot_row];
                self.rhs[row] = self.round(value);
            }

            pivot_row += 1;
        }

        self.rank_coefficients = pivot_row;
        let inconsistent = (pivot_row..rows).any(|row| self.is_significant_rhs(self.rhs[row]));
        self.rank_augmented = if inconsistent { pivot_row + 1 } else { pivot_row };
        self.state = SystemState::EchelonFormed;
    }

    /// Only valid for full column rank: the pivots sit on the diagonal
    fn back_substitute(&mut self) {
        let n = self.columns();
        let mut solution = na::DVector::zeros(n);

        for i in (0..n).rev() {
            let mut sum = self.rhs[i];
            for j in (i + 1)..n {
                sum -= self.lhs[(i, j)] * solution[j];
            }
            solution[i] = self.round(sum / self.lhs[(i, i)]);
        }

        self.solution = Some(solution);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn system(rows: usize, columns: usize, lhs: &[f64], rhs: &[f64]) -> LinearEquationSystem {
        LinearEquationSystem::new(
            na::DMatrix::from_row_slice(rows, columns, lhs),
            na::DVector::from_row_slice(rhs),
            SolverTolerances::default(),
        )
        .unwrap()
    }

    /// Moment rows for the contact points (0,0), (10,0), (0,10) with the
    /// resultant 100 N at (2,3)
    fn triangle() -> LinearEquationSystem {
        system(
            6,
            3,
            &[
                0.0, -10.0, 0.0, //
                0.0, 0.0, -10.0, //
                10.0, 0.0, 10.0, //
                0.0, 0.0, -10.0, //
                0.0, -10.0, 0.0, //
                10.0, 10.0, 0.0,
            ],
            &[-200.0, -300.0, 800.0, -300.0, -200.0, 700.0],
        )
    }

    #[test]
    fn test_unique_solution() {
        let mut system = triangle();

        assert_eq!(system.solve(), Solubility::UniqueSolution);
        assert_eq!(system.rank_coefficients(), 3);
        assert_eq!(system.rank_augmented(), 3);

        let solution = system.solution().unwrap();
        assert_relative_eq!(solution[0], 50.0);
        assert_relative_eq!(solution[1], 20.0);
        assert_relative_eq!(solution[2], 30.0);
        assert_relative_eq!(solution.sum(), 100.0);
    }

    #[test]
    fn test_solve_is_one_shot() {
        let mut system = triangle();
        let first = system.solve();

        assert_eq!(system.state(), SystemState::Solved(first));
        assert_eq!(system.solve(), first);
    }

    #[test]
    fn test_infinite_solutions_for_duplicated_point() {
        // two coincident points at x=0 and one at x=10, resultant 10 N at x=5
        let mut system = system(
            3,
            3,
            &[
                0.0, 0.0, -10.0, //
                0.0, 0.0, -10.0, //
                10.0, 10.0, 0.0,
            ],
            &[-50.0, -50.0, 50.0],
        );

        assert_eq!(system.solve(), Solubility::InfiniteSolutions);
        assert_eq!(system.rank_coefficients(), 2);
        assert!(system.solution().is_none());
        assert_eq!(system.reduced_lhs().unwrap().nrows(), 2);
        assert_eq!(system.reduced_rhs().unwrap().len(), 2);
    }

    #[test]
    fn test_no_solution() {
        let mut system = system(2, 1, &[1.0, 1.0], &[1.0, 3.0]);

        assert_eq!(system.solve(), Solubility::NoSolution);
        assert_eq!(system.rank_coefficients(), 1);
        assert_eq!(system.rank_augmented(), 2);
    }

    #[test]
    fn test_zero_column_is_free() {
        // a single contact point gives an all-zero coefficient column
        let mut centered = system(2, 1, &[0.0, 0.0], &[0.0, 0.0]);
        assert_eq!(centered.solve(), Solubility::InfiniteSolutions);

        let mut off_center = system(2, 1, &[0.0, 0.0], &[-5.0, 0.0]);
        assert_eq!(off_center.solve(), Solubility::NoSolution);
    }

    #[test]
    fn test_subsystem_columns() {
        let mut system = system(
            4,
            4,
            &[
                1.0, 0.0, 1.0, 2.0, //
                0.0, 1.0, 1.0, 0.0, //
                1.0, 1.0, 2.0, 2.0, //
                2.0, 0.0, 2.0, 4.0,
            ],
            &[3.0, 2.0, 5.0, 6.0],
        );

        assert!(system.reduced_lhs().is_none());
        assert_eq!(system.solve(), Solubility::InfiniteSolutions);
        assert_eq!(system.rank_coefficients(), 2);

        let mut sub = system.subsystem(&[0, 1]).unwrap();
        assert_eq!(sub.solve(), Solubility::UniqueSolution);

        let solution = sub.solution().unwrap();
        assert_relative_eq!(solution[0], 3.0);
        assert_relative_eq!(solution[1], 2.0);

        assert_eq!(
            system.subsystem(&[0, 1, 2]).unwrap_err(),
            LinearSystemError::Underdetermined { rows: 2, columns: 3 }
        );
        assert!(matches!(
            system.select_reduced_columns(&[7]),
            Err(LinearSystemError::ColumnOutOfRange { column: 7, .. })
        ));
    }

    #[test]
    fn test_invalid_dimensions() {
        let err = LinearEquationSystem::new(
            na::DMatrix::zeros(2, 1),
            na::DVector::zeros(3),
            SolverTolerances::default(),
        )
        .unwrap_err();
        assert_eq!(err, LinearSystemError::DimensionMismatch { rows: 2, rhs: 3 });

        let err = LinearEquationSystem::new(
            na::DMatrix::zeros(1, 2),
            na::DVector::zeros(1),
            SolverTolerances::default(),
        )
        .unwrap_err();
        assert_eq!(err, LinearSystemError::Underdetermined { rows: 1, columns: 2 });
    }
}
