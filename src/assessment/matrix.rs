use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StaticsError;
use crate::model::ItemId;

/// Stability of every item (rows, placement order) at every sequence (columns)
///
/// `None` marks an item that isn't placed yet at that sequence, or a
/// sequence beyond the computed horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct StabilityMatrix {
    labels: Vec<String>,
    cells: Vec<Vec<Option<bool>>>,
}

/// One CSV line: `item,sequence,stable`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CellRecord {
    item: String,
    sequence: usize,
    stable: Option<bool>,
}

impl StabilityMatrix {
    pub fn new(labels: Vec<String>) -> Self {
        let n = labels.len();
        Self {
            labels,
            cells: vec![vec![None; n]; n],
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Replace a row; extra entries are dropped, missing ones stay `None`
    pub fn set_row(&mut self, id: ItemId, row: &[Option<bool>]) {
        let n = self.len();
        let target = &mut self.cells[id.index()];
        for (cell, value) in target.iter_mut().zip(row.iter().take(n)) {
            *cell = *value;
        }
    }

    pub fn row(&self, id: ItemId) -> &[Option<bool>] {
        &self.cells[id.index()]
    }

    pub fn cell(&self, id: ItemId, sequence: usize) -> Option<bool> {
        self.cells
            .get(id.index())
            .and_then(|row| row.get(sequence))
            .copied()
            .flatten()
    }

    /// Earliest sequence at which any item is unstable
    pub fn first_unstable_sequence(&self) -> Option<usize> {
        (0..self.len()).find(|&s| self.cells.iter().any(|row| row[s] == Some(false)))
    }

    /// Number of leading sequences without any unstable item
    pub fn stable_prefix(&self) -> usize {
        self.first_unstable_sequence().unwrap_or(self.len())
    }

    /// (stable, placed) cell counts
    pub fn counts(&self) -> (usize, usize) {
        self.cells
            .iter()
            .flatten()
            .fold((0, 0), |(stable, placed), cell| match cell {
                Some(true) => (stable + 1, placed + 1),
                Some(false) => (stable, placed + 1),
                None => (stable, placed),
            })
    }

    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), StaticsError> {
        let mut csv = csv::Writer::from_writer(writer);
        for (label, row) in self.labels.iter().zip(&self.cells) {
            for (sequence, stable) in row.iter().enumerate() {
                csv.serialize(CellRecord {
                    item: label.clone(),
                    sequence,
                    stable: *stable,
                })?;
            }
        }
        csv.flush()?;
        Ok(())
    }

    pub fn to_csv_file(&self, path: impl AsRef<Path>) -> Result<(), StaticsError> {
        let file = std::fs::File::create(path.as_ref())?;
        self.write_csv(file)
    }

    /// Rows appear in order of first mention
    pub fn read_csv<R: io::Read>(reader: R) -> Result<Self, StaticsError> {
        let mut csv = csv::Reader::from_reader(reader);
        let mut records = Vec::new();
        for record in csv.deserialize() {
            let record: CellRecord = record?;
            records.push(record);
        }

        let mut labels: Vec<String> = Vec::new();
        for record in &records {
            if !labels.contains(&record.item) {
                labels.push(record.item.clone());
            }
        }

        let mut matrix = Self::new(labels);
        for record in records {
            let Some(row) = matrix.labels.iter().position(|l| *l == record.item) else {
                continue;
            };
            if let Some(cell) = matrix.cells[row].get_mut(record.sequence) {
                *cell = record.stable;
            }
        }
        Ok(matrix)
    }

    pub fn from_csv_file(path: impl AsRef<Path>) -> Result<Self, StaticsError> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::read_csv(file)
    }
}
