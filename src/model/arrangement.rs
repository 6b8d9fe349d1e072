use std::collections::HashMap;
use std::path::Path;

use nalgebra as na;
use serde::{Deserialize, Serialize};

use crate::error::{StaticsError, ValidationError};
use crate::geometry::{Position, Shape};
use crate::model::item::{ItemId, PlacedItem};
use crate::types::*;

/// The finished arrangement of one ULD, in placement order
#[derive(Debug, Clone, Default)]
pub struct Arrangement {
    items: Vec<PlacedItem>,
}

/// Serialized form of a placed item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedItemRecord {
    pub label: String,
    pub shape: Shape,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub weight: WeightValue,
    #[serde(default)]
    pub center_of_mass: [f64; 3],
    pub sequence: usize,
}

/// Serialized form of an arrangement
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArrangementFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub items: Vec<PlacedItemRecord>,
}

impl PlacedItemRecord {
    pub fn to_placed_item(&self) -> Result<PlacedItem, StaticsError> {
        let [cx, cy, cz] = self.center_of_mass;
        Ok(PlacedItem {
            label: self.label.clone(),
            shape: self.shape,
            position: Position::new(self.x, self.y, self.z),
            weight: self.weight.to_weight()?,
            center_of_mass: na::Vector3::new(cx, cy, cz),
            sequence: self.sequence,
        })
    }

    pub fn from_placed_item(item: &PlacedItem) -> Self {
        Self {
            label: item.label.clone(),
            shape: item.shape,
            x: item.position.x,
            y: item.position.y,
            z: item.position.z,
            weight: WeightValue::new(item.weight.get::<kilogram>(), "kg"),
            center_of_mass: [item.center_of_mass.x, item.center_of_mass.y, item.center_of_mass.z],
            sequence: item.sequence,
        }
    }
}

impl Arrangement {
    /// Sort items by sequence and check labels and sequences are unique
    pub fn new(mut items: Vec<PlacedItem>) -> Result<Self, ValidationError> {
        items.sort_by_key(|item| item.sequence);

        let mut labels: HashMap<&str, usize> = HashMap::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            if item.label.is_empty() {
                return Err(ValidationError::EmptyLabel { sequence: item.sequence });
            }
            if labels.insert(item.label.as_str(), i).is_some() {
                return Err(ValidationError::DuplicateLabel(item.label.clone()));
            }
            if i > 0 && items[i - 1].sequence == item.sequence {
                return Err(ValidationError::DuplicateSequence {
                    sequence: item.sequence,
                    first: items[i - 1].label.clone(),
                    second: item.label.clone(),
                });
            }
        }

        Ok(Self { items })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, id: ItemId) -> &PlacedItem {
        &self.items[id.0]
    }

    pub fn items(&self) -> &[PlacedItem] {
        &self.items
    }

    /// Item handles in ascending placement order
    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        (0..self.items.len()).map(ItemId)
    }

    pub fn find(&self, label: &str) -> Option<ItemId> {
        self.items.iter().position(|item| item.label == label).map(ItemId)
    }

    pub fn labels(&self) -> Vec<String> {
        self.items.iter().map(|item| item.label.clone()).collect()
    }

    pub fn from_file_model(file: &ArrangementFile) -> Result<Self, StaticsError> {
        let items = file
            .items
            .iter()
            .map(PlacedItemRecord::to_placed_item)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(items)?)
    }

    pub fn to_file_model(&self) -> ArrangementFile {
        ArrangementFile {
            name: None,
            items: self.items.iter().map(PlacedItemRecord::from_placed_item).collect(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, StaticsError> {
        let file: ArrangementFile = serde_json::from_str(json)?;
        Self::from_file_model(&file)
    }

    /// Load from JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StaticsError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    /// Save to JSON file
    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<(), StaticsError> {
        let json = serde_json::to_string_pretty(&self.to_file_model())?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(label: &str, sequence: usize) -> PlacedItem {
        PlacedItem::new(
            label,
            Shape::cuboid(10, 10, 10),
            Position::new(0, 0, 0),
            Weight::new::<kilogram>(1.0),
            sequence,
        )
    }

    #[test]
    fn test_items_sorted_by_sequence() {
        let arrangement = Arrangement::new(vec![item("b", 7), item("a", 2), item("c", 9)]).unwrap();

        assert_eq!(arrangement.labels(), vec!["a", "b", "c"]);
        assert_eq!(arrangement.find("b"), Some(ItemId(1)));
    }

    #[test]
    fn test_rejects_duplicates() {
        assert_eq!(
            Arrangement::new(vec![item("a", 0), item("a", 1)]).unwrap_err(),
            ValidationError::DuplicateLabel("a".into())
        );
        assert!(matches!(
            Arrangement::new(vec![item("a", 3), item("b", 3)]),
            Err(ValidationError::DuplicateSequence { sequence: 3, .. })
        ));
        assert!(matches!(
            Arrangement::new(vec![item("", 0)]),
            Err(ValidationError::EmptyLabel { sequence: 0 })
        ));
    }

    #[test]
    fn test_json_with_units() {
        let json = r#"{
            "items": [
                {"label": "pallet", "shape": {"shapeType": "Cuboid", "width": 100, "height": 20, "depth": 100},
                 "x": 0, "y": 0, "z": 0, "weight": {"value": 2000.0, "unit": "g"}, "sequence": 0},
                {"label": "box", "shape": {"shapeType": "Cuboid", "width": 50, "height": 50, "depth": 50},
                 "x": 0, "y": 20, "z": 0, "weight": {"value": 5.0, "unit": "kg"},
                 "center_of_mass": [1.0, 0.0, -2.0], "sequence": 1}
            ]
        }"#;

        let arrangement = Arrangement::from_json_str(json).unwrap();
        assert_eq!(arrangement.len(), 2);
        assert_eq!(arrangement.item(ItemId(0)).weight.get::<kilogram>(), 2.0);
        assert_eq!(arrangement.item(ItemId(1)).center_of_mass.z, -2.0);
    }

    #[test]
    fn test_json_unknown_unit() {
        let json = r#"{"items": [{"label": "a", "shape": {"shapeType": "Cuboid", "width": 1, "height": 1, "depth": 1},
            "x": 0, "y": 0, "z": 0, "weight": {"value": 1.0, "unit": "stone"}, "sequence": 0}]}"#;

        assert!(matches!(Arrangement::from_json_str(json), Err(StaticsError::Unit(_))));
    }
}
