use nalgebra as na;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::geometry::{BoundingBox, Position, Shape};
use crate::types::*;

/// Handle of an item inside one arrangement
///
/// The index is the item's placement rank: `ItemId(0)` is placed first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub usize);

impl ItemId {
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A cargo item with a fixed position in the evaluated arrangement
#[derive(Debug, Clone)]
pub struct PlacedItem {
    pub label: String,

    pub shape: Shape,

    /// Minimum corner (mm)
    pub position: Position,

    pub weight: Weight,

    /// Offset of the center of mass from the geometric center (mm)
    pub center_of_mass: na::Vector3<f64>,

    /// Placement sequence; only the ordering matters
    pub sequence: usize,
}

impl PlacedItem {
    pub fn new(
        label: impl Into<String>,
        shape: Shape,
        position: Position,
        weight: Weight,
        sequence: usize,
    ) -> Self {
        Self {
            label: label.into(),
            shape,
            position,
            weight,
            center_of_mass: na::Vector3::zeros(),
            sequence,
        }
    }

    /// Builder-style center of mass offset
    pub fn with_center_of_mass(mut self, offset: na::Vector3<f64>) -> Self {
        self.center_of_mass = offset;
        self
    }

    /// Center of mass in absolute coordinates (mm)
    pub fn absolute_center_of_mass(&self, bbox: &BoundingBox) -> na::Point3<f64> {
        self.position.to_point() + bbox.half_extents() + self.center_of_mass
    }

    /// Top face height (mm)
    pub fn max_y(&self, bbox: &BoundingBox) -> i32 {
        self.position.y + bbox.height
    }

    /// Items standing directly on the floor of the ULD
    pub fn rests_on_floor(&self) -> bool {
        self.position.y == 0
    }

    /// The center of mass must lie within the half extents on every axis
    pub fn validate_center_of_mass(&self, bbox: &BoundingBox) -> Result<(), ValidationError> {
        let half = bbox.half_extents();
        let com = &self.center_of_mass;

        let inside = com.x.abs() <= half.x.abs()
            && com.y.abs() <= half.y.abs()
            && com.z.abs() <= half.z.abs();

        if !inside {
            return Err(ValidationError::CenterOfMassOutside {
                label: self.label.clone(),
            });
        }
        Ok(())
    }
}
