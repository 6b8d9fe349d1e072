//! Geometric collaborator of the force assessor
//!
//! # Coordinate system
//!
//! - **X-axis**: width, left(-) / right(+)
//! - **Y-axis**: height, down(-) / up(+); the floor of the ULD is `y = 0`
//! - **Z-axis**: depth
//!
//! Item positions are the minimum corner of the bounding box on an integer
//! millimetre grid. Floor points are `na::Point2<f64>` where `.x` is X and
//! `.y` carries Z.

pub mod cuboid;
pub mod hull;

pub use cuboid::*;
pub use hull::*;

use nalgebra as na;
use serde::{Deserialize, Serialize};

/// Absolute position of an item's minimum corner (mm)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn to_point(&self) -> na::Point3<f64> {
        na::Point3::new(self.x as f64, self.y as f64, self.z as f64)
    }
}

/// Shape of a cargo item, already rotated into its placed orientation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shapeType")]
pub enum Shape {
    /// Axis-aligned box (mm)
    Cuboid { width: i32, height: i32, depth: i32 },
    /// Upright cylinder (mm); not supported by the force assessor
    Cylinder { radius: i32, height: i32 },
}

impl Shape {
    pub fn cuboid(width: i32, height: i32, depth: i32) -> Self {
        Shape::Cuboid { width, height, depth }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Cuboid { .. } => "cuboid",
            Shape::Cylinder { .. } => "cylinder",
        }
    }
}

/// Smallest axis-aligned box around a shape (mm)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub width: i32,
    pub height: i32,
    pub depth: i32,
}

impl BoundingBox {
    /// Half extents along x, y and z
    pub fn half_extents(&self) -> na::Vector3<f64> {
        na::Vector3::new(
            self.width as f64 / 2.0,
            self.height as f64 / 2.0,
            self.depth as f64 / 2.0,
        )
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("Degenerate {kind}: {reason}")]
    DegenerateShape { kind: &'static str, reason: String },

    #[error("Shape kind '{0}' can't be evaluated by this geometry provider")]
    NotEvaluable(&'static str),
}

/// Geometric queries the force assessor consumes as pure functions
pub trait ContactGeometry {
    /// Bounding box of a shape; fails for degenerate shapes
    fn bounding_box(&self, shape: &Shape) -> Result<BoundingBox, GeometryError>;

    /// Lowest y the `above` shape could rest at when dropped at (x, z) over
    /// the `below` shape, or 0 when their footprints don't overlap
    #[allow(clippy::too_many_arguments)]
    fn min_resting_y(
        &self,
        above: &Shape,
        x_above: i32,
        z_above: i32,
        below: &Shape,
        x_below: i32,
        z_below: i32,
        y_below: i32,
        max_y_below: i32,
    ) -> Result<i32, GeometryError>;

    /// Corners of the contact polygon where `upper` rests on `lower`, in
    /// absolute floor coordinates. Empty if they don't touch.
    fn contact_points(
        &self,
        upper: &Shape,
        upper_offset: Position,
        lower: &Shape,
        lower_offset: Position,
    ) -> Result<Vec<na::Point2<f64>>, GeometryError>;
}
