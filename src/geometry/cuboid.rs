use nalgebra as na;

use crate::geometry::*;
use crate::types::round_point;

/// Decimals kept on contact point coordinates
const CONTACT_POINT_DECIMALS: u32 = 2;

/// Axis-aligned footprint on the floor plane (mm)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub min_x: f64,
    pub min_z: f64,
    pub max_x: f64,
    pub max_z: f64,
}

impl Footprint {
    pub fn new(x: i32, z: i32, width: i32, depth: i32) -> Self {
        Self {
            min_x: x as f64,
            min_z: z as f64,
            max_x: (x + width) as f64,
            max_z: (z + depth) as f64,
        }
    }

    /// Closed intersection of two footprints, `None` if they are disjoint
    pub fn intersection(&self, other: &Footprint) -> Option<Footprint> {
        let min_x = self.min_x.max(other.min_x);
        let max_x = self.max_x.min(other.max_x);
        let min_z = self.min_z.max(other.min_z);
        let max_z = self.max_z.min(other.max_z);

        if min_x > max_x || min_z > max_z {
            return None;
        }
        Some(Footprint { min_x, min_z, max_x, max_z })
    }

    pub fn area(&self) -> f64 {
        (self.max_x - self.min_x) * (self.max_z - self.min_z)
    }

    pub fn corners(&self) -> [na::Point2<f64>; 4] {
        [
            na::Point2::new(self.min_x, self.min_z),
            na::Point2::new(self.min_x, self.max_z),
            na::Point2::new(self.max_x, self.max_z),
            na::Point2::new(self.max_x, self.min_z),
        ]
    }
}

/// Default geometry provider for axis-aligned cuboids
#[derive(Debug, Clone, Copy, Default)]
pub struct CuboidGeometry;

impl CuboidGeometry {
    pub fn new() -> Self {
        Self
    }

    fn cuboid_dimensions(shape: &Shape) -> Result<(i32, i32, i32), GeometryError> {
        match *shape {
            Shape::Cuboid { width, height, depth } => {
                if width <= 0 || height <= 0 || depth <= 0 {
                    return Err(GeometryError::DegenerateShape {
                        kind: shape.kind(),
                        reason: format!("dimensions {}x{}x{} must be positive", width, height, depth),
                    });
                }
                Ok((width, height, depth))
            }
            _ => Err(GeometryError::NotEvaluable(shape.kind())),
        }
    }

    fn footprint(shape: &Shape, x: i32, z: i32) -> Result<Footprint, GeometryError> {
        let (width, _, depth) = Self::cuboid_dimensions(shape)?;
        Ok(Footprint::new(x, z, width, depth))
    }
}

impl ContactGeometry for CuboidGeometry {
    fn bounding_box(&self, shape: &Shape) -> Result<BoundingBox, GeometryError> {
        match *shape {
            Shape::Cuboid { .. } => {
                let (width, height, depth) = Self::cuboid_dimensions(shape)?;
                Ok(BoundingBox { width, height, depth })
            }
            Shape::Cylinder { radius, height } => {
                if radius <= 0 || height <= 0 {
                    return Err(GeometryError::DegenerateShape {
                        kind: shape.kind(),
                        reason: format!("radius {} and height {} must be positive", radius, height),
                    });
                }
                Ok(BoundingBox { width: 2 * radius, height, depth: 2 * radius })
            }
        }
    }

    fn min_resting_y(
        &self,
        above: &Shape,
        x_above: i32,
        z_above: i32,
        below: &Shape,
        x_below: i32,
        z_below: i32,
        _y_below: i32,
        max_y_below: i32,
    ) -> Result<i32, GeometryError> {
        let upper = Self::footprint(above, x_above, z_above)?;
        let lower = Self::footprint(below, x_below, z_below)?;

        // Only a positive overlap area blocks the fall
        match upper.intersection(&lower) {
            Some(overlap) if overlap.area() > 0.0 => Ok(max_y_below),
            _ => Ok(0),
        }
    }

    fn contact_points(
        &self,
        upper: &Shape,
        upper_offset: Position,
        lower: &Shape,
        lower_offset: Position,
    ) -> Result<Vec<na::Point2<f64>>, GeometryError> {
        let (_, lower_height, _) = Self::cuboid_dimensions(lower)?;
        let upper_footprint = Self::footprint(upper, upper_offset.x, upper_offset.z)?;
        let lower_footprint = Self::footprint(lower, lower_offset.x, lower_offset.z)?;

        if upper_offset.y != lower_offset.y + lower_height {
            return Ok(Vec::new());
        }

        let Some(contact) = upper_footprint.intersection(&lower_footprint) else {
            return Ok(Vec::new());
        };

        let corners: Vec<na::Point2<f64>> = contact
            .corners()
            .iter()
            .map(|c| round_point(*c, CONTACT_POINT_DECIMALS))
            .collect();

        Ok(convex_hull(&corners))
    }
}
