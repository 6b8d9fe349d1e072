use std::collections::BTreeMap;

use nalgebra as na;

use crate::model::ItemId;
use crate::types::*;

/// A vertical force acting on the floor plane
///
/// `point` is the application point (x, z) in mm, `magnitude` is in newtons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointForce {
    pub point: na::Point2<f64>,
    pub magnitude: f64,
}

/// Forces grouped by the item they are exchanged with
pub type ForceMap = BTreeMap<ItemId, Vec<PointForce>>;

impl PointForce {
    pub fn new(point: na::Point2<f64>, magnitude: f64) -> Self {
        Self { point, magnitude }
    }

    /// Gravity force of a mass at a floor point
    pub fn from_weight(weight: Weight, point: na::Point2<f64>, gravity: f64, decimals: u32) -> Self {
        let newtons = weight.get::<kilogram>() * gravity;
        Self {
            point: round_point(point, decimals),
            magnitude: round_to(newtons, decimals),
        }
    }

    pub fn as_load_force(&self) -> LoadForce {
        LoadForce::new::<newton>(self.magnitude)
    }

    /// Distance of the application point to another floor point
    pub fn distance_to(&self, other: &na::Point2<f64>) -> f64 {
        na::distance(&self.point, other)
    }
}

/// A corner of a contact polygon, tagged with the item providing support
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    pub point: na::Point2<f64>,
    pub support: ItemId,
}

impl ContactPoint {
    pub fn new(point: na::Point2<f64>, support: ItemId) -> Self {
        Self { point, support }
    }
}

/// Combine forces into a single equivalent force
///
/// The application point is the magnitude-weighted mean of all points and the
/// magnitude is the sum. Both are rounded to `decimals`. A set without load
/// acts at the plain centroid.
pub fn compose<'a, I>(forces: I, decimals: u32) -> Option<PointForce>
where
    I: IntoIterator<Item = &'a PointForce>,
{
    let mut count = 0usize;
    let mut total = 0.0;
    let mut weighted = na::Vector2::zeros();
    let mut centroid = na::Vector2::zeros();

    for force in forces {
        count += 1;
        total += force.magnitude;
        weighted += force.point.coords * force.magnitude;
        centroid += force.point.coords;
    }

    if count == 0 {
        return None;
    }

    let point = if total == 0.0 {
        centroid / count as f64
    } else {
        weighted / total
    };

    Some(PointForce {
        point: round_point(na::Point2::from(point), decimals),
        magnitude: round_to(total, decimals),
    })
}

/// Sum of all magnitudes in a grouped force set
pub fn total_magnitude(forces: &ForceMap) -> f64 {
    forces.values().flatten().map(|force| force.magnitude).sum()
}
