//! Force-balance statics of stacked cargo
//!
//! # Coordinate system
//!
//! Forces act vertically; application points live on the floor plane and
//! are stored as `na::Point2<f64>` with `.x` = X and `.y` = Z (mm). Force
//! magnitudes are plain `f64` newtons internally and exposed as
//! `uom` forces through [`PointForce::as_load_force`].

pub mod force;
pub mod support_graph;
pub mod linear_system;
pub mod calculation;
pub mod force_item;

pub use force::*;
pub use support_graph::*;
pub use linear_system::*;
pub use calculation::CalculationContext;
pub use force_item::*;
