pub mod conversion;

pub use conversion::*;
pub use uom::si::f64::*;
pub use uom::si::{
    force::{kilonewton, newton},
    mass::{gram, kilogram, pound, ton},
};
pub use uom::si::{force, mass};
use serde::{Deserialize, Serialize};
// Type aliases for domain clarity (zero cost)
pub type Weight = Mass;
pub type LoadForce = Force;

// Re-export nalgebra
pub use nalgebra as na;

// Internally lengths are millimetres on the placement grid, masses
// kilograms and forces newtons

use std::{fmt, marker::PhantomData};
#[derive(Debug)]
pub struct DisplayForce(pub Force);
#[derive(Debug)]
pub struct DisplayWeight(pub Weight);

impl fmt::Display for DisplayForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let newtons = self.0.get::<newton>();
        let kn = self.0.get::<kilonewton>();
        write!(f, "{:.2} N ({:.3} kN)", newtons, kn)
    }
}

impl fmt::Display for DisplayWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kg = self.0.get::<kilogram>();
        let lbs = self.0.get::<pound>();
        write!(f, "{:.2} kg ({:.0} lbs)", kg, lbs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WithUnit<T> {
    pub value: f64,
    pub unit: String,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

pub type WeightValue = WithUnit<Mass>;

impl<T> WithUnit<T> {
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
            _marker: PhantomData,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UnitError {
    #[error("Unknown mass unit: {0}")]
    UnknownWeightUnit(String),
}

impl WithUnit<Mass> {
    pub fn to_weight(&self) -> Result<Weight, UnitError> {
        match self.unit.as_str() {
            "kg" | "Kg" | "KG"
            | "kgs" | "Kgs" | "KGS"
            | "kilogram" | "Kilogram" | "KILOGRAM"
            | "kilograms" | "Kilograms" | "KILOGRAMS" => Ok(Weight::new::<kilogram>(self.value)),
            "g" | "G"
            | "gram" | "Gram" | "GRAM"
            | "grams" | "Grams" | "GRAMS" => Ok(Weight::new::<gram>(self.value)),
            "lb" | "Lb" | "LB"
            | "lbs" | "Lbs" | "LBS"
            | "pound" | "Pound" | "POUND"
            | "pounds" | "Pounds" | "POUNDS" => Ok(Weight::new::<pound>(self.value)),
            "t" | "T"
            | "metric ton" | "Metric Ton" | "METRIC TON"
            | "metric tons" | "Metric Tons" | "METRIC TONS" => Ok(Weight::new::<ton>(self.value)),
            _ => Err(UnitError::UnknownWeightUnit(self.unit.clone())),
        }
    }

    pub fn from_weight(weight: Weight, unit: &str) -> Result<Self, UnitError> {
        let value = match unit {
            "kg" | "Kg" | "KG"
            | "kgs" | "Kgs" | "KGS"
            | "kilogram" | "Kilogram" | "KILOGRAM"
            | "kilograms" | "Kilograms" | "KILOGRAMS" => weight.get::<kilogram>(),
            "g" | "G"
            | "gram" | "Gram" | "GRAM"
            | "grams" | "Grams" | "GRAMS" => weight.get::<gram>(),
            "lb" | "Lb" | "LB"
            | "lbs" | "Lbs" | "LBS"
            | "pound" | "Pound" | "POUND"
            | "pounds" | "Pounds" | "POUNDS" => weight.get::<pound>(),
            "t" | "T"
            | "metric ton" | "Metric Ton" | "METRIC TON"
            | "metric tons" | "Metric Tons" | "METRIC TONS" => weight.get::<ton>(),
            _ => return Err(UnitError::UnknownWeightUnit(unit.to_string())),
        };

        Ok(Self::new(value, unit))
    }
}
