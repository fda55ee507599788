use std::fmt;

use serde::Serialize;

pub const KILOMETER_THRESHOLD_M: f64 = 1_000.0;
pub const SQUARE_KILOMETER_THRESHOLD_M2: f64 = 1_000_000.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Meters,
    Kilometers,
    SquareMeters,
    SquareKilometers,
}

impl Unit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Meters => "m",
            Unit::Kilometers => "km",
            Unit::SquareMeters => "m²",
            Unit::SquareKilometers => "km²",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A value already scaled into its display unit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Quantity {
    pub value: f64,
    pub unit: Unit,
}

impl Quantity {
    pub fn label(&self) -> String {
        format!("{:.2} {}", self.value, self.unit)
    }
}

pub fn format_distance(meters: f64) -> Quantity {
    if meters < KILOMETER_THRESHOLD_M {
        Quantity {
            value: meters,
            unit: Unit::Meters,
        }
    } else {
        Quantity {
            value: meters / 1_000.0,
            unit: Unit::Kilometers,
        }
    }
}

pub fn format_area(square_meters: f64) -> Quantity {
    if square_meters < SQUARE_KILOMETER_THRESHOLD_M2 {
        Quantity {
            value: square_meters,
            unit: Unit::SquareMeters,
        }
    } else {
        Quantity {
            value: square_meters / 1_000_000.0,
            unit: Unit::SquareKilometers,
        }
    }
}
