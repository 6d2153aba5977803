//! Datapost units - converts sampled values between units of measurement.
//!
//! Unit identifiers use the `convert-units` vocabulary (`m/s`, `knot`, `C`,
//! `hPa`, `nMi`, ...). Conversion only succeeds between units of the same
//! [`Measure`].
//!
//! # Example
//!
//! ```
//! let knots = datapost_units::convert(5.14, "m/s", "knot").unwrap();
//! assert!((knots - 9.9914).abs() < 1e-3);
//!
//! assert!(datapost_units::convert(1.0, "m/s", "bar").is_err());
//! ```

mod error;
mod table;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

pub use error::{Result, UnitError};
pub use table::Unit;

use table::UNITS;

/// Physical quantity a unit measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Measure {
    Length,
    Area,
    Mass,
    Volume,
    Temperature,
    Time,
    Speed,
    Pressure,
    Angle,
    Frequency,
    Voltage,
    Current,
    Power,
    Energy,
}

impl Measure {
    /// All supported measures, in listing order
    pub const ALL: [Measure; 14] = [
        Measure::Length,
        Measure::Area,
        Measure::Mass,
        Measure::Volume,
        Measure::Temperature,
        Measure::Time,
        Measure::Speed,
        Measure::Pressure,
        Measure::Angle,
        Measure::Frequency,
        Measure::Voltage,
        Measure::Current,
        Measure::Power,
        Measure::Energy,
    ];

    /// Lowercase name used in listings and errors
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Length => "length",
            Self::Area => "area",
            Self::Mass => "mass",
            Self::Volume => "volume",
            Self::Temperature => "temperature",
            Self::Time => "time",
            Self::Speed => "speed",
            Self::Pressure => "pressure",
            Self::Angle => "angle",
            Self::Frequency => "frequency",
            Self::Voltage => "voltage",
            Self::Current => "current",
            Self::Power => "power",
            Self::Energy => "energy",
        }
    }

    /// Identifier of the SI unit every other unit of this measure maps onto
    pub fn base_unit(&self) -> &'static str {
        match self {
            Self::Length => "m",
            Self::Area => "m2",
            Self::Mass => "kg",
            Self::Volume => "m3",
            Self::Temperature => "K",
            Self::Time => "s",
            Self::Speed => "m/s",
            Self::Pressure => "Pa",
            Self::Angle => "rad",
            Self::Frequency => "Hz",
            Self::Voltage => "V",
            Self::Current => "A",
            Self::Power => "W",
            Self::Energy => "J",
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Measure {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Measure::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown measure '{s}'"))
    }
}

/// Every supported measure.
pub fn measures() -> &'static [Measure] {
    &Measure::ALL
}

/// Look up a unit by identifier.
pub fn find(id: &str) -> Option<&'static Unit> {
    UNITS.iter().find(|u| u.id == id)
}

/// Look up a unit, failing with [`UnitError::UnknownUnit`].
pub fn describe(id: &str) -> Result<&'static Unit> {
    find(id).ok_or_else(|| UnitError::unknown(id))
}

/// Unit identifiers, optionally restricted to one measure.
pub fn possibilities(measure: Option<Measure>) -> Vec<&'static str> {
    UNITS
        .iter()
        .filter(|u| measure.is_none_or(|m| u.measure == m))
        .map(|u| u.id)
        .collect()
}

/// Check that `from` and `to` exist and can be converted into each other.
pub fn check_pair(from: &str, to: &str) -> Result<(&'static Unit, &'static Unit)> {
    let source = describe(from)?;
    let target = describe(to)?;

    if source.measure != target.measure {
        return Err(UnitError::Incompatible {
            from: from.to_string(),
            from_measure: source.measure,
            to: to.to_string(),
            to_measure: target.measure,
        });
    }

    Ok((source, target))
}

/// Convert `value` from one unit to another.
///
/// # Errors
///
/// Returns [`UnitError::UnknownUnit`] if either identifier is not known and
/// [`UnitError::Incompatible`] if the units measure different things.
pub fn convert(value: f64, from: &str, to: &str) -> Result<f64> {
    let (source, target) = check_pair(from, to)?;
    if source.id == target.id {
        return Ok(value);
    }
    Ok(target.from_base(source.to_base(value)))
}
