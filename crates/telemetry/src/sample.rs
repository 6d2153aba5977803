//! Type guard and unit conversion for sampled values.
//!
//! Only booleans, numbers and strings reach the template. Anything else
//! (objects, arrays, null) is emitted as an empty string so the item stays
//! in the envelope.

use serde::Serialize;
use serde_json::{Number, Value};

use crate::error::{Result, TelemetryError};

/// Largest integer an f64 holds exactly
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Value of one envelope item
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ItemValue {
    Bool(bool),
    Number(Number),
    Text(String),
}

impl ItemValue {
    /// Empty string, the stand-in for disallowed kinds
    pub fn empty() -> Self {
        Self::Text(String::new())
    }

    /// Numeric view, if this is a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }
}

impl From<ItemValue> for Value {
    fn from(value: ItemValue) -> Self {
        match value {
            ItemValue::Bool(b) => Value::Bool(b),
            ItemValue::Number(n) => Value::Number(n),
            ItemValue::Text(s) => Value::String(s),
        }
    }
}

/// Apply the type allow-list to a raw value.
pub fn guard(value: &Value) -> ItemValue {
    match value {
        Value::Bool(b) => ItemValue::Bool(*b),
        Value::Number(n) => ItemValue::Number(n.clone()),
        Value::String(s) => ItemValue::Text(s.clone()),
        Value::Null | Value::Array(_) | Value::Object(_) => ItemValue::empty(),
    }
}

/// Guard a raw value, then convert it when a unit pair is given.
///
/// Conversion only applies to numbers; a non-numeric value with a unit pair
/// is an error rather than a silent pass-through.
pub fn process(value: &Value, conversion: Option<(&str, &str)>) -> Result<ItemValue> {
    let item = guard(value);
    let Some((from, to)) = conversion else {
        return Ok(item);
    };

    let Some(raw) = item.as_f64() else {
        return Err(TelemetryError::NotNumeric {
            from: from.to_string(),
            to: to.to_string(),
        });
    };

    let converted = datapost_units::convert(raw, from, to)?;
    number(converted)
        .map(ItemValue::Number)
        .ok_or_else(|| TelemetryError::NonFinite {
            from: from.to_string(),
            to: to.to_string(),
        })
}

/// JSON number for a conversion result; integral values stay integers.
fn number(value: f64) -> Option<Number> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER {
        return Some(Number::from(value as i64));
    }
    Number::from_f64(value)
}
