//! Unit definitions.
//!
//! Identifiers follow the `convert-units` vocabulary so existing path
//! configurations keep working. Every unit maps onto its measure's base unit
//! with `base = (value + offset) * factor`.

use std::f64::consts::PI;

use crate::Measure;

/// A single unit of measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unit {
    /// Identifier used in configuration (case-sensitive)
    pub id: &'static str,
    /// Measure this unit belongs to
    pub measure: Measure,
    /// Human-readable singular name
    pub singular: &'static str,
    /// Human-readable plural name
    pub plural: &'static str,
    factor: f64,
    offset: f64,
}

impl Unit {
    const fn linear(
        id: &'static str,
        measure: Measure,
        singular: &'static str,
        plural: &'static str,
        factor: f64,
    ) -> Self {
        Self {
            id,
            measure,
            singular,
            plural,
            factor,
            offset: 0.0,
        }
    }

    const fn affine(
        id: &'static str,
        measure: Measure,
        singular: &'static str,
        plural: &'static str,
        factor: f64,
        offset: f64,
    ) -> Self {
        Self {
            id,
            measure,
            singular,
            plural,
            factor,
            offset,
        }
    }

    /// Express `value` (in this unit) in the measure's base unit
    #[inline]
    pub(crate) fn to_base(&self, value: f64) -> f64 {
        (value + self.offset) * self.factor
    }

    /// Express a base-unit `value` in this unit
    #[inline]
    pub(crate) fn from_base(&self, value: f64) -> f64 {
        value / self.factor - self.offset
    }
}

use Measure::*;

pub(crate) static UNITS: &[Unit] = &[
    // Length (base: metre)
    Unit::linear("nm", Length, "Nanometer", "Nanometers", 1e-9),
    Unit::linear("um", Length, "Micrometer", "Micrometers", 1e-6),
    Unit::linear("mm", Length, "Millimeter", "Millimeters", 1e-3),
    Unit::linear("cm", Length, "Centimeter", "Centimeters", 1e-2),
    Unit::linear("m", Length, "Meter", "Meters", 1.0),
    Unit::linear("km", Length, "Kilometer", "Kilometers", 1e3),
    Unit::linear("in", Length, "Inch", "Inches", 0.0254),
    Unit::linear("yd", Length, "Yard", "Yards", 0.9144),
    Unit::linear("ft-us", Length, "US Survey Foot", "US Survey Feet", 1200.0 / 3937.0),
    Unit::linear("ft", Length, "Foot", "Feet", 0.3048),
    Unit::linear("fathom", Length, "Fathom", "Fathoms", 1.8288),
    Unit::linear("mi", Length, "Mile", "Miles", 1609.344),
    Unit::linear("nMi", Length, "Nautical Mile", "Nautical Miles", 1852.0),
    // Area (base: square metre)
    Unit::linear("mm2", Area, "Square Millimeter", "Square Millimeters", 1e-6),
    Unit::linear("cm2", Area, "Square Centimeter", "Square Centimeters", 1e-4),
    Unit::linear("m2", Area, "Square Meter", "Square Meters", 1.0),
    Unit::linear("ha", Area, "Hectare", "Hectares", 1e4),
    Unit::linear("km2", Area, "Square Kilometer", "Square Kilometers", 1e6),
    Unit::linear("in2", Area, "Square Inch", "Square Inches", 0.000_645_16),
    Unit::linear("yd2", Area, "Square Yard", "Square Yards", 0.836_127_36),
    Unit::linear("ft2", Area, "Square Foot", "Square Feet", 0.092_903_04),
    Unit::linear("ac", Area, "Acre", "Acres", 4046.856_422_4),
    Unit::linear("mi2", Area, "Square Mile", "Square Miles", 2_589_988.110_336),
    // Mass (base: kilogram)
    Unit::linear("mcg", Mass, "Microgram", "Micrograms", 1e-9),
    Unit::linear("mg", Mass, "Milligram", "Milligrams", 1e-6),
    Unit::linear("g", Mass, "Gram", "Grams", 1e-3),
    Unit::linear("kg", Mass, "Kilogram", "Kilograms", 1.0),
    Unit::linear("mt", Mass, "Metric Tonne", "Metric Tonnes", 1e3),
    Unit::linear("oz", Mass, "Ounce", "Ounces", 0.028_349_523_125),
    Unit::linear("lb", Mass, "Pound", "Pounds", 0.453_592_37),
    Unit::linear("t", Mass, "Ton", "Tons", 907.184_74),
    // Volume (base: cubic metre)
    Unit::linear("mm3", Volume, "Cubic Millimeter", "Cubic Millimeters", 1e-9),
    Unit::linear("cm3", Volume, "Cubic Centimeter", "Cubic Centimeters", 1e-6),
    Unit::linear("ml", Volume, "Millilitre", "Millilitres", 1e-6),
    Unit::linear("cl", Volume, "Centilitre", "Centilitres", 1e-5),
    Unit::linear("dl", Volume, "Decilitre", "Decilitres", 1e-4),
    Unit::linear("l", Volume, "Litre", "Litres", 1e-3),
    Unit::linear("kl", Volume, "Kilolitre", "Kilolitres", 1.0),
    Unit::linear("m3", Volume, "Cubic Meter", "Cubic Meters", 1.0),
    Unit::linear("km3", Volume, "Cubic Kilometer", "Cubic Kilometers", 1e9),
    Unit::linear("tsp", Volume, "Teaspoon", "Teaspoons", 4.928_921_593_75e-6),
    Unit::linear("Tbs", Volume, "Tablespoon", "Tablespoons", 1.478_676_478_125e-5),
    Unit::linear("in3", Volume, "Cubic Inch", "Cubic Inches", 1.638_706_4e-5),
    Unit::linear("fl-oz", Volume, "Fluid Ounce", "Fluid Ounces", 2.957_352_956_25e-5),
    Unit::linear("cup", Volume, "Cup", "Cups", 2.365_882_365e-4),
    Unit::linear("pnt", Volume, "Pint", "Pints", 4.731_764_73e-4),
    Unit::linear("qt", Volume, "Quart", "Quarts", 9.463_529_46e-4),
    Unit::linear("gal", Volume, "Gallon", "Gallons", 3.785_411_784e-3),
    Unit::linear("ft3", Volume, "Cubic Foot", "Cubic Feet", 0.028_316_846_592),
    Unit::linear("yd3", Volume, "Cubic Yard", "Cubic Yards", 0.764_554_857_984),
    // Temperature (base: kelvin)
    Unit::affine("C", Temperature, "Degree Celsius", "Degrees Celsius", 1.0, 273.15),
    Unit::affine("F", Temperature, "Degree Fahrenheit", "Degrees Fahrenheit", 5.0 / 9.0, 459.67),
    Unit::linear("K", Temperature, "Kelvin", "Kelvin", 1.0),
    Unit::linear("R", Temperature, "Degree Rankine", "Degrees Rankine", 5.0 / 9.0),
    // Time (base: second)
    Unit::linear("ns", Time, "Nanosecond", "Nanoseconds", 1e-9),
    Unit::linear("mu", Time, "Microsecond", "Microseconds", 1e-6),
    Unit::linear("ms", Time, "Millisecond", "Milliseconds", 1e-3),
    Unit::linear("s", Time, "Second", "Seconds", 1.0),
    Unit::linear("min", Time, "Minute", "Minutes", 60.0),
    Unit::linear("h", Time, "Hour", "Hours", 3600.0),
    Unit::linear("d", Time, "Day", "Days", 86_400.0),
    Unit::linear("week", Time, "Week", "Weeks", 604_800.0),
    Unit::linear("month", Time, "Month", "Months", 2_629_800.0),
    Unit::linear("year", Time, "Year", "Years", 31_557_600.0),
    // Speed (base: metre per second)
    Unit::linear("m/s", Speed, "Metre per second", "Metres per second", 1.0),
    Unit::linear("km/h", Speed, "Kilometre per hour", "Kilometres per hour", 1.0 / 3.6),
    Unit::linear("m/h", Speed, "Mile per hour", "Miles per hour", 0.447_04),
    Unit::linear("knot", Speed, "Knot", "Knots", 1852.0 / 3600.0),
    Unit::linear("ft/s", Speed, "Foot per second", "Feet per second", 0.3048),
    // Pressure (base: pascal)
    Unit::linear("Pa", Pressure, "pascal", "pascals", 1.0),
    Unit::linear("hPa", Pressure, "hectopascal", "hectopascals", 100.0),
    Unit::linear("mbar", Pressure, "millibar", "millibars", 100.0),
    Unit::linear("kPa", Pressure, "kilopascal", "kilopascals", 1e3),
    Unit::linear("MPa", Pressure, "megapascal", "megapascals", 1e6),
    Unit::linear("bar", Pressure, "bar", "bar", 1e5),
    Unit::linear("atm", Pressure, "atmosphere", "atmospheres", 101_325.0),
    Unit::linear("torr", Pressure, "torr", "torr", 101_325.0 / 760.0),
    Unit::linear("inHg", Pressure, "inch of mercury", "inches of mercury", 3386.389),
    Unit::linear("psi", Pressure, "pound per square inch", "pounds per square inch", 6894.757_293_168),
    Unit::linear("ksi", Pressure, "kilopound per square inch", "kilopound per square inch", 6_894_757.293_168),
    // Angle (base: radian)
    Unit::linear("rad", Angle, "radian", "radians", 1.0),
    Unit::linear("deg", Angle, "degree", "degrees", PI / 180.0),
    Unit::linear("grad", Angle, "gradian", "gradians", PI / 200.0),
    Unit::linear("arcmin", Angle, "arcminute", "arcminutes", PI / 10_800.0),
    Unit::linear("arcsec", Angle, "arcsecond", "arcseconds", PI / 648_000.0),
    // Frequency (base: hertz)
    Unit::linear("mHz", Frequency, "millihertz", "millihertz", 1e-3),
    Unit::linear("Hz", Frequency, "hertz", "hertz", 1.0),
    Unit::linear("kHz", Frequency, "kilohertz", "kilohertz", 1e3),
    Unit::linear("MHz", Frequency, "megahertz", "megahertz", 1e6),
    Unit::linear("GHz", Frequency, "gigahertz", "gigahertz", 1e9),
    Unit::linear("THz", Frequency, "terahertz", "terahertz", 1e12),
    Unit::linear("rpm", Frequency, "rotation per minute", "rotations per minute", 1.0 / 60.0),
    Unit::linear("deg/s", Frequency, "degree per second", "degrees per second", 1.0 / 360.0),
    Unit::linear("rad/s", Frequency, "radian per second", "radians per second", 1.0 / (2.0 * PI)),
    // Voltage (base: volt)
    Unit::linear("mV", Voltage, "Millivolt", "Millivolts", 1e-3),
    Unit::linear("V", Voltage, "Volt", "Volts", 1.0),
    Unit::linear("kV", Voltage, "Kilovolt", "Kilovolts", 1e3),
    // Current (base: ampere)
    Unit::linear("mA", Current, "Milliampere", "Milliamperes", 1e-3),
    Unit::linear("A", Current, "Ampere", "Amperes", 1.0),
    Unit::linear("kA", Current, "Kiloampere", "Kiloamperes", 1e3),
    // Power (base: watt)
    Unit::linear("mW", Power, "Milliwatt", "Milliwatts", 1e-3),
    Unit::linear("W", Power, "Watt", "Watts", 1.0),
    Unit::linear("kW", Power, "Kilowatt", "Kilowatts", 1e3),
    Unit::linear("MW", Power, "Megawatt", "Megawatts", 1e6),
    Unit::linear("GW", Power, "Gigawatt", "Gigawatts", 1e9),
    // Energy (base: joule)
    Unit::linear("J", Energy, "Joule", "Joules", 1.0),
    Unit::linear("kJ", Energy, "Kilojoule", "Kilojoules", 1e3),
    Unit::linear("mWh", Energy, "Milliwatt-hour", "Milliwatt-hours", 3.6),
    Unit::linear("Wh", Energy, "Watt-hour", "Watt-hours", 3600.0),
    Unit::linear("kWh", Energy, "Kilowatt-hour", "Kilowatt-hours", 3.6e6),
    Unit::linear("MWh", Energy, "Megawatt-hour", "Megawatt-hours", 3.6e9),
    Unit::linear("GWh", Energy, "Gigawatt-hour", "Gigawatt-hours", 3.6e12),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique() {
        let mut seen = HashSet::new();
        for unit in UNITS {
            assert!(seen.insert(unit.id), "duplicate unit id {}", unit.id);
        }
    }

    #[test]
    fn test_every_measure_has_a_base_unit() {
        for measure in Measure::ALL {
            let base = UNITS
                .iter()
                .find(|u| u.id == measure.base_unit())
                .unwrap_or_else(|| panic!("no base unit for {measure}"));
            assert_eq!(base.measure, measure);
            assert_eq!(base.to_base(42.0), 42.0);
        }
    }

    #[test]
    fn test_factors_are_positive() {
        for unit in UNITS {
            assert!(unit.factor > 0.0, "{} has non-positive factor", unit.id);
        }
    }
}
