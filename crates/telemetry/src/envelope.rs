//! Envelope types.
//!
//! Defines the exact structure handed to the template for one tick:
//! `{ "path": [ { "name": ..., "value": ... }, ... ] }`.

use datapost_config::PathSpec;
use serde::Serialize;
use tracing::{trace, warn};

use crate::error::TelemetryError;
use crate::sample::{self, ItemValue};
use crate::source::DataSource;

/// One validated, possibly converted value paired with its output name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvelopeItem {
    pub name: String,
    pub value: ItemValue,
}

/// Root structure passed to the template.
///
/// Items appear in path configuration order; absent paths are left out.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Envelope {
    pub path: Vec<EnvelopeItem>,
}

/// A path whose item was dropped because its conversion failed
#[derive(Debug)]
pub struct PathFailure {
    pub path: String,
    pub name: String,
    pub error: TelemetryError,
}

/// Result of building one envelope
#[derive(Debug, Default)]
pub struct Built {
    pub envelope: Envelope,
    pub failures: Vec<PathFailure>,
}

impl Envelope {
    /// Sample every path from `source` in order.
    ///
    /// Absent values are skipped. Disallowed kinds become empty strings.
    /// A failed conversion drops that path's item and is reported in
    /// `failures`; the remaining paths are still sampled.
    pub fn build(paths: &[PathSpec], source: &dyn DataSource) -> Built {
        let mut built = Built::default();

        for spec in paths {
            let Some(raw) = source.get_value(&spec.path) else {
                trace!(path = %spec.path, "value absent, skipped");
                continue;
            };

            match sample::process(&raw, spec.conversion()) {
                Ok(value) => {
                    trace!(path = %spec.path, name = %spec.name, "value sampled");
                    built.envelope.path.push(EnvelopeItem {
                        name: spec.name.clone(),
                        value,
                    });
                }
                Err(error) => {
                    warn!(
                        path = %spec.path,
                        name = %spec.name,
                        error = %error,
                        "conversion failed, item omitted"
                    );
                    built.failures.push(PathFailure {
                        path: spec.path.clone(),
                        name: spec.name.clone(),
                        error,
                    });
                }
            }
        }

        built
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.path.len()
    }

    /// Whether there is nothing to deliver
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Value of the first item called `name`
    pub fn get(&self, name: &str) -> Option<&ItemValue> {
        self.path
            .iter()
            .find(|item| item.name == name)
            .map(|item| &item.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn source() -> Value {
        json!({
            "navigation": {
                "speedOverGround": 5.14,
                "headingTrue": 0,
                "state": "sailing",
                "position": { "latitude": 60.1, "longitude": 24.9 },
                "lights": false
            },
            "name": null
        })
    }

    fn names(envelope: &Envelope) -> Vec<&str> {
        envelope.path.iter().map(|item| item.name.as_str()).collect()
    }

    #[test]
    fn test_build_preserves_configuration_order() {
        let paths = vec![
            PathSpec::new("navigation.state", "state"),
            PathSpec::new("navigation.missing", "missing"),
            PathSpec::new("navigation.headingTrue", "hdg"),
            PathSpec::new("navigation.lights", "lights"),
        ];
        let built = Envelope::build(&paths, &source());

        assert_eq!(names(&built.envelope), vec!["state", "hdg", "lights"]);
        assert!(built.failures.is_empty());
        assert_eq!(built.envelope.get("hdg"), Some(&ItemValue::Number(0.into())));
        assert_eq!(built.envelope.get("lights"), Some(&ItemValue::Bool(false)));
    }

    #[test]
    fn test_build_guards_disallowed_kinds() {
        let paths = vec![
            PathSpec::new("navigation.position", "pos"),
            PathSpec::new("name", "name"),
        ];
        let built = Envelope::build(&paths, &source());

        assert_eq!(built.envelope.len(), 2);
        assert_eq!(built.envelope.get("pos"), Some(&ItemValue::empty()));
        assert_eq!(built.envelope.get("name"), Some(&ItemValue::empty()));
    }

    #[test]
    fn test_build_applies_conversion() {
        let paths =
            vec![PathSpec::new("navigation.speedOverGround", "sog").with_conversion("m/s", "knot")];
        let built = Envelope::build(&paths, &source());

        let sog = built.envelope.get("sog").and_then(ItemValue::as_f64).unwrap();
        assert!((sog - 9.99).abs() < 0.01);
    }

    #[test]
    fn test_build_single_unit_leaves_value() {
        let paths = vec![PathSpec {
            conversion_to: Some("knot".into()),
            ..PathSpec::new("navigation.speedOverGround", "sog")
        }];
        let built = Envelope::build(&paths, &source());
        assert_eq!(built.envelope.get("sog").and_then(ItemValue::as_f64), Some(5.14));
    }

    #[test]
    fn test_build_conversion_failure_drops_only_that_item() {
        let paths = vec![
            PathSpec::new("navigation.state", "state").with_conversion("m/s", "knot"),
            PathSpec::new("navigation.headingTrue", "hdg").with_conversion("rad", "C"),
            PathSpec::new("navigation.speedOverGround", "sog"),
        ];
        let built = Envelope::build(&paths, &source());

        assert_eq!(names(&built.envelope), vec!["sog"]);
        assert_eq!(built.failures.len(), 2);
        assert_eq!(built.failures[0].name, "state");
        assert!(matches!(built.failures[0].error, TelemetryError::NotNumeric { .. }));
        assert!(matches!(built.failures[1].error, TelemetryError::Units(_)));
    }

    #[test]
    fn test_build_nothing_resolves() {
        let paths = vec![PathSpec::new("environment.depth", "depth")];
        let built = Envelope::build(&paths, &source());
        assert!(built.envelope.is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let envelope = Envelope {
            path: vec![EnvelopeItem {
                name: "sog".into(),
                value: ItemValue::Number(serde_json::Number::from_f64(9.99).unwrap()),
            }],
        };
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({ "path": [{ "name": "sog", "value": 9.99 }] })
        );
    }
}
