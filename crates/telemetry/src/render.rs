//! Template rendering.
//!
//! The upload template is compiled once when the pipeline is built and
//! rendered against a fresh envelope every tick. Templates use Handlebars
//! syntax plus one helper:
//!
//! ```text
//! {{getValueByName path "sog"}}
//! ```
//!
//! which returns the value of the first envelope item named `sog`, or an
//! empty string when there is none.

use handlebars::{Handlebars, handlebars_helper, no_escape};
use serde_json::Value;

use crate::envelope::Envelope;
use crate::error::{Result, TelemetryError};

/// Name the upload template is registered under
const TEMPLATE_NAME: &str = "upload";

handlebars_helper!(get_value_by_name: |items: array, name: str| {
    items
        .iter()
        .find(|item| item.get("name").and_then(Value::as_str) == Some(name))
        .and_then(|item| item.get("value"))
        .cloned()
        .unwrap_or_else(|| Value::String(String::new()))
});

/// Compiled upload template
pub struct Renderer {
    registry: Handlebars<'static>,
}

impl Renderer {
    /// Compile `template`.
    ///
    /// With `escape_html` off, `{{ }}` output is inserted verbatim instead of
    /// HTML-escaped.
    pub fn compile(template: &str, escape_html: bool) -> Result<Self> {
        let mut registry = Handlebars::new();
        if !escape_html {
            registry.register_escape_fn(no_escape);
        }
        registry.register_helper("getValueByName", Box::new(get_value_by_name));
        registry
            .register_template_string(TEMPLATE_NAME, template)
            .map_err(|e| TelemetryError::Template(e.to_string()))?;

        Ok(Self { registry })
    }

    /// Render an envelope. The envelope is only read.
    pub fn render(&self, envelope: &Envelope) -> Result<String> {
        self.registry
            .render(TEMPLATE_NAME, envelope)
            .map_err(|e| TelemetryError::Render(e.to_string()))
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::EnvelopeItem;
    use crate::sample::ItemValue;
    use serde_json::Number;

    fn envelope(items: &[(&str, ItemValue)]) -> Envelope {
        Envelope {
            path: items
                .iter()
                .map(|(name, value)| EnvelopeItem {
                    name: name.to_string(),
                    value: value.clone(),
                })
                .collect(),
        }
    }

    fn num(v: f64) -> ItemValue {
        ItemValue::Number(Number::from_f64(v).unwrap())
    }

    #[test]
    fn test_get_value_by_name() {
        let renderer = Renderer::compile(r#"{"v":"{{getValueByName path "sog"}}"}"#, true).unwrap();
        let body = renderer.render(&envelope(&[("sog", num(9.99))])).unwrap();
        assert_eq!(body, r#"{"v":"9.99"}"#);
    }

    #[test]
    fn test_missing_name_renders_empty() {
        let renderer = Renderer::compile(r#"[{{getValueByName path "depth"}}]"#, true).unwrap();
        let body = renderer.render(&envelope(&[("sog", num(1.5))])).unwrap();
        assert_eq!(body, "[]");

        let body = renderer.render(&Envelope::default()).unwrap();
        assert_eq!(body, "[]");
    }

    #[test]
    fn test_first_match_wins() {
        let renderer = Renderer::compile(r#"{{getValueByName path "a"}}"#, true).unwrap();
        let body = renderer
            .render(&envelope(&[
                ("a", ItemValue::Text("first".into())),
                ("a", ItemValue::Text("second".into())),
            ]))
            .unwrap();
        assert_eq!(body, "first");
    }

    #[test]
    fn test_kinds_render_like_json() {
        let renderer = Renderer::compile(
            r#"{{getValueByName path "b"}} {{getValueByName path "i"}} {{getValueByName path "e"}}|"#,
            true,
        )
        .unwrap();
        let body = renderer
            .render(&envelope(&[
                ("b", ItemValue::Bool(false)),
                ("i", ItemValue::Number(10.into())),
                ("e", ItemValue::empty()),
            ]))
            .unwrap();
        assert_eq!(body, "false 10 |");
    }

    #[test]
    fn test_each_over_items() {
        let template = r#"{{#each path}}{{name}}={{value}};{{/each}}"#;
        let renderer = Renderer::compile(template, true).unwrap();
        let body = renderer
            .render(&envelope(&[("a", num(1.25)), ("b", ItemValue::Text("x".into()))]))
            .unwrap();
        assert_eq!(body, "a=1.25;b=x;");
    }

    #[test]
    fn test_escape_html_toggle() {
        let items = envelope(&[("s", ItemValue::Text("a<b".into()))]);

        let escaped = Renderer::compile(r#"{{getValueByName path "s"}}"#, true).unwrap();
        assert_eq!(escaped.render(&items).unwrap(), "a&lt;b");

        let raw = Renderer::compile(r#"{{getValueByName path "s"}}"#, false).unwrap();
        assert_eq!(raw.render(&items).unwrap(), "a<b");
    }

    #[test]
    fn test_invalid_template() {
        let result = Renderer::compile("{{#each path}}unclosed", true);
        assert!(matches!(result, Err(TelemetryError::Template(_))));
    }

    #[test]
    fn test_render_does_not_mutate_envelope() {
        let renderer = Renderer::compile(r#"{{getValueByName path "a"}}"#, true).unwrap();
        let items = envelope(&[("a", num(2.5))]);
        let before = items.clone();
        renderer.render(&items).unwrap();
        assert_eq!(items, before);
    }
}
