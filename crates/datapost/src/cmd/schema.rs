//! Schema command - JSON Schema of the upload settings
//!
//! The schema is what an operator UI needs to render a settings form.

use anyhow::Result;
use datapost_config::UploadConfig;
use schemars::schema_for;

/// Run the schema command
pub fn run() -> Result<()> {
    let schema = schema_for!(UploadConfig);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_describes_upload_fields() {
        let schema = serde_json::to_value(schema_for!(UploadConfig)).unwrap();
        let properties = &schema["properties"];
        for field in ["url", "interval", "template", "headers", "paths", "timeout"] {
            assert!(properties.get(field).is_some(), "missing {field}");
        }
        assert_eq!(properties["timeout"]["type"], "string");
    }

    #[test]
    fn test_schema_suggests_interval_default() {
        let schema = serde_json::to_value(schema_for!(UploadConfig)).unwrap();
        assert_eq!(schema["properties"]["interval"]["default"], 60);
        assert_eq!(UploadConfig::default().interval(), None);
    }
}
