use crate::error::Result;
use crate::search::SearchConfig;
use crate::summary::{DEFAULT_EXAMPLE_NAMES, DEFAULT_PREVIEW_LIMIT};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SummaryConfig {
    #[schemars(description = "Maximum number of nodes included in a summarization prompt")]
    pub preview_limit: usize,

    #[schemars(description = "Number of example names listed by the local summary")]
    pub example_names: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            preview_limit: DEFAULT_PREVIEW_LIMIT,
            example_names: DEFAULT_EXAMPLE_NAMES,
        }
    }
}

/// Engine settings. Every section is optional in serialized form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct EngineConfig {
    pub search: SearchConfig,
    pub summary: SummaryConfig,
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(EngineConfig)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchField;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.summary.preview_limit, 50);
        assert_eq!(config.summary.example_names, 6);
        assert_eq!(config.search.fields.len(), 6);
    }

    #[test]
    fn test_partial_config() {
        let config = EngineConfig::from_json_str(
            r#"{ "search": { "fields": ["name", "accountName", "diffPct"] }, "summary": { "example_names": 3 } }"#,
        )
        .unwrap();

        assert_eq!(
            config.search.fields,
            vec![SearchField::Name, SearchField::AccountName, SearchField::DiffPct]
        );
        assert_eq!(config.summary.example_names, 3);
        assert_eq!(config.summary.preview_limit, 50);
    }

    #[test]
    fn test_invalid_config_is_error() {
        assert!(EngineConfig::from_json_str(r#"{ "search": { "fields": ["bogus"] } }"#).is_err());
    }

    #[test]
    fn test_schema_generation() {
        let schema_json = EngineConfig::schema_as_json().unwrap();
        assert!(schema_json.contains("preview_limit"));
        assert!(schema_json.contains("fields"));
    }
}
