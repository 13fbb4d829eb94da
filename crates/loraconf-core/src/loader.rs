//! Config loading from disk

use crate::model_config::{ModelConfig, ModelConfigInput};
use crate::validator::ValidationError;
use serde_yaml::{Mapping, Value as YamlValue};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Loader errors
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("Config not found: {0}")]
    NotFound(PathBuf),

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("Config too large: {size} > {max} bytes")]
    FileTooLarge { size: u64, max: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialize error: {0}")]
    Serialize(String),

    #[error("Invalid config: {0}")]
    Invalid(#[from] ValidationError),
}

/// Config document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigFormat {
    #[default]
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Pick a format from a file extension
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Loader configuration
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Maximum file size in bytes
    pub max_file_size: u64,
    /// Key of the model section in job files
    pub section: Option<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_file_size: 16 * 1024 * 1024, // 16MB
            section: Some("model".to_string()),
        }
    }
}

/// Model config loader
pub struct ConfigLoader {
    config: LoaderConfig,
}

impl ConfigLoader {
    /// Create a new loader
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Get configuration
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Parse a model config from a document
    ///
    /// If the document is a mapping holding the configured section key, the
    /// model settings are read from that section. An empty document or section
    /// is an empty model config.
    pub fn parse(&self, content: &str, format: ConfigFormat) -> Result<ModelConfig, LoaderError> {
        let document: YamlValue = if content.trim().is_empty() {
            YamlValue::Null
        } else {
            match format {
                ConfigFormat::Yaml => {
                    serde_yaml::from_str(content).map_err(|e| LoaderError::Parse(e.to_string()))?
                }
                ConfigFormat::Json => {
                    serde_json::from_str(content).map_err(|e| LoaderError::Parse(e.to_string()))?
                }
            }
        };

        let mut section = match self.select_section(document) {
            YamlValue::Null => YamlValue::Mapping(Mapping::new()),
            section => section,
        };
        mark_non_finite_weights(&mut section);

        let input: ModelConfigInput =
            serde_yaml::from_value(section).map_err(|e| LoaderError::Parse(e.to_string()))?;

        let config = input.build()?;
        debug!(adapters = config.adapters().len(), "Parsed model config");

        Ok(config)
    }

    /// Load a model config from a file
    pub fn load(&self, path: impl AsRef<Path>) -> Result<ModelConfig, LoaderError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(LoaderError::NotFound(path.to_path_buf()));
        }

        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| LoaderError::UnsupportedFormat(path.to_path_buf()))?;

        let metadata = std::fs::metadata(path)?;
        if metadata.len() > self.config.max_file_size {
            return Err(LoaderError::FileTooLarge {
                size: metadata.len(),
                max: self.config.max_file_size,
            });
        }

        let content = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), ?format, "Loading model config");

        self.parse(&content, format)
    }

    /// Render a normalized config
    pub fn render(
        &self,
        config: &ModelConfig,
        format: ConfigFormat,
    ) -> Result<String, LoaderError> {
        match format {
            ConfigFormat::Yaml => {
                serde_yaml::to_string(config).map_err(|e| LoaderError::Serialize(e.to_string()))
            }
            ConfigFormat::Json => serde_json::to_string_pretty(config)
                .map_err(|e| LoaderError::Serialize(e.to_string())),
        }
    }

    /// Save a normalized config, format taken from the extension
    pub fn save(&self, config: &ModelConfig, path: impl AsRef<Path>) -> Result<(), LoaderError> {
        let path = path.as_ref();

        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| LoaderError::UnsupportedFormat(path.to_path_buf()))?;

        std::fs::write(path, self.render(config, format)?)?;

        Ok(())
    }

    fn select_section(&self, document: YamlValue) -> YamlValue {
        let Some(key) = self.config.section.as_deref() else {
            return document;
        };

        match document {
            YamlValue::Mapping(mut map)
                if map
                    .get(key)
                    .is_some_and(|section| section.is_mapping() || section.is_null()) =>
            {
                map.remove(key).unwrap_or(YamlValue::Null)
            }
            other => other,
        }
    }
}

/// Replace non-finite `lora_paths` weights with their text form
///
/// Raw records are JSON values, which cannot hold `.inf` or `.nan`; as text
/// they still fail validation at their own index instead of reading as unset.
fn mark_non_finite_weights(section: &mut YamlValue) {
    let Some(records) = section
        .get_mut("lora_paths")
        .and_then(YamlValue::as_sequence_mut)
    else {
        return;
    };

    for record in records {
        let Some(weight) = record.get_mut("weight") else {
            continue;
        };
        if let Some(value) = weight.as_f64().filter(|w| !w.is_finite()) {
            *weight = YamlValue::String(value.to_string());
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const JOB_YAML: &str = r#"
model:
  name_or_path: black-forest-labs/FLUX.1-dev
  is_flux: true
  lora_paths:
    - path: /path/to/lora1.safetensors
      weight: 0.9
    - path: /path/to/lora2.safetensors
      weight: 0.6
train:
  steps: 1000
"#;

    #[test]
    fn test_parse_job_yaml() {
        let loader = ConfigLoader::default();
        let config = loader.parse(JOB_YAML, ConfigFormat::Yaml).unwrap();

        assert_eq!(
            config.name_or_path.as_deref(),
            Some("black-forest-labs/FLUX.1-dev")
        );
        assert!(config.is_flux);
        assert_eq!(config.adapters().len(), 2);
        assert_eq!(config.adapters()[0].weight, 0.9);
        assert_eq!(config.adapters()[1].weight, 0.6);
        assert!(!config.extra.contains_key("train"));
    }

    #[test]
    fn test_parse_bare_section() {
        let yaml = "lora_path: /a.safetensors\nlora_weight: 0.8\n";

        let config = ConfigLoader::default()
            .parse(yaml, ConfigFormat::Yaml)
            .unwrap();

        assert_eq!(config.lora_path, None);
        assert_eq!(config.adapters()[0].path, "/a.safetensors");
        assert_eq!(config.adapters()[0].weight, 0.8);
    }

    #[test]
    fn test_parse_without_section_key() {
        let loader = ConfigLoader::new(LoaderConfig {
            section: None,
            ..Default::default()
        });

        let config = loader.parse(JOB_YAML, ConfigFormat::Yaml).unwrap();
        assert!(config.extra.contains_key("model"));
        assert!(!config.has_adapters());
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{"model": {"lora_paths": [{"path": "/a"}]}}"#;

        let config = ConfigLoader::default()
            .parse(json, ConfigFormat::Json)
            .unwrap();
        assert_eq!(config.adapters()[0].weight, 1.0);
    }

    #[test]
    fn test_invalid_records_surface_as_validation_errors() {
        let yaml = "model:\n  lora_paths:\n    - /path/to/lora.safetensors\n";

        let result = ConfigLoader::default().parse(yaml, ConfigFormat::Yaml);
        assert!(matches!(
            result,
            Err(LoaderError::Invalid(ValidationError::NotAMapping { index: 0 }))
        ));
    }

    #[test]
    fn test_malformed_document() {
        let result = ConfigLoader::default().parse("model: [unclosed", ConfigFormat::Yaml);
        assert!(matches!(result, Err(LoaderError::Parse(_))));
    }

    #[test]
    fn test_non_finite_record_weights_rejected() {
        for weight in [".inf", "-.inf", ".nan"] {
            let yaml = format!(
                "model:\n  lora_paths:\n    - path: /a\n    - path: /b\n      weight: {weight}\n"
            );

            let result = ConfigLoader::default().parse(&yaml, ConfigFormat::Yaml);
            assert!(
                matches!(
                    result,
                    Err(LoaderError::Invalid(ValidationError::InvalidWeight { index: 1 }))
                ),
                "weight {weight} gave {result:?}"
            );
        }
    }

    #[test]
    fn test_non_finite_record_weight_after_invalid_record() {
        let yaml = "model:
  lora_paths:
    - weight: 0.5
    - path: /b
      weight: .nan
";

        let result = ConfigLoader::default().parse(yaml, ConfigFormat::Yaml);
        assert!(matches!(
            result,
            Err(LoaderError::Invalid(ValidationError::MissingPath { index: 0 }))
        ));
    }

    #[test]
    fn test_non_finite_lora_weight_rejected() {
        for weight in [".inf", ".nan"] {
            let yaml =
                format!("model:\n  lora_path: /a.safetensors\n  lora_weight: {weight}\n");

            let result = ConfigLoader::default().parse(&yaml, ConfigFormat::Yaml);
            assert!(
                matches!(
                    result,
                    Err(LoaderError::Invalid(ValidationError::InvalidLoraWeight))
                ),
                "lora_weight {weight} gave {result:?}"
            );
        }
    }

    #[test]
    fn test_empty_documents_have_no_adapters() {
        let loader = ConfigLoader::default();

        for (content, format) in [
            ("", ConfigFormat::Yaml),
            ("~\n", ConfigFormat::Yaml),
            ("model: ~\n", ConfigFormat::Yaml),
            ("  \n", ConfigFormat::Json),
            ("null", ConfigFormat::Json),
        ] {
            let config = loader.parse(content, format).unwrap();
            assert!(!config.has_adapters());
            assert_eq!(config.lora_path, None);
            assert!(config.extra.is_empty(), "{content:?} kept {:?}", config.extra);
        }
    }

    #[test]
    fn test_serialize_error_message() {
        let err = LoaderError::Serialize("unsupported value".to_string());
        assert_eq!(err.to_string(), "Serialize error: unsupported value");
    }

    #[test]
    fn test_parse_sample_config() {
        let yaml = include_str!("../../../configs/multi_lora.yaml");

        let config = ConfigLoader::default()
            .parse(yaml, ConfigFormat::Yaml)
            .unwrap();

        let weights: Vec<f64> = config.adapters().iter().map(|a| a.weight).collect();
        assert_eq!(weights, [1.0, 0.7, 1.0]);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ConfigFormat::from_path("job.yaml"), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_path("job.YML"), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_path("job.json"), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_path("job.toml"), None);
        assert_eq!(ConfigFormat::from_path("job"), None);
    }

    #[test]
    fn test_load_and_save_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("job.yaml");
        std::fs::write(&source, JOB_YAML).unwrap();

        let loader = ConfigLoader::default();
        let config = loader.load(&source).unwrap();

        let target = temp_dir.path().join("normalized.json");
        loader.save(&config, &target).unwrap();

        let reloaded = loader.load(&target).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = ConfigLoader::default().load(temp_dir.path().join("missing.yaml"));

        assert!(matches!(result, Err(LoaderError::NotFound(_))));
    }

    #[test]
    fn test_load_unsupported_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("job.ini");
        std::fs::write(&path, "lora_path = x").unwrap();

        let result = ConfigLoader::default().load(&path);
        assert!(matches!(result, Err(LoaderError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_load_too_large() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("job.yaml");
        std::fs::write(&path, JOB_YAML).unwrap();

        let loader = ConfigLoader::new(LoaderConfig {
            max_file_size: 8,
            ..Default::default()
        });

        let result = loader.load(&path);
        assert!(matches!(result, Err(LoaderError::FileTooLarge { .. })));
    }
}
