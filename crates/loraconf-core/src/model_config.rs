//! Model configuration
//!
//! [`ModelConfig`] is only ever built through [`ModelConfigInput`], so its
//! LoRA fields are always normalized.

use crate::descriptor::{AdapterDescriptor, DEFAULT_LORA_WEIGHT, default_lora_weight};
use crate::normalize::normalize;
use crate::validator::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Model section as written in a config file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelConfigInput {
    /// Base model name or path
    #[serde(default)]
    pub name_or_path: Option<String>,

    /// Flux architecture flag
    #[serde(default)]
    pub is_flux: bool,

    /// Legacy single adapter path
    #[serde(default)]
    pub lora_path: Option<String>,

    /// Weight for `lora_path`
    #[serde(default = "default_lora_weight")]
    pub lora_weight: f64,

    /// Raw adapter records
    #[serde(default)]
    pub lora_paths: Option<Vec<Value>>,

    /// Remaining model settings
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ModelConfigInput {
    /// Create an empty input
    pub fn new() -> Self {
        Self {
            name_or_path: None,
            is_flux: false,
            lora_path: None,
            lora_weight: DEFAULT_LORA_WEIGHT,
            lora_paths: None,
            extra: Map::new(),
        }
    }

    /// Set the base model
    pub fn with_name_or_path(mut self, name_or_path: impl Into<String>) -> Self {
        self.name_or_path = Some(name_or_path.into());
        self
    }

    /// Mark as a Flux model
    pub fn with_flux(mut self, is_flux: bool) -> Self {
        self.is_flux = is_flux;
        self
    }

    /// Set the legacy single adapter path
    pub fn with_lora_path(mut self, path: impl Into<String>) -> Self {
        self.lora_path = Some(path.into());
        self
    }

    /// Set the legacy adapter weight
    pub fn with_lora_weight(mut self, weight: f64) -> Self {
        self.lora_weight = weight;
        self
    }

    /// Set raw adapter records
    pub fn with_lora_paths(mut self, records: Vec<Value>) -> Self {
        self.lora_paths = Some(records);
        self
    }

    /// Add one adapter record
    pub fn with_adapter(mut self, descriptor: &AdapterDescriptor) -> Self {
        self.lora_paths
            .get_or_insert_with(Vec::new)
            .push(descriptor.to_value());
        self
    }

    /// Set an additional model setting
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Normalize into a [`ModelConfig`]
    pub fn build(self) -> Result<ModelConfig, ValidationError> {
        ModelConfig::try_from(self)
    }
}

impl Default for ModelConfigInput {
    fn default() -> Self {
        Self::new()
    }
}

/// Model configuration with normalized LoRA fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ModelConfigInput")]
pub struct ModelConfig {
    /// Base model name or path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_or_path: Option<String>,

    /// Flux architecture flag
    pub is_flux: bool,

    /// Legacy single adapter path; `None` once `lora_paths` is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lora_path: Option<String>,

    /// Weight the legacy path was configured with
    pub lora_weight: f64,

    /// Adapters in application order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lora_paths: Option<Vec<AdapterDescriptor>>,

    /// Remaining model settings
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ModelConfig {
    /// Adapters to apply, empty when none are configured
    pub fn adapters(&self) -> &[AdapterDescriptor] {
        self.lora_paths.as_deref().unwrap_or_default()
    }

    /// True when at least one adapter is configured
    pub fn has_adapters(&self) -> bool {
        !self.adapters().is_empty()
    }
}

impl TryFrom<ModelConfigInput> for ModelConfig {
    type Error = ValidationError;

    fn try_from(input: ModelConfigInput) -> Result<Self, Self::Error> {
        let lora = normalize(
            input.lora_path.as_deref(),
            input.lora_weight,
            input.lora_paths.as_deref(),
        )?;

        Ok(Self {
            name_or_path: input.name_or_path,
            is_flux: input.is_flux,
            lora_path: lora.lora_path,
            lora_weight: input.lora_weight,
            lora_paths: lora.lora_paths,
            extra: input.extra,
        })
    }
}
