//! Adapter descriptor format
//!
//! A descriptor names one LoRA artifact and the strength it is applied with.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Weight applied to an adapter when none is configured
pub const DEFAULT_LORA_WEIGHT: f64 = 1.0;

/// Serde default for descriptor and legacy weights
pub(crate) fn default_lora_weight() -> f64 {
    DEFAULT_LORA_WEIGHT
}

/// One LoRA adapter in a model configuration
///
/// Descriptors are kept in configuration order; downstream loaders apply them
/// in that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdapterDescriptor {
    /// Path or identifier of the adapter artifact
    pub path: String,

    /// Influence of the adapter
    #[serde(default = "default_lora_weight")]
    pub weight: f64,

    /// Any further keys the record carried
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AdapterDescriptor {
    /// Create a descriptor with the default weight
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            weight: DEFAULT_LORA_WEIGHT,
            extra: Map::new(),
        }
    }

    /// Set the weight
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Attach an extra key
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Raw record form, as it would appear in a `lora_paths` list
    pub fn to_value(&self) -> Value {
        let mut record = self.extra.clone();
        record.insert("path".to_string(), Value::from(self.path.clone()));
        record.insert("weight".to_string(), Value::from(self.weight));
        Value::Object(record)
    }
}
