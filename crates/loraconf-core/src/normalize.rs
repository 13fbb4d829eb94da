//! LoRA path normalization
//!
//! Model configurations name their adapters in one of two shapes:
//!
//! ```text
//! lora_path: /loras/style.safetensors      lora_paths:
//! lora_weight: 0.8                           - path: /loras/style.safetensors
//!                                              weight: 0.8
//!                                            - path: /loras/detail.safetensors
//! ```
//!
//! [`normalize`] folds both into a single ordered list of
//! [`AdapterDescriptor`]s. Once a list exists the legacy single path is
//! always cleared.

use crate::descriptor::AdapterDescriptor;
use crate::validator::{ValidationError, validate_lora_paths};
use serde_json::Value;
use tracing::{debug, warn};

/// Canonical LoRA fields after normalization
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedLora {
    /// Legacy single path; `None` whenever `lora_paths` is set
    pub lora_path: Option<String>,
    /// Adapters in application order
    pub lora_paths: Option<Vec<AdapterDescriptor>>,
}

impl NormalizedLora {
    /// Adapters to apply, empty when none are configured
    pub fn adapters(&self) -> &[AdapterDescriptor] {
        self.lora_paths.as_deref().unwrap_or_default()
    }

    /// True when no adapters are configured
    pub fn is_empty(&self) -> bool {
        self.lora_paths.is_none() && self.lora_path.is_none()
    }
}

/// Normalize the `lora_path` / `lora_weight` / `lora_paths` triple
///
/// `lora_weight` only matters when `lora_path` is the sole input, but it must
/// be finite either way. When both a path and a list are given, the list is
/// validated like any other and the path is dropped.
pub fn normalize(
    lora_path: Option<&str>,
    lora_weight: f64,
    lora_paths: Option<&[Value]>,
) -> Result<NormalizedLora, ValidationError> {
    if lora_path.is_some_and(str::is_empty) {
        return Err(ValidationError::EmptyLoraPath);
    }
    if !lora_weight.is_finite() {
        return Err(ValidationError::InvalidLoraWeight);
    }

    let lora_paths = match (lora_path, lora_paths) {
        (Some(path), None) => {
            debug!(path, weight = lora_weight, "Converting lora_path to lora_paths");
            Some(vec![AdapterDescriptor::new(path).with_weight(lora_weight)])
        }
        (None, Some(records)) => {
            let descriptors = validate_lora_paths(records)?;
            debug!(adapters = descriptors.len(), "Validated lora_paths");
            Some(descriptors)
        }
        (Some(path), Some(records)) => {
            let descriptors = validate_lora_paths(records)?;
            warn!(
                path,
                adapters = descriptors.len(),
                "Both lora_path and lora_paths set; ignoring lora_path"
            );
            Some(descriptors)
        }
        (None, None) => None,
    };

    // A list always wins over the single path.
    let lora_path = match lora_paths {
        Some(_) => None,
        None => lora_path.map(str::to_string),
    };

    Ok(NormalizedLora {
        lora_path,
        lora_paths,
    })
}
