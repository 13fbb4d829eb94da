//! LoRA descriptor validation
//!
//! Turns raw `lora_paths` records into [`AdapterDescriptor`]s, filling in the
//! default weight where a record leaves it out.

use crate::descriptor::{AdapterDescriptor, DEFAULT_LORA_WEIGHT};
use serde_json::Value;
use thiserror::Error;

/// Configuration shape violation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("lora_paths[{index}] must be a dict with 'path' and 'weight' keys")]
    NotAMapping { index: usize },

    #[error("lora_paths[{index}] must have a 'path' key")]
    MissingPath { index: usize },

    #[error("lora_paths[{index}] 'path' must be a non-empty string")]
    InvalidPath { index: usize },

    #[error("lora_paths[{index}] 'weight' must be a finite number")]
    InvalidWeight { index: usize },

    #[error("lora_path must not be empty")]
    EmptyLoraPath,

    #[error("lora_weight must be a finite number")]
    InvalidLoraWeight,
}

impl ValidationError {
    /// Index of the offending `lora_paths` record, if any
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::NotAMapping { index }
            | Self::MissingPath { index }
            | Self::InvalidPath { index }
            | Self::InvalidWeight { index } => Some(*index),
            Self::EmptyLoraPath | Self::InvalidLoraWeight => None,
        }
    }
}

/// Validate one raw record at position `index`
pub fn validate_descriptor(
    index: usize,
    record: &Value,
) -> Result<AdapterDescriptor, ValidationError> {
    let Value::Object(fields) = record else {
        return Err(ValidationError::NotAMapping { index });
    };

    let path = match fields.get("path") {
        None => return Err(ValidationError::MissingPath { index }),
        Some(Value::String(path)) if !path.is_empty() => path.clone(),
        Some(_) => return Err(ValidationError::InvalidPath { index }),
    };

    // A null weight counts as unset.
    let weight = match fields.get("weight") {
        None | Some(Value::Null) => DEFAULT_LORA_WEIGHT,
        Some(value) => value
            .as_f64()
            .filter(|weight| weight.is_finite())
            .ok_or(ValidationError::InvalidWeight { index })?,
    };

    let mut extra = fields.clone();
    extra.remove("path");
    extra.remove("weight");

    Ok(AdapterDescriptor {
        path,
        weight,
        extra,
    })
}

/// Validate a whole `lora_paths` list
///
/// Stops at the first invalid record. Nothing is returned unless every
/// record validated.
pub fn validate_lora_paths(
    records: &[Value],
) -> Result<Vec<AdapterDescriptor>, ValidationError> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| validate_descriptor(index, record))
        .collect()
}
