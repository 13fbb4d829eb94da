//! loraconf Core - LoRA adapter configuration
//!
//! Normalizes the LoRA fields of a model configuration before the model
//! loader sees them.
//!
//! # Adapter Fields
//!
//! Two shapes are accepted in a model section:
//!
//! - `lora_path` + `lora_weight`: one adapter, the legacy form
//! - `lora_paths`: an ordered list of `{path, weight}` records
//!
//! Both end up as a single `lora_paths` list of [`AdapterDescriptor`]s, with
//! missing weights set to 1.0 and `lora_path` cleared.

pub mod descriptor;
pub mod loader;
pub mod model_config;
pub mod normalize;
pub mod validator;

pub use descriptor::{AdapterDescriptor, DEFAULT_LORA_WEIGHT};
pub use loader::{ConfigFormat, ConfigLoader, LoaderConfig, LoaderError};
pub use model_config::{ModelConfig, ModelConfigInput};
pub use normalize::{NormalizedLora, normalize};
pub use validator::{ValidationError, validate_descriptor, validate_lora_paths};
