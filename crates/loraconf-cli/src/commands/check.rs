//! Config check command

use loraconf_core::{ConfigLoader, ModelConfig};
use tracing::info;

pub fn run(input: &str) -> Result<(), Box<dyn std::error::Error>> {
    info!("Checking config at {}", input);

    let config = ConfigLoader::default().load(input)?;

    println!("Model: {}", config.name_or_path.as_deref().unwrap_or("(unset)"));
    println!();
    for line in adapter_lines(&config) {
        println!("{}", line);
    }

    Ok(())
}

/// One line per adapter, in application order
fn adapter_lines(config: &ModelConfig) -> Vec<String> {
    let adapters = config.adapters();
    if adapters.is_empty() {
        return vec!["No LoRA adapters configured.".to_string()];
    }

    let mut lines = vec![format!("LoRA adapters ({}):", adapters.len())];
    for (idx, adapter) in adapters.iter().enumerate() {
        lines.push(format!(
            "  {}. {} (weight {})",
            idx + 1,
            adapter.path,
            adapter.weight
        ));
    }
    lines
}
