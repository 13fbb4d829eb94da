//! Normalized config output

use crate::OutputFormat;
use loraconf_core::{ConfigFormat, ConfigLoader};
use tracing::info;

impl From<OutputFormat> for ConfigFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Yaml => ConfigFormat::Yaml,
            OutputFormat::Json => ConfigFormat::Json,
        }
    }
}

impl OutputFormat {
    fn name(self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }
}

/// Print the normalized config, or save it to `output`
///
/// A saved file always takes the format of its extension.
pub fn run(
    input: &str,
    output: Option<&str>,
    format: Option<OutputFormat>,
) -> Result<(), Box<dyn std::error::Error>> {
    let loader = ConfigLoader::default();
    let config = loader.load(input)?;

    match output {
        Some(path) => {
            if let (Some(requested), Some(detected)) = (format, ConfigFormat::from_path(path)) {
                if ConfigFormat::from(requested) != detected {
                    return Err(format!(
                        "--format {} does not match output file {}",
                        requested.name(),
                        path
                    )
                    .into());
                }
            }

            loader.save(&config, path)?;
            info!(
                "Wrote normalized config with {} adapter(s) to {}",
                config.adapters().len(),
                path
            );
        }
        None => {
            let format = format.unwrap_or(OutputFormat::Yaml);
            print!("{}", loader.render(&config, format.into())?);
        }
    }

    Ok(())
}
