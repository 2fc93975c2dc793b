use crate::error::CliError;
use std::path::Path;
use tonelink_core::ModemConfig;

/// Build the process-wide modem configuration.
///
/// Without a path the built-in defaults are used. A JSON file only needs the
/// fields it wants to change; everything else keeps its default. Validation
/// warnings are logged and never stop startup.
pub fn load(path: Option<&Path>) -> Result<ModemConfig, CliError> {
    let config = match path {
        None => ModemConfig::default(),
        Some(path) => {
            let raw = std::fs::read_to_string(path).map_err(|source| CliError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            let config: ModemConfig = serde_json::from_str(&raw)?;
            tracing::info!("Loaded config overlay from {}", path.display());
            config
        }
    };

    for warning in config.validate() {
        tracing::warn!("Config warning: {}", warning);
    }

    Ok(config)
}
