//! Configuration and secret loading.

use std::path::Path;

use anyhow::{Context, Result};
use extensibility::{CompilerConfig, Secrets};
use tracing::debug;

/// Prefix of environment variables that contribute secrets.
pub const SECRET_ENV_PREFIX: &str = "HOOKC_SECRET_";

/// Loads the compiler configuration, falling back to defaults without a file.
pub fn load_config(path: Option<&Path>) -> Result<CompilerConfig> {
    let Some(path) = path else {
        return Ok(CompilerConfig::default());
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: CompilerConfig = serde_json::from_str(&text)
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    config.validate()?;

    debug!(path = %path.display(), "Loaded compiler configuration");
    Ok(config)
}

/// Loads secrets from an optional JSON file and merges `HOOKC_SECRET_<NAME>`
/// variables from `env` on top.
///
/// The variable suffix is used verbatim as the secret name.
pub fn load_secrets(
    path: Option<&Path>,
    env: impl IntoIterator<Item = (String, String)>,
) -> Result<Secrets> {
    let mut secrets = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read secrets file {}", path.display()))?;
            serde_json::from_str::<Secrets>(&text)
                .with_context(|| format!("Invalid secrets file {}", path.display()))?
        }
        None => Secrets::new(),
    };

    let from_env: Secrets = env
        .into_iter()
        .filter_map(|(key, value)| {
            key.strip_prefix(SECRET_ENV_PREFIX)
                .filter(|name| !name.is_empty())
                .map(|name| (name.to_string(), value))
        })
        .collect();
    secrets.merge(from_env);

    debug!(secrets = ?secrets, "Loaded secrets");
    Ok(secrets)
}
