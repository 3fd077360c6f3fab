use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Prefix for environment overrides, e.g. `APP_API__BASE_URL`.
pub const ENV_PREFIX: &str = "APP";

/// Locate the `config/` directory of a workspace member.
///
/// Works both when run from the member directory and from the workspace root.
pub fn configuration_directory(member: &str) -> anyhow::Result<PathBuf> {
    let base_path = std::env::current_dir()
        .map_err(|e| anyhow::anyhow!("Failed to determine the current directory: {}", e))?;

    if base_path.ends_with(member) {
        Ok(base_path.join("config"))
    } else {
        Ok(base_path.join(member).join("config"))
    }
}

/// Load settings from `<dir>/base.yaml` (optional) overlaid with `APP_*`
/// environment variables. A `.env` file is honoured if present.
pub fn load_settings<T: DeserializeOwned>(
    configuration_directory: &Path,
) -> Result<T, config::ConfigError> {
    dotenvy::dotenv().ok();

    let settings = Config::builder()
        .add_source(File::from(configuration_directory.join("base.yaml")).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<T>()
}
