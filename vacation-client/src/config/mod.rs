use serde::Deserialize;
use std::path::PathBuf;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub api: ApiSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApiSettings {
    /// Backend origin, e.g. `https://ferias.example.com`. Paths are appended
    /// verbatim.
    pub base_url: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct StorageSettings {
    /// Directory holding the persisted session.
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
        }
    }
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from(".vacation")
}

fn default_log_level() -> String {
    "warn".to_string()
}

pub fn get_configuration() -> anyhow::Result<Settings> {
    let configuration_directory = client_core::config::configuration_directory("vacation-client")?;

    let settings: Settings = client_core::config::load_settings(&configuration_directory)?;
    settings.validate()?;

    Ok(settings)
}

impl Settings {
    pub fn validate(&self) -> anyhow::Result<()> {
        let url = reqwest::Url::parse(&self.api.base_url).map_err(|e| {
            anyhow::anyhow!("Invalid api.base_url '{}': {}", self.api.base_url, e)
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("api.base_url must be an http(s) URL, got '{}'", self.api.base_url);
        }

        Ok(())
    }
}
