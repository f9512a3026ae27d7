use crate::domain::session::TrailingRunPolicy;
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_CONFIG_PATH: &str = "config/settings";
const ENV_PREFIX: &str = "APPLIANCE";

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub store: StoreSettings,
    #[serde(default = "default_switches")]
    pub switches: Vec<String>,
    #[serde(default)]
    pub export: ExportSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreSettings {
    pub host: String,
    #[serde(default)]
    pub token: String,
    pub database: String,
    #[serde(default = "default_retention_policy")]
    pub retention_policy: String,
    #[serde(default = "default_measurement")]
    pub measurement: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ExportSettings {
    pub output_dir: PathBuf,
    pub delimiter: char,
    pub trailing_run: TrailingRunPolicy,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("data"),
            delimiter: ' ',
            trailing_run: TrailingRunPolicy::Discard,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

fn default_switches() -> Vec<String> {
    vec!["Washer".to_string(), "Dryer".to_string()]
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_retention_policy() -> String {
    "autogen".to_string()
}

fn default_measurement() -> String {
    "reading".to_string()
}

/// Load settings from `path` (extension optional, file optional) overlaid with
/// `APPLIANCE__SECTION__KEY` environment variables.
pub fn load_settings(path: &str) -> anyhow::Result<Settings> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("switches"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
