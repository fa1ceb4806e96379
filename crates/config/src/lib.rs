use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "roomcast.toml",
    "config/roomcast.toml",
    "crates/config/roomcast.toml",
    "../roomcast.toml",
    "../config/roomcast.toml",
    "../crates/config/roomcast.toml",
];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 7080,
        }
    }
}

/// Transport-adapter settings: where the WebSocket endpoint lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Path of the WebSocket upgrade endpoint.
    #[serde(default = "GatewayConfig::default_ws_path")]
    pub ws_path: String,
}

impl GatewayConfig {
    fn default_ws_path() -> String {
        "/chats".to_string()
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            ws_path: Self::default_ws_path(),
        }
    }
}

/// Chat history persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Disable to drop dispatched envelopes instead of logging them.
    #[serde(default = "HistoryConfig::default_enabled")]
    pub enabled: bool,
    /// Directory receiving one append-only log file per room.
    #[serde(default = "HistoryConfig::default_directory")]
    pub directory: String,
}

impl HistoryConfig {
    const fn default_enabled() -> bool {
        true
    }

    fn default_directory() -> String {
        "chat-history".to_string()
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            directory: Self::default_directory(),
        }
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use roomcast_config::load;
///
/// std::env::remove_var("ROOMCAST_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let mut builder = config::Config::builder();
    builder = builder
        .set_default("http.address", defaults.http.address.clone())
        .unwrap()
        .set_default("http.port", i64::from(defaults.http.port))
        .unwrap()
        .set_default("gateway.ws_path", defaults.gateway.ws_path.clone())
        .unwrap()
        .set_default("history.enabled", defaults.history.enabled)
        .unwrap()
        .set_default("history.directory", defaults.history.directory.clone())
        .unwrap();

    let environment_overrides = config::Environment::with_prefix("ROOMCAST").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("ROOMCAST_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via ROOMCAST_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    if !config.gateway.ws_path.starts_with('/') {
        anyhow::bail!(
            "gateway.ws_path must start with '/', got {:?}",
            config.gateway.ws_path
        );
    }

    if config.history.enabled && config.history.directory.is_empty() {
        anyhow::bail!("history.directory must not be empty when history is enabled");
    }

    debug!(?config, "loaded relay configuration");
    Ok(config)
}
