use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    pub paths: PathsConfig,
    pub ui: UiConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Supabase project settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Project URL, e.g. https://xyz.supabase.co (empty = not configured)
    #[serde(default)]
    pub url: String,
    /// Public anon key sent as `apikey`
    #[serde(default)]
    pub anon_key: String,
    #[serde(default = "default_vehicles_table")]
    pub vehicles_table: String,
    #[serde(default = "default_customers_table")]
    pub customers_table: String,
    /// App URL that password recovery links point back to
    #[serde(default = "default_redirect_url")]
    pub redirect_url: String,
    /// HTTP timeout for every backend request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_vehicles_table() -> String {
    "veiculos".to_string()
}

fn default_customers_table() -> String {
    "clientes".to_string()
}

fn default_redirect_url() -> String {
    "app-oficinas://".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            vehicles_table: default_vehicles_table(),
            customers_table: default_customers_table(),
            redirect_url: default_redirect_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Keep the signed-in session in the state dir between runs
    #[serde(default = "default_persist_session")]
    pub persist_session: bool,
}

fn default_persist_session() -> bool {
    true
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            persist_session: default_persist_session(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub state: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    pub refresh_rate_ms: u64,
    /// How long toasts stay on screen
    #[serde(default = "default_toast_secs")]
    pub toast_secs: u64,
    /// Render password fields in clear text (screen-sharing demos)
    #[serde(default)]
    pub show_passwords: bool,
}

fn default_toast_secs() -> u64 {
    4
}

/// External commands used to capture media.
///
/// `{output}` is replaced with the destination file, `{max_secs}` with
/// `max_video_secs`. An empty command disables that capture mode; files can
/// still be imported by path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    #[serde(default)]
    pub photo_command: Vec<String>,
    #[serde(default)]
    pub video_command: Vec<String>,
    #[serde(default = "default_max_video_secs")]
    pub max_video_secs: u64,
    /// Recordings shorter than this are rejected
    #[serde(default = "default_min_video_ms")]
    pub min_video_ms: u64,
}

fn default_max_video_secs() -> u64 {
    60
}

fn default_min_video_ms() -> u64 {
    1000
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            photo_command: Vec::new(),
            video_command: Vec::new(),
            max_video_secs: default_max_video_secs(),
            min_video_ms: default_min_video_ms(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to log to file in TUI mode (false = stderr for debugging)
    #[serde(default = "default_log_to_file")]
    pub to_file: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_to_file() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: default_log_to_file(),
        }
    }
}

impl Config {
    /// Project-local config file
    pub fn project_config_path() -> PathBuf {
        PathBuf::from(".oficina/config.toml")
    }

    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // Start with embedded defaults so oficina works without config files
        let defaults = Config::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        let project_config = Self::project_config_path();
        if project_config.exists() {
            builder = builder.add_source(config::File::from(project_config));
        }

        // User config in ~/.config/oficina/ (optional global overrides)
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("oficina").join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        // Environment variables with OFICINA_ prefix, e.g. OFICINA_BACKEND__URL
        builder = builder.add_source(
            config::Environment::with_prefix("OFICINA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Save config to .oficina/config.toml
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::project_config_path())
    }

    pub fn save_to(&self, config_path: &std::path::Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_str =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        std::fs::write(config_path, toml_str).context("Failed to write config file")?;

        Ok(())
    }

    /// True when both the backend URL and key are set
    pub fn backend_configured(&self) -> bool {
        !self.backend.url.trim().is_empty() && !self.backend.anon_key.trim().is_empty()
    }

    /// Get absolute path to state directory
    pub fn state_path(&self) -> PathBuf {
        let path = PathBuf::from(&self.paths.state);
        if path.is_absolute() {
            path
        } else {
            std::env::current_dir().unwrap_or_default().join(path)
        }
    }

    /// Get absolute path to logs directory
    pub fn logs_path(&self) -> PathBuf {
        self.state_path().join("logs")
    }

    /// Where captured photos and videos are written
    pub fn media_path(&self) -> PathBuf {
        self.state_path().join("media")
    }

    /// Where the JSON sink stores submitted check-ins
    pub fn checkins_path(&self) -> PathBuf {
        self.state_path().join("checkins")
    }

    pub fn session_path(&self) -> PathBuf {
        self.state_path().join("session.json")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            auth: AuthConfig::default(),
            paths: PathsConfig {
                state: ".oficina".to_string(), // Relative to cwd
            },
            ui: UiConfig {
                refresh_rate_ms: 250,
                toast_secs: default_toast_secs(),
                show_passwords: false,
            },
            capture: CaptureConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
