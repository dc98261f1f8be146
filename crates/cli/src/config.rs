//! Layered configuration: defaults, then the config file, then `CSPRESS_*` variables

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cspress_core::application::constants::DEFAULT_BUILD_DIR;
use cspress_core::application::ToolSettings;

const DEFAULT_SERVER_URL: &str = "http://localhost:8080/TopicIndex";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_BUILD_COMMAND: &str = "publican build --formats=html --langs=en-US";
const DEFAULT_PREVIEW_COMMAND: &str = "xdg-open";
const DEFAULT_EDITOR: &str = "vi";
const DEFAULT_LOG_LEVEL: &str = "info";
const ENV_PREFIX: &str = "CSPRESS";
const CONFIG_FILE_NAME: &str = "cspress.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub server_url: String,
    pub request_timeout_secs: u64,
    pub build_command: String,
    pub preview_command: String,
    #[serde(default)]
    pub editor: Option<String>,
    pub build_dir: String,
    #[serde(default)]
    pub process_timeout_secs: Option<u64>,
    pub log_level: String,
}

impl Settings {
    /// Load settings from the default locations
    ///
    /// An explicit `config_file` must exist; the per-user file is optional.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let (path, required) = match config_file {
            Some(path) => (Some(path.to_path_buf()), true),
            None => (default_config_file(), false),
        };
        Self::load_from(path.as_deref(), required, config::Environment::with_prefix(ENV_PREFIX))
    }

    fn load_from(file: Option<&Path>, required: bool, env: config::Environment) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("server_url", DEFAULT_SERVER_URL)?
            .set_default("request_timeout_secs", DEFAULT_REQUEST_TIMEOUT_SECS)?
            .set_default("build_command", DEFAULT_BUILD_COMMAND)?
            .set_default("preview_command", DEFAULT_PREVIEW_COMMAND)?
            .set_default("build_dir", DEFAULT_BUILD_DIR)?
            .set_default("log_level", DEFAULT_LOG_LEVEL)?;

        if let Some(file) = file {
            builder = builder.add_source(config::File::from(file).required(required));
        }

        let settings: Settings = builder
            .add_source(env)
            .build()
            .and_then(|c| c.try_deserialize())
            .context("Failed to load configuration")?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.server_url.trim().is_empty() {
            bail!("server_url must not be empty");
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than zero");
        }
        if self.build_dir.trim().is_empty() || Path::new(&self.build_dir).is_absolute() {
            bail!("build_dir must be a relative directory name, got `{}`", self.build_dir);
        }
        if self.process_timeout_secs == Some(0) {
            bail!("process_timeout_secs must be greater than zero");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Configured editor, else `$EDITOR`, else `vi`
    pub fn editor(&self) -> String {
        self.editor
            .clone()
            .filter(|e| !e.trim().is_empty())
            .or_else(|| std::env::var("EDITOR").ok().filter(|e| !e.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_EDITOR.to_string())
    }

    pub fn tool_settings(&self) -> ToolSettings {
        ToolSettings {
            build_command: self.build_command.clone(),
            preview_command: self.preview_command.clone(),
            editor: self.editor(),
            build_dir: self.build_dir.clone(),
            process_timeout: self.process_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// `<config dir>/cspress/cspress.toml`, if the platform has a config dir
pub fn default_config_file() -> Option<PathBuf> {
    ProjectDirs::from("org", "cspress", "cspress")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}
