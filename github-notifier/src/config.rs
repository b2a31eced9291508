use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::{BaseDirs, ProjectDirs};
use github_notifier_shared::api::{self, rest::ClientOptions};
use serde::Deserialize;

use crate::AppError;

pub const ENV_CONFIG: &str = "GITHUB_NOTIFIER_CONFIG";
pub const ENV_FILTER: &str = "GITHUB_NOTIFIER_FILTER";
pub const ENV_TOKEN: &str = "GITHUB_TOKEN";

const WATERMARK_FILE: &str = ".mcgithubnotif";
const TOKEN_FILE: &str = ".github_token";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_auth_username")]
    pub auth_username: String,
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    /// Repository full-name prefix. `GITHUB_NOTIFIER_FILTER` wins when set.
    #[serde(default)]
    pub filter: String,
    /// Defaults to `~/.mcgithubnotif`.
    #[serde(default)]
    pub watermark_path: Option<PathBuf>,
    /// Defaults to `~/.github_token`.
    #[serde(default)]
    pub token_path: Option<PathBuf>,
    /// Unset means requests may block forever.
    #[serde(default)]
    pub http_timeout_secs: Option<u64>,
}

fn default_api_url() -> String {
    api::DEFAULT_API_BASE.to_string()
}

fn default_auth_username() -> String {
    api::DEFAULT_AUTH_USERNAME.to_string()
}

fn default_interval() -> u64 {
    60
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            auth_username: default_auth_username(),
            interval_secs: default_interval(),
            filter: String::new(),
            watermark_path: None,
            token_path: None,
            http_timeout_secs: None,
        }
    }
}

impl ClientConfig {
    /// Loads the explicitly requested config, or the default one if it exists.
    /// Without either, built-in defaults apply.
    pub fn find_and_load(cli_value: Option<PathBuf>) -> Result<(Option<PathBuf>, Self), AppError> {
        if let Some(path) = explicit_config_path(cli_value) {
            let cfg = load_config(&path)?;
            return Ok((Some(path), cfg));
        }
        match default_config_path() {
            Some(path) if path.exists() => {
                let cfg = load_config(&path)?;
                Ok((Some(path), cfg))
            }
            _ => Ok((None, Self::default())),
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let url = url::Url::parse(&self.api_url)
            .map_err(|e| AppError::Config(format!("invalid api_url: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::Config(format!(
                "api_url must be http or https, got {}",
                url.scheme()
            )));
        }
        if self.interval_secs == 0 {
            return Err(AppError::Config("interval_secs must be positive".into()));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn watermark_path(&self, home: &Path) -> PathBuf {
        self.watermark_path
            .clone()
            .unwrap_or_else(|| home.join(WATERMARK_FILE))
    }

    pub fn token_path(&self, home: &Path) -> PathBuf {
        self.token_path
            .clone()
            .unwrap_or_else(|| home.join(TOKEN_FILE))
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            base: self.api_url.clone(),
            username: self.auth_username.clone(),
            timeout: self.http_timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn resolve_filter(&self) -> String {
        self.filter_with_env(std::env::var(ENV_FILTER).ok())
    }

    fn filter_with_env(&self, env_value: Option<String>) -> String {
        match env_value {
            Some(v) if !v.is_empty() => v,
            _ => self.filter.clone(),
        }
    }
}

fn explicit_config_path(cli_value: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(p) = cli_value {
        return Some(p);
    }
    std::env::var(ENV_CONFIG)
        .ok()
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
}

pub fn default_config_path() -> Option<PathBuf> {
    let pd = ProjectDirs::from("com", "github-notifier", "github-notifier")?;
    Some(pd.config_dir().join("config.yaml"))
}

pub fn home_dir() -> Result<PathBuf, AppError> {
    BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .ok_or_else(|| AppError::Config("could not determine home directory".into()))
}

pub fn load_config(path: &Path) -> Result<ClientConfig, AppError> {
    let data = std::fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("read {} failed: {e}", path.display())))?;
    let cfg: ClientConfig = if data.trim().is_empty() {
        ClientConfig::default()
    } else {
        serde_yaml::from_str(&data)
            .map_err(|e| AppError::Config(format!("parse {} failed: {e}", path.display())))?
    };
    cfg.validate()?;
    Ok(cfg)
}
