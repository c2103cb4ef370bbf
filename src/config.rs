use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_FILE: &str = "onboard.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    // Onboarding endpoint; ONBOARD_URL overrides it
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_subtitle")]
    pub subtitle: String,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            title: default_title(),
            subtitle: default_subtitle(),
            request_timeout_secs: None,
            log_file: None,
        }
    }
}

fn default_title() -> String {
    "Client Onboarding Form".to_string()
}

fn default_subtitle() -> String {
    "Tell us about your project and we'll get back to you within 24 hours".to_string()
}

impl AppConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn from_yaml(path: &Path, text: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(path, &text)
    }

    /// Environment wins over the file for the endpoint and log path.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("ONBOARD_URL").filter(|u| !u.trim().is_empty()) {
            self.endpoint = Some(url);
        }
        if self.log_file.is_none() {
            if let Some(p) = lookup("ONBOARD_TUI_LOG").filter(|p| !p.trim().is_empty()) {
                self.log_file = Some(PathBuf::from(p));
            }
        }
    }
}

/// Candidate config locations, most specific first.
pub(crate) fn candidate_paths(
    explicit: Option<PathBuf>,
    cwd: &Path,
    home: Option<PathBuf>,
) -> Vec<PathBuf> {
    let mut out = Vec::new();
    if let Some(p) = explicit {
        out.push(p);
        return out;
    }
    out.push(cwd.join(CONFIG_FILE));
    out.push(cwd.join(".tui").join(CONFIG_FILE));
    if let Some(home) = home {
        out.push(home.join(".tui").join(CONFIG_FILE));
    }
    out
}

/// Loads the config from the first existing candidate, then applies env overrides.
/// No file at all is fine; an explicit ONBOARD_TUI_CONFIG that is missing is not.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let explicit = std::env::var("ONBOARD_TUI_CONFIG").ok().map(PathBuf::from);
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let home = std::env::var("HOME")
        .ok()
        .or_else(|| std::env::var("USERPROFILE").ok())
        .map(PathBuf::from);
    let must_exist = explicit.is_some();
    let mut cfg = AppConfig::default();
    for p in candidate_paths(explicit, &cwd, home) {
        if must_exist || p.exists() {
            cfg = AppConfig::read(&p)?;
            break;
        }
    }
    cfg.apply_env_overrides(|k| std::env::var(k).ok());
    Ok(cfg)
}
