use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::config::themes::ThemeRegistry;
use crate::feed::{DateRange, SortOrder};

pub mod themes;

const APP_DOMAIN: &str = "io";
const APP_ORG: &str = "SirenTui";
const APP_NAME: &str = "sirentui";

const MIN_POLL_SECS: u64 = 3;
const MAX_POLL_SECS: u64 = 300;

pub struct ConfigLoader {
    paths: ConfigPaths,
}

impl ConfigLoader {
    pub fn discover() -> Result<Self> {
        let paths = ConfigPaths::discover()?;
        Ok(Self { paths })
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    pub fn load_or_init(&self) -> Result<AppConfig> {
        self.paths.ensure_directories()?;
        if !self.paths.config_file.exists() {
            let mut default_cfg = AppConfig::default();
            default_cfg.post_load();
            self.write_default_config(&default_cfg)?;
            return Ok(default_cfg);
        }

        self.load()
    }

    pub fn load(&self) -> Result<AppConfig> {
        let raw = fs::read_to_string(&self.paths.config_file)
            .with_context(|| format!("reading config {}", self.paths.config_file.display()))?;
        let mut cfg: AppConfig = toml::from_str(&raw).context("parsing config toml")?;
        cfg.post_load();
        Ok(cfg)
    }

    fn write_default_config(&self, cfg: &AppConfig) -> Result<()> {
        let toml = toml::to_string_pretty(cfg).context("serializing default config")?;
        if let Some(parent) = self.paths.config_file.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
        let mut file = fs::File::create(&self.paths.config_file)
            .with_context(|| format!("creating config {}", self.paths.config_file.display()))?;
        file.write_all(toml.as_bytes())
            .context("writing default config")?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
    pub data_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub log_dir: PathBuf,
    pub state_dir: PathBuf,
}

impl ConfigPaths {
    pub fn discover() -> Result<Self> {
        let override_config = env::var("SIRENTUI_CONFIG").ok().map(PathBuf::from);
        let override_data = env::var("SIRENTUI_DATA").ok().map(PathBuf::from);

        let project_dirs = ProjectDirs::from(APP_DOMAIN, APP_ORG, APP_NAME)
            .context("resolving XDG project directories")?;

        let config_dir = override_config
            .clone()
            .map(|p| {
                if p.is_dir() {
                    p
                } else {
                    p.parent().map(Path::to_path_buf).unwrap_or(p)
                }
            })
            .unwrap_or_else(|| project_dirs.config_dir().to_path_buf());

        let config_file = override_config
            .filter(|p| p.is_file() || p.extension().is_some())
            .unwrap_or_else(|| config_dir.join("config.toml"));

        let data_root = override_data.unwrap_or_else(|| project_dirs.data_dir().to_path_buf());

        let cache_dir = project_dirs.cache_dir().to_path_buf();
        let state_dir = project_dirs
            .state_dir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| data_root.join("state"));
        let log_dir = state_dir.join("logs");

        Ok(Self {
            config_dir,
            config_file,
            data_dir: data_root,
            cache_dir,
            log_dir,
            state_dir,
        })
    }

    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [
            &self.config_dir,
            &self.data_dir,
            &self.cache_dir,
            &self.log_dir,
            &self.state_dir,
        ] {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating application directory {}", dir.display()))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub theme: ThemeName,
    pub api: ApiOptions,
    pub poll: PollOptions,
    pub feed: FeedOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            theme: ThemeName::Dark,
            api: ApiOptions::default(),
            poll: PollOptions::default(),
            feed: FeedOptions::default(),
        }
    }
}

impl AppConfig {
    fn post_load(&mut self) {
        if !ThemeRegistry::default().contains(&self.theme) {
            tracing::warn!(?self.theme, "unknown theme in config, falling back to Dark");
            self.theme = ThemeName::Dark;
        }
        let clamped = self.poll.interval_secs.clamp(MIN_POLL_SECS, MAX_POLL_SECS);
        if clamped != self.poll.interval_secs {
            tracing::warn!(
                configured = self.poll.interval_secs,
                clamped,
                "poll interval out of range"
            );
            self.poll.interval_secs = clamped;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiOptions {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiOptions {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_secs: 10,
        }
    }
}

impl ApiOptions {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollOptions {
    pub interval_secs: u64,
    pub enabled: bool,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval_secs: 10,
            enabled: true,
        }
    }
}

impl PollOptions {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Filter state the feed opens with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedOptions {
    pub status: Option<String>,
    pub range: DateRange,
    pub sort: SortOrder,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            status: None,
            range: DateRange::All,
            sort: SortOrder::Default,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, std::hash::Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeName {
    Dark,
    Light,
}

impl Default for ThemeName {
    fn default() -> Self {
        ThemeName::Dark
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let cfg = AppConfig::default();
        let raw = toml::to_string_pretty(&cfg).expect("serializes");
        let parsed: AppConfig = toml::from_str(&raw).expect("parses");
        assert_eq!(parsed.api.base_url, "http://localhost:3000");
        assert_eq!(parsed.poll.interval_secs, 10);
        assert!(parsed.poll.enabled);
        assert!(parsed.feed.status.is_none());
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let raw = "[api]\nbase_url = \"https://siren.example.com/\"\n";
        let mut cfg: AppConfig = toml::from_str(raw).expect("parses");
        cfg.post_load();
        assert_eq!(cfg.api.base_url, "https://siren.example.com/");
        assert_eq!(cfg.api.timeout_secs, 10);
        assert_eq!(cfg.poll.interval_secs, 10);
    }

    #[test]
    fn post_load_clamps_the_poll_interval() {
        let mut cfg = AppConfig::default();
        cfg.poll.interval_secs = 1;
        cfg.post_load();
        assert_eq!(cfg.poll.interval_secs, 3);

        cfg.poll.interval_secs = 3600;
        cfg.post_load();
        assert_eq!(cfg.poll.interval_secs, 300);
    }

    #[test]
    fn load_or_init_writes_a_default_file() {
        let temp = tempfile::TempDir::new().expect("tempdir");
        let base = temp.path();
        let config_dir = base.join("config");
        let paths = ConfigPaths {
            config_dir: config_dir.clone(),
            config_file: config_dir.join("config.toml"),
            data_dir: base.join("data"),
            cache_dir: base.join("cache"),
            log_dir: base.join("logs"),
            state_dir: base.join("state"),
        };
        let loader = ConfigLoader { paths };
        let cfg = loader.load_or_init().expect("initializes");
        assert!(loader.paths().config_file.exists());
        assert_eq!(cfg.api.base_url, "http://localhost:3000");

        let reloaded = loader.load().expect("reloads");
        assert_eq!(reloaded.poll.interval_secs, cfg.poll.interval_secs);
    }
}
