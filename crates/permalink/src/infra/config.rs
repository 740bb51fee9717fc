//! Configuration management utilities.

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static DEFAULT_REPOSITORY_CONFIG_PATH: &str = ".permalink/config.toml";

/// Layered configuration loaded from defaults, user, repository, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub remotes: Remotes,
    #[serde(default)]
    pub branches: Branches,
    #[serde(default)]
    pub link: Link,
}

/// Remote ranking preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Remotes {
    #[serde(default)]
    preferred: Option<Vec<String>>,
    /// Remote used unconditionally instead of ranking.
    #[serde(default)]
    pinned: Option<String>,
}

impl Remotes {
    fn default_preferred() -> Vec<String> {
        vec!["upstream".into(), "origin".into()]
    }

    pub fn preferred(&self) -> Vec<String> {
        self.preferred
            .clone()
            .unwrap_or_else(Self::default_preferred)
    }

    pub fn pinned(&self) -> Option<&str> {
        self.pinned.as_deref()
    }

    pub fn set_pinned(&mut self, remote: impl Into<String>) {
        self.pinned = Some(remote.into());
    }
}

/// Default-branch detection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Branches {
    #[serde(default)]
    conventional: Option<Vec<String>>,
    #[serde(default)]
    fallback: Option<String>,
    #[serde(default)]
    query_remote: Option<bool>,
}

impl Branches {
    fn default_conventional() -> Vec<String> {
        ["main", "master", "develop", "dev", "trunk"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn default_fallback() -> &'static str {
        "main"
    }

    pub fn conventional(&self) -> Vec<String> {
        self.conventional
            .clone()
            .unwrap_or_else(Self::default_conventional)
    }

    pub fn fallback(&self) -> String {
        self.fallback
            .clone()
            .unwrap_or_else(|| Self::default_fallback().to_owned())
    }

    pub fn query_remote(&self) -> bool {
        self.query_remote.unwrap_or(true)
    }

    pub fn set_query_remote(&mut self, enabled: bool) {
        self.query_remote = Some(enabled);
    }
}

/// Link rendering and delivery settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Link {
    #[serde(default)]
    hosts: Vec<String>,
    #[serde(default)]
    copy: Option<bool>,
    #[serde(default)]
    open: Option<bool>,
}

impl Link {
    /// Hosts whose remotes can be turned into links. `github.com` is always accepted.
    pub fn hosts(&self) -> Vec<String> {
        let mut hosts: BTreeSet<String> = self.hosts.iter().cloned().collect();
        hosts.insert("github.com".into());
        hosts.into_iter().collect()
    }

    pub fn copy(&self) -> bool {
        self.copy.unwrap_or(true)
    }

    pub fn open(&self) -> bool {
        self.open.unwrap_or(false)
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    remote: Option<String>,
    query_remote: Option<bool>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            remote: env::var("PERMALINK_REMOTE")
                .ok()
                .filter(|value| !value.trim().is_empty()),
            query_remote: env::var("PERMALINK_QUERY_REMOTE")
                .ok()
                .and_then(|value| parse_flag(&value)),
        }
    }

    #[cfg(test)]
    fn for_tests(remote: &str, query_remote: bool) -> Self {
        Self {
            remote: Some(remote.to_owned()),
            query_remote: Some(query_remote),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    /// Load configuration from defaults, user config, the repository at `root`, and env
    /// overrides.
    pub fn load(root: Option<&Path>) -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let repository = root.map(|root| root.join(DEFAULT_REPOSITORY_CONFIG_PATH));
        Self::load_with_layers(global, repository, env)
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        repository: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(&DEFAULT_CONFIG)?);

        if let Some(global_path) = global.filter(|path| path.exists()) {
            layers.push(Self::from_file(&global_path)?);
        }

        if let Some(repository_path) = repository.filter(|path| path.exists()) {
            layers.push(Self::from_file(&repository_path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        Ok(apply_env_overrides(merged, env_overrides))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            remotes: merge_remotes(self.remotes, other.remotes),
            branches: merge_branches(self.branches, other.branches),
            link: merge_link(self.link, other.link),
        }
    }
}

fn merge_remotes(mut base: Remotes, overlay: Remotes) -> Remotes {
    if let Some(value) = overlay.preferred {
        base.preferred = Some(value);
    }
    if let Some(value) = overlay.pinned {
        base.pinned = Some(value);
    }
    base
}

fn merge_branches(mut base: Branches, overlay: Branches) -> Branches {
    if let Some(value) = overlay.conventional {
        base.conventional = Some(value);
    }
    if let Some(value) = overlay.fallback {
        base.fallback = Some(value);
    }
    if let Some(value) = overlay.query_remote {
        base.query_remote = Some(value);
    }
    base
}

fn merge_link(mut base: Link, overlay: Link) -> Link {
    let mut hosts: BTreeSet<String> = base.hosts.into_iter().collect();
    hosts.extend(overlay.hosts);
    base.hosts = hosts.into_iter().collect();

    if let Some(value) = overlay.copy {
        base.copy = Some(value);
    }
    if let Some(value) = overlay.open {
        base.open = Some(value);
    }
    base
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("permalink/config.toml"))
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(remote) = env.remote {
        config.remotes.pinned = Some(remote);
    }
    if let Some(query_remote) = env.query_remote {
        config.branches.query_remote = Some(query_remote);
    }
    config
}
