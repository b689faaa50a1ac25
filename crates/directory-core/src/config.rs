//! ============================================================================
//! Directory Config - Page sizes, allowance and redirect destinations
//! ============================================================================
//! Defaults match the featured members section: 10 profiles on first load,
//! 8 per "load more", one extra page for members.
//!
//! Sources, later wins: built-in defaults, optional JSON file, environment.
//! ============================================================================

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::access::{AccessGate, RedirectTarget, DEFAULT_MEMBER_ALLOWANCE};
use crate::types::RequestKind;

/// Profiles requested on the first page
pub const DEFAULT_INITIAL_PAGE_SIZE: usize = 10;

/// Profiles requested on each "load more"
pub const DEFAULT_LOAD_MORE_PAGE_SIZE: usize = 8;

pub const DEFAULT_AUTH_PATH: &str = "/login";
pub const DEFAULT_SEARCH_PATH: &str = "/MatrimonyFilter";

pub const ENV_INITIAL_PAGE_SIZE: &str = "DIRECTORY_INITIAL_PAGE_SIZE";
pub const ENV_LOAD_MORE_PAGE_SIZE: &str = "DIRECTORY_LOAD_MORE_PAGE_SIZE";
pub const ENV_MEMBER_ALLOWANCE: &str = "DIRECTORY_MEMBER_ALLOWANCE";
pub const ENV_AUTH_PATH: &str = "DIRECTORY_AUTH_PATH";
pub const ENV_SEARCH_PATH: &str = "DIRECTORY_SEARCH_PATH";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("Invalid value for {var}: {value}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Directory configuration (can be customized per deployment)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Page size for the initial, ungated load
    pub initial_page_size: usize,
    /// Page size for each permitted "load more"
    pub load_more_page_size: usize,
    /// Successful "load more" requests a member gets
    pub member_load_more_allowance: u32,
    /// Route of the sign-in surface
    pub auth_path: String,
    /// Route of the advanced search/filter surface
    pub search_path: String,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            initial_page_size: DEFAULT_INITIAL_PAGE_SIZE,
            load_more_page_size: DEFAULT_LOAD_MORE_PAGE_SIZE,
            member_load_more_allowance: DEFAULT_MEMBER_ALLOWANCE,
            auth_path: DEFAULT_AUTH_PATH.to_string(),
            search_path: DEFAULT_SEARCH_PATH.to_string(),
        }
    }
}

impl DirectoryConfig {
    /// Load defaults, then the optional JSON file, then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env(|var| std::env::var(var).ok())?;
        config.validate()?;

        info!(
            "Directory config: initial={} load_more={} allowance={}",
            config.initial_page_size, config.load_more_page_size, config.member_load_more_allowance
        );
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let shown = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: shown.clone(),
            source,
        })?;
        debug!("Read config file {}", shown);
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: shown,
            source,
        })
    }

    /// Apply overrides from a variable lookup (the process environment in `load`)
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_INITIAL_PAGE_SIZE) {
            self.initial_page_size = parse_env(ENV_INITIAL_PAGE_SIZE, v)?;
        }
        if let Some(v) = lookup(ENV_LOAD_MORE_PAGE_SIZE) {
            self.load_more_page_size = parse_env(ENV_LOAD_MORE_PAGE_SIZE, v)?;
        }
        if let Some(v) = lookup(ENV_MEMBER_ALLOWANCE) {
            self.member_load_more_allowance = parse_env(ENV_MEMBER_ALLOWANCE, v)?;
        }
        if let Some(v) = lookup(ENV_AUTH_PATH) {
            self.auth_path = v;
        }
        if let Some(v) = lookup(ENV_SEARCH_PATH) {
            self.search_path = v;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_page_size == 0 {
            return Err(ConfigError::Invalid("initial_page_size must be > 0".into()));
        }
        if self.load_more_page_size == 0 {
            return Err(ConfigError::Invalid("load_more_page_size must be > 0".into()));
        }
        let paths = [("auth_path", &self.auth_path), ("search_path", &self.search_path)];
        for (name, path) in paths {
            if !path.starts_with('/') {
                return Err(ConfigError::Invalid(format!(
                    "{} must start with '/', got '{}'",
                    name, path
                )));
            }
        }
        Ok(())
    }

    /// Page size for a request kind
    pub fn page_size(&self, kind: RequestKind) -> usize {
        match kind {
            RequestKind::Initial => self.initial_page_size,
            RequestKind::LoadMore => self.load_more_page_size,
        }
    }

    /// Route a redirect target resolves to
    pub fn path_for(&self, target: RedirectTarget) -> &str {
        match target {
            RedirectTarget::AuthenticationSurface => &self.auth_path,
            RedirectTarget::AlternateSearchSurface => &self.search_path,
        }
    }

    pub fn access_gate(&self) -> AccessGate {
        AccessGate::new(self.member_load_more_allowance)
    }
}

fn parse_env<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { var, value })
}
