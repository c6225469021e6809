use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub voting: VotingConfig,
}

impl ApiConfig {
    pub fn load() -> Result<Self> {
        let configured_path =
            std::env::var("EVOTING_API_CONFIG").unwrap_or_else(|_| "config/api.toml".to_string());
        if configured_path.is_empty() {
            bail!("EVOTING_API_CONFIG must not be empty");
        }

        let mut builder = Config::builder()
            .add_source(File::new(&configured_path, FileFormat::Toml).required(true));

        if let Ok(env_override) = std::env::var("EVOTING_API_ENV") {
            if !env_override.is_empty() {
                let env_file = format!("config/api.{}.toml", env_override);
                if Path::new(&env_file).exists() {
                    builder = builder.add_source(File::new(&env_file, FileFormat::Toml));
                }
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("EVOTING")
                .prefix_separator("__")
                .separator("__"),
        );

        Self::from_builder(builder, &configured_path)
    }

    /// Loads a single TOML file without overlays or environment overrides.
    #[cfg(test)]
    pub fn from_path(path: &Path) -> Result<Self> {
        let display = path.display().to_string();
        let builder =
            Config::builder().add_source(File::new(&display, FileFormat::Toml).required(true));
        Self::from_builder(builder, &display)
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        path: &str,
    ) -> Result<Self> {
        let settings = builder
            .build()
            .map_err(|err| map_config_error(err, path))?;
        let config: Self = settings
            .try_deserialize()
            .context("Failed to deserialize API configuration")?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            bail!("Server port must be greater than zero");
        }
        self.database.ensure_bounds()?;
        self.cache.ensure_bounds()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: Option<IpAddr>,
    pub port: u16,
}

impl ServerConfig {
    pub fn address(&self) -> SocketAddr {
        let host = self.host.unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
        SocketAddr::new(host, self.port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,
    pub url: Option<String>,
    #[serde(default = "DatabaseConfig::default_max_connections")]
    pub max_connections: u32,
    pub min_connections: Option<u32>,
    #[serde(default)]
    pub seed_demo_data: bool,
}

impl DatabaseConfig {
    fn ensure_bounds(&self) -> Result<()> {
        if self.backend == StorageBackend::Postgres
            && self.url.as_deref().is_none_or(|url| url.trim().is_empty())
        {
            bail!("database.url must be set for the postgres backend");
        }
        if self.max_connections == 0 || self.max_connections > 128 {
            bail!("database.max_connections must be within 1..=128");
        }
        if self.max_connections < self.min_connections.unwrap_or(1) {
            bail!("database.max_connections must be >= min_connections");
        }
        Ok(())
    }

    const fn default_max_connections() -> u32 {
        10
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub votes_max_capacity: u64,
    pub votes_ttl_seconds: u64,
}

impl CacheConfig {
    pub fn votes_ttl(&self) -> Duration {
        Duration::from_secs(self.votes_ttl_seconds)
    }

    fn ensure_bounds(&self) -> Result<()> {
        if self.votes_max_capacity == 0 {
            bail!("cache.votes_max_capacity must be positive");
        }
        if self.votes_ttl_seconds == 0 || self.votes_ttl_seconds > 86_400 {
            bail!("cache.votes_ttl_seconds must be within 1..=86400");
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            votes_max_capacity: 1_000,
            votes_ttl_seconds: 60,
        }
    }
}

/// Ballot rules beyond the active-status check. Both are off unless
/// explicitly enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VotingConfig {
    /// Reject ballots once the vote's deadline date has passed.
    pub enforce_deadline: bool,
    /// Reject a second ballot from the same citizen on the same vote.
    pub reject_duplicate_ballots: bool,
}

fn map_config_error(err: ConfigError, path: &str) -> ConfigError {
    match err {
        ConfigError::NotFound(_) => ConfigError::NotFound(path.to_string()),
        other => other,
    }
}
