use std::collections::BTreeMap;
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use streamify_social::SocialConfig;

use crate::error::{ServerError, ServerResult};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub environment: Environment,
    pub log_level: String,
    pub cors_origins: Vec<String>,
    /// JSON file of user documents loaded into the in-memory store at start.
    pub seed_users: Option<PathBuf>,
    pub auth: AuthConfig,
    pub social: SocialConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 4000)),
            environment: Environment::Development,
            log_level: "info".into(),
            cors_origins: Vec::new(),
            seed_users: None,
            auth: AuthConfig::default(),
            social: SocialConfig::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl FromStr for Environment {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" => Ok(Self::Production),
            other => Err(ServerError::Config(format!(
                "environment must be one of development, staging, production; got {other}"
            ))),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        };
        f.write_str(name)
    }
}

/// Static bearer tokens, each mapped to the id of the user it authenticates.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub tokens: BTreeMap<String, String>,
}

impl ServerConfig {
    /// Load from a TOML file (or defaults when `path` is `None`), apply
    /// `STREAMIFY_*` environment overrides, and validate.
    pub fn load(path: Option<&Path>) -> ServerResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml_str(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Override fields from `STREAMIFY_BIND_ADDR`, `STREAMIFY_ENV` and
    /// `STREAMIFY_LOG_LEVEL` as resolved by `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> ServerResult<()> {
        if let Some(addr) = lookup("STREAMIFY_BIND_ADDR") {
            self.bind_addr = addr
                .parse()
                .map_err(|e| ServerError::Config(format!("STREAMIFY_BIND_ADDR: {e}")))?;
        }
        if let Some(env) = lookup("STREAMIFY_ENV") {
            self.environment = env.parse()?;
        }
        if let Some(level) = lookup("STREAMIFY_LOG_LEVEL") {
            self.log_level = level;
        }
        Ok(())
    }

    pub fn validate(&self) -> ServerResult<()> {
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ServerError::Config(format!(
                "log_level must be one of {}; got {}",
                LOG_LEVELS.join(", "),
                self.log_level
            )));
        }
        for origin in &self.cors_origins {
            if !(origin.starts_with("http://") || origin.starts_with("https://")) {
                return Err(ServerError::Config(format!(
                    "each cors origin must be a valid url; got {origin}"
                )));
            }
        }
        if self.social.max_page_size == 0 {
            return Err(ServerError::Config("social.max_page_size must be positive".into()));
        }
        if self.social.store_timeout_ms == 0 {
            return Err(ServerError::Config("social.store_timeout_ms must be positive".into()));
        }
        Ok(())
    }

    pub fn tracing_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:4000".parse::<SocketAddr>().unwrap());
        assert_eq!(c.environment, Environment::Development);
        assert!(c.auth.tokens.is_empty());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn parse_toml_with_sections() {
        let c = ServerConfig::from_toml_str(
            r#"
            bind_addr = "0.0.0.0:8080"
            environment = "staging"
            log_level = "debug"
            cors_origins = ["https://app.example.com"]

            [auth.tokens]
            dev-token = "0190c1a2-7b3c-7d4e-8f10-1a2b3c4d5e6f"

            [social]
            use_transactions = false
            max_page_size = 50
            "#,
        )
        .unwrap();

        assert_eq!(c.bind_addr.port(), 8080);
        assert_eq!(c.environment, Environment::Staging);
        assert_eq!(c.tracing_level(), tracing::Level::DEBUG);
        assert_eq!(c.auth.tokens.len(), 1);
        assert!(!c.social.use_transactions);
        assert_eq!(c.social.max_page_size, 50);
        assert_eq!(c.social.store_timeout_ms, 5_000);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn env_overrides_win() {
        let mut c = ServerConfig::default();
        c.apply_overrides(|key| match key {
            "STREAMIFY_BIND_ADDR" => Some("127.0.0.1:9999".into()),
            "STREAMIFY_ENV" => Some("production".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(c.bind_addr.port(), 9999);
        assert_eq!(c.environment, Environment::Production);
        assert_eq!(c.log_level, "info");
    }

    #[test]
    fn bad_override_is_config_error() {
        let mut c = ServerConfig::default();
        let err = c
            .apply_overrides(|key| (key == "STREAMIFY_ENV").then(|| "qa".to_string()))
            .unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let c = ServerConfig {
            log_level: "loud".into(),
            ..Default::default()
        };
        assert!(c.validate().is_err());

        let c = ServerConfig {
            cors_origins: vec!["example.com".into()],
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_level = \"warn\"").unwrap();
        let c = ServerConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(c.log_level, "warn");
    }
}
