use std::env;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    /// Signing secret; its raw bytes are the HMAC key.
    pub secret: String,
    #[serde(default = "default_expiration_seconds")]
    pub expiration_seconds: i64,
}

impl JwtConfig {
    /// Lifetime of issued tokens.
    ///
    /// # Errors
    /// * `ConfigError::Message` - `expiration_seconds` is not positive or is out of range
    pub fn token_ttl(&self) -> Result<chrono::Duration, ConfigError> {
        if self.expiration_seconds <= 0 {
            return Err(ConfigError::Message(format!(
                "jwt.expiration_seconds must be positive, got {}",
                self.expiration_seconds
            )));
        }

        chrono::Duration::try_seconds(self.expiration_seconds).ok_or_else(|| {
            ConfigError::Message(format!(
                "jwt.expiration_seconds out of range: {}",
                self.expiration_seconds
            ))
        })
    }
}

// Keeps the secret out of `Configuration loaded` style debug output.
impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"***")
            .field("expiration_seconds", &self.expiration_seconds)
            .finish()
    }
}

fn default_max_connections() -> u32 {
    5
}

fn default_expiration_seconds() -> i64 {
    3600
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JWT__SECRET, DATABASE__URL, SERVER__HTTP_PORT, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        configuration.try_deserialize()
    }
}
