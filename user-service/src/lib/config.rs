use std::env;

use auth::settings::DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES;
use auth::AuthSettings;
use auth::TokenError;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Postgres URL. Without one, users are kept in memory.
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Deserialize, Clone)]
pub struct SecurityConfig {
    pub secret_key: String,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    #[serde(default = "default_expire_minutes")]
    pub access_token_expire_minutes: i64,
}

impl SecurityConfig {
    /// Validated signing settings for the authenticator.
    pub fn auth_settings(&self) -> Result<AuthSettings, TokenError> {
        AuthSettings::new(
            self.secret_key.as_bytes(),
            &self.algorithm,
            self.access_token_expire_minutes,
        )
    }
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("secret_key", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field(
                "access_token_expire_minutes",
                &self.access_token_expire_minutes,
            )
            .finish()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

fn default_expire_minutes() -> i64 {
    DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Flat variables SECRET_KEY, ALGORITHM, ACCESS_TOKEN_EXPIRE_MINUTES, DATABASE_URL
    /// 2. Nested environment variables (DATABASE__URL, SECURITY__SECRET_KEY, etc.)
    /// 3. Environment-specific config file (config/{environment}.toml)
    /// 4. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .set_default("server.http_port", 8000)?
            .set_default("security.algorithm", default_algorithm())?
            .set_default(
                "security.access_token_expire_minutes",
                DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES,
            )?
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: DATABASE__URL=postgres://... overrides database.url
            .add_source(Environment::default().separator("__"))
            .set_override_option("security.secret_key", env::var("SECRET_KEY").ok())?
            .set_override_option("security.algorithm", env::var("ALGORITHM").ok())?
            .set_override_option(
                "security.access_token_expire_minutes",
                env::var("ACCESS_TOKEN_EXPIRE_MINUTES").ok(),
            )?
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn security(secret: &str, algorithm: &str, minutes: i64) -> SecurityConfig {
        SecurityConfig {
            secret_key: secret.to_string(),
            algorithm: algorithm.to_string(),
            access_token_expire_minutes: minutes,
        }
    }

    #[test]
    fn test_auth_settings_from_security_config() {
        let settings = security("secret", "HS384", 15).auth_settings().unwrap();

        assert_eq!(settings.algorithm(), auth::Algorithm::HS384);
        assert_eq!(settings.access_token_ttl().num_minutes(), 15);
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        let result = security("", "HS256", 30).auth_settings();
        assert!(matches!(result, Err(TokenError::SigningError(_))));
    }

    #[test]
    fn test_security_debug_hides_secret() {
        let rendered = format!("{:?}", security("hunter2", "HS256", 30));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let config: Config = ConfigBuilder::builder()
            .add_source(config::File::from_str(
                r#"
                [server]
                http_port = 9000
                [security]
                secret_key = "secret"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert!(config.database.url.is_none());
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.server.http_port, 9000);
        assert_eq!(config.security.algorithm, "HS256");
        assert_eq!(config.security.access_token_expire_minutes, 30);
    }
}
