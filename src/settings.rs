use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GrantrsSettings {
    #[serde(default)]
    pub application: ApplicationSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub credentials: CredentialSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite database path; `:memory:` is accepted for ephemeral runs.
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialSettings {
    /// Process-wide signing secret. Must be set; startup fails otherwise.
    pub signing_secret: String,
    /// Access token lifetime. The shipped default is 7 days.
    pub access_ttl_hours: i64,
    /// Refresh token lifetime, 30x the access default.
    pub refresh_ttl_hours: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 61018,
            cors_origins: "http://localhost:5173".to_string(),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: "grantrs.db".to_string(),
        }
    }
}

impl Default for CredentialSettings {
    fn default() -> Self {
        Self {
            signing_secret: String::new(), // Required from config or environment
            access_ttl_hours: 168,
            refresh_ttl_hours: 5040,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl GrantrsSettings {
    /// Load settings from `Settings.toml` and environment variables
    ///
    /// Priority, highest to lowest: `GRANTRS_*` environment variables,
    /// `Settings.toml` in the current directory, built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be read or parsed.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let mut settings = Self::load_base_settings()?;
        Self::apply_env_overrides(&mut settings);
        Ok(settings)
    }

    /// Initialize logging at the configured level. Safe to call more than
    /// once; later calls are ignored.
    pub fn init_logging(&self) {
        let _ = env_logger::Builder::new()
            .parse_filters(&self.logging.level)
            .try_init();
    }

    /// Comma-separated CORS origins as a list.
    #[must_use]
    pub fn get_cors_origins(&self) -> Vec<String> {
        self.application
            .cors_origins
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect()
    }

    #[must_use]
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.application.host, self.application.port)
    }

    fn load_base_settings() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Path::new("Settings.toml");
        if path.exists() {
            let content = fs::read_to_string(path)?;
            Ok(basic_toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    fn apply_env_overrides(settings: &mut Self) {
        if let Ok(host) = std::env::var("GRANTRS_HOST") {
            settings.application.host = host;
        }
        if let Ok(port) = std::env::var("GRANTRS_PORT") {
            if let Ok(port) = port.parse() {
                settings.application.port = port;
            }
        }
        if let Ok(origins) = std::env::var("GRANTRS_CORS_ORIGINS") {
            settings.application.cors_origins = origins;
        }
        if let Ok(path) = std::env::var("GRANTRS_DATABASE_PATH") {
            settings.database.path = path;
        }
        if let Ok(secret) = std::env::var("GRANTRS_SIGNING_SECRET") {
            settings.credentials.signing_secret = secret;
        }
        if let Ok(hours) = std::env::var("GRANTRS_ACCESS_TTL_HOURS") {
            if let Ok(hours) = hours.parse() {
                settings.credentials.access_ttl_hours = hours;
            }
        }
        if let Ok(hours) = std::env::var("GRANTRS_REFRESH_TTL_HOURS") {
            if let Ok(hours) = hours.parse() {
                settings.credentials.refresh_ttl_hours = hours;
            }
        }
        if let Ok(level) = std::env::var("GRANTRS_LOG_LEVEL") {
            settings.logging.level = level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = GrantrsSettings::default();
        assert_eq!(settings.application.port, 61018);
        assert_eq!(settings.credentials.access_ttl_hours, 168);
        assert_eq!(settings.credentials.refresh_ttl_hours, 5040);
        assert!(settings.credentials.signing_secret.is_empty());
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let settings: GrantrsSettings = basic_toml::from_str(
            r#"
            [credentials]
            signing_secret = "s3cret"
            access_ttl_hours = 1
            refresh_ttl_hours = 720
            "#,
        )
        .unwrap();

        assert_eq!(settings.credentials.signing_secret, "s3cret");
        assert_eq!(settings.credentials.access_ttl_hours, 1);
        // untouched sections keep their defaults
        assert_eq!(settings.application.port, 61018);
        assert_eq!(settings.database.path, "grantrs.db");
    }

    #[test]
    fn test_cors_origins_split() {
        let mut settings = GrantrsSettings::default();
        settings.application.cors_origins =
            "http://localhost:5173, https://example.com,".to_string();
        assert_eq!(
            settings.get_cors_origins(),
            vec!["http://localhost:5173", "https://example.com"]
        );
    }

    #[test]
    fn test_bind_address() {
        let settings = GrantrsSettings::default();
        assert_eq!(settings.get_bind_address(), "0.0.0.0:61018");
    }
}
