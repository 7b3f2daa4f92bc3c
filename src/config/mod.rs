use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub documents: DocumentConfig,
    pub otp: OtpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Replaces the database name in DATABASE_URL when set
    pub database_name: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub auto_migrate: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    /// bcrypt work factor for newly set passwords
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    /// Read-modify-write attempts before a version conflict is reported
    pub max_write_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpConfig {
    pub ttl_secs: u64,
    pub sweep_interval_secs: u64,
    /// Lifetime of password reset tokens
    pub reset_ttl_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| env::var(key).ok())
    }

    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        // Database overrides
        if let Some(v) = var("CUSTOMIZER_DB_NAME") {
            self.database.database_name = Some(v).filter(|s| !s.is_empty());
        }
        if let Some(v) = var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Some(v) = var("DATABASE_AUTO_MIGRATE") {
            self.database.auto_migrate = v.parse().unwrap_or(self.database.auto_migrate);
        }

        // API overrides
        if let Some(port) = var("API_PORT")
            .or_else(|| var("PORT"))
            .and_then(|v| v.parse().ok())
        {
            self.api.port = port;
        }
        if let Some(v) = var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Some(v) = var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Some(v) = var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Some(v) = var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Some(v) = var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Some(v) = var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Some(v) = var("SECURITY_BCRYPT_COST") {
            self.security.bcrypt_cost = v
                .parse::<u32>()
                .ok()
                .filter(|cost| (4..=31).contains(cost))
                .unwrap_or(self.security.bcrypt_cost);
        }

        // Document store overrides
        if let Some(v) = var("DOCUMENTS_MAX_WRITE_ATTEMPTS") {
            self.documents.max_write_attempts = v
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .unwrap_or(self.documents.max_write_attempts);
        }

        // OTP overrides
        // Zero periods are ignored: a zero sweep interval cannot drive a timer
        if let Some(v) = var("OTP_TTL_SECS") {
            self.otp.ttl_secs = v.parse::<u64>().ok().filter(|n| *n > 0).unwrap_or(self.otp.ttl_secs);
        }
        if let Some(v) = var("OTP_SWEEP_INTERVAL_SECS") {
            self.otp.sweep_interval_secs = v
                .parse::<u64>()
                .ok()
                .filter(|n| *n > 0)
                .unwrap_or(self.otp.sweep_interval_secs);
        }
        if let Some(v) = var("OTP_RESET_TTL_SECS") {
            self.otp.reset_ttl_secs = v
                .parse::<u64>()
                .ok()
                .filter(|n| *n > 0)
                .unwrap_or(self.otp.reset_ttl_secs);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                database_name: None,
                max_connections: 10,
                connection_timeout: 30,
                auto_migrate: true,
            },
            api: ApiConfig {
                port: 5000,
                enable_request_logging: true,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                jwt_secret: "development-only-secret".to_string(),
                jwt_expiry_hours: 24,
                bcrypt_cost: 10,
            },
            documents: DocumentConfig { max_write_attempts: 3 },
            otp: OtpConfig {
                ttl_secs: 10 * 60,
                sweep_interval_secs: 5 * 60,
                reset_ttl_secs: 60 * 60,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                database_name: None,
                max_connections: 20,
                connection_timeout: 10,
                auto_migrate: true,
            },
            api: ApiConfig {
                port: 5000,
                enable_request_logging: true,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                bcrypt_cost: 10,
            },
            documents: DocumentConfig { max_write_attempts: 3 },
            otp: OtpConfig {
                ttl_secs: 10 * 60,
                sweep_interval_secs: 5 * 60,
                reset_ttl_secs: 60 * 60,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                database_name: None,
                max_connections: 50,
                connection_timeout: 5,
                auto_migrate: false,
            },
            api: ApiConfig {
                port: 5000,
                enable_request_logging: false,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                bcrypt_cost: 10,
            },
            documents: DocumentConfig { max_write_attempts: 5 },
            otp: OtpConfig {
                ttl_secs: 10 * 60,
                sweep_interval_secs: 5 * 60,
                reset_ttl_secs: 60 * 60,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_config_has_usable_secret() {
        let config = AppConfig::development();
        assert!(!config.security.jwt_secret.is_empty());
        assert!(config.database.auto_migrate);
        assert_eq!(config.otp.ttl_secs, 600);
    }

    #[test]
    fn production_config_requires_explicit_secret() {
        let config = AppConfig::production();
        assert!(config.security.jwt_secret.is_empty());
        assert!(!config.database.auto_migrate);
        assert!(config.documents.max_write_attempts >= 3);
    }

    #[test]
    fn zero_periods_keep_their_defaults() {
        let vars = [
            ("OTP_SWEEP_INTERVAL_SECS", "0"),
            ("OTP_TTL_SECS", "0"),
            ("OTP_RESET_TTL_SECS", "0"),
            ("DOCUMENTS_MAX_WRITE_ATTEMPTS", "0"),
        ];
        let config = AppConfig::development().with_overrides(|key| {
            vars.iter().find(|(k, _)| *k == key).map(|(_, v)| v.to_string())
        });

        assert_eq!(config.otp.sweep_interval_secs, 300);
        assert_eq!(config.otp.ttl_secs, 600);
        assert_eq!(config.otp.reset_ttl_secs, 3600);
        assert_eq!(config.documents.max_write_attempts, 3);
    }

    #[test]
    fn overrides_apply_valid_values() {
        let vars = [
            ("OTP_SWEEP_INTERVAL_SECS", "30"),
            ("SECURITY_BCRYPT_COST", "12"),
            ("PORT", "8080"),
        ];
        let config = AppConfig::development().with_overrides(|key| {
            vars.iter().find(|(k, _)| *k == key).map(|(_, v)| v.to_string())
        });

        assert_eq!(config.otp.sweep_interval_secs, 30);
        assert_eq!(config.security.bcrypt_cost, 12);
        assert_eq!(config.api.port, 8080);

        let config = AppConfig::development()
            .with_overrides(|key| (key == "SECURITY_BCRYPT_COST").then(|| "99".to_string()));
        assert_eq!(config.security.bcrypt_cost, 10);
    }
}
