use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub store: StoreConfig,
    pub auth: AuthConfig,
    pub mail: Option<MailConfig>,
}

impl AppConfig {
    /// Load from the process environment, reading `.env` first when present.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let environment =
            AppEnvironment::from_str(&var("APP_ENV").unwrap_or_else(|| "development".to_string()));

        let host = var("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = var("APP_PORT")
            .or_else(|| var("PORT"))
            .unwrap_or_else(|| "3000".to_string())
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;
        let static_dir = var("APP_STATIC_DIR").map(PathBuf::from);

        let log_level = var("APP_LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        let log_format = match var("APP_LOG_FORMAT") {
            Some(raw) => LogFormat::parse(&raw).ok_or(ConfigError::InvalidLogFormat(raw))?,
            None => LogFormat::Compact,
        };

        let store_url = var("SUPABASE_URL").ok_or(ConfigError::Missing("SUPABASE_URL"))?;
        let store_url =
            Url::parse(store_url.trim()).map_err(|err| ConfigError::InvalidStoreUrl {
                value: store_url.clone(),
                reason: err.to_string(),
            })?;
        let api_key = var("SUPABASE_ANON_KEY").ok_or(ConfigError::Missing("SUPABASE_ANON_KEY"))?;
        let timeout_secs = parse_number(&var, "STORE_TIMEOUT_SECS", 15)?;

        let jwt_secret = var("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let token_ttl_hours = parse_number(&var, "JWT_TTL_HOURS", 7 * 24)?;
        let token_ttl_secs = token_ttl_hours
            .checked_mul(3600)
            .filter(|secs| i64::try_from(*secs).is_ok())
            .ok_or_else(|| ConfigError::InvalidNumber {
                key: "JWT_TTL_HOURS",
                value: token_ttl_hours.to_string(),
            })?;

        let mail = match (var("EMAIL_USER"), var("EMAIL_PASS")) {
            (Some(username), Some(password)) => {
                let service = var("EMAIL_SERVICE").unwrap_or_else(|| "gmail".to_string());
                let from = var("EMAIL_FROM").unwrap_or_else(|| username.clone());
                Some(MailConfig {
                    host: smtp_host(&service),
                    username,
                    password,
                    from,
                })
            }
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteMail),
        };

        Ok(Self {
            environment,
            server: ServerConfig {
                host,
                port,
                static_dir,
            },
            telemetry: TelemetryConfig {
                log_level,
                format: log_format,
            },
            store: StoreConfig {
                url: store_url,
                api_key,
                timeout: Duration::from_secs(timeout_secs),
            },
            auth: AuthConfig {
                jwt_secret,
                token_ttl: Duration::from_secs(token_ttl_secs),
            },
            mail,
        })
    }
}

fn parse_number<F>(var: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { key, value: raw }),
        None => Ok(default),
    }
}

/// Map a mail service name to its SMTP relay; unknown names are used as the host itself.
fn smtp_host(service: &str) -> String {
    match service.trim().to_ascii_lowercase().as_str() {
        "gmail" => "smtp.gmail.com".to_string(),
        "outlook" | "hotmail" | "outlook365" => "smtp-mail.outlook.com".to_string(),
        "yahoo" => "smtp.mail.yahoo.com".to_string(),
        "zoho" => "smtp.zoho.com".to_string(),
        _ => service.trim().to_string(),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: Option<PathBuf>,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" => Some(Self::Compact),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

/// Connection settings for the PostgREST store.
#[derive(Clone)]
pub struct StoreConfig {
    pub url: Url,
    pub api_key: String,
    pub timeout: Duration,
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url.as_str())
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Session token signing settings.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: Duration,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

/// SMTP credentials for new-lead alerts.
#[derive(Clone)]
pub struct MailConfig {
    pub host: String,
    pub username: String,
    pub password: String,
    pub from: String,
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from", &self.from)
            .finish()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    Missing(&'static str),
    InvalidStoreUrl { value: String, reason: String },
    InvalidNumber { key: &'static str, value: String },
    InvalidLogFormat(String),
    IncompleteMail,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT/PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::Missing(key) => write!(f, "{key} must be set"),
            ConfigError::InvalidStoreUrl { value, reason } => {
                write!(f, "SUPABASE_URL '{value}' is not a valid URL ({reason})")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be a whole number, got '{value}'")
            }
            ConfigError::InvalidLogFormat(value) => {
                write!(f, "APP_LOG_FORMAT must be 'compact' or 'json', got '{value}'")
            }
            ConfigError::IncompleteMail => {
                write!(f, "EMAIL_USER and EMAIL_PASS must be set together")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn required() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("SUPABASE_URL", "https://demo.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon-key"),
            ("JWT_SECRET", "signing-secret"),
        ])
    }

    fn load_with(vars: HashMap<&'static str, &'static str>) -> Result<AppConfig, ConfigError> {
        AppConfig::from_lookup(|key| vars.get(key).map(|value| value.to_string()))
    }

    #[test]
    fn uses_defaults_when_optional_values_missing() {
        let config = load_with(required()).expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.telemetry.format, LogFormat::Compact);
        assert_eq!(config.store.timeout, Duration::from_secs(15));
        assert_eq!(config.auth.token_ttl, Duration::from_secs(7 * 24 * 3600));
        assert!(config.mail.is_none());
    }

    #[test]
    fn fails_fast_without_store_or_signing_settings() {
        for key in ["SUPABASE_URL", "SUPABASE_ANON_KEY", "JWT_SECRET"] {
            let mut vars = required();
            vars.remove(key);
            match load_with(vars) {
                Err(ConfigError::Missing(missing)) => assert_eq!(missing, key),
                other => panic!("expected missing {key}, got {other:?}"),
            }
        }
    }

    #[test]
    fn falls_back_to_port_variable() {
        let mut vars = required();
        vars.insert("PORT", "8080");
        let config = load_with(vars).expect("config loads");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn resolves_mail_service_and_sender() {
        let mut vars = required();
        vars.insert("EMAIL_USER", "alerts@example.com");
        vars.insert("EMAIL_PASS", "app-password");
        let config = load_with(vars).expect("config loads");
        let mail = config.mail.expect("mail configured");
        assert_eq!(mail.host, "smtp.gmail.com");
        assert_eq!(mail.from, "alerts@example.com");
        assert!(!format!("{mail:?}").contains("app-password"));
    }

    #[test]
    fn rejects_partial_mail_credentials() {
        let mut vars = required();
        vars.insert("EMAIL_USER", "alerts@example.com");
        assert!(matches!(load_with(vars), Err(ConfigError::IncompleteMail)));
    }

    #[test]
    fn rejects_invalid_store_url() {
        let mut vars = required();
        vars.insert("SUPABASE_URL", "not a url");
        assert!(matches!(
            load_with(vars),
            Err(ConfigError::InvalidStoreUrl { .. })
        ));
    }

    #[test]
    fn rejects_token_lifetime_that_overflows() {
        let mut vars = required();
        vars.insert("JWT_TTL_HOURS", "18446744073709551615");
        match load_with(vars) {
            Err(ConfigError::InvalidNumber { key, .. }) => assert_eq!(key, "JWT_TTL_HOURS"),
            other => panic!("expected invalid JWT_TTL_HOURS, got {other:?}"),
        }
    }

    #[test]
    fn load_reads_process_environment() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        env::set_var("SUPABASE_URL", "https://demo.supabase.co");
        env::set_var("SUPABASE_ANON_KEY", "anon-key");
        env::set_var("JWT_SECRET", "signing-secret");
        env::set_var("APP_HOST", "localhost");

        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr.ip(), IpAddr::from([127, 0, 0, 1]));

        env::remove_var("APP_HOST");
    }
}
