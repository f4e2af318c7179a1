use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MAX_QUESTIONS: usize = 20;
pub const DEFAULT_PDF_SERVICE_URL: &str = "http://168.231.115.219:5001/generate-pdf";

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
    pub providers: ProvidersConfig,
    pub assessment: AssessmentConfig,
    pub delivery: DeliveryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(&env_or("APP_ENV", "development"));

        let host = env_or("APP_HOST", "127.0.0.1");
        let port = env_or("APP_PORT", "3000")
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env_or("APP_LOG_LEVEL", "info");
        let log_format = LogFormat::from_str(&env_or("APP_LOG_FORMAT", "compact"));

        let providers = ProvidersConfig {
            openai: ProviderSettings {
                api_key: optional_env("OPENAI_API_KEY"),
                model: env_or("OPENAI_MODEL", "gpt-4o"),
                base_url: env_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            },
            google: ProviderSettings {
                api_key: optional_env("GOOGLE_API_KEY"),
                model: env_or("GOOGLE_MODEL", "gemini-2.0-flash"),
                base_url: env_or(
                    "GOOGLE_BASE_URL",
                    "https://generativelanguage.googleapis.com/v1beta/models",
                ),
            },
            groq: ProviderSettings {
                api_key: optional_env("GROQ_API_KEY"),
                model: env_or("GROQ_MODEL", "qwen-qwq-32b"),
                base_url: env_or("GROQ_BASE_URL", "https://api.groq.com/openai/v1"),
            },
            pollinations: PollinationsSettings {
                enabled: parse_flag("POLLINATIONS_ENABLED")?,
                url: env_or("POLLINATIONS_URL", "https://text.pollinations.ai/openai"),
                model: env_or("POLLINATIONS_MODEL", "openai-large"),
            },
            request_timeout: Duration::from_secs(parse_env("LLM_REQUEST_TIMEOUT_SECS", 120u64)?),
        };

        let max_questions = parse_env("SCORECARD_MAX_QUESTIONS", DEFAULT_MAX_QUESTIONS)?;
        if max_questions == 0 {
            return Err(ConfigError::InvalidNumber {
                key: "SCORECARD_MAX_QUESTIONS",
            });
        }

        let delivery = DeliveryConfig {
            pdf_service_url: env_or("WEASYPRINT_SERVICE_URL", DEFAULT_PDF_SERVICE_URL),
            pdf_timeout: Duration::from_secs(parse_env("PDF_TIMEOUT_SECS", 30u64)?),
            lead_log_dir: PathBuf::from(env_or("LEAD_LOG_DIR", "logs")),
            lead_webhook_url: optional_env("LEAD_WEBHOOK_URL"),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                format: log_format,
            },
            providers,
            assessment: AssessmentConfig { max_questions },
            delivery,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_env<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { key }),
        None => Ok(default),
    }
}

fn parse_flag(key: &'static str) -> Result<bool, ConfigError> {
    match optional_env(key).map(|raw| raw.to_ascii_lowercase()) {
        None => Ok(false),
        Some(raw) => match raw.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidFlag { key }),
        },
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
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

/// Output shape for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Compact,
        }
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

/// Credentials and endpoint for one hosted model.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl ProviderSettings {
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// The keyless Pollinations endpoint is opt-in.
#[derive(Debug, Clone)]
pub struct PollinationsSettings {
    pub enabled: bool,
    pub url: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct ProvidersConfig {
    pub openai: ProviderSettings,
    pub google: ProviderSettings,
    pub groq: ProviderSettings,
    pub pollinations: PollinationsSettings,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AssessmentConfig {
    pub max_questions: usize,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            max_questions: DEFAULT_MAX_QUESTIONS,
        }
    }
}

/// PDF rendering service and lead capture sinks.
#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    pub pdf_service_url: String,
    pub pdf_timeout: Duration,
    pub lead_log_dir: PathBuf,
    pub lead_webhook_url: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str },
    InvalidFlag { key: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key } => {
                write!(f, "{key} must be a positive whole number")
            }
            ConfigError::InvalidFlag { key } => write!(f, "{key} must be true or false"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidFlag { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_LOG_FORMAT",
            "OPENAI_API_KEY",
            "GOOGLE_API_KEY",
            "GROQ_API_KEY",
            "POLLINATIONS_ENABLED",
            "LLM_REQUEST_TIMEOUT_SECS",
            "SCORECARD_MAX_QUESTIONS",
            "WEASYPRINT_SERVICE_URL",
            "PDF_TIMEOUT_SECS",
            "LEAD_LOG_DIR",
            "LEAD_WEBHOOK_URL",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.telemetry.format, LogFormat::Compact);
        assert_eq!(config.assessment.max_questions, 20);
        assert_eq!(config.providers.request_timeout, Duration::from_secs(120));
        assert!(!config.providers.openai.is_configured());
        assert!(!config.providers.pollinations.enabled);
        assert_eq!(config.delivery.pdf_service_url, DEFAULT_PDF_SERVICE_URL);
        assert_eq!(config.delivery.pdf_timeout, Duration::from_secs(30));
        assert!(config.delivery.lead_webhook_url.is_none());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reads_provider_keys_and_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("OPENAI_API_KEY", "sk-test");
        env::set_var("GOOGLE_API_KEY", "  ");
        env::set_var("POLLINATIONS_ENABLED", "true");
        env::set_var("SCORECARD_MAX_QUESTIONS", "10");
        env::set_var("APP_LOG_FORMAT", "json");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.providers.openai.api_key.as_deref(), Some("sk-test"));
        assert!(!config.providers.google.is_configured());
        assert!(config.providers.pollinations.enabled);
        assert_eq!(config.assessment.max_questions, 10);
        assert_eq!(config.telemetry.format, LogFormat::Json);
        reset_env();
    }

    #[test]
    fn rejects_non_numeric_limits() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SCORECARD_MAX_QUESTIONS", "twenty");
        match AppConfig::load() {
            Err(ConfigError::InvalidNumber { key }) => assert_eq!(key, "SCORECARD_MAX_QUESTIONS"),
            other => panic!("expected invalid number error, got {other:?}"),
        }

        env::set_var("SCORECARD_MAX_QUESTIONS", "0");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidNumber { .. })
        ));
        reset_env();
    }
}
