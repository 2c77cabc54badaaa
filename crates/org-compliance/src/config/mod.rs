use crate::analysis::{
    AnalysisPolicy, DEFAULT_MAX_REPORTING_DEPTH, DEFAULT_MAX_SALARY_RATIO,
    DEFAULT_MIN_SALARY_RATIO,
};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

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
    pub analysis: AnalysisConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let max_reporting_depth = match env::var("ORG_MAX_REPORTING_DEPTH") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidMaxDepth)?,
            Err(_) => DEFAULT_MAX_REPORTING_DEPTH,
        };
        let min_salary_ratio = ratio_var("ORG_SALARY_MIN_RATIO", DEFAULT_MIN_SALARY_RATIO)?;
        let max_salary_ratio = ratio_var("ORG_SALARY_MAX_RATIO", DEFAULT_MAX_SALARY_RATIO)?;
        if min_salary_ratio > max_salary_ratio {
            return Err(ConfigError::InvertedSalaryBand);
        }

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            analysis: AnalysisConfig {
                min_salary_ratio,
                max_salary_ratio,
                max_reporting_depth,
            },
        })
    }
}

fn ratio_var(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|ratio| ratio.is_finite() && *ratio > 0.0)
            .ok_or(ConfigError::InvalidSalaryRatio { name }),
        Err(_) => Ok(default),
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Company rules applied by the salary and reporting-line analyzers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisConfig {
    pub min_salary_ratio: f64,
    pub max_salary_ratio: f64,
    pub max_reporting_depth: usize,
}

impl AnalysisConfig {
    pub fn policy(&self) -> AnalysisPolicy {
        AnalysisPolicy::from(self)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_salary_ratio: DEFAULT_MIN_SALARY_RATIO,
            max_salary_ratio: DEFAULT_MAX_SALARY_RATIO,
            max_reporting_depth: DEFAULT_MAX_REPORTING_DEPTH,
        }
    }
}

impl From<&AnalysisConfig> for AnalysisPolicy {
    fn from(config: &AnalysisConfig) -> Self {
        AnalysisPolicy::new(
            config.min_salary_ratio,
            config.max_salary_ratio,
            config.max_reporting_depth,
        )
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidMaxDepth,
    InvalidSalaryRatio { name: &'static str },
    InvertedSalaryBand,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidMaxDepth => {
                write!(f, "ORG_MAX_REPORTING_DEPTH must be a non-negative integer")
            }
            ConfigError::InvalidSalaryRatio { name } => {
                write!(f, "{name} must be a positive decimal number")
            }
            ConfigError::InvertedSalaryBand => write!(
                f,
                "ORG_SALARY_MIN_RATIO must not exceed ORG_SALARY_MAX_RATIO"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidMaxDepth
            | ConfigError::InvalidSalaryRatio { .. }
            | ConfigError::InvertedSalaryBand => None,
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
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("ORG_MAX_REPORTING_DEPTH");
        env::remove_var("ORG_SALARY_MIN_RATIO");
        env::remove_var("ORG_SALARY_MAX_RATIO");
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
        assert_eq!(config.analysis, AnalysisConfig::default());
        assert_eq!(config.analysis.policy(), AnalysisPolicy::default());
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
    fn analysis_rules_come_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "ci");
        env::set_var("ORG_MAX_REPORTING_DEPTH", "6");
        env::set_var("ORG_SALARY_MIN_RATIO", "1.1");
        env::set_var("ORG_SALARY_MAX_RATIO", "1.4");
        let config = AppConfig::load().expect("config loads");
        reset_env();

        assert_eq!(config.environment, AppEnvironment::Test);
        let policy = config.analysis.policy();
        assert_eq!(policy.max_reporting_depth(), 6);
        assert_eq!(policy.min_salary_ratio(), 1.1);
        assert_eq!(policy.max_salary_ratio(), 1.4);
    }

    #[test]
    fn rejects_invalid_analysis_settings() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();

        env::set_var("ORG_MAX_REPORTING_DEPTH", "-1");
        assert!(matches!(AppConfig::load(), Err(ConfigError::InvalidMaxDepth)));
        reset_env();

        env::set_var("ORG_SALARY_MIN_RATIO", "zero");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidSalaryRatio {
                name: "ORG_SALARY_MIN_RATIO"
            })
        ));
        reset_env();

        env::set_var("ORG_SALARY_MIN_RATIO", "2.0");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvertedSalaryBand)
        ));
        reset_env();
    }
}
