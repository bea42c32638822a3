use crate::roster::access::{AccessPolicy, PolicyError};
use std::env;
use std::fmt;
use std::path::PathBuf;

const DEFAULT_SESSION_PATH: &str = ".roster-session.json";
const DEFAULT_TOP_DEFICITS: usize = 5;

/// Distinguishes runtime behavior for different stages of the dashboard.
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
    pub telemetry: TelemetryConfig,
    pub access: AccessConfig,
    pub session: SessionConfig,
    pub report: ReportConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let policy_path = env::var("ROSTER_POLICY_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let session_path = env::var("ROSTER_SESSION_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_PATH));

        let top_deficits = match env::var("ROSTER_TOP_DEFICITS") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|value| *value > 0)
                .ok_or(ConfigError::InvalidTopDeficits)?,
            Err(_) => DEFAULT_TOP_DEFICITS,
        };

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            access: AccessConfig { policy_path },
            session: SessionConfig { path: session_path },
            report: ReportConfig { top_deficits },
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where the role table comes from; the built-in table when unset.
#[derive(Debug, Clone)]
pub struct AccessConfig {
    pub policy_path: Option<PathBuf>,
}

impl AccessConfig {
    pub fn load_policy(&self) -> Result<AccessPolicy, PolicyError> {
        match &self.policy_path {
            Some(path) => AccessPolicy::from_path(path),
            None => Ok(AccessPolicy::default()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub top_deficits: usize,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidTopDeficits,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidTopDeficits => {
                write!(f, "ROSTER_TOP_DEFICITS must be a positive integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
