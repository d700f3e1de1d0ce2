use crate::course::archive::ArchivePolicy;
use crate::course::objectives::ObjectivePolicy;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

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
        let max_upload_mb: usize = read_limit("APP_MAX_UPLOAD_MB", 200)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig {
                host,
                port,
                max_upload_bytes: max_upload_mb.saturating_mul(1024 * 1024),
            },
            telemetry: TelemetryConfig { log_level },
            analysis: AnalysisConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
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

/// Hard caps applied by the extraction pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub max_assessments: usize,
    pub assessment_char_limit: usize,
    pub max_course_objectives: usize,
    pub max_syllabus_objectives: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_assessments: 15,
            assessment_char_limit: 2000,
            max_course_objectives: 60,
            max_syllabus_objectives: 40,
        }
    }
}

impl AnalysisConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            max_assessments: read_limit("COURSE_MAX_ASSESSMENTS", defaults.max_assessments)?,
            assessment_char_limit: read_limit(
                "COURSE_ASSESSMENT_CHARS",
                defaults.assessment_char_limit,
            )?,
            max_course_objectives: read_limit(
                "COURSE_MAX_OBJECTIVES",
                defaults.max_course_objectives,
            )?,
            max_syllabus_objectives: read_limit(
                "COURSE_MAX_SYLLABUS_OBJECTIVES",
                defaults.max_syllabus_objectives,
            )?,
        })
    }

    pub fn archive_policy(&self) -> ArchivePolicy {
        ArchivePolicy {
            max_assessments: self.max_assessments,
            assessment_char_limit: self.assessment_char_limit,
            ..ArchivePolicy::default()
        }
    }

    pub fn objective_policy(&self) -> ObjectivePolicy {
        ObjectivePolicy {
            max_course_objectives: self.max_course_objectives,
            max_syllabus_objectives: self.max_syllabus_objectives,
            ..ObjectivePolicy::default()
        }
    }
}

fn read_limit<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidLimit { name, value: raw }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLimit { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLimit { name, value } => {
                write!(f, "{name} must be a non-negative integer (found '{value}')")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidLimit { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
