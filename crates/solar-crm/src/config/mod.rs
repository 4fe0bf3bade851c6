use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::workflows::commissions::{CommissionConfig, CommissionSchedule};
use crate::workflows::projects::MilestoneKey;
use crate::workflows::ModelAssumptions;

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
    pub model: ModelAssumptions,
    pub commissions: CommissionConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            model: load_model_assumptions()?,
            commissions: load_commissions()?,
        })
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

/// Valid range of a policy assumption.
#[derive(Debug, Clone, Copy)]
enum Range {
    /// `(0, 1]`
    Fraction,
    /// `[0, 1]`
    Rate,
    Positive,
}

impl Range {
    fn contains(self, value: f64) -> bool {
        value.is_finite()
            && match self {
                Range::Fraction => value > 0.0 && value <= 1.0,
                Range::Rate => (0.0..=1.0).contains(&value),
                Range::Positive => value > 0.0,
            }
    }
}

fn load_model_assumptions() -> Result<ModelAssumptions, ConfigError> {
    let defaults = ModelAssumptions::default();
    Ok(ModelAssumptions {
        module_efficiency: assumption(
            "SOLAR_MODULE_EFFICIENCY",
            defaults.module_efficiency,
            Range::Fraction,
        )?,
        capacity_factor_kwh_per_kw: assumption(
            "SOLAR_CAPACITY_FACTOR_KWH_PER_KW",
            defaults.capacity_factor_kwh_per_kw,
            Range::Positive,
        )?,
        daily_yield_kwh_per_kw: assumption(
            "SOLAR_DAILY_YIELD_KWH_PER_KW",
            defaults.daily_yield_kwh_per_kw,
            Range::Positive,
        )?,
        federal_credit_rate: assumption(
            "SOLAR_FEDERAL_CREDIT_RATE",
            defaults.federal_credit_rate,
            Range::Rate,
        )?,
        bill_offset_fraction: assumption(
            "SOLAR_BILL_OFFSET_FRACTION",
            defaults.bill_offset_fraction,
            Range::Fraction,
        )?,
    })
}

fn assumption(name: &'static str, default: f64, range: Range) -> Result<f64, ConfigError> {
    let Ok(raw) = env::var(name) else {
        return Ok(default);
    };

    match raw.trim().parse::<f64>() {
        Ok(value) if range.contains(value) => Ok(value),
        _ => Err(ConfigError::InvalidAssumption { name, value: raw }),
    }
}

/// Reads `COMMISSION_PCT_<MILESTONE>` settings, expressed in percent.
fn load_commissions() -> Result<CommissionConfig, ConfigError> {
    let enabled = match env::var("ENABLE_COMMISSION_TRACKING") {
        Ok(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidFlag {
            name: "ENABLE_COMMISSION_TRACKING",
            value: raw,
        })?,
        Err(_) => true,
    };

    let mut schedule = CommissionSchedule::default();
    for key in MilestoneKey::ordered() {
        let name = format!("COMMISSION_PCT_{}", key.config_suffix());
        let Ok(raw) = env::var(&name) else {
            continue;
        };

        let percent = raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| ConfigError::InvalidCommissionPercent {
                name: name.clone(),
                value: raw.clone(),
            })?;
        schedule.set_percent(key, percent.max(0.0) / 100.0);
    }

    Ok(CommissionConfig { enabled, schedule })
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidAssumption { name: &'static str, value: String },
    InvalidCommissionPercent { name: String, value: String },
    InvalidFlag { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidAssumption { name, value } => {
                write!(f, "{name} is not a valid value: '{value}'")
            }
            ConfigError::InvalidCommissionPercent { name, value } => {
                write!(f, "{name} must be a percentage, got '{value}'")
            }
            ConfigError::InvalidFlag { name, value } => {
                write!(f, "{name} must be true or false, got '{value}'")
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
