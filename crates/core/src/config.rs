use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub redistribution: RedistributionConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

/// Tunables of the transfer suggestion engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RedistributionConfig {
    /// Minimum acceptable months of stock; below this a location is in shortage.
    pub min_months_of_stock: f64,
    /// Months of stock a source keeps for itself before anything counts as surplus.
    pub safety_buffer_months: f64,
    pub search_radius_km: f64,
    pub average_speed_kmh: f64,
    pub confidence_threshold: f64,
    pub bulk_transfer_threshold: u64,
    pub long_distance_km: f64,
    pub extended_travel_minutes: f64,
    pub high_risk_regions: Vec<String>,
    /// 1-based, inclusive. The window wraps the year end when start > end.
    pub rainy_season_start_month: u32,
    pub rainy_season_end_month: u32,
    pub default_completion_minutes: u32,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub min_months_of_stock: Option<f64>,
    pub safety_buffer_months: Option<f64>,
    pub search_radius_km: Option<f64>,
    pub confidence_threshold: Option<f64>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://vaxflow.db?mode=rwc".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            redistribution: RedistributionConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl Default for RedistributionConfig {
    fn default() -> Self {
        Self {
            min_months_of_stock: 1.0,
            safety_buffer_months: 4.0,
            search_radius_km: 100.0,
            average_speed_kmh: 40.0,
            confidence_threshold: 0.6,
            bulk_transfer_threshold: 500,
            long_distance_km: 50.0,
            extended_travel_minutes: 120.0,
            high_risk_regions: vec![
                "Borno".to_string(),
                "Yobe".to_string(),
                "Adamawa".to_string(),
            ],
            rainy_season_start_month: 6,
            rainy_season_end_month: 9,
            default_completion_minutes: 240,
        }
    }
}

impl RedistributionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("redistribution.min_months_of_stock", self.min_months_of_stock),
            ("redistribution.safety_buffer_months", self.safety_buffer_months),
            ("redistribution.search_radius_km", self.search_radius_km),
            ("redistribution.average_speed_kmh", self.average_speed_kmh),
            ("redistribution.long_distance_km", self.long_distance_km),
            ("redistribution.extended_travel_minutes", self.extended_travel_minutes),
        ];
        for (key, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Validation(format!(
                    "{key} must be a positive number, got {value}"
                )));
            }
        }

        if self.safety_buffer_months <= self.min_months_of_stock {
            return Err(ConfigError::Validation(format!(
                "redistribution.safety_buffer_months ({}) must be greater than redistribution.min_months_of_stock ({})",
                self.safety_buffer_months, self.min_months_of_stock
            )));
        }

        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ConfigError::Validation(
                "redistribution.confidence_threshold must be in range 0.0..=1.0".to_string(),
            ));
        }

        if self.bulk_transfer_threshold == 0 {
            return Err(ConfigError::Validation(
                "redistribution.bulk_transfer_threshold must be greater than zero".to_string(),
            ));
        }

        for (key, month) in [
            ("redistribution.rainy_season_start_month", self.rainy_season_start_month),
            ("redistribution.rainy_season_end_month", self.rainy_season_end_month),
        ] {
            if !(1..=12).contains(&month) {
                return Err(ConfigError::Validation(format!("{key} must be in range 1..=12")));
            }
        }

        if self.default_completion_minutes == 0 {
            return Err(ConfigError::Validation(
                "redistribution.default_completion_minutes must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    pub fn is_rainy_month(&self, month: u32) -> bool {
        let (start, end) = (self.rainy_season_start_month, self.rainy_season_end_month);
        if start <= end {
            (start..=end).contains(&month)
        } else {
            month >= start || month <= end
        }
    }

    pub fn is_high_risk_region(&self, region_name: &str) -> bool {
        let region_name = region_name.trim();
        !region_name.is_empty()
            && self.high_risk_regions.iter().any(|region| region.trim().eq_ignore_ascii_case(region_name))
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("vaxflow.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(redistribution) = patch.redistribution {
            let target = &mut self.redistribution;
            if let Some(value) = redistribution.min_months_of_stock {
                target.min_months_of_stock = value;
            }
            if let Some(value) = redistribution.safety_buffer_months {
                target.safety_buffer_months = value;
            }
            if let Some(value) = redistribution.search_radius_km {
                target.search_radius_km = value;
            }
            if let Some(value) = redistribution.average_speed_kmh {
                target.average_speed_kmh = value;
            }
            if let Some(value) = redistribution.confidence_threshold {
                target.confidence_threshold = value;
            }
            if let Some(value) = redistribution.bulk_transfer_threshold {
                target.bulk_transfer_threshold = value;
            }
            if let Some(value) = redistribution.long_distance_km {
                target.long_distance_km = value;
            }
            if let Some(value) = redistribution.extended_travel_minutes {
                target.extended_travel_minutes = value;
            }
            if let Some(value) = redistribution.high_risk_regions {
                target.high_risk_regions = value;
            }
            if let Some(value) = redistribution.rainy_season_start_month {
                target.rainy_season_start_month = value;
            }
            if let Some(value) = redistribution.rainy_season_end_month {
                target.rainy_season_end_month = value;
            }
            if let Some(value) = redistribution.default_completion_minutes {
                target.default_completion_minutes = value;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("VAXFLOW_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("VAXFLOW_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_env("VAXFLOW_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("VAXFLOW_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_env("VAXFLOW_DATABASE_TIMEOUT_SECS", &value)?;
        }

        let redistribution = &mut self.redistribution;
        if let Some(value) = read_env("VAXFLOW_REDISTRIBUTION_MIN_MONTHS_OF_STOCK") {
            redistribution.min_months_of_stock =
                parse_env("VAXFLOW_REDISTRIBUTION_MIN_MONTHS_OF_STOCK", &value)?;
        }
        if let Some(value) = read_env("VAXFLOW_REDISTRIBUTION_SAFETY_BUFFER_MONTHS") {
            redistribution.safety_buffer_months =
                parse_env("VAXFLOW_REDISTRIBUTION_SAFETY_BUFFER_MONTHS", &value)?;
        }
        if let Some(value) = read_env("VAXFLOW_REDISTRIBUTION_SEARCH_RADIUS_KM") {
            redistribution.search_radius_km =
                parse_env("VAXFLOW_REDISTRIBUTION_SEARCH_RADIUS_KM", &value)?;
        }
        if let Some(value) = read_env("VAXFLOW_REDISTRIBUTION_AVERAGE_SPEED_KMH") {
            redistribution.average_speed_kmh =
                parse_env("VAXFLOW_REDISTRIBUTION_AVERAGE_SPEED_KMH", &value)?;
        }
        if let Some(value) = read_env("VAXFLOW_REDISTRIBUTION_CONFIDENCE_THRESHOLD") {
            redistribution.confidence_threshold =
                parse_env("VAXFLOW_REDISTRIBUTION_CONFIDENCE_THRESHOLD", &value)?;
        }
        if let Some(value) = read_env("VAXFLOW_REDISTRIBUTION_BULK_TRANSFER_THRESHOLD") {
            redistribution.bulk_transfer_threshold =
                parse_env("VAXFLOW_REDISTRIBUTION_BULK_TRANSFER_THRESHOLD", &value)?;
        }
        if let Some(value) = read_env("VAXFLOW_REDISTRIBUTION_LONG_DISTANCE_KM") {
            redistribution.long_distance_km =
                parse_env("VAXFLOW_REDISTRIBUTION_LONG_DISTANCE_KM", &value)?;
        }
        if let Some(value) = read_env("VAXFLOW_REDISTRIBUTION_EXTENDED_TRAVEL_MINUTES") {
            redistribution.extended_travel_minutes =
                parse_env("VAXFLOW_REDISTRIBUTION_EXTENDED_TRAVEL_MINUTES", &value)?;
        }
        if let Some(value) = read_env("VAXFLOW_REDISTRIBUTION_HIGH_RISK_REGIONS") {
            redistribution.high_risk_regions = value
                .split(',')
                .map(str::trim)
                .filter(|region| !region.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(value) = read_env("VAXFLOW_REDISTRIBUTION_RAINY_SEASON_START_MONTH") {
            redistribution.rainy_season_start_month =
                parse_env("VAXFLOW_REDISTRIBUTION_RAINY_SEASON_START_MONTH", &value)?;
        }
        if let Some(value) = read_env("VAXFLOW_REDISTRIBUTION_RAINY_SEASON_END_MONTH") {
            redistribution.rainy_season_end_month =
                parse_env("VAXFLOW_REDISTRIBUTION_RAINY_SEASON_END_MONTH", &value)?;
        }

        if let Some(value) = read_env("VAXFLOW_REDISTRIBUTION_DEFAULT_COMPLETION_MINUTES") {
            redistribution.default_completion_minutes =
                parse_env("VAXFLOW_REDISTRIBUTION_DEFAULT_COMPLETION_MINUTES", &value)?;
        }

        let log_level =
            read_env("VAXFLOW_LOGGING_LEVEL").or_else(|| read_env("VAXFLOW_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("VAXFLOW_LOGGING_FORMAT").or_else(|| read_env("VAXFLOW_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(value) = overrides.min_months_of_stock {
            self.redistribution.min_months_of_stock = value;
        }
        if let Some(value) = overrides.safety_buffer_months {
            self.redistribution.safety_buffer_months = value;
        }
        if let Some(value) = overrides.search_radius_km {
            self.redistribution.search_radius_km = value;
        }
        if let Some(value) = overrides.confidence_threshold {
            self.redistribution.confidence_threshold = value;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        self.redistribution.validate()?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("vaxflow.toml"), PathBuf::from("config/vaxflow.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    redistribution: Option<RedistributionPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct RedistributionPatch {
    min_months_of_stock: Option<f64>,
    safety_buffer_months: Option<f64>,
    search_radius_km: Option<f64>,
    average_speed_kmh: Option<f64>,
    confidence_threshold: Option<f64>,
    bulk_transfer_threshold: Option<u64>,
    long_distance_km: Option<f64>,
    extended_travel_minutes: Option<f64>,
    high_risk_regions: Option<Vec<String>>,
    rainy_season_start_month: Option<u32>,
    rainy_season_end_month: Option<u32>,
    default_completion_minutes: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
