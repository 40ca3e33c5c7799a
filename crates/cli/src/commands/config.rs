use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use toml::Value;

use crate::commands::{load_config, CommandResult};

/// Plain-text report on success; the usual JSON failure line otherwise.
pub fn run() -> CommandResult {
    let config = match load_config("config") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_key: &str| {
        field_source(key_path, env_key, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let redistribution = &config.redistribution;
    let entries: Vec<(&str, &str, String)> = vec![
        ("database.url", "VAXFLOW_DATABASE_URL", config.database.url.clone()),
        (
            "database.max_connections",
            "VAXFLOW_DATABASE_MAX_CONNECTIONS",
            config.database.max_connections.to_string(),
        ),
        (
            "database.timeout_secs",
            "VAXFLOW_DATABASE_TIMEOUT_SECS",
            config.database.timeout_secs.to_string(),
        ),
        (
            "redistribution.min_months_of_stock",
            "VAXFLOW_REDISTRIBUTION_MIN_MONTHS_OF_STOCK",
            redistribution.min_months_of_stock.to_string(),
        ),
        (
            "redistribution.safety_buffer_months",
            "VAXFLOW_REDISTRIBUTION_SAFETY_BUFFER_MONTHS",
            redistribution.safety_buffer_months.to_string(),
        ),
        (
            "redistribution.search_radius_km",
            "VAXFLOW_REDISTRIBUTION_SEARCH_RADIUS_KM",
            redistribution.search_radius_km.to_string(),
        ),
        (
            "redistribution.average_speed_kmh",
            "VAXFLOW_REDISTRIBUTION_AVERAGE_SPEED_KMH",
            redistribution.average_speed_kmh.to_string(),
        ),
        (
            "redistribution.confidence_threshold",
            "VAXFLOW_REDISTRIBUTION_CONFIDENCE_THRESHOLD",
            redistribution.confidence_threshold.to_string(),
        ),
        (
            "redistribution.bulk_transfer_threshold",
            "VAXFLOW_REDISTRIBUTION_BULK_TRANSFER_THRESHOLD",
            redistribution.bulk_transfer_threshold.to_string(),
        ),
        (
            "redistribution.long_distance_km",
            "VAXFLOW_REDISTRIBUTION_LONG_DISTANCE_KM",
            redistribution.long_distance_km.to_string(),
        ),
        (
            "redistribution.extended_travel_minutes",
            "VAXFLOW_REDISTRIBUTION_EXTENDED_TRAVEL_MINUTES",
            redistribution.extended_travel_minutes.to_string(),
        ),
        (
            "redistribution.high_risk_regions",
            "VAXFLOW_REDISTRIBUTION_HIGH_RISK_REGIONS",
            redistribution.high_risk_regions.join(","),
        ),
        (
            "redistribution.rainy_season_start_month",
            "VAXFLOW_REDISTRIBUTION_RAINY_SEASON_START_MONTH",
            redistribution.rainy_season_start_month.to_string(),
        ),
        (
            "redistribution.rainy_season_end_month",
            "VAXFLOW_REDISTRIBUTION_RAINY_SEASON_END_MONTH",
            redistribution.rainy_season_end_month.to_string(),
        ),
        (
            "redistribution.default_completion_minutes",
            "VAXFLOW_REDISTRIBUTION_DEFAULT_COMPLETION_MINUTES",
            redistribution.default_completion_minutes.to_string(),
        ),
        ("logging.level", "VAXFLOW_LOGGING_LEVEL", config.logging.level.clone()),
        ("logging.format", "VAXFLOW_LOGGING_FORMAT", format!("{:?}", config.logging.format)),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(
        entries
            .into_iter()
            .map(|(key, env_key, value)| render_line(key, &value, source(key, env_key))),
    );

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("vaxflow.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/vaxflow.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: &str,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if env::var_os(env_key).is_some() {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{contains_path, field_source};

    #[test]
    fn nested_keys_resolve_against_the_file_document() {
        let doc: toml::Value = "[redistribution]\nsearch_radius_km = 80.0\n".parse().expect("toml");
        assert!(contains_path(&doc, "redistribution.search_radius_km"));
        assert!(!contains_path(&doc, "redistribution.confidence_threshold"));

        let source = field_source(
            "redistribution.search_radius_km",
            "VAXFLOW_TEST_UNSET_SEARCH_RADIUS",
            Some(&doc),
            Some(Path::new("vaxflow.toml")),
        );
        assert_eq!(source, "file (vaxflow.toml)");

        let source = field_source(
            "redistribution.confidence_threshold",
            "VAXFLOW_TEST_UNSET_CONFIDENCE",
            Some(&doc),
            Some(Path::new("vaxflow.toml")),
        );
        assert_eq!(source, "default");
    }
}
