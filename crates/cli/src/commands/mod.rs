pub mod config;
pub mod execute;
pub mod migrate;
pub mod seed;
pub mod suggest;

use serde::Serialize;
use serde_json::Value;
use tokio::runtime::Runtime;

use vaxflow_core::config::{AppConfig, LoadOptions};
use vaxflow_core::errors::{ApplicationError, RedistributionError};
use vaxflow_db::{connect, migrations, DbPool};

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

/// `(error_class, message, exit_code)` carried out of a command's async block.
pub(crate) type Failure = (&'static str, String, u8);

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::success_with_data(command, message, None)
    }

    pub fn success_with_data(command: &str, message: impl Into<String>, data: Option<Value>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub(crate) fn from_failure(command: &str, (error_class, message, exit_code): Failure) -> Self {
        Self::failure(command, error_class, message, exit_code)
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn load_config(command: &str) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            2,
        )
    })
}

pub(crate) fn build_runtime(command: &str) -> Result<Runtime, CommandResult> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            3,
        )
    })
}

/// Connect and bring the schema up to date.
pub(crate) async fn open_database(config: &AppConfig) -> Result<DbPool, Failure> {
    let pool =
        connect(&config.database).await.map_err(|error| ("db_connectivity", error.to_string(), 4))?;
    migrations::run_pending(&pool).await.map_err(|error| ("migration", error.to_string(), 5))?;
    Ok(pool)
}

/// Classifies an engine error and renders its user-safe message tagged with `correlation_id`.
pub(crate) fn engine_failure(correlation_id: &str, error: RedistributionError) -> Failure {
    let application = ApplicationError::from(error);
    let (error_class, exit_code) = match &application {
        ApplicationError::Configuration(_) => ("config_validation", 2),
        ApplicationError::Persistence(_) => ("persistence", 4),
        ApplicationError::Integration(_) => ("integration", 6),
        ApplicationError::Domain(_) => ("domain_validation", 6),
    };

    let interface = application.into_interface(correlation_id);
    let message =
        format!("{} {interface} (correlation_id: {correlation_id})", interface.user_message());
    (error_class, message, exit_code)
}

pub(crate) fn to_data<T: Serialize>(value: &T) -> Result<Value, Failure> {
    serde_json::to_value(value).map_err(|error| ("serialization", error.to_string(), 3))
}

#[cfg(test)]
mod tests {
    use serde_json::Value;
    use vaxflow_core::errors::{CollaboratorError, RedistributionError};

    use super::{engine_failure, CommandResult};

    #[test]
    fn success_payload_omits_absent_data() {
        let result = CommandResult::success("migrate", "applied pending migrations");
        let payload: Value = serde_json::from_str(&result.output).expect("json");
        assert_eq!(result.exit_code, 0);
        assert_eq!(payload["status"], "ok");
        assert!(payload["error_class"].is_null());
        assert!(payload.get("data").is_none());
    }

    #[test]
    fn engine_errors_map_to_exit_codes() {
        let (class, message, code) =
            engine_failure("execute:x", RedistributionError::InvalidSuggestionId("x".to_string()));
        assert_eq!((class, code), ("domain_validation", 6));
        assert!(message.starts_with("The request could not be processed."));
        assert!(message.contains("invalid suggestion id `x`"));
        assert!(message.ends_with("(correlation_id: execute:x)"));

        let (class, message, code) = engine_failure(
            "suggest:ikeja/bcg",
            RedistributionError::Collaborator(CollaboratorError::Unavailable(
                "db down".to_string(),
            )),
        );
        assert_eq!((class, code), ("integration", 6));
        assert!(message.starts_with("The service is temporarily unavailable."));

        let (class, _, code) = engine_failure(
            "suggest:ikeja/bcg",
            RedistributionError::InvalidConfiguration("radius".to_string()),
        );
        assert_eq!((class, code), ("config_validation", 2));
    }
}
