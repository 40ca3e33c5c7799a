use crate::commands::suggest::build_engine;
use crate::commands::{
    build_runtime, engine_failure, load_config, open_database, to_data, CommandResult, Failure,
};
use vaxflow_core::domain::suggestion::SuggestionId;
use vaxflow_core::domain::transfer::ExecutionParams;

pub fn run(
    suggestion: &str,
    reason: Option<String>,
    notes: Option<String>,
    eta_minutes: Option<u32>,
) -> CommandResult {
    let config = match load_config("execute") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match build_runtime("execute") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let suggestion_id = SuggestionId(suggestion.trim().to_string());
    let params = ExecutionParams { reason, notes, estimated_completion_minutes: eta_minutes };

    let result = runtime.block_on(async {
        let pool = open_database(&config).await?;
        let outcome = async {
            let correlation_id = format!("execute:{}", suggestion_id.0);
            let engine = build_engine(&config, &pool, &correlation_id)?;
            let execution = engine
                .execute_transfer(&suggestion_id, params)
                .await
                .map_err(|error| engine_failure(&correlation_id, error))?;
            let data = to_data(&execution)?;
            Ok::<_, Failure>((execution.transfer_id.0, data))
        }
        .await;
        pool.close().await;
        outcome
    });

    match result {
        Ok((transfer_id, data)) => CommandResult::success_with_data(
            "execute",
            format!("transfer {transfer_id} forwarded for suggestion {}", suggestion_id.0),
            Some(data),
        ),
        Err(failure) => CommandResult::from_failure("execute", failure),
    }
}
