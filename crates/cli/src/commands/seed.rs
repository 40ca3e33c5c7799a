use crate::commands::{build_runtime, load_config, open_database, CommandResult, Failure};
use vaxflow_db::{NetworkSeedDataset, SeededPosition};

pub fn run() -> CommandResult {
    let config = match load_config("seed") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match build_runtime("seed") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let pool = open_database(&config).await?;

        let seed_result = NetworkSeedDataset::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

        let verification = NetworkSeedDataset::verify(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;

        let run_result: Result<Vec<SeededPosition>, Failure> = if verification.all_present {
            Ok(seed_result.positions_seeded)
        } else {
            Err(("seed_verification", verification_failure_message(&verification.checks), 6u8))
        };

        pool.close().await;
        run_result
    });

    match result {
        Ok(positions) => {
            let lines: Vec<String> = positions
                .iter()
                .map(|p| format!("  - {}/{} ({})", p.location_id, p.commodity_id, p.region_name))
                .collect();
            let message = format!(
                "demo network loaded with {} stock positions:\n{}",
                positions.len(),
                lines.join("\n")
            );
            CommandResult::success("seed", message)
        }
        Err(failure) => CommandResult::from_failure("seed", failure),
    }
}

fn verification_failure_message(checks: &[(String, bool)]) -> String {
    let failed_checks = checks
        .iter()
        .filter_map(|(check, passed)| (!passed).then_some(check.as_str()))
        .collect::<Vec<_>>();

    if failed_checks.is_empty() {
        "some seed rows failed to load".to_string()
    } else {
        format!("seed verification failed for positions: {}", failed_checks.join(", "))
    }
}
