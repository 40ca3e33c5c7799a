pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use vaxflow_core::config::{AppConfig, LoadOptions, LogFormat, LoggingConfig};

#[derive(Debug, Parser)]
#[command(
    name = "vaxflow",
    about = "Vaxflow redistribution operator CLI",
    long_about = "Apply migrations, load the demo network, generate transfer suggestions, and forward transfers.",
    after_help = "Examples:\n  vaxflow seed\n  vaxflow suggest --location ikeja --commodity bcg\n  vaxflow execute --suggestion 'agege|ikeja|bcg|160' --reason stockout"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load and verify the deterministic demo distribution network")]
    Seed,
    #[command(about = "Generate ranked transfer suggestions for a location short of a commodity")]
    Suggest {
        #[arg(long, help = "Target location id")]
        location: String,
        #[arg(long, help = "Commodity id")]
        commodity: String,
        #[arg(long, help = "Record a pending redistribution order for every suggestion")]
        create_orders: bool,
    },
    #[command(about = "Forward a transfer for a previously generated suggestion id")]
    Execute {
        #[arg(long, help = "Suggestion id as printed by `suggest`")]
        suggestion: String,
        #[arg(long)]
        reason: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long = "eta-minutes", help = "Estimated completion time in minutes")]
        eta_minutes: Option<u32>,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let logging = AppConfig::load(LoadOptions::default())
        .map(|config| config.logging)
        .unwrap_or_else(|_| AppConfig::default().logging);
    init_logging(&logging);

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Suggest { location, commodity, create_orders } => {
            commands::suggest::run(&location, &commodity, create_orders)
        }
        Command::Execute { suggestion, reason, notes, eta_minutes } => {
            commands::execute::run(&suggestion, reason, notes, eta_minutes)
        }
        Command::Config => commands::config::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr; stdout carries only the command's output.
fn init_logging(logging: &LoggingConfig) {
    use tracing::Level;

    let log_level = logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let _ = match logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
