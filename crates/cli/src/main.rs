use std::process::ExitCode;

fn main() -> ExitCode {
    vaxflow_cli::run()
}
