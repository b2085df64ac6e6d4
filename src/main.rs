use clap::Parser;
use std::process::ExitCode;
use tidyrules::cli::{Cli, run_cli};
use tidyrules::output::OutputFormatter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run_cli(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&format!("Error: {}", e));
            ExitCode::FAILURE
        }
    }
}
