use std::process::ExitCode;

use blendplan::{CLIArguments, exit_status, export_main, solve_main, telemetry};
use clap::Parser;

fn main() -> ExitCode {
    telemetry::init_tracing();
    let args = CLIArguments::parse();

    let result = match args {
        CLIArguments::Solve(args) => solve_main(args),
        CLIArguments::Export(args) => export_main(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_status(&err))
        }
    }
}
