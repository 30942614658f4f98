//! shapegraph - dependency analysis for API shape documents

use std::process::ExitCode;

use clap::Parser;
use shapegraph::cli::Cli;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Usage errors go to stdout with exit 1; --help and --version succeed
            if e.use_stderr() {
                print!("{}", e.render());
                return ExitCode::FAILURE;
            }
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
    };

    shapegraph::cli::init_logging(cli.verbose);

    if let Err(e) = shapegraph::cli::run(cli) {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
