// screenpick-cli/src/main.rs
//
// Entry point for the screenpick binary: parses arguments, installs the
// logger and dispatches to the selected command. Errors are printed with
// their full context chain and exit with status 1.

use clap::Parser;
use screenpick_cli::logging::init_logging;
use screenpick_cli::{Cli, Commands, run_select};
use std::process;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Select(args) => run_select(args),
    };

    if let Err(e) = result {
        log::debug!("Command failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
