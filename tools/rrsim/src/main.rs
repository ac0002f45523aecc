use std::process::ExitCode;

use clap::Parser;

use rrsim::cli::{Cli, Command};
use rrsim::error::RrsimError;
use rrsim::{check, logger, output, run};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.verbose, cli.quiet);

    let result: Result<(), RrsimError> = match &cli.command {
        Command::Run(args) => {
            run::run(args).and_then(|out| output::emit(cli.output, &out).map_err(RrsimError::from))
        }
        Command::Check(args) => check::check(args)
            .and_then(|out| output::emit(cli.output, &out).map_err(RrsimError::from)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::debug!("{e:?}");
            output::emit_error(cli.output, e.exit_status(), &e.to_string());
            e.exit_code()
        }
    }
}
