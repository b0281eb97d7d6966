use clap::Parser;
use todo_store::cli::Cli;
use todo_store::cli::commands;
use todo_store::format::OutputContext;
use todo_store::logging::init_logging;
use todo_store::{StructuredError, TodoError};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.quiet, cli.log_file.as_deref()) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let ctx = OutputContext::from_flags(cli.json, cli.quiet);
    if let Err(err) = commands::run(&cli, &ctx) {
        report(&err, cli.json);
        std::process::exit(err.code().exit_code());
    }
}

fn report(err: &TodoError, json: bool) {
    let structured = StructuredError::from(err);
    if json {
        println!("{}", structured.to_json());
        return;
    }
    eprintln!("Error: {}", structured.message);
    if let Some(hint) = structured.hint {
        eprintln!("Hint: {hint}");
    }
}
