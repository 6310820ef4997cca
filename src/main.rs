use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use symex::cli::{Cli, Commands, Evaluator, RunArgs};
use symex::logging::init_logging;
use symex::{eval, machine, parser, repl};
use tracing::info;

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    info!(?cli, "Parsed CLI arguments");

    match cli.command {
        Commands::Run(args) => run(args),
        Commands::Repl => repl::start_repl(),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let source = match (&args.expr, &args.file) {
        (Some(expr), _) => expr.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => unreachable!("clap requires an expression or a file"),
    };

    let expr = parser::parse(&source)?;
    let result = match args.evaluator {
        Evaluator::Simple => eval::evaluate(&expr),
        Evaluator::Machine => machine::evaluate(&expr),
    }?;

    println!("{result}");
    Ok(())
}
