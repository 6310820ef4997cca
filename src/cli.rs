use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// A purely functional symbolic-expression evaluator.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(name = "symex", bin_name = "symex")]
#[clap(subcommand_required = true, arg_required_else_help = true)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluates an expression from a string or from a file.
    Run(RunArgs),

    /// Starts an interactive session.
    Repl,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Expression string to evaluate.
    #[clap(short, long, value_name = "CODE", conflicts_with = "file")]
    pub expr: Option<String>,

    /// Path to a file holding one expression.
    #[clap(
        value_name = "FILE_PATH",
        conflicts_with = "expr",
        required_unless_present = "expr"
    )]
    pub file: Option<PathBuf>,

    /// Which evaluator runs the program. Both produce identical results;
    /// the machine handles deep recursion without growing the host stack.
    #[clap(long, value_enum, default_value_t = Evaluator::Machine)]
    pub evaluator: Evaluator,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluator {
    /// The structurally-recursive evaluator.
    Simple,
    /// The stack-machine evaluator.
    Machine,
}
