//! The interactive read-eval-print loop, driven by the stack machine.

use crate::eval::SymexError;
use crate::machine::Machine;
use crate::parser;
use crate::primitives::bootstrap_env;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use std::fs;
use std::path::PathBuf;
use tracing::{error, info, warn};

const HISTORY_FILE_SUBDIR: &str = "symex"; // Crate name
const HISTORY_FILE_NAME: &str = "history.txt";

fn history_path() -> Option<PathBuf> {
    dirs::data_dir().or_else(dirs::config_dir).map(|mut path| {
        path.push(HISTORY_FILE_SUBDIR);
        path.push(HISTORY_FILE_NAME);
        path
    })
}

#[tracing::instrument]
pub fn start_repl() -> anyhow::Result<()> {
    info!("Starting REPL session with rustyline");
    let env = bootstrap_env();
    let mut machine = Machine::new();
    let mut rl = Editor::<(), DefaultHistory>::new()?;

    let history_path_opt = history_path();

    if let Some(ref history_path) = history_path_opt {
        if let Some(parent_dir) = history_path.parent() {
            if !parent_dir.exists() {
                if let Err(e) = fs::create_dir_all(parent_dir) {
                    warn!(
                        "Failed to create history directory {}: {}",
                        parent_dir.display(),
                        e
                    );
                }
            }
        }
        if history_path.exists() {
            if let Err(err) = rl.load_history(history_path) {
                warn!(
                    "Could not load history from {}: {}",
                    history_path.display(),
                    err
                );
            } else {
                info!("Loaded history from {}", history_path.display());
            }
        }
    } else {
        warn!("Could not determine history file path. History will not be saved.");
    }

    loop {
        match rl.readline("symex> ") {
            Ok(line) => {
                let trimmed = line.trim();

                if trimmed.is_empty() {
                    continue;
                }
                if let Err(err) = rl.add_history_entry(line.as_str()) {
                    warn!("Failed to add line to history: {}", err);
                }

                if trimmed == ".exit" || trimmed == "(exit)" {
                    info!("Exiting REPL session via user command.");
                    println!("Exiting.");
                    break;
                }

                let outcome = parser::parse(trimmed)
                    .map_err(SymexError::from)
                    .and_then(|expr| machine.eval_in(&expr, &env));
                match outcome {
                    Ok(result) => println!("{result}"),
                    Err(err) => eprintln!("Error: {err}"),
                }
            }
            Err(ReadlineError::Interrupted) => {
                info!("REPL interrupted (Ctrl-C).");
                println!("Interrupted. Type .exit, (exit), or Ctrl-D to exit.");
            }
            Err(ReadlineError::Eof) => {
                info!("REPL EOF detected (Ctrl-D).");
                println!("Exiting.");
                break;
            }
            Err(err) => {
                eprintln!("REPL Readline Error: {err:?}");
                break;
            }
        }
    }

    if let Some(ref history_path) = history_path_opt {
        if let Err(err) = rl.save_history(history_path) {
            error!(
                "Could not save history to {}: {}",
                history_path.display(),
                err
            );
        } else {
            info!("Saved history to {}", history_path.display());
        }
    }
    Ok(())
}
