//! A purely functional evaluator for symbolic expressions.
//!
//! Programs, data, functions, and even environments are all one type: the
//! [`Symex`], either an atom or a list of further symexes. Two evaluators
//! share the entire language definition and produce identical results: a
//! structurally-recursive one in [`eval`], and a stack machine in [`machine`]
//! that runs tail calls in constant stack space.
//!
//! ```
//! use symex::read_eval_print;
//!
//! let result = read_eval_print("(Cons :ha (List :ha :ha))").unwrap();
//! assert_eq!(result, "(:ha :ha :ha)");
//! ```

pub mod cli;
pub mod env;
pub mod eval;
pub mod function;
pub mod logging;
pub mod machine;
pub mod parser;
pub mod primitives;
pub mod repl;
pub mod special_forms;
pub mod symex;

pub use crate::eval::SymexError;
pub use crate::symex::{SAtom, SList, Symex};

/// Parses `source` and evaluates it on the stack machine, rendering the
/// result back to text.
pub fn read_eval_print(source: &str) -> Result<String, SymexError> {
    let expr = parser::parse(source)?;
    let result = machine::evaluate(&expr)?;
    Ok(result.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::init_test_logging;

    #[test]
    fn read_eval_print_round_trips_through_text() {
        init_test_logging();
        assert_eq!(read_eval_print(":hello"), Ok(":hello".to_string()));
        assert_eq!(
            read_eval_print("(List :one (List :two))"),
            Ok("(:one (:two))".to_string())
        );
    }

    #[test]
    fn read_eval_print_surfaces_parse_errors() {
        init_test_logging();
        assert_eq!(
            read_eval_print("(List :one"),
            Err(SymexError::Parse(parser::ParseError::UnterminatedList))
        );
    }

    #[test]
    fn read_eval_print_surfaces_evaluation_errors() {
        init_test_logging();
        assert_eq!(
            read_eval_print("nope"),
            Err(SymexError::UnboundName("nope".to_string()))
        );
    }
}
