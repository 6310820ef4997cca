//! Special forms: list heads that control evaluation order.
//!
//! A special form is dispatched on the literal text of a list's first element
//! before any arguments are evaluated; the form receives the raw remaining
//! sub-expressions. This module owns the form names and the shape
//! decomposition shared by both evaluators, so that malformed input produces
//! the same error kind no matter which evaluator sees it first.

use crate::env::Environment;
use crate::eval::SymexError;
use crate::function::Closure;
use crate::symex::{SAtom, SList, Symex};

pub const QUOTE: &str = "Quote";
pub const LAMBDA: &str = "Lambda";
pub const FUNCTION: &str = "Function";
pub const AND: &str = "And";
pub const OR: &str = "Or";
pub const COND: &str = "Cond";
pub const WHERE: &str = "Where";

pub const SPECIAL_FORMS: &[&str] = &[QUOTE, LAMBDA, FUNCTION, AND, OR, COND, WHERE];

pub fn is_special_form(name: &str) -> bool {
    SPECIAL_FORMS.contains(&name)
}

fn malformed(form: &str, message: &str) -> SymexError {
    SymexError::MalformedForm {
        form: form.to_string(),
        message: message.to_string(),
    }
}

/// `(Quote e)`: exactly one argument, returned unevaluated.
pub fn quote_argument(args: &SList) -> Result<Symex, SymexError> {
    match args.iter().collect::<Vec<_>>().as_slice() {
        [expr] => Ok((*expr).clone()),
        _ => Err(malformed(QUOTE, "expects exactly one expression")),
    }
}

/// `(Lambda params body)`: builds an unnamed closure over the current
/// environment, returned in symex form.
pub fn make_lambda(args: &SList, env: &Environment) -> Result<Symex, SymexError> {
    match args.iter().collect::<Vec<_>>().as_slice() {
        [params, body] => {
            Ok(Closure::from_defining_parts(None, params, (*body).clone(), env.clone())?
                .to_symex())
        }
        _ => Err(malformed(LAMBDA, "expects a parameter list and a body")),
    }
}

/// `(Function name params body)`: builds a named closure; the name enables
/// recursive self-reference when the closure is applied.
pub fn make_function(args: &SList, env: &Environment) -> Result<Symex, SymexError> {
    match args.iter().collect::<Vec<_>>().as_slice() {
        [name, params, body] => {
            let name = name.as_atom()?.clone();
            Ok(
                Closure::from_defining_parts(Some(name), params, (*body).clone(), env.clone())?
                    .to_symex(),
            )
        }
        _ => Err(malformed(
            FUNCTION,
            "expects a name, a parameter list, and a body",
        )),
    }
}

/// Splits one `Cond` case into `(condition, outcome)`.
pub fn split_case(case: &Symex) -> Result<(Symex, Symex), SymexError> {
    let shape_error = || malformed(COND, "each case must be a (condition outcome) pair");
    let pair = case.as_list().map_err(|_| shape_error())?;
    match pair.iter().collect::<Vec<_>>().as_slice() {
        [condition, outcome] => Ok(((*condition).clone(), (*outcome).clone())),
        _ => Err(shape_error()),
    }
}

/// Splits one `Where` binding into `(name, value_expr)`.
pub fn split_binding(binding: &Symex) -> Result<(SAtom, Symex), SymexError> {
    let shape_error = || malformed(WHERE, "each binding must be a (name value) pair");
    let pair = binding.as_list().map_err(|_| shape_error())?;
    match pair.iter().collect::<Vec<_>>().as_slice() {
        [name, value_expr] => {
            let name = name
                .as_atom()
                .map_err(|_| malformed(WHERE, "binding names must be atoms"))?
                .clone();
            Ok((name, (*value_expr).clone()))
        }
        _ => Err(shape_error()),
    }
}

/// Splits `Where` arguments into the body and the binding list.
pub fn split_where(args: &SList) -> Result<(Symex, SList), SymexError> {
    args.split_first()
        .map(|(body, bindings)| (body.clone(), bindings))
        .ok_or_else(|| malformed(WHERE, "expects a body expression"))
}
