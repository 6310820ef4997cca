//! The direct, structurally-recursive evaluator.
//!
//! This evaluator mirrors the shape of the language: evaluating a nested
//! expression recurses on the host stack, so its call depth is proportional
//! to the language-level recursion depth. That is intentional. Deep
//! recursion belongs to the stack-machine evaluator in [`crate::machine`],
//! which produces identical results without growing the host stack.

use crate::env::Environment;
use crate::function::Function;
use crate::primitives::bootstrap_env;
use crate::special_forms;
use crate::symex::{SList, Symex};
use thiserror::Error;
use tracing::{instrument, trace};

/// Every way an evaluation can fail. All are terminal for the current
/// evaluation; the two evaluators raise the same kind for the same input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SymexError {
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("tried to evaluate an empty list")]
    EmptyListEvaluation,
    #[error("malformed {form} form: {message}")]
    MalformedForm { form: String, message: String },
    #[error("the name {0:?} is not bound in this environment")]
    UnboundName(String),
    #[error("function expects {expected} arguments, got {got}")]
    ArityMismatch { expected: usize, got: usize },
    #[error("not a function: {0}")]
    NotAFunction(String),
    #[error("unknown primitive: {0:?}")]
    UnknownPrimitive(String),
    #[error("none of the conditions were true")]
    NoMatchingCondition,
    #[error("{0} of an empty list")]
    EmptyList(String),
    #[error("error raised by the program: {0}")]
    UserError(Symex),
    #[error("a stack frame expected a result but none was produced")]
    MissingFrameResult,
    #[error(transparent)]
    Parse(#[from] crate::parser::ParseError),
}

/// Evaluates `expr` in the bootstrap environment.
pub fn evaluate(expr: &Symex) -> Result<Symex, SymexError> {
    eval_in(expr, &bootstrap_env())
}

/// Evaluates `expr` in `env` by structural recursion.
#[instrument(level = "trace", skip(expr, env), fields(expr = %expr))]
pub fn eval_in(expr: &Symex, env: &Environment) -> Result<Symex, SymexError> {
    match expr {
        Symex::Atom(atom) if atom.is_data_atom() => Ok(expr.clone()),
        Symex::Atom(atom) => env.lookup(atom),
        Symex::List(list) => {
            let Some((head, args)) = list.split_first() else {
                return Err(SymexError::EmptyListEvaluation);
            };
            match head {
                Symex::Atom(name) if special_forms::is_special_form(name.text()) => {
                    eval_special_form(name.text(), &args, env)
                }
                _ => eval_call(list, env),
            }
        }
    }
}

/// Dispatches a special form on its raw, unevaluated arguments.
fn eval_special_form(
    name: &str,
    args: &SList,
    env: &Environment,
) -> Result<Symex, SymexError> {
    trace!(form = name, "Evaluating special form");
    match name {
        special_forms::QUOTE => special_forms::quote_argument(args),
        special_forms::LAMBDA => special_forms::make_lambda(args, env),
        special_forms::FUNCTION => special_forms::make_function(args, env),
        special_forms::AND => eval_and(args, env),
        special_forms::OR => eval_or(args, env),
        special_forms::COND => eval_cond(args, env),
        special_forms::WHERE => eval_where(args, env),
        _ => unreachable!("dispatch covers every special form"),
    }
}

/// Evaluate left to right; return the first falsy value, else the last.
/// Zero arguments yield `:true`.
fn eval_and(args: &SList, env: &Environment) -> Result<Symex, SymexError> {
    let mut result = Symex::truthy();
    for expr in args {
        result = eval_in(expr, env)?;
        if !result.is_truthy() {
            return Ok(result);
        }
    }
    Ok(result)
}

/// Evaluate left to right; return the first truthy value. Zero arguments
/// yield `:false`.
fn eval_or(args: &SList, env: &Environment) -> Result<Symex, SymexError> {
    let mut result = Symex::falsy();
    for expr in args {
        result = eval_in(expr, env)?;
        if result.is_truthy() {
            return Ok(result);
        }
    }
    Ok(result)
}

fn eval_cond(cases: &SList, env: &Environment) -> Result<Symex, SymexError> {
    for case in cases {
        let (condition, outcome) = special_forms::split_case(case)?;
        if eval_in(&condition, env)?.is_truthy() {
            return eval_in(&outcome, env);
        }
    }
    Err(SymexError::NoMatchingCondition)
}

/// Each binding's value expression sees the environment accumulated so far,
/// so later bindings and the body can refer to earlier ones.
fn eval_where(args: &SList, env: &Environment) -> Result<Symex, SymexError> {
    let (body, bindings) = special_forms::split_where(args)?;
    let mut env = env.clone();
    for binding_expr in &bindings {
        let (name, value_expr) = special_forms::split_binding(binding_expr)?;
        let value = eval_in(&value_expr, &env)?;
        env = env.extend_with(vec![crate::env::Binding::new(name, value)]);
    }
    eval_in(&body, &env)
}

/// An ordinary call: evaluate every element left to right, then apply the
/// first value to the rest.
fn eval_call(list: &SList, env: &Environment) -> Result<Symex, SymexError> {
    let Some((head, arg_exprs)) = list.split_first() else {
        return Err(SymexError::EmptyListEvaluation);
    };
    let func_value = eval_in(head, env)?;
    let args = arg_exprs
        .iter()
        .map(|expr| eval_in(expr, env))
        .collect::<Result<Vec<_>, _>>()?;

    match Function::from_symex(&func_value)? {
        Function::Primitive(primitive) => primitive.apply(&args),
        Function::Closure(closure) => {
            let call_env = closure.build_env(&args)?;
            eval_in(&closure.body, &call_env)
        }
    }
}
