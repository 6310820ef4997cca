//! The primitive library and the bootstrap environment.
//!
//! Primitives are native functions that receive already-evaluated arguments
//! and never re-enter the evaluator. The name-to-function table is built once
//! by [`build_primitive_table`] and shared read-only for the life of the
//! process; the bootstrap environment binds each name to its `(:primitive
//! name)` encoding, plus the constant `Nil`.

use crate::env::{Binding, Environment};
use crate::eval::SymexError;
use crate::function::Primitive;
use crate::symex::{SAtom, SList, Symex};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::debug;

/// A native function callable from the language. Arguments arrive already
/// evaluated.
pub type NativeFn = fn(&[Symex]) -> Result<Symex, SymexError>;

static PRIMITIVE_TABLE: Lazy<HashMap<&'static str, NativeFn>> = Lazy::new(build_primitive_table);

static BOOTSTRAP_ENV: Lazy<Environment> = Lazy::new(build_bootstrap_env);

/// Looks a native function up by primitive name.
pub fn native_function(name: &str) -> Option<NativeFn> {
    PRIMITIVE_TABLE.get(name).copied()
}

/// The ready-made environment exposing every primitive plus `Nil`. Cheap to
/// clone: the chain is shared.
pub fn bootstrap_env() -> Environment {
    BOOTSTRAP_ENV.clone()
}

fn build_primitive_table() -> HashMap<&'static str, NativeFn> {
    debug!("Building primitive table");
    let entries: &[(&'static str, NativeFn)] = &[
        ("Not", native_not),
        ("=", native_equal),
        ("Cons", native_cons),
        ("Head", native_head),
        ("Tail", native_tail),
        ("List", native_list),
        ("Error", native_error),
        ("Is-Data-Atom", native_is_data_atom),
    ];
    entries.iter().copied().collect()
}

fn build_bootstrap_env() -> Environment {
    debug!("Building bootstrap environment");
    let mut bindings: Vec<Binding> = PRIMITIVE_TABLE
        .keys()
        .map(|name| Binding::new(SAtom::new(name), Primitive::new(name).to_symex()))
        .collect();
    // Deterministic chain order; shadowing is irrelevant here since the names
    // are unique, but stable order keeps encodings reproducible.
    bindings.sort_by(|a, b| a.name.text().cmp(b.name.text()));

    // Nil is a constant binding for the empty list, not a callable primitive.
    bindings.push(Binding::new(SAtom::new("Nil"), Symex::list([])));

    Environment::empty().extend_with(bindings)
}

fn expect_arity(args: &[Symex], expected: usize) -> Result<(), SymexError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(SymexError::ArityMismatch {
            expected,
            got: args.len(),
        })
    }
}

fn native_not(args: &[Symex]) -> Result<Symex, SymexError> {
    expect_arity(args, 1)?;
    Ok(Symex::from_bool(!args[0].is_truthy()))
}

/// Variadic equality: true iff all arguments are structurally equal. Zero or
/// one arguments are vacuously equal.
fn native_equal(args: &[Symex]) -> Result<Symex, SymexError> {
    let all_equal = match args.split_first() {
        None => true,
        Some((first, rest)) => rest.iter().all(|other| other == first),
    };
    Ok(Symex::from_bool(all_equal))
}

fn native_cons(args: &[Symex]) -> Result<Symex, SymexError> {
    expect_arity(args, 2)?;
    let tail = args[1].as_list()?;
    Ok(Symex::List(SList::cons(args[0].clone(), tail.clone())))
}

fn native_head(args: &[Symex]) -> Result<Symex, SymexError> {
    expect_arity(args, 1)?;
    let list = args[0].as_list()?;
    list.head()
        .cloned()
        .ok_or_else(|| SymexError::EmptyList("Head".to_string()))
}

fn native_tail(args: &[Symex]) -> Result<Symex, SymexError> {
    expect_arity(args, 1)?;
    let list = args[0].as_list()?;
    list.tail()
        .map(Symex::List)
        .ok_or_else(|| SymexError::EmptyList("Tail".to_string()))
}

fn native_list(args: &[Symex]) -> Result<Symex, SymexError> {
    Ok(Symex::list(args.iter().cloned()))
}

/// Always fails, signaling a user-raised error carrying the payload.
fn native_error(args: &[Symex]) -> Result<Symex, SymexError> {
    expect_arity(args, 1)?;
    Err(SymexError::UserError(args[0].clone()))
}

fn native_is_data_atom(args: &[Symex]) -> Result<Symex, SymexError> {
    expect_arity(args, 1)?;
    Ok(Symex::from_bool(args[0].is_data_atom()))
}
