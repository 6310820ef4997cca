//! Function values: closures and primitives.
//!
//! Function values are ordinary symexes tagged by a leading marker atom, so
//! they can be passed around, quoted, and inspected like any other data. This
//! module owns the encoding and decoding of both kinds, plus the
//! call-environment construction for closures.
//!
//! Applying a closure here only *builds* the call environment; whether the
//! body is then evaluated by recursion or by a tail call is the evaluator's
//! decision.

use crate::env::{Binding, Environment};
use crate::eval::SymexError;
use crate::primitives;
use crate::symex::{SAtom, SList, Symex};
use tracing::trace;

/// The marker atom that tags an encoded closure.
pub const CLOSURE_TAG: &str = ":closure";

/// The marker atom that tags an encoded primitive.
pub const PRIMITIVE_TAG: &str = ":primitive";

/// Any kind of function value, decoded from its symex form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Function {
    Closure(Closure),
    Primitive(Primitive),
}

impl Function {
    /// Decodes a function value by dispatching on its leading marker atom.
    /// Atoms, unrecognized markers, and markerless lists are not functions.
    pub fn from_symex(symex: &Symex) -> Result<Function, SymexError> {
        let list = symex
            .as_list()
            .map_err(|_| SymexError::NotAFunction(symex.to_string()))?;
        match list.head() {
            Some(Symex::Atom(tag)) if tag.text() == CLOSURE_TAG => {
                Ok(Function::Closure(Closure::from_symex(symex)?))
            }
            Some(Symex::Atom(tag)) if tag.text() == PRIMITIVE_TAG => {
                Ok(Function::Primitive(Primitive::from_symex(symex)?))
            }
            _ => Err(SymexError::NotAFunction(symex.to_string())),
        }
    }
}

/// A function written in the language itself: parameters, a body, a captured
/// environment, and an optional self-name for recursive reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Closure {
    pub name: Option<SAtom>,
    pub params: Vec<SAtom>,
    pub body: Symex,
    pub env: Environment,
}

impl Closure {
    /// Builds a closure from the raw pieces of a `Lambda` or `Function` form.
    /// The parameter list must be a list of atoms.
    pub fn from_defining_parts(
        name: Option<SAtom>,
        params: &Symex,
        body: Symex,
        env: Environment,
    ) -> Result<Closure, SymexError> {
        let param_list = params.as_list()?;
        let params = param_list
            .iter()
            .map(|param| param.as_atom().cloned())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Closure {
            name,
            params,
            body,
            env,
        })
    }

    /// Encodes as `(:closure (name?) (params...) body env)`. The self-name
    /// slot is a list so that "no name" is representable.
    pub fn to_symex(&self) -> Symex {
        let name_list = Symex::list(self.name.iter().cloned().map(Symex::Atom));
        Symex::list([
            Symex::atom(CLOSURE_TAG),
            name_list,
            Symex::list(self.params.iter().cloned().map(Symex::Atom)),
            self.body.clone(),
            self.env.to_symex(),
        ])
    }

    pub fn from_symex(symex: &Symex) -> Result<Closure, SymexError> {
        let malformed = || SymexError::NotAFunction(symex.to_string());
        let list = symex.as_list().map_err(|_| malformed())?;
        if list.len() != 5 {
            return Err(malformed());
        }
        let mut parts = list.iter();
        let tag = parts.next().ok_or_else(malformed)?;
        if *tag != Symex::atom(CLOSURE_TAG) {
            return Err(malformed());
        }

        let name_list = parts.next().ok_or_else(malformed)?.as_list()?;
        let name = match name_list.len() {
            0 => None,
            1 => Some(name_list.head().ok_or_else(malformed)?.as_atom()?.clone()),
            _ => return Err(malformed()),
        };

        let params = parts
            .next()
            .ok_or_else(malformed)?
            .as_list()?
            .iter()
            .map(|param| param.as_atom().cloned())
            .collect::<Result<Vec<_>, _>>()?;
        let body = parts.next().ok_or_else(malformed)?.clone();
        let env = Environment::from_symex(parts.next().ok_or_else(malformed)?)?;

        Ok(Closure {
            name,
            params,
            body,
            env,
        })
    }

    /// Builds the environment the body must be evaluated in: the captured
    /// environment extended with param-to-argument bindings, preceded by a
    /// self-name binding when the closure is named. Does not evaluate.
    pub fn build_env(&self, args: &[Symex]) -> Result<Environment, SymexError> {
        if args.len() != self.params.len() {
            return Err(SymexError::ArityMismatch {
                expected: self.params.len(),
                got: args.len(),
            });
        }

        let mut bindings: Vec<Binding> = self
            .params
            .iter()
            .zip(args)
            .map(|(param, arg)| Binding::new(param.clone(), arg.clone()))
            .collect();

        // The self-name binds to the closure's own encoding, so recursive
        // bodies resolve it without any cyclic storage.
        if let Some(name) = &self.name {
            bindings.insert(0, Binding::new(name.clone(), self.to_symex()));
        }

        trace!(params = self.params.len(), named = self.name.is_some(), "Built call environment");
        Ok(self.env.extend_with(bindings))
    }
}

/// A native function exposed to the language, identified by name in the
/// process-wide primitive table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Primitive {
    pub name: SAtom,
}

impl Primitive {
    pub fn new(name: impl AsRef<str>) -> Primitive {
        Primitive {
            name: SAtom::new(name),
        }
    }

    /// Encodes as `(:primitive name)`.
    pub fn to_symex(&self) -> Symex {
        Symex::list([Symex::atom(PRIMITIVE_TAG), Symex::Atom(self.name.clone())])
    }

    pub fn from_symex(symex: &Symex) -> Result<Primitive, SymexError> {
        let malformed = || SymexError::NotAFunction(symex.to_string());
        let list: &SList = symex.as_list().map_err(|_| malformed())?;
        if list.len() != 2 {
            return Err(malformed());
        }
        let mut parts = list.iter();
        let tag = parts.next().ok_or_else(malformed)?;
        if *tag != Symex::atom(PRIMITIVE_TAG) {
            return Err(malformed());
        }
        let name = parts.next().ok_or_else(malformed)?.as_atom()?.clone();
        Ok(Primitive { name })
    }

    /// Invokes the registered native function on already-evaluated arguments.
    pub fn apply(&self, args: &[Symex]) -> Result<Symex, SymexError> {
        let func = primitives::native_function(self.name.text())
            .ok_or_else(|| SymexError::UnknownPrimitive(self.name.text().to_string()))?;
        trace!(primitive = %self.name, argc = args.len(), "Applying primitive");
        func(args)
    }
}
