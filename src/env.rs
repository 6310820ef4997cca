//! Environments: persistent name-to-value chains.
//!
//! An environment is an ordered sequence of bindings. Lookup scans from the
//! front and the first match wins, so duplicate names are allowed and simply
//! shadow older bindings. Extending an environment shares the old chain
//! rather than copying it, which is what makes captured closure environments
//! cheap.

use crate::eval::SymexError;
use crate::symex::{SAtom, SList, Symex};
use std::sync::Arc;
use tracing::trace;

/// A variable name and its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: SAtom,
    pub value: Symex,
}

impl Binding {
    pub fn new(name: SAtom, value: Symex) -> Binding {
        Binding { name, value }
    }

    /// Encodes the binding as a two-element `(name value)` list.
    pub fn to_symex(&self) -> Symex {
        Symex::list([Symex::Atom(self.name.clone()), self.value.clone()])
    }

    pub fn from_symex(symex: &Symex) -> Result<Binding, SymexError> {
        let pair = symex.as_list()?;
        let malformed = || SymexError::TypeMismatch {
            expected: "a (name value) pair".to_string(),
            found: symex.to_string(),
        };
        if pair.len() != 2 {
            return Err(malformed());
        }
        let name = pair.head().ok_or_else(malformed)?.as_atom()?.clone();
        let value = pair.iter().nth(1).ok_or_else(malformed)?.clone();
        Ok(Binding { name, value })
    }
}

/// A persistent chain of bindings.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    head: Option<Arc<Node>>,
}

#[derive(Debug)]
struct Node {
    binding: Binding,
    next: Option<Arc<Node>>,
}

impl Environment {
    pub fn empty() -> Environment {
        Environment { head: None }
    }

    /// Looks `name` up, front to back. The earliest binding in the chain wins.
    pub fn lookup(&self, name: &SAtom) -> Result<Symex, SymexError> {
        let mut current = self.head.as_deref();
        while let Some(node) = current {
            if node.binding.name == *name {
                // Values can be arbitrarily large lists; log only the name.
                trace!(name = %name, "Resolved name");
                return Ok(node.binding.value.clone());
            }
            current = node.next.as_deref();
        }
        Err(SymexError::UnboundName(name.text().to_string()))
    }

    pub fn contains(&self, name: &SAtom) -> bool {
        self.iter().any(|binding| binding.name == *name)
    }

    /// Returns a new environment with `new_bindings` in front of this chain,
    /// in order: the first new binding becomes the front of the result. The
    /// receiver is never mutated; the old chain is shared.
    pub fn extend_with(&self, new_bindings: Vec<Binding>) -> Environment {
        let mut head = self.head.clone();
        for binding in new_bindings.into_iter().rev() {
            head = Some(Arc::new(Node { binding, next: head }));
        }
        Environment { head }
    }

    pub fn iter(&self) -> BindingIter<'_> {
        BindingIter {
            next: self.head.as_deref(),
        }
    }

    /// Encodes the environment as a list of `(name value)` pairs, front to
    /// back. Environments are first-class data: closures capture them in
    /// symex form.
    pub fn to_symex(&self) -> Symex {
        Symex::list(self.iter().map(Binding::to_symex))
    }

    pub fn from_symex(symex: &Symex) -> Result<Environment, SymexError> {
        let pairs: &SList = symex.as_list()?;
        let bindings = pairs
            .iter()
            .map(Binding::from_symex)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Environment::empty().extend_with(bindings))
    }
}

// Same iterative teardown as `SList`: the derived drop glue would recurse
// once per node, and call environments can chain arbitrarily deep.
impl Drop for Environment {
    fn drop(&mut self) {
        let mut next = self.head.take();
        while let Some(node) = next {
            match Arc::try_unwrap(node) {
                Ok(mut node) => next = node.next.take(),
                Err(_) => break,
            }
        }
    }
}

impl PartialEq for Environment {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for Environment {}

pub struct BindingIter<'a> {
    next: Option<&'a Node>,
}

impl<'a> Iterator for BindingIter<'a> {
    type Item = &'a Binding;

    fn next(&mut self) -> Option<&'a Binding> {
        let node = self.next?;
        self.next = node.next.as_deref();
        Some(&node.binding)
    }
}
