//! The fundamental symbolic-expression type.
//!
//! A [`Symex`] is either an atom (an immutable text token) or a list (a
//! persistent cons chain of further symexes). Everything the language touches
//! is one of these two things: closures, primitives, and environments are all
//! encoded as tagged lists so that they can flow through programs as ordinary
//! data.

use crate::eval::SymexError;
use std::fmt;
use std::sync::Arc;

/// The reserved prefix that marks a self-evaluating data atom.
pub const DATA_PREFIX: char = ':';

/// The text of the single falsy atom.
pub const FALSE_TEXT: &str = ":false";

/// The text of the canonical truthy atom.
pub const TRUE_TEXT: &str = ":true";

/// A symbolic expression: exactly an atom or a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symex {
    Atom(SAtom),
    List(SList),
}

impl Symex {
    /// Constructs an atom from its text.
    pub fn atom(text: impl AsRef<str>) -> Symex {
        Symex::Atom(SAtom::new(text))
    }

    /// Constructs a list from an ordered sequence of symexes.
    pub fn list(items: impl IntoIterator<Item = Symex>) -> Symex {
        Symex::List(items.into_iter().collect())
    }

    /// The canonical truthy atom, `:true`.
    pub fn truthy() -> Symex {
        Symex::atom(TRUE_TEXT)
    }

    /// The single falsy atom, `:false`.
    pub fn falsy() -> Symex {
        Symex::atom(FALSE_TEXT)
    }

    /// Encodes a boolean as `:true` or `:false`.
    pub fn from_bool(value: bool) -> Symex {
        if value { Symex::truthy() } else { Symex::falsy() }
    }

    pub fn is_atom(&self) -> bool {
        matches!(self, Symex::Atom(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Symex::List(_))
    }

    /// Projects to the atom view, or fails with `TypeMismatch`.
    pub fn as_atom(&self) -> Result<&SAtom, SymexError> {
        match self {
            Symex::Atom(atom) => Ok(atom),
            Symex::List(_) => Err(SymexError::TypeMismatch {
                expected: "an atom".to_string(),
                found: self.to_string(),
            }),
        }
    }

    /// Projects to the list view, or fails with `TypeMismatch`.
    pub fn as_list(&self) -> Result<&SList, SymexError> {
        match self {
            Symex::List(list) => Ok(list),
            Symex::Atom(_) => Err(SymexError::TypeMismatch {
                expected: "a list".to_string(),
                found: self.to_string(),
            }),
        }
    }

    /// True iff this is an atom whose text starts with the reserved prefix.
    /// Data atoms are self-evaluating literals.
    pub fn is_data_atom(&self) -> bool {
        match self {
            Symex::Atom(atom) => atom.is_data_atom(),
            Symex::List(_) => false,
        }
    }

    /// Every symex is truthy except the atom `:false`. In particular the
    /// empty list is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Symex::Atom(atom) => atom.text() != FALSE_TEXT,
            Symex::List(_) => true,
        }
    }
}

impl From<SAtom> for Symex {
    fn from(atom: SAtom) -> Symex {
        Symex::Atom(atom)
    }
}

impl From<SList> for Symex {
    fn from(list: SList) -> Symex {
        Symex::List(list)
    }
}

impl fmt::Display for Symex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symex::Atom(atom) => write!(f, "{atom}"),
            Symex::List(list) => write!(f, "{list}"),
        }
    }
}

/// An atom: an immutable text token. Equality is text equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SAtom(Arc<str>);

impl SAtom {
    pub fn new(text: impl AsRef<str>) -> SAtom {
        SAtom(Arc::from(text.as_ref()))
    }

    pub fn text(&self) -> &str {
        &self.0
    }

    pub fn is_data_atom(&self) -> bool {
        self.0.starts_with(DATA_PREFIX)
    }
}

impl fmt::Display for SAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A list: a persistent cons chain with a cached length.
///
/// `cons`, `head`, `tail`, and `len` are all O(1); tails are shared between
/// lists rather than copied.
#[derive(Debug, Clone)]
pub struct SList(Option<Arc<ConsCell>>);

#[derive(Debug)]
struct ConsCell {
    head: Symex,
    tail: SList,
    len: usize,
}

impl SList {
    pub fn empty() -> SList {
        SList(None)
    }

    /// Returns a new list with `head` prepended to `tail`.
    pub fn cons(head: Symex, tail: SList) -> SList {
        let len = tail.len() + 1;
        SList(Some(Arc::new(ConsCell { head, tail, len })))
    }

    pub fn len(&self) -> usize {
        self.0.as_ref().map_or(0, |cell| cell.len)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// The first element, if any.
    pub fn head(&self) -> Option<&Symex> {
        self.0.as_ref().map(|cell| &cell.head)
    }

    /// The list minus its first element, if any. O(1): the tail is shared.
    pub fn tail(&self) -> Option<SList> {
        self.0.as_ref().map(|cell| cell.tail.clone())
    }

    /// Splits into head and tail in one step.
    pub fn split_first(&self) -> Option<(&Symex, SList)> {
        self.0.as_ref().map(|cell| (&cell.head, cell.tail.clone()))
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            next: self.0.as_deref(),
        }
    }
}

// The derived drop glue would recurse once per cell, so releasing a long
// list could exhaust the host stack. Walk the spine iteratively instead,
// detaching each uniquely-owned cell; a shared tail stays alive and is
// dropped later by its remaining owners.
impl Drop for SList {
    fn drop(&mut self) {
        let mut next = self.0.take();
        while let Some(cell) = next {
            match Arc::try_unwrap(cell) {
                Ok(mut cell) => next = cell.tail.0.take(),
                Err(_) => break,
            }
        }
    }
}

impl PartialEq for SList {
    fn eq(&self, other: &Self) -> bool {
        // Lengths are cached, so unequal lengths short-circuit the walk.
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for SList {}

impl FromIterator<Symex> for SList {
    fn from_iter<I: IntoIterator<Item = Symex>>(iter: I) -> SList {
        let items: Vec<Symex> = iter.into_iter().collect();
        let mut result = SList::empty();
        for item in items.into_iter().rev() {
            result = SList::cons(item, result);
        }
        result
    }
}

impl<'a> IntoIterator for &'a SList {
    type Item = &'a Symex;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

pub struct Iter<'a> {
    next: Option<&'a ConsCell>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Symex;

    fn next(&mut self) -> Option<&'a Symex> {
        let cell = self.next?;
        self.next = cell.tail.0.as_deref();
        Some(&cell.head)
    }
}

impl fmt::Display for SList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (index, item) in self.iter().enumerate() {
            if index > 0 {
                write!(f, " ")?;
            }
            write!(f, "{item}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::init_test_logging;

    fn items(list: &SList) -> Vec<Symex> {
        list.iter().cloned().collect()
    }

    #[test]
    fn atom_equality_is_text_equality() {
        init_test_logging();
        assert_eq!(Symex::atom("test"), Symex::atom("test"));
        assert_ne!(Symex::atom("test"), Symex::atom("other"));
    }

    #[test]
    fn list_equality_is_structural() {
        init_test_logging();
        let a = Symex::list([Symex::atom("one"), Symex::atom("two")]);
        let b = Symex::list([Symex::atom("one"), Symex::atom("two")]);
        assert_eq!(a, b);
    }

    #[test]
    fn lists_of_different_length_are_never_equal() {
        init_test_logging();
        let short = Symex::list([Symex::atom("one")]);
        let long = Symex::list([Symex::atom("one"), Symex::atom("two")]);
        assert_ne!(short, long);
    }

    #[test]
    fn list_is_never_equal_to_atom() {
        init_test_logging();
        assert_ne!(Symex::list([Symex::atom("x")]), Symex::atom("x"));
        assert_ne!(Symex::list([]), Symex::atom("()"));
    }

    #[test]
    fn shared_tails_compare_equal_to_rebuilt_lists() {
        init_test_logging();
        let tail: SList = [Symex::atom("b"), Symex::atom("c")].into_iter().collect();
        let via_cons = SList::cons(Symex::atom("a"), tail);
        let rebuilt: SList = [Symex::atom("a"), Symex::atom("b"), Symex::atom("c")]
            .into_iter()
            .collect();
        assert_eq!(via_cons, rebuilt);
    }

    #[test]
    fn data_atom_detection() {
        init_test_logging();
        assert!(Symex::atom(":blue").is_data_atom());
        assert!(!Symex::atom("blue").is_data_atom());
        assert!(!Symex::list([Symex::atom(":blue")]).is_data_atom());
    }

    #[test]
    fn only_the_false_atom_is_falsy() {
        init_test_logging();
        assert!(!Symex::atom(":false").is_truthy());
        assert!(Symex::atom(":true").is_truthy());
        assert!(Symex::atom("false").is_truthy());
        assert!(Symex::atom(":anything").is_truthy());
    }

    #[test]
    fn empty_list_is_truthy() {
        init_test_logging();
        assert!(Symex::list([]).is_truthy());
    }

    #[test]
    fn cons_head_tail_and_cached_length() {
        init_test_logging();
        let list: SList = [Symex::atom("a"), Symex::atom("b"), Symex::atom("c")]
            .into_iter()
            .collect();
        assert_eq!(list.len(), 3);
        assert_eq!(list.head(), Some(&Symex::atom("a")));

        let tail = list.tail().unwrap();
        assert_eq!(tail.len(), 2);
        assert_eq!(items(&tail), vec![Symex::atom("b"), Symex::atom("c")]);

        let extended = SList::cons(Symex::atom("z"), list);
        assert_eq!(extended.len(), 4);
        assert_eq!(extended.head(), Some(&Symex::atom("z")));
    }

    #[test]
    fn empty_list_has_no_head_or_tail() {
        init_test_logging();
        let empty = SList::empty();
        assert!(empty.is_empty());
        assert_eq!(empty.len(), 0);
        assert_eq!(empty.head(), None);
        assert!(empty.tail().is_none());
    }

    #[test]
    fn dropping_a_long_list_does_not_overflow_the_stack() {
        init_test_logging();
        let list: SList = (0..100_000).map(|_| Symex::atom(":item")).collect();
        assert_eq!(list.len(), 100_000);
        drop(list);
    }

    #[test]
    fn dropping_a_list_leaves_its_shared_tail_intact() {
        init_test_logging();
        let tail: SList = [Symex::atom("b"), Symex::atom("c")].into_iter().collect();
        let longer = SList::cons(Symex::atom("a"), tail.clone());
        drop(longer);
        assert_eq!(items(&tail), vec![Symex::atom("b"), Symex::atom("c")]);
    }

    #[test]
    fn projection_type_mismatches() {
        init_test_logging();
        let atom = Symex::atom("x");
        let list = Symex::list([]);
        assert!(atom.as_atom().is_ok());
        assert!(matches!(
            atom.as_list(),
            Err(SymexError::TypeMismatch { .. })
        ));
        assert!(list.as_list().is_ok());
        assert!(matches!(
            list.as_atom(),
            Err(SymexError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn display_renders_atoms_and_nested_lists() {
        init_test_logging();
        assert_eq!(Symex::atom(":hello").to_string(), ":hello");
        assert_eq!(Symex::list([]).to_string(), "()");
        let nested = Symex::list([
            Symex::atom("a"),
            Symex::list([Symex::atom("b"), Symex::atom("c")]),
        ]);
        assert_eq!(nested.to_string(), "(a (b c))");
    }
}
