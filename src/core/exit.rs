use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;

use crate::core::Atom;
use crate::core::Item;
use crate::core::Term;

/// Reason describing why a process stopped executing.
///
/// Exit reasons explain what caused a termination and decide how linked
/// processes react to it: [`Exit::NORMAL`] is ignored by non-trapping links,
/// everything else is abnormal and propagates.
///
/// # Examples
///
/// ```
/// use spindle::core::{Atom, Exit};
///
/// assert!(Exit::NORMAL.is_normal());
/// assert!(!Exit::from(Atom::new("kaboom")).is_normal());
/// assert_eq!(Exit::term("kaboom").to_string(), "\"kaboom\"");
/// ```
#[derive(Clone, PartialEq)]
pub enum Exit {
  /// Exit reason represented by an atom.
  Atom(Atom),
  /// Exit reason represented by an arbitrary runtime value.
  Term(Term),
}

impl Exit {
  /// Normal process termination.
  pub const NORMAL: Self = Self::Atom(Atom::NORMAL);

  /// Untrappable exit signal; the receiver terminates with [`Exit::KILLED`].
  pub const KILL: Self = Self::Atom(Atom::KILL);

  /// Reason of a process terminated by [`Exit::KILL`].
  pub const KILLED: Self = Self::Atom(Atom::KILLED);

  /// The target process did not exist.
  pub const NOPROC: Self = Self::Atom(Atom::NOPROC);

  /// Runtime tear-down.
  pub const SHUTDOWN: Self = Self::Atom(Atom::SHUTDOWN);

  /// Creates an exit reason wrapping an arbitrary value.
  #[inline]
  pub fn term<T>(data: T) -> Self
  where
    T: Item,
  {
    Self::Term(Term::new(data))
  }

  /// Returns `true` if this exit reason represents normal termination.
  #[inline]
  pub fn is_normal(&self) -> bool {
    matches!(self, Self::Atom(atom) if *atom == Atom::NORMAL)
  }

  /// Returns `true` if this is the untrappable `kill` signal.
  #[inline]
  pub fn is_kill(&self) -> bool {
    matches!(self, Self::Atom(atom) if *atom == Atom::KILL)
  }

  /// Returns `true` if this exit reason represents forced termination.
  #[inline]
  pub fn is_killed(&self) -> bool {
    matches!(self, Self::Atom(atom) if *atom == Atom::KILLED)
  }

  /// Returns `true` if this exit reason represents a missing process.
  #[inline]
  pub fn is_noproc(&self) -> bool {
    matches!(self, Self::Atom(atom) if *atom == Atom::NOPROC)
  }

  /// Returns `true` if this exit reason equals the given atom.
  #[inline]
  pub fn is_atom(&self, other: Atom) -> bool {
    matches!(self, Self::Atom(atom) if *atom == other)
  }

  /// Returns the contained value if this is a term reason of type `T`.
  #[inline]
  pub fn downcast_ref<T>(&self) -> Option<&T>
  where
    T: 'static,
  {
    match self {
      Self::Atom(_) => None,
      Self::Term(term) => term.downcast_ref(),
    }
  }
}

impl Debug for Exit {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    match self {
      Self::Atom(inner) => Debug::fmt(inner, f),
      Self::Term(inner) => Debug::fmt(inner, f),
    }
  }
}

impl Display for Exit {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    match self {
      Self::Atom(inner) => Display::fmt(inner, f),
      Self::Term(inner) => Display::fmt(inner, f),
    }
  }
}

impl From<Atom> for Exit {
  #[inline]
  fn from(other: Atom) -> Self {
    Self::Atom(other)
  }
}

impl From<Term> for Exit {
  #[inline]
  fn from(other: Term) -> Self {
    Self::Term(other)
  }
}

impl From<&'static str> for Exit {
  #[inline]
  fn from(other: &'static str) -> Self {
    Self::Atom(Atom::new(other))
  }
}

impl From<String> for Exit {
  #[inline]
  fn from(other: String) -> Self {
    Self::Term(Term::new(other))
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
