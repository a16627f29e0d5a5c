use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;

use crate::core::Atom;
use crate::core::InternalPid;

/// Destination addressing a process or a registered name.
///
/// Names are resolved when the message is sent; sending to a name that is
/// not registered drops the message.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Dest {
  /// Destination identifying a process.
  Pid(InternalPid),
  /// Destination identifying a registered name.
  Name(Atom),
}

impl Dest {
  /// Returns `true` if this destination identifies a process.
  #[inline]
  pub const fn is_pid(&self) -> bool {
    matches!(self, Self::Pid(_))
  }

  /// Returns `true` if this destination identifies a registered name.
  #[inline]
  pub const fn is_name(&self) -> bool {
    matches!(self, Self::Name(_))
  }
}

impl Debug for Dest {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    match self {
      Self::Pid(inner) => Debug::fmt(inner, f),
      Self::Name(inner) => Debug::fmt(inner, f),
    }
  }
}

impl Display for Dest {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    match self {
      Self::Pid(inner) => Display::fmt(inner, f),
      Self::Name(inner) => Display::fmt(inner, f),
    }
  }
}

impl From<InternalPid> for Dest {
  #[inline]
  fn from(other: InternalPid) -> Self {
    Self::Pid(other)
  }
}

impl From<Atom> for Dest {
  #[inline]
  fn from(other: Atom) -> Self {
    Self::Name(other)
  }
}

impl From<&str> for Dest {
  #[inline]
  fn from(other: &str) -> Self {
    Self::Name(Atom::new(other))
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
