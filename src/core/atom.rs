use std::cmp::Ordering;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::ops::Deref;
use std::sync::LazyLock;

use crate::core::AtomTable;
use crate::error::fatal;
use crate::raise;

/// Atoms with a fixed slot, in slot order.
const WELL_KNOWN: [(&str, Atom); 7] = [
  ("", Atom::EMPTY),
  ("kill", Atom::KILL),
  ("killed", Atom::KILLED),
  ("normal", Atom::NORMAL),
  ("noproc", Atom::NOPROC),
  ("shutdown", Atom::SHUTDOWN),
  ("undefined", Atom::UNDEFINED),
];

static ATOM_TABLE: LazyLock<AtomTable> = LazyLock::new(|| {
  let table: AtomTable = AtomTable::new();

  for (name, atom) in WELL_KNOWN {
    match table.insert(name) {
      Ok(slot) if slot == atom.slot => {}
      Ok(slot) => fatal!(format!("atom {name:?} seeded at slot {slot}")),
      Err(error) => fatal!(error),
    }
  }

  table
});

// -----------------------------------------------------------------------------
// Atom
// -----------------------------------------------------------------------------

/// An interned string.
///
/// Atoms are copied by value and compared by slot. Interned strings live for
/// the rest of the program, so atoms are meant for a bounded set of names
/// such as registered process names and exit reasons.
///
/// ```
/// use spindle::core::Atom;
///
/// let name: Atom = Atom::new("logger");
///
/// assert_eq!(name, Atom::from("logger"));
/// assert_eq!(name, "logger");
/// ```
#[derive(Clone, Copy, Hash, PartialEq, Eq)]
#[repr(transparent)]
pub struct Atom {
  slot: u32,
}

impl Atom {
  pub const EMPTY: Self = Self::from_slot(0);
  pub const KILL: Self = Self::from_slot(1);
  pub const KILLED: Self = Self::from_slot(2);
  pub const NORMAL: Self = Self::from_slot(3);
  pub const NOPROC: Self = Self::from_slot(4);
  pub const SHUTDOWN: Self = Self::from_slot(5);
  pub const UNDEFINED: Self = Self::from_slot(6);

  #[inline]
  pub(crate) const fn from_slot(slot: u32) -> Self {
    Self { slot }
  }

  #[inline]
  pub(crate) const fn into_slot(self) -> u32 {
    self.slot
  }

  /// Returns the atom for `data`, interning it on first use.
  ///
  /// # Panics
  ///
  /// Raises a `SysCap` exception if `data` is longer than
  /// [`MAX_ATOM_BYTES`] or the table holds [`MAX_ATOM_COUNT`] atoms.
  ///
  /// [`MAX_ATOM_BYTES`]: crate::consts::MAX_ATOM_BYTES
  /// [`MAX_ATOM_COUNT`]: crate::consts::MAX_ATOM_COUNT
  #[inline]
  pub fn new(data: &str) -> Self {
    ATOM_TABLE
      .insert(data)
      .map(Self::from_slot)
      .unwrap_or_else(|error| raise!(Error, SysCap, error))
  }

  #[inline]
  pub fn as_str(&self) -> &'static str {
    ATOM_TABLE.lookup(self.slot).unwrap_or_else(|error| fatal!(error))
  }
}

impl Debug for Atom {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.write_str(self.as_str())
  }
}

impl Display for Atom {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.write_str(self.as_str())
  }
}

impl Default for Atom {
  #[inline]
  fn default() -> Self {
    Self::EMPTY
  }
}

/// Atoms order alphabetically, not by slot.
impl Ord for Atom {
  #[inline]
  fn cmp(&self, other: &Self) -> Ordering {
    if self.slot == other.slot {
      Ordering::Equal
    } else {
      self.as_str().cmp(other.as_str())
    }
  }
}

impl PartialOrd for Atom {
  #[inline]
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Deref for Atom {
  type Target = str;

  #[inline]
  fn deref(&self) -> &Self::Target {
    self.as_str()
  }
}

impl From<&str> for Atom {
  #[inline]
  fn from(other: &str) -> Self {
    Self::new(other)
  }
}

impl From<String> for Atom {
  #[inline]
  fn from(other: String) -> Self {
    Self::new(&other)
  }
}

impl From<Atom> for &'static str {
  #[inline]
  fn from(other: Atom) -> Self {
    other.as_str()
  }
}

impl From<Atom> for String {
  #[inline]
  fn from(other: Atom) -> Self {
    other.as_str().to_owned()
  }
}

impl PartialEq<str> for Atom {
  #[inline]
  fn eq(&self, other: &str) -> bool {
    self.as_str() == other
  }
}

impl PartialEq<&str> for Atom {
  #[inline]
  fn eq(&self, other: &&str) -> bool {
    self.as_str() == *other
  }
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeSet;

  use crate::core::Atom;
  use crate::core::atom::WELL_KNOWN;

  #[test]
  fn test_well_known() {
    for (name, atom) in WELL_KNOWN {
      assert_eq!(atom.as_str(), name);
      assert_eq!(Atom::new(name), atom);
    }
  }

  #[test]
  fn test_interned_once() {
    let first: Atom = Atom::new("atom_interned_once");
    let again: Atom = Atom::from(String::from("atom_interned_once"));

    assert_eq!(first.into_slot(), again.into_slot());
    assert_ne!(first, Atom::new("atom_interned_twice"));
  }

  #[test]
  #[should_panic]
  fn test_too_long() {
    Atom::new(&"x".repeat(256));
  }

  #[test]
  fn test_alphabetical_order() {
    let set: BTreeSet<Atom> = ["pear", "apple", "fig", "apple"].into_iter().map(Atom::new).collect();
    let names: Vec<&str> = set.into_iter().map(Into::into).collect();

    assert_eq!(names, ["apple", "fig", "pear"]);
  }

  #[test]
  fn test_format() {
    let atom: Atom = Atom::new("ünïcode");

    assert_eq!(atom.to_string(), "ünïcode");
    assert_eq!(format!("{atom:?}"), "ünïcode");
    assert_eq!(atom.len(), "ünïcode".len());
  }
}
