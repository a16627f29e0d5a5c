//! Global atom interning table with permanent storage semantics.
//!
//! Interned strings are leaked and live for the rest of the OS process, so
//! the table enforces [`MAX_ATOM_COUNT`] and [`MAX_ATOM_BYTES`]. Avoid
//! creating atoms from untrusted or unbounded input.

use hashbrown::HashMap;
use parking_lot::RwLock;
use parking_lot::RwLockReadGuard;
use parking_lot::RwLockUpgradableReadGuard;
use parking_lot::RwLockWriteGuard;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use thiserror::Error;

use crate::consts::MAX_ATOM_BYTES;
use crate::consts::MAX_ATOM_COUNT;

// -----------------------------------------------------------------------------
// Atom Table Error
// -----------------------------------------------------------------------------

/// Errors returned from atom table lookup or insertion operations.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum AtomTableError {
  /// The atom exceeds [`MAX_ATOM_BYTES`] UTF-8 bytes.
  #[error("atom too large")]
  AtomTooLarge,
  /// The table already holds [`MAX_ATOM_COUNT`] atoms.
  #[error("too many atoms")]
  TooManyAtoms,
  /// The requested slot has not been allocated.
  #[error("atom not found")]
  AtomNotFound,
}

// -----------------------------------------------------------------------------
// Atom Table
// -----------------------------------------------------------------------------

/// Thread-safe atom interning table.
///
/// Lookups by slot and re-interning of known strings only take a read lock;
/// the lock is upgraded for new atoms.
pub struct AtomTable {
  inner: RwLock<Table>,
}

struct Table {
  map: HashMap<&'static str, u32>,
  vec: Vec<&'static str>,
}

impl AtomTable {
  /// Creates a new empty atom table.
  #[inline]
  pub fn new() -> Self {
    Self {
      inner: RwLock::new(Table {
        map: HashMap::with_capacity(1024),
        vec: Vec::with_capacity(1024),
      }),
    }
  }

  /// Returns the number of interned atoms.
  #[inline]
  pub fn len(&self) -> usize {
    self.inner.read().vec.len()
  }

  /// Returns `true` if no atoms have been interned.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Returns the string stored in `slot`.
  ///
  /// # Errors
  ///
  /// Returns [`AtomTableError::AtomNotFound`] if the slot is unallocated.
  pub fn lookup(&self, slot: u32) -> Result<&'static str, AtomTableError> {
    let guard: RwLockReadGuard<'_, Table> = self.inner.read();

    guard
      .vec
      .get(slot as usize)
      .copied()
      .ok_or(AtomTableError::AtomNotFound)
  }

  /// Interns `data` and returns its slot.
  ///
  /// # Errors
  ///
  /// Returns [`AtomTableError::AtomTooLarge`] if `data` exceeds
  /// [`MAX_ATOM_BYTES`], or [`AtomTableError::TooManyAtoms`] if the table
  /// is full.
  pub fn insert(&self, data: &str) -> Result<u32, AtomTableError> {
    let guard: RwLockUpgradableReadGuard<'_, Table> = self.inner.upgradable_read();

    if let Some(slot) = guard.map.get(data) {
      return Ok(*slot);
    }

    if data.len() > MAX_ATOM_BYTES {
      return Err(AtomTableError::AtomTooLarge);
    }

    if guard.vec.len() >= MAX_ATOM_COUNT {
      return Err(AtomTableError::TooManyAtoms);
    }

    let mut guard: RwLockWriteGuard<'_, Table> = RwLockUpgradableReadGuard::upgrade(guard);

    let slot: u32 = guard.vec.len() as u32;
    let term: &'static str = Box::leak(Box::from(data));

    guard.vec.push(term);
    guard.map.insert(term, slot);

    Ok(slot)
  }
}

impl Default for AtomTable {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}

impl Debug for AtomTable {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    let guard: RwLockReadGuard<'_, Table> = self.inner.read();

    f.debug_struct("AtomTable")
      .field("size", &guard.vec.len())
      .finish_non_exhaustive()
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
