use parking_lot::Mutex;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result;
use triomphe::Arc;

/// Shared, take-once cell for moving a value through a [`Term`].
///
/// Terms must be [`Clone`] and [`PartialEq`]; a parcel satisfies both by
/// sharing one slot between clones and comparing by identity, which lets
/// closures and task results travel inside messages. Whoever calls
/// [`take()`] first gets the value.
///
/// [`Term`]: crate::core::Term
/// [`take()`]: Self::take
pub struct Parcel<T> {
  slot: Arc<Mutex<Option<T>>>,
}

impl<T> Parcel<T> {
  /// Creates a parcel holding `value`.
  #[inline]
  pub fn new(value: T) -> Self {
    Self {
      slot: Arc::new(Mutex::new(Some(value))),
    }
  }

  /// Creates an empty parcel.
  #[inline]
  pub fn empty() -> Self {
    Self {
      slot: Arc::new(Mutex::new(None)),
    }
  }

  /// Stores `value`, replacing any previous contents.
  #[inline]
  pub fn put(&self, value: T) {
    *self.slot.lock() = Some(value);
  }

  /// Removes and returns the stored value.
  #[inline]
  pub fn take(&self) -> Option<T> {
    self.slot.lock().take()
  }

  /// Returns `true` if a value is stored.
  #[inline]
  pub fn is_full(&self) -> bool {
    self.slot.lock().is_some()
  }
}

impl<T> Clone for Parcel<T> {
  #[inline]
  fn clone(&self) -> Self {
    Self {
      slot: Arc::clone(&self.slot),
    }
  }
}

impl<T> PartialEq for Parcel<T> {
  #[inline]
  fn eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.slot, &other.slot)
  }
}

impl<T> Debug for Parcel<T> {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    f.write_str("Parcel(..)")
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
