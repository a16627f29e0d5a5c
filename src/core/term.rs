//! Type-erased runtime value container used for inter-process communication.
//!
//! # Examples
//!
//! ```
//! use spindle::core::Term;
//!
//! let num = Term::new(42_i32);
//!
//! assert_eq!(num.downcast_ref::<i32>(), Some(&42));
//! assert_eq!(num.downcast_ref::<String>(), None);
//! ```

use dyn_clone::clone_box;
use std::any::Any;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

use crate::core::Item;

/// Dynamically typed value that can be sent between processes.
///
/// Cloning a [`Term`] deep-clones the contained value, so each receiver owns
/// its own copy after message passing. The concrete type is recovered with
/// [`is()`], [`downcast_ref()`], [`downcast_mut()`] or [`downcast()`].
///
/// [`is()`]: Self::is
/// [`downcast_ref()`]: Self::downcast_ref
/// [`downcast_mut()`]: Self::downcast_mut
/// [`downcast()`]: Self::downcast
#[repr(transparent)]
pub struct Term {
  data: Box<dyn Item>,
}

impl Term {
  /// Creates a new term wrapping the given value.
  #[inline]
  pub fn new<T>(data: T) -> Self
  where
    T: Item,
  {
    Self {
      data: Box::new(data),
    }
  }

  /// Returns `true` if the contained value is of type `T`.
  #[inline]
  pub fn is<T>(&self) -> bool
  where
    T: 'static,
  {
    self.data.as_any().is::<T>()
  }

  /// Returns a shared reference to the contained value of type `T`.
  #[inline]
  pub fn downcast_ref<T>(&self) -> Option<&T>
  where
    T: 'static,
  {
    self.data.as_any().downcast_ref()
  }

  /// Returns a mutable reference to the contained value of type `T`.
  ///
  /// # Examples
  ///
  /// ```
  /// use spindle::core::Term;
  ///
  /// let mut term = Term::new(vec![1, 2, 3]);
  ///
  /// if let Some(vec) = term.downcast_mut::<Vec<i32>>() {
  ///   vec.push(4);
  /// }
  ///
  /// assert_eq!(term.downcast_ref::<Vec<i32>>(), Some(&vec![1, 2, 3, 4]));
  /// ```
  #[inline]
  pub fn downcast_mut<T>(&mut self) -> Option<&mut T>
  where
    T: 'static,
  {
    self.data.as_mut_any().downcast_mut()
  }

  /// Extracts the contained value as `Box<T>`.
  ///
  /// # Errors
  ///
  /// Returns the original term if the value has a different type.
  #[inline]
  pub fn downcast<T>(self) -> Result<Box<T>, Self>
  where
    T: 'static,
  {
    if self.is::<T>() {
      match self.data.into_any().downcast::<T>() {
        Ok(data) => Ok(data),
        Err(_) => unreachable!(),
      }
    } else {
      Err(self)
    }
  }

  /// Creates a term from a caught panic payload.
  ///
  /// String payloads are kept as `String`; anything else is described.
  #[inline]
  pub(crate) fn new_error(error: Box<dyn Any + Send>) -> Self {
    match error.downcast::<&'static str>() {
      Ok(error) => Self::new(String::from(*error)),
      Err(error) => match error.downcast::<String>() {
        Ok(error) => Self::new(*error),
        Err(error) => Self::new(format!("unknown error ({error:?})")),
      },
    }
  }
}

impl Clone for Term {
  #[inline]
  fn clone(&self) -> Self {
    Self {
      data: clone_box(&*self.data),
    }
  }
}

impl PartialEq for Term {
  #[inline]
  fn eq(&self, other: &Self) -> bool {
    *self.data == *other.data
  }
}

impl Debug for Term {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    Debug::fmt(&*self.data, f)
  }
}

impl Display for Term {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    Debug::fmt(&*self.data, f)
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
