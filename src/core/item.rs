use dyn_clone::DynClone;
use std::any::Any;
use std::fmt::Debug;

/// Bound on values that can be sent as messages.
///
/// Blanket-implemented, so any owned value that can be cloned, compared and
/// shared across threads qualifies.
pub trait Item: Any + Debug + DynClone + Send + Sync + 'static {
  fn as_any(&self) -> &(dyn Any + Send + Sync);

  fn as_mut_any(&mut self) -> &mut (dyn Any + Send + Sync);

  fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync>;

  /// Compares against a value of unknown type; differing types are unequal.
  fn dyn_eq(&self, other: &dyn Any) -> bool;
}

impl PartialEq for dyn Item {
  #[inline]
  fn eq(&self, other: &Self) -> bool {
    self.dyn_eq(other.as_any())
  }
}

impl<T> Item for T
where
  T: Any + Debug + DynClone + PartialEq + Send + Sync + 'static,
{
  #[inline]
  fn as_any(&self) -> &(dyn Any + Send + Sync) {
    self
  }

  #[inline]
  fn as_mut_any(&mut self) -> &mut (dyn Any + Send + Sync) {
    self
  }

  #[inline]
  fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
    self
  }

  #[inline]
  fn dyn_eq(&self, other: &dyn Any) -> bool {
    other
      .downcast_ref::<T>()
      .is_some_and(|other| PartialEq::eq(self, other))
  }
}
