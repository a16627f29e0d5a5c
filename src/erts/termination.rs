use crate::core::Exit;

/// Conversion of a process future output into an exit reason.
///
/// A process whose future returns `()` exits `normal`. Returning an
/// [`Exit`] or an `Err` exits with that reason.
///
/// ```
/// use spindle::core::Exit;
/// use spindle::erts::Termination;
///
/// assert!(().into_exit().is_normal());
/// assert!(Ok::<(), Exit>(()).into_exit().is_normal());
/// assert!(!Err::<(), Exit>(Exit::from("kaboom")).into_exit().is_normal());
/// ```
pub trait Termination: Send + 'static {
  /// Returns the exit reason of the process.
  fn into_exit(self) -> Exit;
}

impl Termination for () {
  #[inline]
  fn into_exit(self) -> Exit {
    Exit::NORMAL
  }
}

impl Termination for Exit {
  #[inline]
  fn into_exit(self) -> Exit {
    self
  }
}

impl<E> Termination for Result<(), E>
where
  E: Into<Exit> + Send + 'static,
{
  #[inline]
  fn into_exit(self) -> Exit {
    match self {
      Ok(()) => Exit::NORMAL,
      Err(error) => error.into(),
    }
  }
}
