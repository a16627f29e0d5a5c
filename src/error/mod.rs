//! Failure handling for the Spindle runtime.
//!
//! Operations that talk to other processes report expected failures as
//! [`ProcessError`] values: timeouts, dead targets and abnormal exits.
//!
//! Misuse of the runtime is not recoverable by the caller. It is raised as an
//! [`Exception`] with [`raise!`], which unwinds the calling process; the
//! runtime catches the unwind at the process boundary and turns it into an
//! abnormal exit that links and monitors observe like any other.
//!
//! [`raise!`]: crate::raise!

mod exception;
mod process_error;

pub use self::exception::Exception;
pub use self::exception::ExceptionClass;
pub use self::exception::ExceptionGroup;
pub use self::process_error::ProcessError;

/// Unwinds the calling process with an [`Exception`].
///
/// The first two arguments name an [`ExceptionClass`] and an
/// [`ExceptionGroup`] variant, the third is anything that implements
/// [`Display`].
///
/// ```should_panic
/// use spindle::raise;
///
/// fn checked_len(items: &[u8]) -> usize {
///   if items.is_empty() {
///     raise!(Error, BadArg, "empty input");
///   }
///
///   items.len()
/// }
///
/// checked_len(&[]);
/// ```
///
/// [`Display`]: std::fmt::Display
#[macro_export]
macro_rules! raise {
  ($class:ident, $group:ident, $message:expr $(,)?) => {
    ::std::panic::panic_any($crate::error::Exception::new(
      $crate::error::ExceptionClass::$class,
      $crate::error::ExceptionGroup::$group,
      $message,
    ))
  };
}

/// Prints a broken-invariant report and aborts without unwinding.
macro_rules! fatal {
  ($message:expr) => {{
    ::std::eprintln!(
      "{}:{}: fatal: {}: {}",
      ::std::file!(),
      ::std::line!(),
      $crate::error::ExceptionGroup::SysInv.describe(),
      $message,
    );

    ::std::process::abort();
  }};
}

pub(crate) use fatal;

#[cfg(test)]
mod tests {
  use std::any::Any;
  use std::panic;

  use crate::error::Exception;
  use crate::error::ExceptionClass;
  use crate::error::ExceptionGroup;

  fn raised(f: impl FnOnce() + panic::UnwindSafe) -> Box<Exception> {
    let payload: Box<dyn Any + Send> = panic::catch_unwind(f).unwrap_err();

    payload.downcast::<Exception>().unwrap()
  }

  #[test]
  fn test_raise_payload() {
    let exception: Box<Exception> = raised(|| raise!(Error, SysInv, "invalid state"));

    assert_eq!(exception.class(), ExceptionClass::Error);
    assert_eq!(exception.group(), ExceptionGroup::SysInv);
    assert_eq!(exception.message(), "invalid state");
  }

  #[test]
  fn test_raise_formatted() {
    let limit: usize = 8;
    let exception: Box<Exception> = raised(|| raise!(Error, SysCap, format!("limit {limit} reached")));

    assert_eq!(exception.to_string(), "error:syscap - limit 8 reached");
  }
}
