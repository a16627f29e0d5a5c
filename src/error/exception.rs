use std::backtrace::Backtrace;
use std::backtrace::BacktraceStatus;
use std::error::Error;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

use crate::core::Exit;

// -----------------------------------------------------------------------------
// Exception Class
// -----------------------------------------------------------------------------

/// Severity of an [`Exception`].
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExceptionClass {
  /// The raising process cannot continue.
  Error,
}

impl ExceptionClass {
  /// Returns the lowercase name of the class.
  #[inline]
  pub const fn as_str(&self) -> &'static str {
    match self {
      Self::Error => "error",
    }
  }
}

impl Display for ExceptionClass {
  #[inline]
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.write_str(self.as_str())
  }
}

// -----------------------------------------------------------------------------
// Exception Group
// -----------------------------------------------------------------------------

/// What went wrong when an [`Exception`] was raised.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExceptionGroup {
  /// An argument was rejected, such as registering the `undefined` atom.
  BadArg,
  /// A fixed system limit was hit, such as a full atom table.
  SysCap,
  /// The runtime was used in a state that does not allow it, such as calling
  /// the process API from outside a process.
  SysInv,
}

impl ExceptionGroup {
  /// Returns the lowercase name of the group.
  #[inline]
  pub const fn as_str(&self) -> &'static str {
    match self {
      Self::BadArg => "badarg",
      Self::SysCap => "syscap",
      Self::SysInv => "sysinv",
    }
  }

  /// Returns a one-line description of the group.
  #[inline]
  pub const fn describe(&self) -> &'static str {
    match self {
      Self::BadArg => "bad argument",
      Self::SysCap => "system limit reached",
      Self::SysInv => "invalid system state",
    }
  }
}

impl Display for ExceptionGroup {
  #[inline]
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.write_str(self.as_str())
  }
}

// -----------------------------------------------------------------------------
// Exception
// -----------------------------------------------------------------------------

/// A runtime failure raised by unwinding the calling process.
///
/// Built by [`raise!`]. When an exception escapes a process future the
/// process terminates and its exit reason is the formatted exception; the
/// captured backtrace is logged alongside.
///
/// Exceptions format as `{class}:{group} - {message}`:
///
/// ```
/// use spindle::error::Exception;
/// use spindle::error::ExceptionClass;
/// use spindle::error::ExceptionGroup;
///
/// let exception: Exception = Exception::new(ExceptionClass::Error, ExceptionGroup::BadArg, "bad name");
///
/// assert_eq!(exception.to_string(), "error:badarg - bad name");
/// ```
///
/// [`raise!`]: crate::raise
pub struct Exception {
  class: ExceptionClass,
  group: ExceptionGroup,
  message: String,
  backtrace: Backtrace,
}

impl Exception {
  /// Creates an exception, capturing a backtrace at the call site.
  #[inline]
  pub fn new(class: ExceptionClass, group: ExceptionGroup, message: impl Display) -> Self {
    Self {
      class,
      group,
      message: message.to_string(),
      backtrace: Backtrace::capture(),
    }
  }

  #[inline]
  pub const fn class(&self) -> ExceptionClass {
    self.class
  }

  #[inline]
  pub const fn group(&self) -> ExceptionGroup {
    self.group
  }

  #[inline]
  pub fn message(&self) -> &str {
    &self.message
  }

  /// Returns the backtrace captured when the exception was created.
  ///
  /// Empty unless enabled with `RUST_BACKTRACE` or `RUST_LIB_BACKTRACE`.
  #[inline]
  pub const fn backtrace(&self) -> &Backtrace {
    &self.backtrace
  }

  /// Returns `true` if a backtrace was captured.
  #[inline]
  pub fn has_backtrace(&self) -> bool {
    self.backtrace.status() == BacktraceStatus::Captured
  }

  /// Returns the exit reason of a process terminated by this exception.
  #[inline]
  pub fn to_exit(&self) -> Exit {
    Exit::term(self.to_string())
  }
}

impl Debug for Exception {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct("Exception")
      .field("class", &self.class)
      .field("group", &self.group)
      .field("message", &self.message)
      .finish_non_exhaustive()
  }
}

impl Display for Exception {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    write!(f, "{}:{} - {}", self.class, self.group, self.message)
  }
}

impl Error for Exception {}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
