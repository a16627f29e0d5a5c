use thiserror::Error;

use crate::core::Atom;
use crate::core::Exit;

/// Failure of an operation that depends on another process.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum ProcessError {
  /// No reply or message arrived within the allotted time.
  #[error("timed out")]
  Timeout,
  /// The target process does not exist or the name is not registered.
  #[error("no such process")]
  NoSuchProcess,
  /// The target process terminated with an abnormal reason.
  #[error("process exited abnormally: {0}")]
  AbnormalExit(Exit),
  /// The target process was terminated by an exit signal from a link.
  #[error("process exited via link: {0}")]
  LinkPropagatedExit(Exit),
  /// The name is already registered to another process.
  #[error("name already registered: {0}")]
  NameTaken(Atom),
  /// The process or name is not registered.
  #[error("not registered")]
  NotRegistered,
}

impl ProcessError {
  /// Returns the exit reason carried by this error, if any.
  #[inline]
  pub fn reason(&self) -> Option<&Exit> {
    match self {
      Self::AbnormalExit(reason) | Self::LinkPropagatedExit(reason) => Some(reason),
      _ => None,
    }
  }
}

impl From<ProcessError> for Exit {
  /// Uses the carried exit reason, or the error itself as a term.
  #[inline]
  fn from(other: ProcessError) -> Self {
    match other {
      ProcessError::AbnormalExit(reason) | ProcessError::LinkPropagatedExit(reason) => reason,
      ProcessError::NoSuchProcess => Exit::NOPROC,
      error => Exit::term(error),
    }
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use crate::core::Atom;
  use crate::core::Exit;
  use crate::error::ProcessError;

  #[test]
  fn test_display() {
    let name: Atom = Atom::new("counter");

    assert_eq!(ProcessError::Timeout.to_string(), "timed out");
    assert_eq!(ProcessError::NoSuchProcess.to_string(), "no such process");
    assert_eq!(
      ProcessError::AbnormalExit(Exit::KILLED).to_string(),
      "process exited abnormally: killed",
    );
    assert_eq!(
      ProcessError::NameTaken(name).to_string(),
      "name already registered: counter",
    );
  }

  #[test]
  fn test_into_exit() {
    assert_eq!(Exit::from(ProcessError::NoSuchProcess), Exit::NOPROC);
    assert_eq!(Exit::from(ProcessError::AbnormalExit(Exit::KILLED)), Exit::KILLED);
    assert_eq!(
      Exit::from(ProcessError::Timeout),
      Exit::term(ProcessError::Timeout),
    );
  }

  #[test]
  fn test_reason() {
    assert_eq!(ProcessError::Timeout.reason(), None);
    assert_eq!(
      ProcessError::LinkPropagatedExit(Exit::KILLED).reason(),
      Some(&Exit::KILLED),
    );
  }
}
