use bitflags::bitflags;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

use crate::core::Atom;
use crate::core::InternalPid;
use crate::core::MonitorRef;

// -----------------------------------------------------------------------------
// Process Flags
// -----------------------------------------------------------------------------

bitflags! {
  /// Per-process behavior flags.
  #[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
  pub struct ProcessFlags: u32 {
    /// Exit signals are converted to [`ExitMessage`]s instead of
    /// terminating the process. `kill` cannot be trapped.
    ///
    /// [`ExitMessage`]: crate::erts::ExitMessage
    const TRAP_EXIT = 1 << 1;
  }
}

// -----------------------------------------------------------------------------
// Process Status
// -----------------------------------------------------------------------------

/// Scheduling status of a process.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum ProcessStatus {
  /// Ready to run, or running.
  Runnable,
  /// Parked in a receive, waiting for a matching message.
  Waiting,
  /// Stopped; the process is being or has been removed.
  Terminated,
}

impl ProcessStatus {
  #[inline]
  pub const fn is_terminated(&self) -> bool {
    matches!(self, Self::Terminated)
  }
}

impl Display for ProcessStatus {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    match self {
      Self::Runnable => f.write_str("runnable"),
      Self::Waiting => f.write_str("waiting"),
      Self::Terminated => f.write_str("terminated"),
    }
  }
}

// -----------------------------------------------------------------------------
// Process Info
// -----------------------------------------------------------------------------

/// Snapshot of a process, returned by [`Process::info`].
///
/// [`Process::info`]: crate::erts::Process::info
#[derive(Clone, Debug)]
pub struct ProcessInfo {
  /// The PID of the process.
  pub pid: InternalPid,
  /// Scheduling status at the time of the snapshot.
  pub status: ProcessStatus,
  /// The name registered to this process, if any.
  pub registered_name: Option<Atom>,
  /// The value of the [`TRAP_EXIT`] process flag.
  ///
  /// [`TRAP_EXIT`]: crate::erts::ProcessFlags::TRAP_EXIT
  pub trap_exit: bool,
  /// Processes linked to this one.
  pub links: Vec<InternalPid>,
  /// Monitors held by this process.
  pub monitors: Vec<MonitorRef>,
  /// Processes monitoring this one.
  pub monitored_by: Vec<InternalPid>,
  /// Number of messages waiting in the mailbox.
  pub message_queue_len: usize,
  /// The process that spawned this one; the root process has none.
  pub parent: Option<InternalPid>,
}
