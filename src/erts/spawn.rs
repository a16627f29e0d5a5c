use std::num::NonZeroUsize;

use crate::consts;
use crate::core::InternalPid;
use crate::core::MonitorRef;

// -----------------------------------------------------------------------------
// Spawn Config
// -----------------------------------------------------------------------------

/// Options for [`Process::spawn_opt`].
///
/// ```
/// use spindle::erts::SpawnConfig;
///
/// let config: SpawnConfig = SpawnConfig::new_monitor().with_trap_exit(true);
///
/// assert!(config.monitor);
/// assert!(config.trap_exit);
/// assert!(!config.link);
/// ```
///
/// [`Process::spawn_opt`]: crate::erts::Process::spawn_opt
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct SpawnConfig {
  /// Link the new process to its parent before it runs.
  pub link: bool,
  /// Monitor the new process from its parent before it runs.
  pub monitor: bool,
  /// Initial value of the `TRAP_EXIT` flag.
  pub trap_exit: bool,
  /// Mailbox capacity; messages to a full mailbox are dropped. EXIT and
  /// DOWN notices are always delivered.
  ///
  /// Unbounded when `None`.
  pub mailbox_limit: Option<NonZeroUsize>,
}

impl SpawnConfig {
  #[inline]
  pub const fn new() -> Self {
    Self {
      link: false,
      monitor: false,
      trap_exit: consts::SPAWN_INIT_TRAP_EXIT,
      mailbox_limit: None,
    }
  }

  /// Options of [`Process::spawn_link`].
  ///
  /// [`Process::spawn_link`]: crate::erts::Process::spawn_link
  #[inline]
  pub const fn new_link() -> Self {
    Self::new().with_link(true)
  }

  /// Options of [`Process::spawn_monitor`].
  ///
  /// [`Process::spawn_monitor`]: crate::erts::Process::spawn_monitor
  #[inline]
  pub const fn new_monitor() -> Self {
    Self::new().with_monitor(true)
  }

  #[inline]
  pub const fn with_link(mut self, value: bool) -> Self {
    self.link = value;
    self
  }

  #[inline]
  pub const fn with_monitor(mut self, value: bool) -> Self {
    self.monitor = value;
    self
  }

  #[inline]
  pub const fn with_trap_exit(mut self, value: bool) -> Self {
    self.trap_exit = value;
    self
  }

  #[inline]
  pub const fn with_mailbox_limit(mut self, value: Option<NonZeroUsize>) -> Self {
    self.mailbox_limit = value;
    self
  }
}

impl Default for SpawnConfig {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}

// -----------------------------------------------------------------------------
// Spawn Handle
// -----------------------------------------------------------------------------

/// Result of [`Process::spawn_opt`]: the new PID, plus the monitor reference
/// when the spawn was monitored.
///
/// [`Process::spawn_opt`]: crate::erts::Process::spawn_opt
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum SpawnHandle {
  Process(InternalPid),
  Monitor(InternalPid, MonitorRef),
}

impl SpawnHandle {
  #[inline]
  pub const fn is_process(&self) -> bool {
    matches!(self, Self::Process(_))
  }

  #[inline]
  pub const fn is_monitor(&self) -> bool {
    matches!(self, Self::Monitor(..))
  }

  #[inline]
  pub const fn pid(&self) -> InternalPid {
    match self {
      Self::Process(pid) | Self::Monitor(pid, _) => *pid,
    }
  }

  #[inline]
  pub const fn mref(&self) -> Option<MonitorRef> {
    match self {
      Self::Process(_) => None,
      Self::Monitor(_, mref) => Some(*mref),
    }
  }
}
