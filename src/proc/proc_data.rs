use hashbrown::HashMap;
use parking_lot::Mutex;
use parking_lot::RwLock;
use std::num::NonZeroUsize;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use crate::core::Atom;
use crate::core::Dest;
use crate::core::Exit;
use crate::core::InternalPid;
use crate::core::MonitorRef;
use crate::erts::DynMessage;
use crate::erts::ProcessFlags;
use crate::erts::ProcessStatus;
use crate::erts::Signal;
use crate::erts::SignalDemonitor;
use crate::erts::SignalEmit;
use crate::erts::SignalExit;
use crate::erts::SignalLink;
use crate::erts::SignalLinkExit;
use crate::erts::SignalMonitor;
use crate::erts::SignalMonitorDown;
use crate::erts::SignalSend;
use crate::erts::SignalUnlink;
use crate::erts::SignalUnlinkAck;
use crate::proc::ProcLink;
use crate::proc::ProcMail;
use crate::proc::ProcMonitor;
use crate::proc::ProcSend;

// -----------------------------------------------------------------------------
// Proc Data
// -----------------------------------------------------------------------------

/// Process control block, split into three locking domains.
///
/// 1. **Read-only**: set at creation, no lock needed
/// 2. **Internal**: links, monitors, flags and the mailbox; locked briefly
///    by the owning task and by termination cleanup, never across `.await`
/// 3. **External**: status, registered name and termination record
#[derive(Debug)]
pub(crate) struct ProcData {
  pub(crate) readonly: ProcReadOnly,
  pub(crate) internal: Mutex<ProcInternal>,
  pub(crate) external: RwLock<ProcExternal>,
}

impl ProcData {
  #[inline]
  pub(crate) fn new(readonly: ProcReadOnly, internal: ProcInternal) -> Self {
    Self {
      readonly,
      internal: Mutex::new(internal),
      external: RwLock::new(ProcExternal::new()),
    }
  }

  /// Returns `true` if the process has not started terminating.
  #[inline]
  pub(crate) fn is_alive(&self) -> bool {
    !self.external.read().status.is_terminated()
  }

  /// Returns the termination record, once the process has exited.
  #[inline]
  pub(crate) fn termination(&self) -> Option<ProcExit> {
    self.external.read().exit.clone()
  }
}

// -----------------------------------------------------------------------------
// Proc Read-only
// -----------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct ProcReadOnly {
  /// PID of the process.
  pub(crate) mpid: InternalPid,
  /// Sending side of the process signal queue.
  pub(crate) send: ProcSend,
  /// Process that spawned this one.
  pub(crate) root: Option<InternalPid>,
  /// Counter for process-unique ids, such as unlink ids.
  pub(crate) puid: AtomicU64,
}

impl ProcReadOnly {
  #[inline]
  pub(crate) fn new(mpid: InternalPid, send: ProcSend, root: Option<InternalPid>) -> Self {
    Self {
      mpid,
      send,
      root,
      puid: AtomicU64::new(1),
    }
  }

  #[inline]
  pub(crate) fn next_puid(&self) -> u64 {
    self.puid.fetch_add(1, Ordering::Relaxed)
  }

  // ---------------------------------------------------------------------------
  // Signals
  //
  // Every helper returns `false` if this process has closed its queue.
  // ---------------------------------------------------------------------------

  #[inline]
  pub(crate) fn send_message(&self, from: InternalPid, data: DynMessage) -> bool {
    SignalSend::new(from, data).emit(self)
  }

  #[inline]
  pub(crate) fn send_exit(&self, from: InternalPid, exit: Exit) -> bool {
    SignalExit::new(from, exit).emit(self)
  }

  #[inline]
  pub(crate) fn send_link(&self, from: InternalPid) -> bool {
    SignalLink::new(from).emit(self)
  }

  #[inline]
  pub(crate) fn send_link_exit(&self, from: InternalPid, exit: Exit) -> bool {
    SignalLinkExit::new(from, exit).emit(self)
  }

  #[inline]
  pub(crate) fn send_unlink(&self, from: InternalPid, ulid: u64) -> bool {
    SignalUnlink::new(from, ulid).emit(self)
  }

  #[inline]
  pub(crate) fn send_unlink_ack(&self, from: InternalPid, ulid: u64) -> bool {
    SignalUnlinkAck::new(from, ulid).emit(self)
  }

  #[inline]
  pub(crate) fn send_monitor(&self, from: InternalPid, mref: MonitorRef, item: Dest) -> bool {
    SignalMonitor::new(from, mref, item).emit(self)
  }

  #[inline]
  pub(crate) fn send_monitor_down(&self, from: InternalPid, mref: MonitorRef, exit: Exit) -> bool {
    SignalMonitorDown::new(from, mref, exit).emit(self)
  }

  #[inline]
  pub(crate) fn send_demonitor(&self, from: InternalPid, mref: MonitorRef) -> bool {
    SignalDemonitor::new(from, mref).emit(self)
  }

  #[inline]
  pub(crate) fn send_signal(&self, signal: Signal) -> bool {
    self.send.send(signal)
  }
}

// -----------------------------------------------------------------------------
// Proc Internal
// -----------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct ProcInternal {
  /// Process flags.
  pub(crate) flags: ProcessFlags,
  /// Messages moved out of the signal queue, awaiting a matching receive.
  pub(crate) inbox: ProcMail,
  /// Linked processes.
  pub(crate) links: HashMap<InternalPid, ProcLink>,
  /// Monitors requested by this process.
  pub(crate) monitor_send: HashMap<MonitorRef, ProcMonitor>,
  /// Monitors watching this process.
  pub(crate) monitor_recv: HashMap<MonitorRef, ProcMonitor>,
}

impl ProcInternal {
  #[inline]
  pub(crate) fn new(flags: ProcessFlags, limit: Option<NonZeroUsize>) -> Self {
    Self {
      flags,
      inbox: ProcMail::new(limit),
      links: HashMap::new(),
      monitor_send: HashMap::new(),
      monitor_recv: HashMap::new(),
    }
  }

  #[inline]
  pub(crate) fn is_trapping(&self) -> bool {
    self.flags.contains(ProcessFlags::TRAP_EXIT)
  }
}

// -----------------------------------------------------------------------------
// Proc External
// -----------------------------------------------------------------------------

#[derive(Debug)]
pub(crate) struct ProcExternal {
  /// Scheduling status.
  pub(crate) status: ProcessStatus,
  /// Registered name (if any).
  pub(crate) name: Option<Atom>,
  /// Termination record, set once when the process stops running.
  pub(crate) exit: Option<ProcExit>,
}

impl ProcExternal {
  #[inline]
  pub(crate) const fn new() -> Self {
    Self {
      status: ProcessStatus::Runnable,
      name: None,
      exit: None,
    }
  }
}

// -----------------------------------------------------------------------------
// Proc Exit
// -----------------------------------------------------------------------------

/// What ended a process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ExitCause {
  /// The future completed or called `Process::terminate`.
  Return,
  /// The future panicked.
  Panic,
  /// An exit signal sent with `Process::exit`.
  Signal,
  /// An exit signal propagated from a linked process.
  Link,
  /// The runtime dropped the process task.
  Shutdown,
}

/// Termination record of a process.
#[derive(Clone, Debug)]
pub(crate) struct ProcExit {
  pub(crate) exit: Exit,
  pub(crate) cause: ExitCause,
}

impl ProcExit {
  #[inline]
  pub(crate) const fn new(exit: Exit, cause: ExitCause) -> Self {
    Self { exit, cause }
  }
}
