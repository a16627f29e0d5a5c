//! Global scheduler state: the process table and the name registry.

use hashbrown::HashMap;
use parking_lot::RwLock;
use std::sync::OnceLock;
use triomphe::Arc;

use crate::consts;
use crate::core::Atom;
use crate::core::InternalPid;
use crate::proc::ProcData;

static SCHEDULER: OnceLock<Scheduler> = OnceLock::new();

/// Runtime-wide process bookkeeping.
///
/// Tokio drives the process tasks; the scheduler only tracks which
/// processes exist and which names point at them. Every runtime started
/// through [`init`] shares the same tables.
///
/// [`init`]: crate::init
pub(crate) struct Scheduler {
  /// Process table mapping PIDs to process data.
  procs: RwLock<HashMap<InternalPid, Arc<ProcData>>>,
  /// Name registry mapping registered names to PIDs.
  names: RwLock<HashMap<Atom, InternalPid>>,
}

impl Scheduler {
  #[inline]
  fn new() -> Self {
    Self {
      procs: RwLock::new(HashMap::with_capacity(consts::CAP_REGISTERED_PROCS)),
      names: RwLock::new(HashMap::with_capacity(consts::CAP_REGISTERED_NAMES)),
    }
  }

  /// Returns a reference to the global scheduler.
  #[inline]
  pub(crate) fn this() -> &'static Self {
    SCHEDULER.get_or_init(Self::new)
  }

  /// Returns a reference to the process table.
  #[inline]
  pub(crate) fn procs() -> &'static RwLock<HashMap<InternalPid, Arc<ProcData>>> {
    &Self::this().procs
  }

  /// Returns a reference to the name registry.
  #[inline]
  pub(crate) fn names() -> &'static RwLock<HashMap<Atom, InternalPid>> {
    &Self::this().names
  }

  /// Returns the process data for `pid`, if it is in the table.
  #[inline]
  pub(crate) fn lookup(pid: InternalPid) -> Option<Arc<ProcData>> {
    Self::procs().read().get(&pid).cloned()
  }

  /// Returns the PID registered under `name`.
  #[inline]
  pub(crate) fn resolve(name: Atom) -> Option<InternalPid> {
    Self::names().read().get(&name).copied()
  }
}
