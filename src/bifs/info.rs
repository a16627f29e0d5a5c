// -----------------------------------------------------------------------------
// Process Info
// -----------------------------------------------------------------------------

use parking_lot::MutexGuard;
use parking_lot::RwLockReadGuard;
use triomphe::Arc;

use crate::bifs::proc_find;
use crate::core::InternalPid;
use crate::erts::ProcessFlags;
use crate::erts::ProcessInfo;
use crate::proc::ProcData;
use crate::proc::ProcExternal;
use crate::proc::ProcInternal;
use crate::sched::Scheduler;

/// Returns `true` if `pid` exists and is not exiting.
pub(crate) fn proc_alive(pid: InternalPid) -> bool {
  proc_find(pid).is_some_and(|proc| proc.is_alive())
}

/// Returns the PIDs of all processes in the process table.
///
/// Exiting processes are included until their cleanup completes.
pub(crate) fn proc_list() -> Vec<InternalPid> {
  Scheduler::procs().read().keys().copied().collect()
}

/// Returns a snapshot of the process identified by `pid`.
///
/// Returns `None` if the process is not alive.
pub(crate) fn proc_info(pid: InternalPid) -> Option<ProcessInfo> {
  let proc: Arc<ProcData> = proc_find(pid)?;

  let internal: MutexGuard<'_, ProcInternal> = proc.internal.lock();
  let external: RwLockReadGuard<'_, ProcExternal> = proc.external.read();

  if external.status.is_terminated() {
    return None;
  }

  Some(ProcessInfo {
    pid,
    status: external.status,
    registered_name: external.name,
    trap_exit: internal.flags.contains(ProcessFlags::TRAP_EXIT),
    links: internal
      .links
      .iter()
      .filter(|(_, state)| state.is_enabled())
      .map(|(pid, _)| *pid)
      .collect(),
    monitors: internal.monitor_send.keys().copied().collect(),
    monitored_by: internal
      .monitor_recv
      .values()
      .map(|state| state.peer())
      .collect(),
    message_queue_len: internal.inbox.len(),
    parent: proc.readonly.root,
  })
}
