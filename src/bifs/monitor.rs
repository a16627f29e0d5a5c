// -----------------------------------------------------------------------------
// Process Monitor
// -----------------------------------------------------------------------------

use triomphe::Arc;

use crate::bifs::proc_find;
use crate::bifs::proc_resolve;
use crate::core::Dest;
use crate::core::Exit;
use crate::core::InternalPid;
use crate::core::MonitorRef;
use crate::erts::DynMessage;
use crate::proc::ProcData;
use crate::proc::ProcMonitor;
use crate::proc::ProcTask;

/// Starts monitoring `item` from the calling process.
///
/// # Monitor Protocol
///
/// 1. Resolve the target, following registered names
/// 2. Store the monitor in the caller's table
/// 3. Send MONITOR signal to the target (or MONITOR_DOWN to self if the
///    target is dead or the name is not registered)
pub(crate) fn proc_monitor(this: &ProcTask, item: Dest) -> MonitorRef {
  let mref: MonitorRef = MonitorRef::new();
  let target: Option<Arc<ProcData>> = proc_resolve(item);

  let peer: InternalPid = match (&target, item) {
    (Some(proc), _) => proc.readonly.mpid,
    (None, Dest::Pid(pid)) => pid,
    (None, Dest::Name(_)) => InternalPid::UNDEFINED,
  };

  this
    .internal
    .lock()
    .monitor_send
    .insert(mref, ProcMonitor::new(peer, item));

  let monitored: bool = match target {
    Some(proc) => proc.readonly.send_monitor(this.readonly.mpid, mref, item),
    None => false,
  };

  if !monitored {
    tracing::trace!(%mref, %item, result = "noproc");
    this.readonly.send_monitor_down(peer, mref, Exit::NOPROC);
  }

  mref
}

/// Turns off the monitor identified by `mref`.
///
/// Returns `true` if the monitor was active. A DOWN message that was already
/// delivered stays in the mailbox; see [`proc_flush_down`].
pub(crate) fn proc_demonitor(this: &ProcTask, mref: MonitorRef) -> bool {
  let Some(state) = this.internal.lock().monitor_send.remove(&mref) else {
    return false;
  };

  if let Some(proc) = proc_find(state.peer()) {
    proc.readonly.send_demonitor(this.readonly.mpid, mref);
  }

  true
}

/// Removes the DOWN message for `mref` from the mailbox, if present.
///
/// Returns `true` if a message was removed.
pub(crate) fn proc_flush_down(this: &ProcTask, mref: MonitorRef) -> bool {
  let mut marker: u64 = 0;

  this
    .internal
    .lock()
    .inbox
    .poll(|message: &DynMessage| message.is_down_for(mref), &mut marker)
    .is_some()
}
