// -----------------------------------------------------------------------------
// Process Link
// -----------------------------------------------------------------------------

use hashbrown::hash_map::Entry;
use parking_lot::MutexGuard;

use crate::bifs::proc_find;
use crate::core::Exit;
use crate::core::InternalPid;
use crate::proc::ProcInternal;
use crate::proc::ProcLink;
use crate::proc::ProcTask;

/// Creates a bidirectional link between the calling process and the target.
///
/// # Link Protocol
///
/// 1. Check if link already exists (no-op if active, enable if disabled)
/// 2. Add link to caller's link table
/// 3. Send LINK signal to target (or LINK_EXIT to self if target is dead)
///
/// Self-linking is ignored.
pub(crate) fn proc_link(this: &ProcTask, pid: InternalPid) {
  if this.readonly.mpid == pid {
    return;
  }

  let mut internal: MutexGuard<'_, ProcInternal> = this.internal.lock();

  match internal.links.entry(pid) {
    Entry::Occupied(mut entry) => {
      if entry.get().is_enabled() {
        return;
      }

      entry.get_mut().enable();
    }
    Entry::Vacant(entry) => {
      entry.insert(ProcLink::new());
    }
  }

  drop(internal);

  let linked: bool = match proc_find(pid) {
    Some(proc) => proc.readonly.send_link(this.readonly.mpid),
    None => false,
  };

  if !linked {
    tracing::trace!(%pid, result = "noproc");
    this.readonly.send_link_exit(pid, Exit::NOPROC);
  }
}

/// Removes a bidirectional link between the calling process and the target.
///
/// # Unlink Protocol
///
/// 1. Disable link with a unique ID so late exit signals are ignored
/// 2. Send UNLINK signal with the ID to the target
/// 3. Remove the link when UNLINK_ACK arrives with the same ID
///
/// The link is removed immediately if the target is already dead.
pub(crate) fn proc_unlink(this: &ProcTask, pid: InternalPid) {
  let mut internal: MutexGuard<'_, ProcInternal> = this.internal.lock();

  let Some(state) = internal.links.get(&pid) else {
    return;
  };

  if state.is_disabled() {
    return;
  }

  let ulid: u64 = this.readonly.next_puid();

  let sent: bool = match proc_find(pid) {
    Some(proc) => proc.readonly.send_unlink(this.readonly.mpid, ulid),
    None => false,
  };

  if sent {
    if let Some(state) = internal.links.get_mut(&pid) {
      state.disable(ulid);
    }
  } else {
    internal.links.remove(&pid);
  }
}
