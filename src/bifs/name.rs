// -----------------------------------------------------------------------------
// Local Name Registration
// -----------------------------------------------------------------------------

use hashbrown::HashMap;
use parking_lot::RwLockWriteGuard;
use triomphe::Arc;

use crate::bifs::proc_find;
use crate::core::Atom;
use crate::core::InternalPid;
use crate::error::ProcessError;
use crate::proc::ProcData;
use crate::proc::ProcExternal;
use crate::raise;
use crate::sched::Scheduler;

/// Registers a name for a process.
///
/// # Registration Protocol
///
/// 1. Validate name (not `undefined`)
/// 2. Acquire write lock on name table, then on the process
/// 3. Check process is alive
/// 4. Check name is free and the process has no other name
/// 5. Store the mapping on both sides
///
/// # Errors
///
/// - [`NoSuchProcess`] if the process is not alive
/// - [`NameTaken`] with the taken name if `name` is registered, or with the
///   current name if the process already has one
///
/// # Panics
///
/// Raises a `BadArg` exception if `name` is `undefined` (reserved).
///
/// [`NoSuchProcess`]: ProcessError::NoSuchProcess
/// [`NameTaken`]: ProcessError::NameTaken
pub(crate) fn proc_register(pid: InternalPid, name: Atom) -> Result<(), ProcessError> {
  if name == Atom::UNDEFINED {
    raise!(Error, BadArg, "reserved name");
  }

  let Some(proc) = proc_find(pid) else {
    return Err(ProcessError::NoSuchProcess);
  };

  let mut names: RwLockWriteGuard<'_, HashMap<Atom, InternalPid>> = Scheduler::names().write();
  let mut external: RwLockWriteGuard<'_, ProcExternal> = proc.external.write();

  if external.status.is_terminated() {
    return Err(ProcessError::NoSuchProcess);
  }

  if names.contains_key(&name) {
    return Err(ProcessError::NameTaken(name));
  }

  if let Some(current) = external.name {
    return Err(ProcessError::NameTaken(current));
  }

  names.insert(name, pid);
  external.name = Some(name);

  tracing::trace!(%pid, %name, "Proc Register");

  Ok(())
}

/// Removes the registered `name`.
///
/// # Errors
///
/// Returns [`NotRegistered`] if the name is not registered.
///
/// [`NotRegistered`]: ProcessError::NotRegistered
pub(crate) fn proc_unregister(name: Atom) -> Result<(), ProcessError> {
  let mut names: RwLockWriteGuard<'_, HashMap<Atom, InternalPid>> = Scheduler::names().write();

  let Some(pid) = names.remove(&name) else {
    return Err(ProcessError::NotRegistered);
  };

  if let Some(proc) = proc_find(pid) {
    let mut external: RwLockWriteGuard<'_, ProcExternal> = proc.external.write();

    if external.name == Some(name) {
      external.name = None;
    }
  }

  tracing::trace!(%pid, %name, "Proc Unregister");

  Ok(())
}

/// Removes `name` on behalf of a terminated process.
///
/// The mapping is only removed if it still points at `pid`.
pub(crate) fn proc_unregister_dead(name: Atom, pid: InternalPid) {
  let mut names: RwLockWriteGuard<'_, HashMap<Atom, InternalPid>> = Scheduler::names().write();

  if names.get(&name) == Some(&pid) {
    names.remove(&name);
  } else {
    tracing::trace!(%pid, %name, "name already released");
  }
}

/// Returns the PID registered under `name`.
pub(crate) fn proc_whereis(name: Atom) -> Option<InternalPid> {
  let pid: InternalPid = Scheduler::resolve(name)?;
  let proc: Arc<ProcData> = proc_find(pid)?;

  proc.is_alive().then_some(pid)
}

/// Returns all registered names.
pub(crate) fn proc_registered() -> Vec<Atom> {
  Scheduler::names().read().keys().copied().collect()
}
