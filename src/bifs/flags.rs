// -----------------------------------------------------------------------------
// Process Flags
// -----------------------------------------------------------------------------

use parking_lot::MutexGuard;

use crate::erts::ProcessFlags;
use crate::proc::ProcInternal;
use crate::proc::ProcTask;

/// Returns the process flags of the calling process.
pub(crate) fn proc_get_flags(this: &ProcTask) -> ProcessFlags {
  this.internal.lock().flags
}

/// Replaces the entire flag set of the calling process.
pub(crate) fn proc_set_flags(this: &ProcTask, flags: ProcessFlags) {
  this.internal.lock().flags = flags;
}

/// Sets a single process flag to the given value.
///
/// Returns the previous value of the flag. Other flags remain unchanged.
pub(crate) fn proc_set_flag(this: &ProcTask, flag: ProcessFlags, value: bool) -> bool {
  let mut internal: MutexGuard<'_, ProcInternal> = this.internal.lock();
  let previous: bool = internal.flags.contains(flag);

  internal.flags.set(flag, value);

  previous
}
