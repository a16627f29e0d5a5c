//! Built-in functions backing the public process API.
//!
//! Functions taking a `&ProcTask` run inside the calling process; the rest
//! can be called from anywhere.

mod flags;
mod info;
mod link;
mod mailbox;
mod monitor;
mod name;
mod spawn;

pub(crate) use self::flags::proc_get_flags;
pub(crate) use self::flags::proc_set_flag;
pub(crate) use self::flags::proc_set_flags;
pub(crate) use self::info::proc_alive;
pub(crate) use self::info::proc_info;
pub(crate) use self::info::proc_list;
pub(crate) use self::link::proc_link;
pub(crate) use self::link::proc_unlink;
pub(crate) use self::mailbox::proc_receive;
pub(crate) use self::mailbox::proc_receive_timeout;
pub(crate) use self::mailbox::proc_send;
pub(crate) use self::monitor::proc_demonitor;
pub(crate) use self::monitor::proc_flush_down;
pub(crate) use self::monitor::proc_monitor;
pub(crate) use self::name::proc_register;
pub(crate) use self::name::proc_registered;
pub(crate) use self::name::proc_unregister;
pub(crate) use self::name::proc_unregister_dead;
pub(crate) use self::name::proc_whereis;
pub(crate) use self::spawn::proc_exit;
pub(crate) use self::spawn::proc_remove;
pub(crate) use self::spawn::proc_spawn;
pub(crate) use self::spawn::proc_spawn_root;

use triomphe::Arc;

use crate::core::Dest;
use crate::core::InternalPid;
use crate::proc::ProcData;
use crate::sched::Scheduler;

// -----------------------------------------------------------------------------
// Common Utilities
// -----------------------------------------------------------------------------

/// Returns the process data for `pid`, if the process is in the table.
#[inline]
pub(crate) fn proc_find(pid: InternalPid) -> Option<Arc<ProcData>> {
  Scheduler::lookup(pid)
}

/// Returns the process data for `dest`, resolving registered names.
#[inline]
pub(crate) fn proc_resolve(dest: Dest) -> Option<Arc<ProcData>> {
  match dest {
    Dest::Pid(pid) => proc_find(pid),
    Dest::Name(name) => Scheduler::resolve(name).and_then(proc_find),
  }
}
