// -----------------------------------------------------------------------------
// Process Mailbox
// -----------------------------------------------------------------------------

use parking_lot::MutexGuard;
use parking_lot::RwLockWriteGuard;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time;
use triomphe::Arc;

use crate::bifs::proc_resolve;
use crate::core::Dest;
use crate::core::Term;
use crate::erts::DynMessage;
use crate::erts::Process;
use crate::erts::ProcessStatus;
use crate::error::ProcessError;
use crate::proc::ProcData;
use crate::proc::ProcExternal;
use crate::proc::ProcInternal;
use crate::proc::ProcTask;

/// Sends `term` to `dest`.
///
/// Messages to dead processes or unregistered names are dropped.
pub(crate) fn proc_send(this: &ProcTask, dest: Dest, term: Term) {
  let Some(proc) = proc_resolve(dest) else {
    tracing::trace!(%dest, result = "dropped", reason = "no process");
    return;
  };

  if !proc.readonly.send_message(this.readonly.mpid, term.into()) {
    tracing::trace!(%dest, result = "dropped", reason = "dead PID");
  }
}

/// Removes and returns the first mailbox message accepted by `filter`,
/// waiting for new messages if none matches.
pub(crate) async fn proc_receive<F>(filter: F) -> DynMessage
where
  F: Fn(&DynMessage) -> bool,
{
  let proc: Arc<ProcData> = Process::with(|this| Arc::clone(&this.inner));
  let _guard: WaitGuard<'_> = WaitGuard { proc: &proc };

  let mut marker: u64 = 0;

  loop {
    let notify: Arc<Notify> = {
      let mut internal: MutexGuard<'_, ProcInternal> = proc.internal.lock();

      if let Some(message) = internal.inbox.poll(&filter, &mut marker) {
        return message;
      }

      internal.inbox.notify()
    };

    // Messages only enter the mailbox from the process task itself, between
    // polls of this future, so registering here cannot miss a wakeup.
    proc.external.write().status = ProcessStatus::Waiting;
    notify.notified().await;
    proc.external.write().status = ProcessStatus::Runnable;
  }
}

/// Same as [`proc_receive`], giving up after `timeout`.
pub(crate) async fn proc_receive_timeout<F>(
  filter: F,
  timeout: Duration,
) -> Result<DynMessage, ProcessError>
where
  F: Fn(&DynMessage) -> bool,
{
  match time::timeout(timeout, proc_receive(filter)).await {
    Ok(message) => Ok(message),
    Err(_) => Err(ProcessError::Timeout),
  }
}

// -----------------------------------------------------------------------------
// Wait Guard
// -----------------------------------------------------------------------------

/// Restores the `Runnable` status when a receive completes or is cancelled.
struct WaitGuard<'a> {
  proc: &'a ProcData,
}

impl Drop for WaitGuard<'_> {
  fn drop(&mut self) {
    let mut external: RwLockWriteGuard<'_, ProcExternal> = self.proc.external.write();

    if external.status == ProcessStatus::Waiting {
      external.status = ProcessStatus::Runnable;
    }
  }
}
