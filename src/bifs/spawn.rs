// -----------------------------------------------------------------------------
// Process Spawning
// -----------------------------------------------------------------------------

use parking_lot::MutexGuard;
use parking_lot::RwLockWriteGuard;
use std::any::Any;
use tokio::task;
use tokio::task::futures::TaskLocalFuture;
use tracing::Span;
use tracing::span;
use triomphe::Arc;

use crate::bifs;
use crate::core::Atom;
use crate::core::Dest;
use crate::core::Exit;
use crate::core::InternalPid;
use crate::core::MonitorRef;
use crate::core::Term;
use crate::error::Exception;
use crate::erts::Process;
use crate::erts::ProcessFlags;
use crate::erts::ProcessStatus;
use crate::erts::Signal;
use crate::erts::SignalRecv;
use crate::erts::SpawnConfig;
use crate::erts::SpawnHandle;
use crate::erts::Termination;
use crate::proc;
use crate::proc::ExitCause;
use crate::proc::ProcData;
use crate::proc::ProcExit;
use crate::proc::ProcExternal;
use crate::proc::ProcGuard;
use crate::proc::ProcInternal;
use crate::proc::ProcReadOnly;
use crate::proc::ProcRecv;
use crate::proc::ProcSend;
use crate::proc::ProcTask;
use crate::raise;
use crate::sched::Scheduler;
use crate::utils::CatchUnwind;

/// Sends an exit signal to the target process.
///
/// Never fails for non-existent PIDs (signals are silently dropped). A
/// signal sent to the calling process takes effect at its next suspension
/// point.
pub(crate) fn proc_exit(this: &ProcTask, pid: InternalPid, exit: Exit) {
  let Some(proc) = bifs::proc_find(pid) else {
    tracing::trace!(%pid, result = "ignored", reason = "dead PID");
    return;
  };

  proc.readonly.send_exit(this.readonly.mpid, exit);
}

/// Spawns a new process with the given configuration.
///
/// Returns the process data alongside the handle so internal callers can
/// inspect the termination record once the process is gone.
pub(crate) fn proc_spawn<F>(
  this: &ProcTask,
  future: F,
  options: SpawnConfig,
) -> (Arc<ProcData>, SpawnHandle)
where
  F: Future + Send + 'static,
  F::Output: Termination,
{
  proc_spawn_internal(Some(this), future, options)
}

/// Spawns a root process.
///
/// Root processes have no parent and therefore cannot be linked or
/// monitored at spawn time.
pub(crate) fn proc_spawn_root<F>(future: F, options: SpawnConfig) -> Arc<ProcData>
where
  F: Future + Send + 'static,
  F::Output: Termination,
{
  if options.link || options.monitor {
    raise!(Error, SysInv, "root process link/monitor");
  }

  proc_spawn_internal(None, future, options).0
}

/// Internal spawn implementation shared by all spawn functions.
///
/// # Spawn Sequence
///
/// 1. **Create Process**: Allocate state and assign PID
/// 2. **Create Task**: Wrap future in task-local context
/// 3. **Initialize Link**: Establish link if requested
/// 4. **Initialize Monitor**: Establish monitor if requested
/// 5. **Spawn Task**: Schedule process future on Tokio
///
/// Links and monitors are queued before the task is scheduled, so the child
/// processes them before running any user code.
fn proc_spawn_internal<F>(
  parent: Option<&ProcTask>,
  future: F,
  options: SpawnConfig,
) -> (Arc<ProcData>, SpawnHandle)
where
  F: Future + Send + 'static,
  F::Output: Termination,
{
  // ---------------------------------------------------------------------------
  // 1. Create Process
  // ---------------------------------------------------------------------------

  let (proc, sig_recv): (Arc<ProcData>, ProcRecv) = proc_create(parent, options);

  // ---------------------------------------------------------------------------
  // 2. Create Process Task
  // ---------------------------------------------------------------------------

  let context: ProcTask = ProcTask::new(Arc::clone(&proc));
  let guard: ProcGuard = ProcGuard::new(Arc::clone(&proc), sig_recv);

  let local: TaskLocalFuture<ProcTask, _> = Process::scope(context, async move {
    // Declared first so cleanup runs after the user future is dropped.
    let mut guard: ProcGuard = guard;
    let safe_task: CatchUnwind<F> = CatchUnwind::new(future);

    tokio::pin!(safe_task);

    let exit: ProcExit = 'run: loop {
      // Process all pending signals before running user code
      while let Ok(signal) = guard.recv.try_recv() {
        if let Some(exit) = proc_handle_signal(&guard.proc, signal) {
          break 'run exit;
        }
      }

      tokio::select! {
        biased;
        Some(signal) = guard.recv.recv() => {
          if let Some(exit) = proc_handle_signal(&guard.proc, signal) {
            break 'run exit;
          }
        }
        result = &mut safe_task => match result {
          Ok(output) => break 'run ProcExit::new(output.into_exit(), ExitCause::Return),
          Err(error) => break 'run proc_panic_exit(guard.proc.readonly.mpid, error),
        }
      }
    };

    let mut external: RwLockWriteGuard<'_, ProcExternal> = guard.proc.external.write();

    if external.exit.is_none() {
      external.exit = Some(exit);
    }
  });

  // ---------------------------------------------------------------------------
  // 3. Initialize Link
  // ---------------------------------------------------------------------------

  if options.link {
    let Some(root) = parent else {
      raise!(Error, SysInv, "link without parent");
    };

    bifs::proc_link(root, proc.readonly.mpid);
  }

  // ---------------------------------------------------------------------------
  // 4. Initialize Monitor
  // ---------------------------------------------------------------------------

  let mut handle: SpawnHandle = SpawnHandle::Process(proc.readonly.mpid);

  if options.monitor {
    let Some(root) = parent else {
      raise!(Error, SysInv, "monitor without parent");
    };

    let mtarget: Dest = Dest::Pid(proc.readonly.mpid);
    let monitor: MonitorRef = bifs::proc_monitor(root, mtarget);

    handle = SpawnHandle::Monitor(proc.readonly.mpid, monitor);
  }

  // ---------------------------------------------------------------------------
  // 5. Spawn Task
  // ---------------------------------------------------------------------------

  if let Some(root) = parent {
    tracing::debug!(pid = %proc.readonly.mpid, from = %root.readonly.mpid, "Proc Spawn");
  } else {
    tracing::debug!(pid = %proc.readonly.mpid, "Proc Spawn");
  }

  // The join handle is not needed: termination is observed through the
  // process guard, links and monitors.
  drop(task::spawn(local));

  (proc, handle)
}

/// Creates a new process and inserts it into the process table.
fn proc_create(parent: Option<&ProcTask>, options: SpawnConfig) -> (Arc<ProcData>, ProcRecv) {
  let parent_pid: Option<InternalPid> = parent.map(|process| process.readonly.mpid);

  let (sig_send, sig_recv): (ProcSend, ProcRecv) = proc::unbounded_channel();

  let mut flags: ProcessFlags = ProcessFlags::empty();

  flags.set(ProcessFlags::TRAP_EXIT, options.trap_exit);

  let readonly: ProcReadOnly = ProcReadOnly::new(InternalPid::next(), sig_send, parent_pid);
  let internal: ProcInternal = ProcInternal::new(flags, options.mailbox_limit);
  let proc: Arc<ProcData> = Arc::new(ProcData::new(readonly, internal));

  Scheduler::procs()
    .write()
    .insert(proc.readonly.mpid, Arc::clone(&proc));

  (proc, sig_recv)
}

/// Removes a process from all global state during termination.
///
/// # Cleanup Protocol
///
/// 1. Lock the process and mark it terminated
/// 2. Remove from the process table and the name registry
/// 3. Close the signal queue and apply what is left in it
/// 4. Send `LINK_EXIT` to all linked processes
/// 5. Send `MONITOR_DOWN` to all monitoring processes
///
/// Steps 2 to 5 are not one atomic step for observers. The PID leaves the
/// table and the name is released before any EXIT or DOWN is sent, so a
/// peer may see `alive(pid) == false` before its notice arrives. Once the
/// notice arrives, the PID is gone and the name is free.
///
/// The queue is closed while the internal lock is held: a link or monitor
/// request racing with termination is either drained here and answered in
/// steps 4 and 5, or rejected by the closed queue and answered by the
/// requester itself with `noproc`.
///
/// Called by [`ProcGuard::drop`] when a process task completes or is dropped.
pub(crate) fn proc_remove(proc: &Arc<ProcData>, recv: &mut ProcRecv) {
  let mpid: InternalPid = proc.readonly.mpid;
  let span: Span = tracing::trace_span!("Proc Delete", pid = %mpid);
  let span_guard: span::Entered<'_> = span.enter();

  tracing::trace!("(1) - Lock");

  let mut internal: MutexGuard<'_, ProcInternal> = proc.internal.lock();
  let mut external: RwLockWriteGuard<'_, ProcExternal> = proc.external.write();

  external.status = ProcessStatus::Terminated;

  let name: Option<Atom> = external.name.take();

  let record: ProcExit = external
    .exit
    .get_or_insert_with(|| ProcExit::new(Exit::SHUTDOWN, ExitCause::Shutdown))
    .clone();

  drop(external);

  tracing::trace!("(2) - Unregister");

  if Scheduler::procs().write().remove(&mpid).is_none() {
    tracing::error!("dangling state");
  }

  if let Some(name) = name {
    bifs::proc_unregister_dead(name, mpid);
  }

  tracing::trace!("(3) - Drain Signals");

  recv.close();

  while let Ok(signal) = recv.try_recv() {
    let _ignore: Option<ProcExit> = signal.recv(&proc.readonly, &mut internal);
  }

  internal.inbox.clear();
  internal.monitor_send.clear();

  tracing::trace!("(4) - Send Link `EXIT`");

  for (pid, state) in internal.links.drain() {
    if state.is_disabled() {
      continue;
    }

    if let Some(peer) = bifs::proc_find(pid) {
      peer.readonly.send_link_exit(mpid, record.exit.clone());
    }
  }

  tracing::trace!("(5) - Send Monitor `DOWN`");

  for (mref, state) in internal.monitor_recv.drain() {
    if let Some(peer) = bifs::proc_find(state.peer()) {
      peer.readonly.send_monitor_down(mpid, mref, record.exit.clone());
    }
  }

  drop(internal);
  drop(span_guard);

  proc_log_exit(mpid, &record);
}

/// Processes a signal in the context of the receiving process.
#[inline]
fn proc_handle_signal(proc: &ProcData, signal: Signal) -> Option<ProcExit> {
  signal.recv(&proc.readonly, &mut proc.internal.lock())
}

/// Converts a caught panic payload into a termination record.
///
/// `Process::terminate` unwinds with an [`Exit`] payload, which counts as a
/// regular return.
fn proc_panic_exit(mpid: InternalPid, error: Box<dyn Any + Send>) -> ProcExit {
  let error: Box<dyn Any + Send> = match error.downcast::<Exit>() {
    Ok(exit) => return ProcExit::new(*exit, ExitCause::Return),
    Err(error) => error,
  };

  match error.downcast::<Exception>() {
    Ok(exception) => {
      if exception.has_backtrace() {
        tracing::error!(pid = %mpid, backtrace = %exception.backtrace(), "{exception}");
      } else {
        tracing::error!(pid = %mpid, "{exception}");
      }

      ProcExit::new(exception.to_exit(), ExitCause::Panic)
    }
    Err(error) => ProcExit::new(Exit::Term(Term::new_error(error)), ExitCause::Panic),
  }
}

/// Emits the diagnostic record of a terminated process.
fn proc_log_exit(mpid: InternalPid, record: &ProcExit) {
  match record.cause {
    _ if record.exit.is_normal() => {
      tracing::debug!(pid = %mpid, exit = %record.exit, "Proc Exit");
    }
    ExitCause::Shutdown => {
      tracing::debug!(pid = %mpid, exit = %record.exit, "Proc Exit");
    }
    cause => {
      tracing::error!(pid = %mpid, exit = %record.exit, cause = ?cause, "Proc Exit");
    }
  }
}
