use std::panic;
use std::time::Duration;
use tokio::task;
use tokio::task::futures::TaskLocalFuture;
use tokio::time;
use triomphe::Arc;

use crate::bifs;
use crate::core::Atom;
use crate::core::Dest;
use crate::core::Exit;
use crate::core::InternalPid;
use crate::core::Item;
use crate::core::MonitorRef;
use crate::core::Term;
use crate::erts::DynMessage;
use crate::erts::Message;
use crate::erts::ProcessFlags;
use crate::erts::ProcessInfo;
use crate::erts::SpawnConfig;
use crate::erts::SpawnHandle;
use crate::erts::Termination;
use crate::error::ProcessError;
use crate::proc::ProcData;
use crate::proc::ProcTask;
use crate::raise;

tokio::task_local! {
  static CONTEXT: ProcTask;
}

// -----------------------------------------------------------------------------
// @api - Process
// -----------------------------------------------------------------------------

/// Spindle process API.
///
/// Functions that act on behalf of "the calling process" must run inside a
/// process spawned by the runtime; outside one they raise a `SysInv`
/// exception.
pub struct Process;

impl Process {
  /// Sets the task-local process context.
  #[inline]
  pub(crate) fn scope<F>(task: ProcTask, future: F) -> TaskLocalFuture<ProcTask, F>
  where
    F: Future,
  {
    CONTEXT.scope(task, future)
  }

  /// Accesses the current task-local process context and runs the given function.
  #[inline]
  pub(crate) fn with<F, R>(f: F) -> R
  where
    F: FnOnce(&ProcTask) -> R,
  {
    match CONTEXT.try_with(f) {
      Ok(result) => result,
      Err(error) => raise!(Error, SysInv, error),
    }
  }

  // ---------------------------------------------------------------------------
  // General API
  // ---------------------------------------------------------------------------

  /// Returns the process identifier of the calling process.
  pub fn this() -> InternalPid {
    Self::with(|this| this.readonly.mpid)
  }

  /// Returns the identifiers of all processes currently in the process table.
  ///
  /// An exiting process exists, but is not alive. That is, [`Process::alive`]
  /// returns false for an exiting process, but its identifier may still be
  /// part of the result returned from [`Process::list`].
  pub fn list() -> Vec<InternalPid> {
    bifs::proc_list()
  }

  /// Sleeps the current process for the given `timeout`.
  pub async fn sleep(timeout: Duration) {
    time::sleep(timeout).await
  }

  /// Yields execution back to the runtime.
  pub async fn yield_now() {
    task::yield_now().await;
  }

  /// Sends an exit signal with the given `reason` to `pid`.
  ///
  /// - `kill` cannot be trapped; the target terminates with `killed`.
  /// - `normal` is ignored by the target unless it traps exits, or the
  ///   target is the caller itself.
  /// - Any other reason terminates the target, or is delivered as an
  ///   [`ExitMessage`] if it traps exits.
  ///
  /// A signal to the calling process takes effect at its next suspension
  /// point.
  ///
  /// [`ExitMessage`]: crate::erts::ExitMessage
  pub fn exit(pid: InternalPid, reason: impl Into<Exit>) {
    Self::with(|this| bifs::proc_exit(this, pid, reason.into()))
  }

  /// Sends an untrappable `kill` exit signal to `pid`.
  pub fn kill(pid: InternalPid) {
    Self::exit(pid, Exit::KILL)
  }

  /// Terminates the calling process immediately with `reason`.
  ///
  /// Linked and monitoring processes observe `reason` exactly as if the
  /// process future had returned it.
  pub fn terminate(reason: impl Into<Exit>) -> ! {
    let reason: Exit = reason.into();

    Self::with(|this| tracing::trace!(pid = %this.readonly.mpid, exit = %reason, "Proc Terminate"));

    panic::resume_unwind(Box::new(reason))
  }

  /// Returns `true` if the process exists and is alive, that is, is not exiting
  /// and has not exited. Otherwise returns `false`.
  pub fn alive(pid: InternalPid) -> bool {
    bifs::proc_alive(pid)
  }

  /// Returns the process flags of the calling process.
  pub fn get_flags() -> ProcessFlags {
    Self::with(bifs::proc_get_flags)
  }

  /// Sets the process flags of the calling process.
  pub fn set_flags(flags: ProcessFlags) {
    Self::with(|this| bifs::proc_set_flags(this, flags))
  }

  /// Sets the process flag indicated to the specified value.
  ///
  /// Returns the previous value of the flag.
  pub fn set_flag(flag: ProcessFlags, value: bool) -> bool {
    Self::with(|this| bifs::proc_set_flag(this, flag, value))
  }

  /// Sets the [`TRAP_EXIT`] flag of the calling process.
  ///
  /// Returns the previous value of the flag.
  ///
  /// [`TRAP_EXIT`]: ProcessFlags::TRAP_EXIT
  pub fn trap_exit(value: bool) -> bool {
    Self::set_flag(ProcessFlags::TRAP_EXIT, value)
  }

  /// Returns information about the process identified by `pid`.
  ///
  /// Returns `None` if the process is not alive.
  pub fn info(pid: InternalPid) -> Option<ProcessInfo> {
    bifs::proc_info(pid)
  }

  // ---------------------------------------------------------------------------
  // General API - Spawning
  // ---------------------------------------------------------------------------

  /// Spawns a new process to handle `future`.
  pub fn spawn<F>(future: F) -> InternalPid
  where
    F: Future + Send + 'static,
    F::Output: Termination,
  {
    Self::spawn_opt(future, SpawnConfig::new()).pid()
  }

  /// Spawns a new process to handle `future`, linked to the caller.
  ///
  /// The link is in place before the new process runs.
  pub fn spawn_link<F>(future: F) -> InternalPid
  where
    F: Future + Send + 'static,
    F::Output: Termination,
  {
    Self::spawn_opt(future, SpawnConfig::new_link()).pid()
  }

  /// Spawns a new process to handle `future`, monitored by the caller.
  ///
  /// The monitor is in place before the new process runs.
  pub fn spawn_monitor<F>(future: F) -> (InternalPid, MonitorRef)
  where
    F: Future + Send + 'static,
    F::Output: Termination,
  {
    match Self::spawn_opt(future, SpawnConfig::new_monitor()) {
      SpawnHandle::Monitor(pid, mref) => (pid, mref),
      SpawnHandle::Process(_) => raise!(Error, SysInv, "spawn monitor without monitor"),
    }
  }

  /// Spawns a new process with the given `opts` to handle `future`.
  pub fn spawn_opt<F>(future: F, opts: SpawnConfig) -> SpawnHandle
  where
    F: Future + Send + 'static,
    F::Output: Termination,
  {
    Self::spawn_internal(future, opts).1
  }

  #[inline]
  pub(crate) fn spawn_internal<F>(future: F, opts: SpawnConfig) -> (Arc<ProcData>, SpawnHandle)
  where
    F: Future + Send + 'static,
    F::Output: Termination,
  {
    Self::with(|this| bifs::proc_spawn(this, future, opts))
  }

  // ---------------------------------------------------------------------------
  // General API - Messaging
  // ---------------------------------------------------------------------------

  /// Sends `term` to the given destination.
  ///
  /// Sending never fails: messages to dead processes or unregistered names
  /// are dropped.
  pub fn send<T>(dest: impl Into<Dest>, term: T)
  where
    T: Item,
  {
    Self::with(|this| bifs::proc_send(this, dest.into(), Term::new(term)))
  }

  /// Waits for the first message that is a `T`, or a trapped EXIT or DOWN
  /// signal.
  pub async fn receive<T>() -> Message<Box<T>>
  where
    T: 'static,
  {
    match bifs::proc_receive(DynMessage::is::<T>).await.downcast::<T>() {
      Ok(message) => message,
      Err(message) => raise!(Error, SysInv, format!("bad receive: {message:?}")),
    }
  }

  /// Waits for the first message that is exactly a `T`.
  pub async fn receive_exact<T>() -> Box<T>
  where
    T: 'static,
  {
    match bifs::proc_receive(DynMessage::is_exact::<T>).await.downcast_exact::<T>() {
      Ok(message) => message,
      Err(message) => raise!(Error, SysInv, format!("bad receive: {message:?}")),
    }
  }

  /// Same as [`Process::receive_exact`], giving up after `timeout`.
  ///
  /// # Errors
  ///
  /// Returns [`ProcessError::Timeout`] if no matching message arrived in time.
  pub async fn receive_exact_timeout<T>(timeout: Duration) -> Result<Box<T>, ProcessError>
  where
    T: 'static,
  {
    let message: DynMessage =
      bifs::proc_receive_timeout(DynMessage::is_exact::<T>, timeout).await?;

    match message.downcast_exact::<T>() {
      Ok(message) => Ok(message),
      Err(message) => raise!(Error, SysInv, format!("bad receive: {message:?}")),
    }
  }

  /// Waits for the first message in the mailbox.
  pub async fn receive_any() -> DynMessage {
    bifs::proc_receive(|_| true).await
  }

  /// Waits for the first message accepted by `filter`.
  ///
  /// Messages are scanned in arrival order; those rejected stay in the
  /// mailbox in their original order.
  pub async fn receive_match<F>(filter: F) -> DynMessage
  where
    F: Fn(&DynMessage) -> bool,
  {
    bifs::proc_receive(filter).await
  }

  /// Same as [`Process::receive_match`], giving up after `timeout`.
  ///
  /// # Errors
  ///
  /// Returns [`ProcessError::Timeout`] if no matching message arrived in time.
  pub async fn receive_timeout<F>(filter: F, timeout: Duration) -> Result<DynMessage, ProcessError>
  where
    F: Fn(&DynMessage) -> bool,
  {
    bifs::proc_receive_timeout(filter, timeout).await
  }

  // ---------------------------------------------------------------------------
  // General API - Links & Monitors
  // ---------------------------------------------------------------------------

  /// Creates a link between the calling process and the given `pid`.
  ///
  /// Links are bidirectional. If such a link exists already, or `pid` is the
  /// caller, this function does nothing. Linking to a dead process delivers
  /// a link exit signal with reason `noproc` to the caller.
  pub fn link(pid: InternalPid) {
    Self::with(|this| bifs::proc_link(this, pid))
  }

  /// Removes the link between the calling process and the given `pid`.
  ///
  /// Exit signals from `pid` arriving after this call no longer affect the
  /// caller. Does nothing if there is no such link.
  pub fn unlink(pid: InternalPid) {
    Self::with(|this| bifs::proc_unlink(this, pid))
  }

  /// Starts monitoring the given `item` from the calling process.
  ///
  /// Once the monitored process terminates, exactly one [`DownMessage`] is
  /// delivered to the caller. If the process is already dead, or the name is
  /// not registered, the message is delivered immediately with reason
  /// `noproc`.
  ///
  /// [`DownMessage`]: crate::erts::DownMessage
  pub fn monitor(item: impl Into<Dest>) -> MonitorRef {
    Self::with(|this| bifs::proc_monitor(this, item.into()))
  }

  /// Turns off the monitor identified by `mref`.
  ///
  /// Returns `true` if the monitor was still active. A DOWN message already
  /// in the mailbox is kept; use [`Process::flush_down`] to discard it.
  pub fn demonitor(mref: MonitorRef) -> bool {
    Self::with(|this| bifs::proc_demonitor(this, mref))
  }

  /// Removes a pending DOWN message for `mref` from the mailbox.
  ///
  /// Returns `true` if one was removed.
  pub fn flush_down(mref: MonitorRef) -> bool {
    Self::with(|this| bifs::proc_flush_down(this, mref))
  }

  // ---------------------------------------------------------------------------
  // General API - Local Name Registration
  // ---------------------------------------------------------------------------

  /// Registers the given `pid` under the given `name`.
  ///
  /// The name is released when the process terminates.
  ///
  /// # Errors
  ///
  /// - [`ProcessError::NoSuchProcess`] if the process is not alive
  /// - [`ProcessError::NameTaken`] if the name is registered, or the process
  ///   already has a name
  ///
  /// # Panics
  ///
  /// Raises a `BadArg` exception if `name` is `undefined`.
  pub fn register(pid: InternalPid, name: impl Into<Atom>) -> Result<(), ProcessError> {
    bifs::proc_register(pid, name.into())
  }

  /// Removes the registered `name`, associated with a PID.
  ///
  /// # Errors
  ///
  /// Returns [`ProcessError::NotRegistered`] if the name is not registered.
  pub fn unregister(name: impl Into<Atom>) -> Result<(), ProcessError> {
    bifs::proc_unregister(name.into())
  }

  /// Returns the PID under `name`, or `None` if the name is not registered.
  pub fn whereis(name: impl Into<Atom>) -> Option<InternalPid> {
    bifs::proc_whereis(name.into())
  }

  /// Returns all registered names.
  pub fn registered() -> Vec<Atom> {
    bifs::proc_registered()
  }
}
