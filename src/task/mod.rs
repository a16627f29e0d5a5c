//! A process wrapped with a single-assignment result slot.
//!
//! # Examples
//!
//! ```no_run
//! use spindle::init;
//! use spindle::task::Task;
//!
//! init::block_on(async {
//!   let task: Task<i32> = Task::spawn(async { 2 + 3 });
//!
//!   assert_eq!(task.join().await, Ok(5));
//! });
//! ```

use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::time::Duration;
use triomphe::Arc;

use crate::core::Exit;
use crate::core::InternalPid;
use crate::core::MonitorRef;
use crate::core::Parcel;
use crate::error::ProcessError;
use crate::erts::DynMessage;
use crate::erts::Process;
use crate::erts::SpawnConfig;
use crate::erts::SpawnHandle;
use crate::proc::ExitCause;
use crate::proc::ProcData;
use crate::raise;

/// Handle to a spawned computation whose output is awaited by its creator.
///
/// The task process is monitored by the process that spawned it; the handle
/// must be joined from that process. Joining consumes the handle, so a
/// result is read at most once.
pub struct Task<T> {
  mpid: InternalPid,
  mref: MonitorRef,
  slot: Parcel<T>,
  proc: Arc<ProcData>,
}

impl<T> Task<T>
where
  T: Send + 'static,
{
  /// Spawns a process running `future`.
  ///
  /// The output is stored as the final action of the process, which then
  /// terminates with reason `normal`.
  pub fn spawn<F>(future: F) -> Self
  where
    F: Future<Output = T> + Send + 'static,
  {
    let slot: Parcel<T> = Parcel::empty();
    let writer: Parcel<T> = slot.clone();

    let task = async move {
      writer.put(future.await);
    };

    let (proc, handle): (Arc<ProcData>, SpawnHandle) =
      Process::spawn_internal(task, SpawnConfig::new_monitor());

    let SpawnHandle::Monitor(mpid, mref) = handle else {
      raise!(Error, SysInv, "task spawned without monitor");
    };

    Self {
      mpid,
      mref,
      slot,
      proc,
    }
  }

  /// Returns the PID of the task process.
  #[inline]
  pub fn pid(&self) -> InternalPid {
    self.mpid
  }

  /// Waits for the task to finish and returns its output.
  ///
  /// # Errors
  ///
  /// - [`ProcessError::AbnormalExit`] if the task exits abnormally
  /// - [`ProcessError::LinkPropagatedExit`] if the task was taken down by a
  ///   linked process
  pub async fn join(self) -> Result<T, ProcessError> {
    let message: DynMessage = Process::receive_match(|message| message.is_down_for(self.mref)).await;

    self.complete(message)
  }

  /// Same as [`Task::join`], giving up after `timeout`.
  ///
  /// On timeout the monitor is removed and the task keeps running.
  ///
  /// # Errors
  ///
  /// Returns [`ProcessError::Timeout`] if the task did not finish in time,
  /// otherwise see [`Task::join`].
  pub async fn join_timeout(self, timeout: Duration) -> Result<T, ProcessError> {
    let result: Result<DynMessage, ProcessError> =
      Process::receive_timeout(|message| message.is_down_for(self.mref), timeout).await;

    match result {
      Ok(message) => self.complete(message),
      Err(error) => {
        Process::demonitor(self.mref);
        Process::flush_down(self.mref);
        Err(error)
      }
    }
  }

  /// Kills the task and waits for it to terminate.
  ///
  /// Returns the output if the task finished before it was killed.
  pub async fn shutdown(self) -> Option<T> {
    Process::exit(self.mpid, Exit::KILL);

    let _down: DynMessage = Process::receive_match(|message| message.is_down_for(self.mref)).await;

    self.slot.take()
  }

  fn complete(self, message: DynMessage) -> Result<T, ProcessError> {
    let reason: Exit = match message {
      DynMessage::Down(down) => down.reason().clone(),
      message => raise!(Error, SysInv, format!("bad task message: {message:?}")),
    };

    if reason.is_normal() {
      if let Some(value) = self.slot.take() {
        return Ok(value);
      }
    }

    match self.proc.termination() {
      Some(record) if matches!(record.cause, ExitCause::Link) => {
        Err(ProcessError::LinkPropagatedExit(reason))
      }
      _ => Err(ProcessError::AbnormalExit(reason)),
    }
  }
}

impl<T> Debug for Task<T> {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct("Task")
      .field("pid", &self.mpid)
      .field("mref", &self.mref)
      .finish_non_exhaustive()
  }
}
