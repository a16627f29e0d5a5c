//! State held by a process and accessed through serialized requests.
//!
//! An agent is a process whose receive loop owns a single state value. Every
//! operation is a closure shipped to the agent and applied to the state in
//! mailbox order, so concurrent callers never observe a partial update.
//!
//! # Examples
//!
//! ```no_run
//! use spindle::agent::Agent;
//! use spindle::init;
//!
//! init::block_on(async {
//!   let pid = Agent::start(|| 0_u32, None).await?;
//!
//!   Agent::update(pid, |count: u32| count + 1).await?;
//!
//!   assert_eq!(Agent::get(pid, |count: &u32| *count).await?, 1);
//!
//!   Ok::<(), spindle::error::ProcessError>(())
//! });
//! ```

use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::time::Duration;

use crate::consts::DEFAULT_CALL_TIMEOUT;
use crate::core::Atom;
use crate::core::Dest;
use crate::core::Exit;
use crate::core::InternalPid;
use crate::core::MonitorRef;
use crate::core::Parcel;
use crate::error::ProcessError;
use crate::erts::DynMessage;
use crate::erts::Message;
use crate::erts::Process;
use crate::erts::SpawnConfig;
use crate::erts::SpawnHandle;
use crate::raise;

// -----------------------------------------------------------------------------
// Agent Protocol
// -----------------------------------------------------------------------------

type Update<S> = Box<dyn FnOnce(S) -> S + Send>;

/// Request applied to the agent state. Calls reply from inside the closure.
struct Request<S> {
  update: Update<S>,
}

/// Request to terminate the agent with the given reason.
#[derive(Clone, Debug, PartialEq)]
struct Stop {
  reason: Exit,
}

/// Acknowledgement sent by a starting agent.
#[derive(Clone, Debug, PartialEq)]
struct Started {
  pid: InternalPid,
  result: Result<(), ProcessError>,
}

/// Reply to a synchronous call, tagged with the caller's monitor.
struct Reply<R> {
  mref: MonitorRef,
  value: Parcel<R>,
}

impl<R> Clone for Reply<R> {
  fn clone(&self) -> Self {
    Self {
      mref: self.mref,
      value: self.value.clone(),
    }
  }
}

impl<R> PartialEq for Reply<R> {
  fn eq(&self, other: &Self) -> bool {
    self.mref == other.mref && self.value == other.value
  }
}

impl<R> Debug for Reply<R> {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct("Reply").field("mref", &self.mref).finish_non_exhaustive()
  }
}

// -----------------------------------------------------------------------------
// @api - Agent
// -----------------------------------------------------------------------------

/// Agent API.
///
/// All functions must be called from inside a process. `target` is either
/// the agent's PID or a name it is registered under.
pub struct Agent;

impl Agent {
  /// Starts an agent whose state is produced by `init`.
  ///
  /// If `name` is given the agent registers itself under it before running
  /// `init`; the name is released when the agent terminates.
  ///
  /// # Errors
  ///
  /// - [`ProcessError::NameTaken`] if `name` is already registered
  /// - [`ProcessError::AbnormalExit`] if `init` fails
  pub async fn start<S, F>(init: F, name: Option<Atom>) -> Result<InternalPid, ProcessError>
  where
    S: Send + 'static,
    F: FnOnce() -> S + Send + 'static,
  {
    start_opt(init, name, SpawnConfig::new_monitor()).await
  }

  /// Starts an agent linked to the caller.
  ///
  /// See [`Agent::start`].
  ///
  /// # Errors
  ///
  /// - [`ProcessError::NameTaken`] if `name` is already registered
  /// - [`ProcessError::AbnormalExit`] if `init` fails
  pub async fn start_link<S, F>(init: F, name: Option<Atom>) -> Result<InternalPid, ProcessError>
  where
    S: Send + 'static,
    F: FnOnce() -> S + Send + 'static,
  {
    start_opt(init, name, SpawnConfig {
      link: true,
      ..SpawnConfig::new_monitor()
    })
    .await
  }

  /// Returns `func` applied to the agent state.
  ///
  /// # Errors
  ///
  /// - [`ProcessError::NoSuchProcess`] if the agent does not exist
  /// - [`ProcessError::AbnormalExit`] if the agent exits during the call
  /// - [`ProcessError::Timeout`] if no reply arrives within
  ///   [`DEFAULT_CALL_TIMEOUT`]
  pub async fn get<S, R, F>(target: impl Into<Dest>, func: F) -> Result<R, ProcessError>
  where
    S: Send + 'static,
    R: Send + 'static,
    F: FnOnce(&S) -> R + Send + 'static,
  {
    Self::get_timeout(target, func, DEFAULT_CALL_TIMEOUT).await
  }

  /// Same as [`Agent::get`] with an explicit `timeout`.
  ///
  /// # Errors
  ///
  /// See [`Agent::get`].
  pub async fn get_timeout<S, R, F>(
    target: impl Into<Dest>,
    func: F,
    timeout: Duration,
  ) -> Result<R, ProcessError>
  where
    S: Send + 'static,
    R: Send + 'static,
    F: FnOnce(&S) -> R + Send + 'static,
  {
    call(target.into(), timeout, move |state: S| (func(&state), state)).await
  }

  /// Replaces the agent state with `func` applied to it.
  ///
  /// Returns once the update has been applied.
  ///
  /// # Errors
  ///
  /// See [`Agent::get`].
  pub async fn update<S, F>(target: impl Into<Dest>, func: F) -> Result<(), ProcessError>
  where
    S: Send + 'static,
    F: FnOnce(S) -> S + Send + 'static,
  {
    Self::update_timeout(target, func, DEFAULT_CALL_TIMEOUT).await
  }

  /// Same as [`Agent::update`] with an explicit `timeout`.
  ///
  /// # Errors
  ///
  /// See [`Agent::get`].
  pub async fn update_timeout<S, F>(
    target: impl Into<Dest>,
    func: F,
    timeout: Duration,
  ) -> Result<(), ProcessError>
  where
    S: Send + 'static,
    F: FnOnce(S) -> S + Send + 'static,
  {
    call(target.into(), timeout, move |state: S| ((), func(state))).await
  }

  /// Updates the agent state and returns a value computed in the same step.
  ///
  /// `func` returns `(reply, new_state)`.
  ///
  /// # Errors
  ///
  /// See [`Agent::get`].
  pub async fn get_and_update<S, R, F>(target: impl Into<Dest>, func: F) -> Result<R, ProcessError>
  where
    S: Send + 'static,
    R: Send + 'static,
    F: FnOnce(S) -> (R, S) + Send + 'static,
  {
    Self::get_and_update_timeout(target, func, DEFAULT_CALL_TIMEOUT).await
  }

  /// Same as [`Agent::get_and_update`] with an explicit `timeout`.
  ///
  /// # Errors
  ///
  /// See [`Agent::get`].
  pub async fn get_and_update_timeout<S, R, F>(
    target: impl Into<Dest>,
    func: F,
    timeout: Duration,
  ) -> Result<R, ProcessError>
  where
    S: Send + 'static,
    R: Send + 'static,
    F: FnOnce(S) -> (R, S) + Send + 'static,
  {
    call(target.into(), timeout, func).await
  }

  /// Updates the agent state without waiting for the update to happen.
  ///
  /// Requests to dead agents or unregistered names are dropped.
  pub fn cast<S, F>(target: impl Into<Dest>, func: F)
  where
    S: Send + 'static,
    F: FnOnce(S) -> S + Send + 'static,
  {
    let request: Request<S> = Request {
      update: Box::new(func),
    };

    Process::send(target, Parcel::new(request));
  }

  /// Stops the agent with `reason` and waits for it to terminate.
  ///
  /// # Errors
  ///
  /// - [`ProcessError::NoSuchProcess`] if the agent does not exist
  /// - [`ProcessError::AbnormalExit`] if the agent exits with another reason
  /// - [`ProcessError::Timeout`] if the agent is still alive after
  ///   [`DEFAULT_CALL_TIMEOUT`]
  pub async fn stop(target: impl Into<Dest>, reason: impl Into<Exit>) -> Result<(), ProcessError> {
    Self::stop_timeout(target, reason, DEFAULT_CALL_TIMEOUT).await
  }

  /// Same as [`Agent::stop`] with an explicit `timeout`.
  ///
  /// # Errors
  ///
  /// See [`Agent::stop`].
  pub async fn stop_timeout(
    target: impl Into<Dest>,
    reason: impl Into<Exit>,
    timeout: Duration,
  ) -> Result<(), ProcessError> {
    let reason: Exit = reason.into();
    let pid: InternalPid = resolve(target.into())?;
    let mref: MonitorRef = Process::monitor(pid);

    Process::send(pid, Stop {
      reason: reason.clone(),
    });

    match Process::receive_timeout(|message| message.is_down_for(mref), timeout).await {
      Ok(DynMessage::Down(down)) if *down.reason() == reason => Ok(()),
      Ok(DynMessage::Down(down)) => Err(down_error(down.reason().clone())),
      Ok(message) => raise!(Error, SysInv, format!("bad agent message: {message:?}")),
      Err(error) => {
        Process::demonitor(mref);
        Process::flush_down(mref);
        Err(error)
      }
    }
  }
}

// -----------------------------------------------------------------------------
// Internal Utilities
// -----------------------------------------------------------------------------

async fn start_opt<S, F>(init: F, name: Option<Atom>, opts: SpawnConfig) -> Result<InternalPid, ProcessError>
where
  S: Send + 'static,
  F: FnOnce() -> S + Send + 'static,
{
  let parent: InternalPid = Process::this();

  let SpawnHandle::Monitor(pid, mref) = Process::spawn_opt(agent_main(init, name, parent), opts) else {
    raise!(Error, SysInv, "agent spawned without monitor");
  };

  let filter = |message: &DynMessage| {
    message.is_down_for(mref) || message.matches::<Started>(|started| started.pid == pid)
  };

  let message: DynMessage = match Process::receive_match(filter).await {
    Message::Down(down) => return Err(ProcessError::AbnormalExit(down.reason().clone())),
    message => message,
  };

  Process::demonitor(mref);
  Process::flush_down(mref);

  match message.downcast_exact::<Started>() {
    Ok(started) => started.result.map(|()| pid),
    Err(message) => raise!(Error, SysInv, format!("bad agent message: {message:?}")),
  }
}

async fn agent_main<S, F>(init: F, name: Option<Atom>, parent: InternalPid) -> Exit
where
  S: Send + 'static,
  F: FnOnce() -> S + Send + 'static,
{
  let this: InternalPid = Process::this();

  if let Some(name) = name {
    if let Err(error) = Process::register(this, name) {
      Process::send(parent, Started { pid: this, result: Err(error) });
      return Exit::NORMAL;
    }
  }

  let state: S = init();

  Process::send(parent, Started { pid: this, result: Ok(()) });

  agent_loop(state).await
}

async fn agent_loop<S>(mut state: S) -> Exit
where
  S: Send + 'static,
{
  loop {
    let message: DynMessage = match Process::receive_any().await.downcast_exact::<Parcel<Request<S>>>() {
      Ok(request) => match request.take() {
        Some(Request { update }) => {
          state = update(state);
          continue;
        }
        None => continue,
      },
      Err(message) => message,
    };

    match message.downcast_exact::<Stop>() {
      Ok(stop) => break stop.reason,
      Err(message) => {
        tracing::warn!(pid = %Process::this(), ?message, "agent discarded unexpected message");
      }
    }
  }
}

/// Runs `func` in the agent and waits for its reply.
async fn call<S, R, F>(target: Dest, timeout: Duration, func: F) -> Result<R, ProcessError>
where
  S: Send + 'static,
  R: Send + 'static,
  F: FnOnce(S) -> (R, S) + Send + 'static,
{
  let pid: InternalPid = resolve(target)?;
  let mref: MonitorRef = Process::monitor(pid);
  let from: InternalPid = Process::this();

  let update: Update<S> = Box::new(move |state: S| {
    let (value, state): (R, S) = func(state);

    Process::send(from, Reply {
      mref,
      value: Parcel::new(value),
    });

    state
  });

  Process::send(pid, Parcel::new(Request { update }));

  let filter = |message: &DynMessage| {
    message.is_down_for(mref) || message.matches::<Reply<R>>(|reply| reply.mref == mref)
  };

  let message: DynMessage = match Process::receive_timeout(filter, timeout).await {
    Ok(Message::Down(down)) => return Err(down_error(down.reason().clone())),
    Ok(message) => message,
    Err(error) => {
      Process::demonitor(mref);
      Process::flush_down(mref);
      return Err(error);
    }
  };

  Process::demonitor(mref);
  Process::flush_down(mref);

  match message.downcast_exact::<Reply<R>>() {
    Ok(reply) => match reply.value.take() {
      Some(value) => Ok(value),
      None => raise!(Error, SysInv, "agent reply taken twice"),
    },
    Err(message) => raise!(Error, SysInv, format!("bad agent message: {message:?}")),
  }
}

#[inline]
fn resolve(target: Dest) -> Result<InternalPid, ProcessError> {
  match target {
    Dest::Pid(pid) => Ok(pid),
    Dest::Name(name) => Process::whereis(name).ok_or(ProcessError::NoSuchProcess),
  }
}

#[inline]
fn down_error(reason: Exit) -> ProcessError {
  if reason.is_noproc() {
    ProcessError::NoSuchProcess
  } else {
    ProcessError::AbnormalExit(reason)
  }
}
