use tokio::sync::oneshot;
use tracing::Span;

use crate::core::Exit;
use crate::core::InternalPid;
use crate::core::Parcel;
use crate::error::ProcessError;
use crate::erts::DynMessage;
use crate::erts::Process;
use crate::raise;

/// Root process of a [`block_on`] call.
///
/// Traps exits, runs `future` in a linked application process and replies
/// with its output once the application has exited.
///
/// [`block_on`]: crate::init::block_on
pub(crate) async fn task<F>(future: F, reply: oneshot::Sender<Result<F::Output, ProcessError>>)
where
  F: Future + Send + 'static,
  F::Output: Send + 'static,
{
  let this: InternalPid = Process::this();
  let span: Span = tracing::debug_span!(target: "spindle", "kernel", %this);

  tracing::debug!(target: "spindle", parent: &span, "initializing");

  let output: Parcel<F::Output> = Parcel::empty();
  let writer: Parcel<F::Output> = output.clone();

  let app: InternalPid = Process::spawn_link(async move {
    writer.put(future.await);
  });

  tracing::debug!(target: "spindle", parent: &span, %app, "polling");

  let reason: Exit = match Process::receive_match(|message| message.is_exit_from(app)).await {
    DynMessage::Exit(exit) => exit.reason().clone(),
    message => raise!(Error, SysInv, format!("bad kernel message: {message:?}")),
  };

  tracing::debug!(target: "spindle", parent: &span, %app, exit = %reason, "EXIT received");

  let result: Result<F::Output, ProcessError> = match output.take() {
    Some(value) if reason.is_normal() => Ok(value),
    _ => Err(ProcessError::AbnormalExit(reason)),
  };

  if reply.send(result).is_err() {
    tracing::trace!(target: "spindle", parent: &span, result = "ignored", reason = "caller gone");
  }

  tracing::debug!(target: "spindle", parent: &span, "exiting");
}
