//! Runtime entry points.
//!
//! [`block_on`] builds a tokio multi-threaded runtime, runs the given future
//! as the application process under a kernel process, and shuts the runtime
//! down once the application has exited.

mod kernel;

use std::fmt::Display;
use std::sync::Once;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::runtime::Builder;
use tokio::runtime::Runtime as TokioRuntime;
use tokio::sync::oneshot;
use tracing::Span;
use triomphe::Arc;

use crate::bifs;
use crate::core::Exit;
use crate::error::Exception;
use crate::error::ExceptionClass;
use crate::error::ExceptionGroup;
use crate::error::ProcessError;
use crate::erts::RuntimeConfig;
use crate::erts::SpawnConfig;
use crate::proc::ProcData;
use crate::proc::ProcExit;
use crate::raise;
use crate::utils::measure;

type Reply<T> = Result<T, ProcessError>;

/// Runs the given future to completion on the Spindle runtime system.
///
/// This is the same as calling `block_on_opts(future, Default::default())`.
///
/// # Errors
///
/// Returns [`ProcessError::AbnormalExit`] if the application process exits
/// abnormally, for example because it panicked or received an exit signal.
#[inline]
pub fn block_on<F>(future: F) -> Result<F::Output, ProcessError>
where
  F: Future + Send + 'static,
  F::Output: Send + 'static,
{
  block_on_opts(future, Default::default())
}

/// Runs the given future to completion on the Spindle runtime system,
/// configured by `config`.
///
/// The future runs inside a process, so the whole [`Process`] API is
/// available to it. When it returns, processes still running are dropped
/// and the runtime is shut down.
///
/// # Errors
///
/// Returns [`ProcessError::AbnormalExit`] if the application process exits
/// abnormally.
///
/// # Panics
///
/// Raises a `SysCap` exception if the tokio runtime cannot be built.
///
/// [`Process`]: crate::erts::Process
pub fn block_on_opts<F>(future: F, config: RuntimeConfig) -> Result<F::Output, ProcessError>
where
  F: Future + Send + 'static,
  F::Output: Send + 'static,
{
  init_tracing_subscriber(&config);

  let span: Span = tracing::debug_span!(target: "spindle", "init::block_on");

  let runtime: TokioRuntime = match build_tokio_runtime(&config) {
    Ok(runtime) => runtime,
    Err(error) => {
      tracing::error!(target: "spindle", parent: &span, error = error.message(), "failed to build runtime");
      raise!(Error, SysCap, error);
    }
  };

  let result: Reply<F::Output> = runtime.block_on(async {
    tracing::debug!(target: "spindle", parent: &span, "initializing");

    let (send, recv): (oneshot::Sender<Reply<F::Output>>, oneshot::Receiver<Reply<F::Output>>) =
      oneshot::channel();

    let options: SpawnConfig = SpawnConfig {
      trap_exit: true,
      ..SpawnConfig::new()
    };

    let kernel: Arc<ProcData> = bifs::proc_spawn_root(kernel::task(future, send), options);

    tracing::debug!(target: "spindle", parent: &span, kernel = %kernel.readonly.mpid, "polling");

    match recv.await {
      Ok(result) => result,
      Err(_) => Err(ProcessError::AbnormalExit(kernel_exit(&kernel))),
    }
  });

  tracing::debug!(
    target: "spindle",
    parent: &span,
    timeout = ?config.rt_shutdown_timeout,
    "system stopping",
  );

  let ((), elapsed): ((), Duration) = measure(|| runtime.shutdown_timeout(config.rt_shutdown_timeout));

  tracing::debug!(target: "spindle", parent: &span, elapsed = ?elapsed, "system stopped");

  result
}

/// Returns the exit reason of a kernel that died without replying.
fn kernel_exit(kernel: &ProcData) -> Exit {
  match kernel.termination() {
    Some(ProcExit { exit, .. }) => exit,
    None => Exit::SHUTDOWN,
  }
}

/// Installs the global tracing subscriber, once per OS process.
fn init_tracing_subscriber(config: &RuntimeConfig) {
  static INIT: Once = Once::new();

  INIT.call_once(|| {
    if let Err(error) = build_tracing_subscriber(config) {
      eprintln!("failed to set tracing subscriber:");
      eprintln!("    {}", error.message());
    }
  });
}

#[cfg(feature = "tracing")]
fn build_tracing_subscriber(config: &RuntimeConfig) -> Result<(), Exception> {
  use tracing_subscriber::FmtSubscriber;
  use tracing_subscriber::fmt::format;
  use tracing_subscriber::util::SubscriberInitExt;

  FmtSubscriber::builder()
    .event_format(format().compact())
    .log_internal_errors(true)
    .with_ansi(true)
    .with_file(config.tracing_location)
    .with_level(true)
    .with_line_number(config.tracing_location)
    .with_max_level(config.tracing_level)
    .with_target(config.tracing_target)
    .with_thread_ids(config.tracing_thread_info)
    .with_thread_names(config.tracing_thread_info)
    .finish()
    .try_init()
    .map_err(error)
}

#[cfg(not(feature = "tracing"))]
fn build_tracing_subscriber(_config: &RuntimeConfig) -> Result<(), Exception> {
  Ok(())
}

/// Builds the tokio multi-threaded runtime with the given configuration.
fn build_tokio_runtime(config: &RuntimeConfig) -> Result<TokioRuntime, Exception> {
  Builder::new_multi_thread()
    .enable_time()
    .event_interval(config.rt_event_interval)
    .global_queue_interval(config.rt_global_queue_interval)
    .max_blocking_threads(config.rt_max_blocking_threads)
    .thread_keep_alive(config.rt_thread_keep_alive)
    .thread_name_fn(next_worker_name)
    .thread_stack_size(config.rt_thread_stack_size)
    .worker_threads(config.rt_worker_threads)
    .build()
    .map_err(error)
}

/// Generates a unique name for the next worker thread.
#[inline]
fn next_worker_name() -> String {
  static ID: AtomicU32 = AtomicU32::new(1);
  format!("spindle-worker-{:0>2}", ID.fetch_add(1, Ordering::Relaxed))
}

/// Returns a generic `SysCap` exception with the given error message.
#[cold]
fn error<E>(error: E) -> Exception
where
  E: Display,
{
  Exception::new(ExceptionClass::Error, ExceptionGroup::SysCap, error)
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
