use std::thread;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;
use tracing::Level;

use crate::consts;

// -----------------------------------------------------------------------------
// Runtime
// -----------------------------------------------------------------------------

/// Host queries used by the runtime.
pub struct Runtime;

impl Runtime {
  /// Returns the parallelism reported by the host, or
  /// [`DEFAULT_PARALLELISM`] when it cannot be determined.
  ///
  /// [`DEFAULT_PARALLELISM`]: crate::consts::DEFAULT_PARALLELISM
  pub fn available_cpus() -> usize {
    thread::available_parallelism().map_or(consts::DEFAULT_PARALLELISM, |count| count.get())
  }

  /// Returns the wall-clock time since the Unix epoch.
  ///
  /// A clock set before the epoch reads as zero.
  pub fn time() -> Duration {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default()
  }
}

// -----------------------------------------------------------------------------
// Runtime Config
// -----------------------------------------------------------------------------

/// Settings of the runtime started by [`init::block_on_opts`].
///
/// Fields prefixed `rt_` configure the tokio runtime, fields prefixed
/// `tracing_` the log subscriber installed by the `tracing` feature. The
/// subscriber is installed by the first runtime of the OS process; later
/// runtimes keep it.
///
/// ```
/// use spindle::erts::RuntimeConfig;
/// use tracing::Level;
///
/// let config: RuntimeConfig = RuntimeConfig::new()
///   .with_worker_threads(2)
///   .with_tracing_level(Level::WARN);
///
/// assert_eq!(config.rt_worker_threads, 2);
/// ```
///
/// [`init::block_on_opts`]: crate::init::block_on_opts
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
  pub rt_event_interval: u32,
  pub rt_global_queue_interval: u32,
  pub rt_max_blocking_threads: usize,
  pub rt_shutdown_timeout: Duration,
  pub rt_thread_keep_alive: Duration,
  pub rt_thread_stack_size: usize,
  pub rt_worker_threads: usize,
  /// Most verbose level recorded.
  pub tracing_level: Level,
  /// Include the source file and line of each event.
  pub tracing_location: bool,
  /// Include the module path of each event.
  pub tracing_target: bool,
  /// Include the worker thread name and id of each event.
  pub tracing_thread_info: bool,
}

impl RuntimeConfig {
  #[inline]
  pub fn new() -> Self {
    Self {
      rt_event_interval: consts::DEFAULT_EVENT_INTERVAL,
      rt_global_queue_interval: consts::DEFAULT_GLOBAL_QUEUE_INTERVAL,
      rt_max_blocking_threads: consts::DEFAULT_MAX_BLOCKING_THREADS,
      rt_shutdown_timeout: consts::SHUTDOWN_TIMEOUT,
      rt_thread_keep_alive: consts::DEFAULT_THREAD_KEEP_ALIVE,
      rt_thread_stack_size: consts::DEFAULT_THREAD_STACK_SIZE,
      rt_worker_threads: Runtime::available_cpus(),
      tracing_level: Level::INFO,
      tracing_location: false,
      tracing_target: false,
      tracing_thread_info: true,
    }
  }

  /// Sets the number of tokio worker threads; zero is raised to one.
  #[inline]
  pub fn with_worker_threads(mut self, value: usize) -> Self {
    self.rt_worker_threads = value.max(1);
    self
  }

  #[inline]
  pub fn with_shutdown_timeout(mut self, value: Duration) -> Self {
    self.rt_shutdown_timeout = value;
    self
  }

  #[inline]
  pub fn with_tracing_level(mut self, value: Level) -> Self {
    self.tracing_level = value;
    self
  }
}

impl Default for RuntimeConfig {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;
  use tracing::Level;

  use crate::erts::Runtime;
  use crate::erts::RuntimeConfig;

  #[test]
  fn test_available_cpus() {
    assert!(Runtime::available_cpus() >= 1);
  }

  #[test]
  fn test_time_advances() {
    assert!(Runtime::time() > Duration::ZERO);
  }

  #[test]
  fn test_builder() {
    let config: RuntimeConfig = RuntimeConfig::default()
      .with_worker_threads(0)
      .with_shutdown_timeout(Duration::from_secs(1))
      .with_tracing_level(Level::TRACE);

    assert_eq!(config.rt_worker_threads, 1);
    assert_eq!(config.rt_shutdown_timeout, Duration::from_secs(1));
    assert_eq!(config.tracing_level, Level::TRACE);
  }
}
