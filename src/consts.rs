//! Limits and defaults of the runtime.

use std::time::Duration;

// -----------------------------------------------------------------------------
// Atoms
// -----------------------------------------------------------------------------

/// Longest accepted atom, in bytes.
pub const MAX_ATOM_BYTES: usize = 255;

/// Number of distinct atoms the global table can hold.
pub const MAX_ATOM_COUNT: usize = 1 << 20;

// -----------------------------------------------------------------------------
// Processes
// -----------------------------------------------------------------------------

/// Initial `trap_exit` flag of a spawned process.
pub const SPAWN_INIT_TRAP_EXIT: bool = false;

/// Timeout of [`Agent`] calls that do not name one.
///
/// [`Agent`]: crate::agent::Agent
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// Initial capacity of a process mailbox.
pub const CAP_PROC_MSG_BUFFER: usize = 8;

/// Initial capacity of the process table.
pub const CAP_REGISTERED_PROCS: usize = 1 << 10;

/// Initial capacity of the name registry.
pub const CAP_REGISTERED_NAMES: usize = 1 << 6;

// -----------------------------------------------------------------------------
// Runtime
// -----------------------------------------------------------------------------

/// Worker count used when the host does not report its parallelism.
pub const DEFAULT_PARALLELISM: usize = 1;

/// Ticks between polls of the I/O and timer drivers.
pub const DEFAULT_EVENT_INTERVAL: u32 = 61;

/// Ticks between polls of the shared injection queue.
pub const DEFAULT_GLOBAL_QUEUE_INTERVAL: u32 = 31;

/// Upper bound of the blocking thread pool.
pub const DEFAULT_MAX_BLOCKING_THREADS: usize = 512;

/// Idle time after which a blocking thread exits.
pub const DEFAULT_THREAD_KEEP_ALIVE: Duration = Duration::from_secs(10);

/// Worker thread stack size, in bytes.
pub const DEFAULT_THREAD_STACK_SIZE: usize = 2 << 20;

/// Time allowed for tasks to wind down when the runtime stops.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);
