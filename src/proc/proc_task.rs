use std::ops::Deref;
use triomphe::Arc;

use crate::bifs;
use crate::proc::ProcData;
use crate::proc::ProcRecv;

// -----------------------------------------------------------------------------
// Proc Task
// -----------------------------------------------------------------------------

/// Task-local handle to the running process.
///
/// Available to code executing inside a process through `Process::with`.
#[derive(Debug)]
#[repr(transparent)]
pub(crate) struct ProcTask {
  pub(crate) inner: Arc<ProcData>,
}

impl ProcTask {
  #[inline]
  pub(crate) fn new(inner: Arc<ProcData>) -> Self {
    Self { inner }
  }
}

impl Deref for ProcTask {
  type Target = ProcData;

  #[inline]
  fn deref(&self) -> &Self::Target {
    &self.inner
  }
}

// -----------------------------------------------------------------------------
// Proc Guard
// -----------------------------------------------------------------------------

/// Owner of the receiving end of a process signal queue.
///
/// Lives inside the process task and runs termination cleanup when the task
/// finishes or is dropped by the runtime, so a process is always removed
/// exactly once no matter how it stops.
#[derive(Debug)]
pub(crate) struct ProcGuard {
  pub(crate) proc: Arc<ProcData>,
  pub(crate) recv: ProcRecv,
}

impl ProcGuard {
  #[inline]
  pub(crate) fn new(proc: Arc<ProcData>, recv: ProcRecv) -> Self {
    Self { proc, recv }
  }
}

impl Drop for ProcGuard {
  fn drop(&mut self) {
    bifs::proc_remove(&self.proc, &mut self.recv);
  }
}
