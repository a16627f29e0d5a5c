use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::num::NonZeroUsize;
use tokio::sync::Notify;
use tokio::sync::mpsc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::error::TryRecvError;
use triomphe::Arc;

use crate::consts::CAP_PROC_MSG_BUFFER;
use crate::erts::DynMessage;
use crate::erts::Signal;

// -----------------------------------------------------------------------------
// Proc Mail
// -----------------------------------------------------------------------------

/// Ordered mailbox supporting selective dequeue.
///
/// Messages keep their arrival order and leave the mailbox only through a
/// matching receive. Each message is stamped with a sequence number on
/// arrival; receive markers refer to sequence numbers, so they stay valid
/// when another receive of the same process removes messages. Waiters are
/// woken through a shared [`Notify`] whenever a message is appended.
pub(crate) struct ProcMail {
  mqueue: Vec<(u64, DynMessage)>,
  sequence: u64,
  notify: Arc<Notify>,
  limit: Option<NonZeroUsize>,
}

impl ProcMail {
  #[inline]
  pub(crate) fn new(limit: Option<NonZeroUsize>) -> Self {
    Self {
      mqueue: Vec::with_capacity(CAP_PROC_MSG_BUFFER),
      sequence: 0,
      notify: Arc::new(Notify::new()),
      limit,
    }
  }

  /// Returns the number of queued messages.
  #[inline]
  pub(crate) fn len(&self) -> usize {
    self.mqueue.len()
  }

  /// Returns the notifier signalled on every successful push.
  #[inline]
  pub(crate) fn notify(&self) -> Arc<Notify> {
    Arc::clone(&self.notify)
  }

  /// Appends a user message to the end of the mailbox.
  ///
  /// Returns `false` and drops the message if the mailbox limit is reached.
  #[inline]
  pub(crate) fn push(&mut self, message: DynMessage) -> bool {
    if let Some(limit) = self.limit
      && self.mqueue.len() >= limit.get()
    {
      return false;
    }

    self.push_reserved(message);

    true
  }

  /// Appends an EXIT or DOWN notice, ignoring the mailbox limit.
  #[inline]
  pub(crate) fn push_reserved(&mut self, message: DynMessage) {
    self.mqueue.push((self.sequence, message));
    self.sequence += 1;
    self.notify.notify_waiters();
  }

  /// Removes and returns the first message accepted by `filter`.
  ///
  /// Only messages that arrived at or after `marker` are inspected. When
  /// nothing matches, `marker` is moved past every queued message so a later
  /// call only inspects new arrivals. A zero marker scans the whole mailbox.
  #[inline]
  pub(crate) fn poll<F>(&mut self, filter: F, marker: &mut u64) -> Option<DynMessage>
  where
    F: Fn(&DynMessage) -> bool,
  {
    let start: usize = self.mqueue.partition_point(|(sequence, _)| *sequence < *marker);

    for index in start..self.mqueue.len() {
      if filter(&self.mqueue[index].1) {
        return Some(self.mqueue.remove(index).1);
      }
    }

    *marker = self.sequence;

    None
  }

  /// Drops every queued message.
  #[inline]
  pub(crate) fn clear(&mut self) {
    self.mqueue.clear();
  }
}

impl Debug for ProcMail {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.write_str("ProcMail ")?;
    f.debug_list().entries(self.mqueue.iter().map(|(_, message)| message)).finish()
  }
}

// -----------------------------------------------------------------------------
// Proc Recv
// -----------------------------------------------------------------------------

#[repr(transparent)]
pub(crate) struct ProcRecv {
  inner: UnboundedReceiver<Signal>,
}

impl ProcRecv {
  #[inline]
  pub(crate) async fn recv(&mut self) -> Option<Signal> {
    self.inner.recv().await
  }

  #[inline]
  pub(crate) fn try_recv(&mut self) -> Result<Signal, TryRecvError> {
    self.inner.try_recv()
  }

  /// Closes the queue; any further send fails.
  ///
  /// Signals already queued remain available through [`try_recv`].
  ///
  /// [`try_recv`]: Self::try_recv
  #[inline]
  pub(crate) fn close(&mut self) {
    self.inner.close();
  }
}

impl Debug for ProcRecv {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.write_str("ProcRecv(..)")
  }
}

// -----------------------------------------------------------------------------
// Proc Send
// -----------------------------------------------------------------------------

#[derive(Clone)]
#[repr(transparent)]
pub(crate) struct ProcSend {
  inner: UnboundedSender<Signal>,
}

impl ProcSend {
  /// Enqueues `signal`.
  ///
  /// Returns `false` if the receiving process has closed its queue.
  #[inline]
  pub(crate) fn send(&self, signal: Signal) -> bool {
    self.inner.send(signal).is_ok()
  }
}

impl Debug for ProcSend {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.write_str("ProcSend(..)")
  }
}

// -----------------------------------------------------------------------------
// Misc. Utilities
// -----------------------------------------------------------------------------

#[inline]
pub(crate) fn unbounded_channel() -> (ProcSend, ProcRecv) {
  let channel: _ = mpsc::unbounded_channel();
  let proc_send: ProcSend = ProcSend { inner: channel.0 };
  let proc_recv: ProcRecv = ProcRecv { inner: channel.1 };

  (proc_send, proc_recv)
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
