// Signal Handling
//
// Every interaction between processes travels as a signal through the
// receiver's queue. The owning process moves signals out of the queue in
// order and applies them to its own control block; termination cleanup
// applies whatever is left with the same handlers.
use hashbrown::hash_map::Entry;
use tracing::Span;
use tracing::span;

use crate::bifs;
use crate::core::Dest;
use crate::core::Exit;
use crate::core::InternalPid;
use crate::core::MonitorRef;
use crate::erts::DownMessage;
use crate::erts::DynMessage;
use crate::erts::ExitMessage;
use crate::proc::ExitCause;
use crate::proc::ProcExit;
use crate::proc::ProcInternal;
use crate::proc::ProcLink;
use crate::proc::ProcMonitor;
use crate::proc::ProcReadOnly;

// -----------------------------------------------------------------------------
// Signal Emit
// -----------------------------------------------------------------------------

/// Trait for sending signals to a process.
pub(crate) trait SignalEmit {
  /// Enqueues this signal in the signal queue of `to`.
  ///
  /// Returns `false` if the target has closed its queue.
  fn emit(self, to: &ProcReadOnly) -> bool;
}

// -----------------------------------------------------------------------------
// Signal Recv
// -----------------------------------------------------------------------------

/// Trait for processing received signals.
pub(crate) trait SignalRecv {
  /// Applies this signal to the receiving process.
  ///
  /// Returns the termination record if the signal kills the process.
  fn recv(self, readonly: &ProcReadOnly, internal: &mut ProcInternal) -> Option<ProcExit>;
}

// -----------------------------------------------------------------------------
// Termination Notice
// -----------------------------------------------------------------------------

/// Outcome of an exit or down signal for the receiving process.
#[derive(Debug)]
pub(crate) enum TerminationNotice {
  /// The receiver terminates.
  Kill(ProcExit),
  /// The receiver gets an `Exit` or `Down` message.
  Message(DynMessage),
}

impl TerminationNotice {
  /// Resolves an exit signal sent with `Process::exit`.
  fn exit(
    readonly: &ProcReadOnly,
    internal: &ProcInternal,
    from: InternalPid,
    exit: Exit,
  ) -> Option<Self> {
    if exit.is_kill() {
      tracing::trace!(result = "terminated", reason = "killed");
      return Some(Self::Kill(ProcExit::new(Exit::KILLED, ExitCause::Signal)));
    }

    if internal.is_trapping() {
      tracing::trace!(result = "trapped", reason = "proc flag");
      return Some(Self::Message(ExitMessage::new(from, exit).into()));
    }

    if !exit.is_normal() {
      tracing::trace!(result = "terminated", reason = "custom");
      return Some(Self::Kill(ProcExit::new(exit, ExitCause::Signal)));
    }

    if from == readonly.mpid {
      tracing::trace!(result = "terminated", reason = "self-destruct");
      return Some(Self::Kill(ProcExit::new(exit, ExitCause::Signal)));
    }

    tracing::trace!(result = "ignored", reason = "normal");

    None
  }

  /// Resolves an exit signal propagated from a linked process.
  ///
  /// Consumes the link; signals from unknown or disabled links are ignored.
  fn link_exit(internal: &mut ProcInternal, from: InternalPid, exit: Exit) -> Option<Self> {
    match internal.links.entry(from) {
      Entry::Occupied(entry) if entry.get().is_enabled() => {
        entry.remove();
      }
      Entry::Occupied(_) => {
        tracing::trace!(result = "ignored", reason = "link disabled");
        return None;
      }
      Entry::Vacant(_) => {
        tracing::trace!(result = "ignored", reason = "no link");
        return None;
      }
    }

    if internal.is_trapping() {
      tracing::trace!(result = "trapped", reason = "proc flag");
      return Some(Self::Message(ExitMessage::new(from, exit).into()));
    }

    if exit.is_normal() {
      tracing::trace!(result = "ignored", reason = "normal");
      return None;
    }

    tracing::trace!(result = "terminated", reason = "link");

    Some(Self::Kill(ProcExit::new(exit, ExitCause::Link)))
  }

  /// Resolves a down signal for a monitor held by the receiver.
  ///
  /// Consumes the monitor; signals for unknown refs are ignored.
  fn down(internal: &mut ProcInternal, mref: MonitorRef, exit: Exit) -> Option<Self> {
    let Some(state) = internal.monitor_send.remove(&mref) else {
      tracing::trace!(result = "ignored", reason = "no monitor");
      return None;
    };

    tracing::trace!(result = "handled", reason = "good mref");

    Some(Self::Message(DownMessage::new(mref, state.peer(), state.target(), exit).into()))
  }

  /// Applies the notice to the receiver.
  fn apply(self, internal: &mut ProcInternal) -> Option<ProcExit> {
    match self {
      Self::Kill(exit) => Some(exit),
      Self::Message(message) => {
        internal.inbox.push_reserved(message);
        None
      }
    }
  }
}

// -----------------------------------------------------------------------------
// Signal
// -----------------------------------------------------------------------------

/// Signal sent between processes.
#[derive(Clone, Debug)]
pub(crate) enum Signal {
  /// Regular user message.
  Send(SignalSend),
  /// Exit signal sent with `Process::exit`.
  Exit(SignalExit),
  /// Establish a link between processes.
  Link(SignalLink),
  /// Exit signal from a linked process.
  LinkExit(SignalLinkExit),
  /// Request to unlink from a process.
  Unlink(SignalUnlink),
  /// Acknowledgment of unlink request.
  UnlinkAck(SignalUnlinkAck),
  /// Establish a monitor on a process.
  Monitor(SignalMonitor),
  /// Notification that a monitored process terminated.
  MonitorDown(SignalMonitorDown),
  /// Remove a monitor on a process.
  Demonitor(SignalDemonitor),
}

impl Signal {
  /// Returns the signal name used in trace spans.
  #[inline]
  const fn kind(&self) -> &'static str {
    match self {
      Self::Send(_) => "send",
      Self::Exit(_) => "exit",
      Self::Link(_) => "link",
      Self::LinkExit(_) => "link exit",
      Self::Unlink(_) => "unlink",
      Self::UnlinkAck(_) => "unlink ack",
      Self::Monitor(_) => "monitor",
      Self::MonitorDown(_) => "monitor down",
      Self::Demonitor(_) => "demonitor",
    }
  }

  /// Returns the sender PID.
  #[inline]
  const fn from(&self) -> InternalPid {
    match self {
      Self::Send(signal) => signal.from,
      Self::Exit(signal) => signal.from,
      Self::Link(signal) => signal.from,
      Self::LinkExit(signal) => signal.from,
      Self::Unlink(signal) => signal.from,
      Self::UnlinkAck(signal) => signal.from,
      Self::Monitor(signal) => signal.from,
      Self::MonitorDown(signal) => signal.from,
      Self::Demonitor(signal) => signal.from,
    }
  }
}

impl SignalRecv for Signal {
  fn recv(self, readonly: &ProcReadOnly, internal: &mut ProcInternal) -> Option<ProcExit> {
    let span: Span = tracing::trace_span!(
      "Proc Signal",
      pid = %readonly.mpid,
      kind = %self.kind(),
      from = %self.from(),
    );

    let _enter: span::Entered<'_> = span.enter();

    match self {
      Self::Send(signal) => signal.recv(readonly, internal),
      Self::Exit(signal) => signal.recv(readonly, internal),
      Self::Link(signal) => signal.recv(readonly, internal),
      Self::LinkExit(signal) => signal.recv(readonly, internal),
      Self::Unlink(signal) => signal.recv(readonly, internal),
      Self::UnlinkAck(signal) => signal.recv(readonly, internal),
      Self::Monitor(signal) => signal.recv(readonly, internal),
      Self::MonitorDown(signal) => signal.recv(readonly, internal),
      Self::Demonitor(signal) => signal.recv(readonly, internal),
    }
  }
}

macro_rules! impl_signal {
  ($variant:ident, $signal:ident) => {
    impl SignalEmit for $signal {
      #[inline]
      fn emit(self, to: &ProcReadOnly) -> bool {
        to.send_signal(Signal::$variant(self))
      }
    }

    impl From<$signal> for Signal {
      #[inline]
      fn from(other: $signal) -> Self {
        Self::$variant(other)
      }
    }
  };
}

impl_signal!(Send, SignalSend);
impl_signal!(Exit, SignalExit);
impl_signal!(Link, SignalLink);
impl_signal!(LinkExit, SignalLinkExit);
impl_signal!(Unlink, SignalUnlink);
impl_signal!(UnlinkAck, SignalUnlinkAck);
impl_signal!(Monitor, SignalMonitor);
impl_signal!(MonitorDown, SignalMonitorDown);
impl_signal!(Demonitor, SignalDemonitor);

// -----------------------------------------------------------------------------
// Signal - Send
// -----------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub(crate) struct SignalSend {
  from: InternalPid,
  data: DynMessage,
}

impl SignalSend {
  #[inline]
  pub(crate) const fn new(from: InternalPid, data: DynMessage) -> Self {
    Self { from, data }
  }
}

impl SignalRecv for SignalSend {
  fn recv(self, _readonly: &ProcReadOnly, internal: &mut ProcInternal) -> Option<ProcExit> {
    if internal.inbox.push(self.data) {
      tracing::trace!(result = "enqueue");
    } else {
      tracing::warn!(from = %self.from, result = "dropped", reason = "mailbox full");
    }

    None
  }
}

// -----------------------------------------------------------------------------
// Signal - Exit
// -----------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub(crate) struct SignalExit {
  from: InternalPid,
  exit: Exit,
}

impl SignalExit {
  #[inline]
  pub(crate) const fn new(from: InternalPid, exit: Exit) -> Self {
    Self { from, exit }
  }
}

impl SignalRecv for SignalExit {
  /// `kill` always terminates with `killed`. With `trap_exit` set, anything
  /// else becomes an EXIT message. Otherwise `normal` only terminates a
  /// process that sent it to itself, and any other reason terminates.
  fn recv(self, readonly: &ProcReadOnly, internal: &mut ProcInternal) -> Option<ProcExit> {
    tracing::trace!(exit = %self.exit);

    TerminationNotice::exit(readonly, internal, self.from, self.exit)
      .and_then(|notice| notice.apply(internal))
  }
}

// -----------------------------------------------------------------------------
// Signal - Link
// -----------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub(crate) struct SignalLink {
  from: InternalPid,
}

impl SignalLink {
  #[inline]
  pub(crate) const fn new(from: InternalPid) -> Self {
    Self { from }
  }
}

impl SignalRecv for SignalLink {
  fn recv(self, _readonly: &ProcReadOnly, internal: &mut ProcInternal) -> Option<ProcExit> {
    match internal.links.entry(self.from) {
      Entry::Occupied(_) => {
        tracing::trace!(result = "ignored", reason = "old link");
      }
      Entry::Vacant(entry) => {
        entry.insert(ProcLink::new());
        tracing::trace!(result = "handled", reason = "new link");
      }
    }

    None
  }
}

// -----------------------------------------------------------------------------
// Signal - LinkExit
// -----------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub(crate) struct SignalLinkExit {
  from: InternalPid,
  exit: Exit,
}

impl SignalLinkExit {
  #[inline]
  pub(crate) const fn new(from: InternalPid, exit: Exit) -> Self {
    Self { from, exit }
  }
}

impl SignalRecv for SignalLinkExit {
  fn recv(self, _readonly: &ProcReadOnly, internal: &mut ProcInternal) -> Option<ProcExit> {
    tracing::trace!(from = %self.from, exit = %self.exit);

    TerminationNotice::link_exit(internal, self.from, self.exit)
      .and_then(|notice| notice.apply(internal))
  }
}

// -----------------------------------------------------------------------------
// Signal - Unlink
// -----------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub(crate) struct SignalUnlink {
  from: InternalPid,
  ulid: u64,
}

impl SignalUnlink {
  #[inline]
  pub(crate) const fn new(from: InternalPid, ulid: u64) -> Self {
    Self { from, ulid }
  }
}

impl SignalRecv for SignalUnlink {
  /// Removes the link and acknowledges the request.
  ///
  /// If both sides unlink at the same time, each one sees the other side's
  /// request on a disabled link and leaves it to the acknowledgment.
  fn recv(self, readonly: &ProcReadOnly, internal: &mut ProcInternal) -> Option<ProcExit> {
    tracing::trace!(ulid = self.ulid);

    match internal.links.entry(self.from) {
      Entry::Occupied(entry) => {
        if entry.get().is_disabled() {
          tracing::trace!(result = "ignored", reason = "link disabled");
        } else {
          entry.remove();
          tracing::trace!(result = "handled");
        }
      }
      Entry::Vacant(_) => {
        tracing::trace!(result = "ignored", reason = "no link");
      }
    }

    if let Some(proc) = bifs::proc_find(self.from) {
      proc.readonly.send_unlink_ack(readonly.mpid, self.ulid);
    }

    None
  }
}

// -----------------------------------------------------------------------------
// Signal - UnlinkAck
// -----------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub(crate) struct SignalUnlinkAck {
  from: InternalPid,
  ulid: u64,
}

impl SignalUnlinkAck {
  #[inline]
  pub(crate) const fn new(from: InternalPid, ulid: u64) -> Self {
    Self { from, ulid }
  }
}

impl SignalRecv for SignalUnlinkAck {
  /// Completes the unlink if the ID matches; a stale acknowledgment for a
  /// re-enabled or newer unlink is ignored.
  fn recv(self, _readonly: &ProcReadOnly, internal: &mut ProcInternal) -> Option<ProcExit> {
    tracing::trace!(ulid = self.ulid);

    match internal.links.entry(self.from) {
      Entry::Occupied(entry) if entry.get().matches(self.ulid) => {
        entry.remove();
        tracing::trace!(result = "handled", reason = "fresh ulid");
      }
      Entry::Occupied(_) => {
        tracing::trace!(result = "ignored", reason = "stale ulid");
      }
      Entry::Vacant(_) => {
        tracing::trace!(result = "ignored", reason = "no link");
      }
    }

    None
  }
}

// -----------------------------------------------------------------------------
// Signal - Monitor
// -----------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub(crate) struct SignalMonitor {
  from: InternalPid,
  mref: MonitorRef,
  item: Dest,
}

impl SignalMonitor {
  #[inline]
  pub(crate) const fn new(from: InternalPid, mref: MonitorRef, item: Dest) -> Self {
    Self { from, mref, item }
  }
}

impl SignalRecv for SignalMonitor {
  fn recv(self, _readonly: &ProcReadOnly, internal: &mut ProcInternal) -> Option<ProcExit> {
    tracing::trace!(mref = %self.mref, item = %self.item);

    match internal.monitor_recv.entry(self.mref) {
      Entry::Occupied(_) => {
        tracing::trace!(result = "ignored", reason = "occupied");
      }
      Entry::Vacant(entry) => {
        entry.insert(ProcMonitor::new(self.from, self.item));
        tracing::trace!(result = "handled");
      }
    }

    None
  }
}

// -----------------------------------------------------------------------------
// Signal - MonitorDown
// -----------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub(crate) struct SignalMonitorDown {
  from: InternalPid,
  mref: MonitorRef,
  exit: Exit,
}

impl SignalMonitorDown {
  #[inline]
  pub(crate) const fn new(from: InternalPid, mref: MonitorRef, exit: Exit) -> Self {
    Self { from, mref, exit }
  }
}

impl SignalRecv for SignalMonitorDown {
  fn recv(self, _readonly: &ProcReadOnly, internal: &mut ProcInternal) -> Option<ProcExit> {
    tracing::trace!(from = %self.from, mref = %self.mref, exit = %self.exit);

    TerminationNotice::down(internal, self.mref, self.exit)
      .and_then(|notice| notice.apply(internal))
  }
}

// -----------------------------------------------------------------------------
// Signal - Demonitor
// -----------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub(crate) struct SignalDemonitor {
  from: InternalPid,
  mref: MonitorRef,
}

impl SignalDemonitor {
  #[inline]
  pub(crate) const fn new(from: InternalPid, mref: MonitorRef) -> Self {
    Self { from, mref }
  }
}

impl SignalRecv for SignalDemonitor {
  fn recv(self, _readonly: &ProcReadOnly, internal: &mut ProcInternal) -> Option<ProcExit> {
    tracing::trace!(from = %self.from, mref = %self.mref);

    if internal.monitor_recv.remove(&self.mref).is_some() {
      tracing::trace!(result = "handled", reason = "good mref");
    } else {
      tracing::trace!(result = "ignored", reason = "no monitor");
    }

    None
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use std::num::NonZeroUsize;

  use crate::core::Atom;
  use crate::core::Dest;
  use crate::core::Exit;
  use crate::core::InternalPid;
  use crate::core::MonitorRef;
  use crate::core::Term;
  use crate::erts::DynMessage;
  use crate::erts::ProcessFlags;
  use crate::erts::SignalExit;
  use crate::erts::SignalLink;
  use crate::erts::SignalLinkExit;
  use crate::erts::SignalMonitorDown;
  use crate::erts::SignalRecv;
  use crate::erts::SignalSend;
  use crate::erts::SignalUnlinkAck;
  use crate::proc::ExitCause;
  use crate::proc::ProcExit;
  use crate::proc::ProcInternal;
  use crate::proc::ProcMonitor;
  use crate::proc::ProcReadOnly;
  use crate::proc::unbounded_channel;

  const PEER: InternalPid = InternalPid::from_bits(u64::MAX);

  fn setup(flags: ProcessFlags) -> (ProcReadOnly, ProcInternal) {
    let (send, _recv) = unbounded_channel();
    let readonly: ProcReadOnly = ProcReadOnly::new(InternalPid::next(), send, None);
    let internal: ProcInternal = ProcInternal::new(flags, None);

    (readonly, internal)
  }

  fn take(internal: &mut ProcInternal) -> Option<DynMessage> {
    internal.inbox.poll(|_| true, &mut 0)
  }

  #[test]
  fn test_exit_kill_untrappable() {
    let (readonly, mut internal) = setup(ProcessFlags::TRAP_EXIT);
    let exit: Option<ProcExit> = SignalExit::new(PEER, Exit::KILL).recv(&readonly, &mut internal);

    let exit: ProcExit = exit.unwrap();

    assert_eq!(exit.exit, Exit::KILLED);
    assert_eq!(exit.cause, ExitCause::Signal);
  }

  #[test]
  fn test_exit_normal_from_peer_ignored() {
    let (readonly, mut internal) = setup(ProcessFlags::empty());

    assert!(SignalExit::new(PEER, Exit::NORMAL).recv(&readonly, &mut internal).is_none());
    assert_eq!(internal.inbox.len(), 0);
  }

  #[test]
  fn test_exit_normal_from_self_terminates() {
    let (readonly, mut internal) = setup(ProcessFlags::empty());
    let mpid: InternalPid = readonly.mpid;

    assert!(SignalExit::new(mpid, Exit::NORMAL).recv(&readonly, &mut internal).is_some());
  }

  #[test]
  fn test_exit_trapped() {
    let (readonly, mut internal) = setup(ProcessFlags::TRAP_EXIT);

    assert!(SignalExit::new(PEER, Exit::from("boom")).recv(&readonly, &mut internal).is_none());
    assert!(take(&mut internal).unwrap().is_exit_from(PEER));
  }

  #[test]
  fn test_link_exit_requires_link() {
    let (readonly, mut internal) = setup(ProcessFlags::empty());

    assert!(SignalLinkExit::new(PEER, Exit::from("boom")).recv(&readonly, &mut internal).is_none());

    SignalLink::new(PEER).recv(&readonly, &mut internal);

    let exit: ProcExit = SignalLinkExit::new(PEER, Exit::from("boom"))
      .recv(&readonly, &mut internal)
      .unwrap();

    assert_eq!(exit.exit, Exit::from("boom"));
    assert_eq!(exit.cause, ExitCause::Link);
    assert!(internal.links.is_empty());
  }

  #[test]
  fn test_link_exit_normal_ignored() {
    let (readonly, mut internal) = setup(ProcessFlags::empty());

    SignalLink::new(PEER).recv(&readonly, &mut internal);

    assert!(SignalLinkExit::new(PEER, Exit::NORMAL).recv(&readonly, &mut internal).is_none());
    assert_eq!(internal.inbox.len(), 0);
  }

  #[test]
  fn test_link_exit_disabled_ignored() {
    let (readonly, mut internal) = setup(ProcessFlags::empty());

    SignalLink::new(PEER).recv(&readonly, &mut internal);

    if let Some(link) = internal.links.get_mut(&PEER) {
      link.disable(9);
    }

    assert!(SignalLinkExit::new(PEER, Exit::from("boom")).recv(&readonly, &mut internal).is_none());

    SignalUnlinkAck::new(PEER, 9).recv(&readonly, &mut internal);

    assert!(internal.links.is_empty());
  }

  #[test]
  fn test_monitor_down_once() {
    let (readonly, mut internal) = setup(ProcessFlags::empty());
    let mref: MonitorRef = MonitorRef::new();

    internal
      .monitor_send
      .insert(mref, ProcMonitor::new(PEER, Dest::Pid(PEER)));

    SignalMonitorDown::new(PEER, mref, Exit::NOPROC).recv(&readonly, &mut internal);
    SignalMonitorDown::new(PEER, mref, Exit::NOPROC).recv(&readonly, &mut internal);

    assert_eq!(internal.inbox.len(), 1);
    assert!(take(&mut internal).unwrap().is_down_for(mref));
  }

  #[test]
  fn test_monitor_down_carries_peer() {
    let (readonly, mut internal) = setup(ProcessFlags::empty());
    let mref: MonitorRef = MonitorRef::new();
    let name: Dest = Dest::Name(Atom::new("signal_down_peer"));

    internal.monitor_send.insert(mref, ProcMonitor::new(PEER, name));

    SignalMonitorDown::new(PEER, mref, Exit::KILLED).recv(&readonly, &mut internal);

    match take(&mut internal) {
      Some(DynMessage::Down(down)) => {
        assert_eq!(down.from(), PEER);
        assert_eq!(down.item(), name);
      }
      other => panic!("expected DOWN, got {other:?}"),
    }
  }

  #[test]
  fn test_notices_bypass_mailbox_limit() {
    let (send, _recv) = unbounded_channel();
    let readonly: ProcReadOnly = ProcReadOnly::new(InternalPid::next(), send, None);
    let mut internal: ProcInternal =
      ProcInternal::new(ProcessFlags::TRAP_EXIT, NonZeroUsize::new(1));
    let mref: MonitorRef = MonitorRef::new();

    internal
      .monitor_send
      .insert(mref, ProcMonitor::new(PEER, Dest::Pid(PEER)));

    SignalSend::new(PEER, DynMessage::Term(Term::new(1_u8))).recv(&readonly, &mut internal);
    SignalSend::new(PEER, DynMessage::Term(Term::new(2_u8))).recv(&readonly, &mut internal);

    assert_eq!(internal.inbox.len(), 1);

    SignalExit::new(PEER, Exit::from("boom")).recv(&readonly, &mut internal);
    SignalMonitorDown::new(PEER, mref, Exit::NOPROC).recv(&readonly, &mut internal);

    assert_eq!(internal.inbox.len(), 3);
  }
}
