use std::any::Any;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

use crate::core::Dest;
use crate::core::Exit;
use crate::core::InternalPid;
use crate::core::MonitorRef;
use crate::core::Term;

pub type DynMessage = Message<Term>;

// -----------------------------------------------------------------------------
// Message
// -----------------------------------------------------------------------------

/// A process message.
///
/// User values arrive as `Term`; trapped exit signals and monitor
/// notifications use the reserved `Exit` and `Down` shapes.
#[derive(Clone, PartialEq)]
pub enum Message<T = Term> {
  Term(T),
  Exit(ExitMessage),
  Down(DownMessage),
}

impl<T> Message<T> {
  /// Returns `true` if the message is a term.
  #[inline]
  pub fn is_term(&self) -> bool {
    matches!(self, Self::Term(_))
  }

  /// Returns `true` if the message is a trapped EXIT signal.
  #[inline]
  pub fn is_exit(&self) -> bool {
    matches!(self, Self::Exit(_))
  }

  /// Returns `true` if the message is a DOWN signal.
  #[inline]
  pub fn is_down(&self) -> bool {
    matches!(self, Self::Down(_))
  }

  /// Returns `true` if the message is a trapped EXIT signal from `pid`.
  #[inline]
  pub fn is_exit_from(&self, pid: InternalPid) -> bool {
    matches!(self, Self::Exit(exit) if exit.from() == pid)
  }

  /// Returns `true` if the message is the DOWN signal for `mref`.
  #[inline]
  pub fn is_down_for(&self, mref: MonitorRef) -> bool {
    matches!(self, Self::Down(down) if down.mref() == mref)
  }

  /// Returns the term value, if this is a term message.
  #[inline]
  pub fn into_term(self) -> Option<T> {
    match self {
      Self::Term(inner) => Some(inner),
      Self::Exit(_) | Self::Down(_) => None,
    }
  }
}

impl Message<Term> {
  /// Returns `true` if the message value is a `T`,
  /// or the message is a trapped EXIT or DOWN signal.
  #[inline]
  pub fn is<T>(&self) -> bool
  where
    T: 'static,
  {
    match self {
      Self::Term(inner) => inner.is::<T>(),
      Self::Exit(_) => true,
      Self::Down(_) => true,
    }
  }

  /// Returns `true` if the message value is exactly a `T`.
  ///
  /// `ExitMessage` and `DownMessage` match their reserved shapes.
  #[inline]
  pub fn is_exact<T>(&self) -> bool
  where
    T: 'static,
  {
    match self {
      Self::Term(inner) => inner.is::<T>(),
      Self::Exit(inner) => (inner as &dyn Any).is::<T>(),
      Self::Down(inner) => (inner as &dyn Any).is::<T>(),
    }
  }

  /// Returns `true` if the message is a term of type `T` accepted by `filter`.
  ///
  /// ```
  /// use spindle::core::Term;
  /// use spindle::erts::DynMessage;
  ///
  /// let message: DynMessage = DynMessage::Term(Term::new(("add", 2_i32, 3_i32)));
  ///
  /// assert!(message.matches::<(&str, i32, i32)>(|msg| matches!(msg, ("add", _, _))));
  /// assert!(!message.matches::<(&str, i32, i32)>(|msg| matches!(msg, ("sub", _, _))));
  /// ```
  #[inline]
  pub fn matches<T>(&self, filter: impl FnOnce(&T) -> bool) -> bool
  where
    T: 'static,
  {
    match self {
      Self::Term(inner) => inner.downcast_ref::<T>().is_some_and(filter),
      Self::Exit(_) | Self::Down(_) => false,
    }
  }

  /// Converts the term into a `Box<T>`, keeping EXIT and DOWN signals.
  ///
  /// Returns the original message if the term is not a `T`.
  #[inline]
  pub fn downcast<T>(self) -> Result<Message<Box<T>>, Self>
  where
    T: 'static,
  {
    match self {
      Self::Term(inner) => inner.downcast::<T>().map(Message::Term).map_err(Self::Term),
      Self::Exit(inner) => Ok(Message::Exit(inner)),
      Self::Down(inner) => Ok(Message::Down(inner)),
    }
  }

  /// Converts the message into exactly a `Box<T>`.
  ///
  /// Returns the original message if it does not hold a `T`.
  #[inline]
  pub fn downcast_exact<T>(self) -> Result<Box<T>, Self>
  where
    T: 'static,
  {
    match self {
      Self::Term(inner) => inner.downcast::<T>().map_err(Self::Term),
      Self::Exit(inner) => downcast_boxed(Box::new(inner)).map_err(|inner| Self::Exit(*inner)),
      Self::Down(inner) => downcast_boxed(Box::new(inner)).map_err(|inner| Self::Down(*inner)),
    }
  }
}

impl<T> Debug for Message<T>
where
  T: Debug,
{
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    match self {
      Self::Term(inner) => Debug::fmt(inner, f),
      Self::Exit(inner) => Debug::fmt(inner, f),
      Self::Down(inner) => Debug::fmt(inner, f),
    }
  }
}

impl From<Term> for Message<Term> {
  #[inline]
  fn from(other: Term) -> Self {
    Self::Term(other)
  }
}

impl<T> From<ExitMessage> for Message<T> {
  #[inline]
  fn from(other: ExitMessage) -> Self {
    Self::Exit(other)
  }
}

impl<T> From<DownMessage> for Message<T> {
  #[inline]
  fn from(other: DownMessage) -> Self {
    Self::Down(other)
  }
}

// -----------------------------------------------------------------------------
// Exit Message
// -----------------------------------------------------------------------------

/// A trapped EXIT signal.
#[derive(Clone, Debug, PartialEq)]
pub struct ExitMessage {
  from: InternalPid,
  reason: Exit,
}

impl ExitMessage {
  #[inline]
  pub(crate) const fn new(from: InternalPid, reason: Exit) -> Self {
    Self { from, reason }
  }

  /// Returns the EXIT signal sender.
  #[inline]
  pub const fn from(&self) -> InternalPid {
    self.from
  }

  /// Returns the exit reason.
  #[inline]
  pub const fn reason(&self) -> &Exit {
    &self.reason
  }
}

// -----------------------------------------------------------------------------
// Down Message
// -----------------------------------------------------------------------------

/// A monitor DOWN notification.
#[derive(Clone, Debug, PartialEq)]
pub struct DownMessage {
  mref: MonitorRef,
  from: InternalPid,
  item: Dest,
  reason: Exit,
}

impl DownMessage {
  #[inline]
  pub(crate) const fn new(mref: MonitorRef, from: InternalPid, item: Dest, reason: Exit) -> Self {
    Self {
      mref,
      from,
      item,
      reason,
    }
  }

  /// Returns the monitor reference.
  #[inline]
  pub const fn mref(&self) -> MonitorRef {
    self.mref
  }

  /// Returns the PID of the monitored process.
  ///
  /// A monitor on a name that was not registered reports `#PID<0.0.0>`.
  #[inline]
  pub const fn from(&self) -> InternalPid {
    self.from
  }

  /// Returns the monitored item, as given to `monitor`.
  #[inline]
  pub const fn item(&self) -> Dest {
    self.item
  }

  /// Returns the exit reason of the monitored process.
  #[inline]
  pub const fn reason(&self) -> &Exit {
    &self.reason
  }
}

// -----------------------------------------------------------------------------
// Misc. Utilities
// -----------------------------------------------------------------------------

#[inline]
fn downcast_boxed<S, T>(value: Box<S>) -> Result<Box<T>, Box<S>>
where
  S: 'static,
  T: 'static,
{
  let value: Box<dyn Any> = value;

  match value.downcast::<T>() {
    Ok(value) => Ok(value),
    Err(value) => match value.downcast::<S>() {
      Ok(value) => Err(value),
      Err(_) => unreachable!(),
    },
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use crate::core::Dest;
  use crate::core::Exit;
  use crate::core::InternalPid;
  use crate::core::MonitorRef;
  use crate::core::Term;
  use crate::erts::DownMessage;
  use crate::erts::DynMessage;
  use crate::erts::ExitMessage;
  use crate::erts::Message;

  #[test]
  fn test_is() {
    let term: DynMessage = DynMessage::Term(Term::new(1_u32));
    let exit: DynMessage = DynMessage::Exit(ExitMessage::new(InternalPid::UNDEFINED, Exit::NORMAL));

    assert!(term.is::<u32>());
    assert!(!term.is::<i32>());
    assert!(exit.is::<i32>());
    assert!(!exit.is_exact::<i32>());
    assert!(exit.is_exact::<ExitMessage>());
  }

  #[test]
  fn test_is_down_for() {
    let mref: MonitorRef = MonitorRef::new();
    let down: DynMessage = DownMessage::new(mref, InternalPid::UNDEFINED, Dest::Pid(InternalPid::UNDEFINED), Exit::NOPROC).into();

    assert!(down.is_down_for(mref));
    assert!(!down.is_down_for(MonitorRef::new()));
    assert!(!down.is_exit_from(InternalPid::UNDEFINED));
  }

  #[test]
  fn test_downcast() {
    let message: DynMessage = DynMessage::Term(Term::new(String::from("hello")));
    let message: DynMessage = message.downcast::<u32>().unwrap_err();

    match message.downcast::<String>() {
      Ok(Message::Term(value)) => assert_eq!(*value, "hello"),
      _ => panic!("expected term"),
    }
  }

  #[test]
  fn test_downcast_exact_reserved() {
    let message: DynMessage = ExitMessage::new(InternalPid::UNDEFINED, Exit::KILLED).into();
    let message: DynMessage = message.downcast_exact::<DownMessage>().unwrap_err();
    let exit: Box<ExitMessage> = message.downcast_exact::<ExitMessage>().unwrap();

    assert!(exit.reason().is_killed());
  }
}
