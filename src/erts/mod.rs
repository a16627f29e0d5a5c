//! Process API and runtime types of the Spindle runtime system.

mod message;
mod process;
mod process_info;
mod runtime;
mod signal;
mod spawn;
mod termination;

pub(crate) use self::signal::Signal;
pub(crate) use self::signal::SignalDemonitor;
pub(crate) use self::signal::SignalEmit;
pub(crate) use self::signal::SignalExit;
pub(crate) use self::signal::SignalLink;
pub(crate) use self::signal::SignalLinkExit;
pub(crate) use self::signal::SignalMonitor;
pub(crate) use self::signal::SignalMonitorDown;
pub(crate) use self::signal::SignalRecv;
pub(crate) use self::signal::SignalSend;
pub(crate) use self::signal::SignalUnlink;
pub(crate) use self::signal::SignalUnlinkAck;

pub use self::message::DownMessage;
pub use self::message::DynMessage;
pub use self::message::ExitMessage;
pub use self::message::Message;
pub use self::process::Process;
pub use self::process_info::ProcessFlags;
pub use self::process_info::ProcessInfo;
pub use self::process_info::ProcessStatus;
pub use self::runtime::Runtime;
pub use self::runtime::RuntimeConfig;
pub use self::spawn::SpawnConfig;
pub use self::spawn::SpawnHandle;
pub use self::termination::Termination;
