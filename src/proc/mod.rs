//! Process control blocks.
//!
//! A [`ProcData`] is shared between the task running the process and every
//! process that signals it. Its state is partitioned by who touches it:
//!
//! - [`ProcReadOnly`] is fixed at spawn (pid, parent, signal sender).
//! - [`ProcInternal`] belongs to the running task (links, monitors,
//!   mailbox, flags) and sits behind a mutex.
//! - [`ProcExternal`] is read by other processes (status, name, exit
//!   record) and sits behind a read-write lock.
//!
//! Signals travel over a per-process unbounded channel ([`ProcSend`] and
//! [`ProcRecv`]); delivered messages land in [`ProcMail`].

mod proc_data;
mod proc_link;
mod proc_task;
mod sig_queue;

pub(crate) use self::proc_data::ExitCause;
pub(crate) use self::proc_data::ProcData;
pub(crate) use self::proc_data::ProcExit;
pub(crate) use self::proc_data::ProcExternal;
pub(crate) use self::proc_data::ProcInternal;
pub(crate) use self::proc_data::ProcReadOnly;
pub(crate) use self::proc_link::ProcLink;
pub(crate) use self::proc_link::ProcMonitor;
pub(crate) use self::proc_task::ProcGuard;
pub(crate) use self::proc_task::ProcTask;
pub(crate) use self::sig_queue::ProcMail;
pub(crate) use self::sig_queue::ProcRecv;
pub(crate) use self::sig_queue::ProcSend;
pub(crate) use self::sig_queue::unbounded_channel;
