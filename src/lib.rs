//! Spindle - lightweight processes with mailboxes, links and monitors.
//!
//! Spindle runs isolated processes on a tokio multi-threaded runtime. A
//! process owns its state and talks to other processes only by sending
//! messages. Failures spread along links and are observed through
//! monitors, so supervision can be built from plain processes.
//!
//! # Quick Start
//!
//! ```no_run
//! use spindle::erts::Process;
//! use spindle::init;
//!
//! init::block_on(async {
//!   let pid = Process::spawn(async {
//!     let name: Box<String> = Process::receive_exact().await;
//!     println!("Hello, {name}!");
//!   });
//!
//!   Process::send(pid, String::from("process"));
//! })
//! .unwrap();
//! ```
//!
//! # Modules
//!
//! - [`init`]: Runtime entry point
//! - [`erts`]: Process API and runtime configuration
//! - [`agent`]: State behind serialized requests
//! - [`task`]: Awaitable one-shot computations
//! - [`core`]: Core types (PIDs, atoms, terms, references)
//! - [`error`]: Exceptions and process errors
//! - [`consts`]: Runtime defaults

mod bifs;
mod proc;
mod sched;
mod utils;

pub mod agent;
pub mod consts;
pub mod core;
pub mod error;
pub mod erts;
pub mod init;
pub mod task;
