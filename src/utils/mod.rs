//! Utility types and functions used throughout the runtime.
//!
//! # Contents
//!
//! - [`CatchUnwind`]: Future wrapper for catching panics
//! - [`measure`]: Wall-clock timing of a closure

mod futures;
mod measure;

pub(crate) use self::futures::CatchUnwind;
pub(crate) use self::measure::measure;
