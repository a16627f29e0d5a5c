//! Fundamental runtime types: atoms, terms, identifiers and exit reasons.
//!
//! # Type Categories
//!
//! ## Identification
//!
//! - [`InternalPid`]: Process identifier, never reused
//! - [`InternalRef`]: Unique reference, also used as [`MonitorRef`]
//! - [`Dest`]: Message destination (pid or registered name)
//!
//! ## Values and Exit Reasons
//!
//! - [`Atom`]: Interned string identifier
//! - [`Term`]: Type-erased runtime value
//! - [`Item`]: Trait for values stored in [`Term`]
//! - [`Exit`]: Process termination reason
//! - [`Parcel`]: Take-once cell for moving non-clonable values in a [`Term`]

mod atom;
mod atom_table;
mod dest;
mod exit;
mod item;
mod parcel;
mod pid;
mod reference;
mod term;

pub use self::atom::Atom;
pub use self::atom_table::AtomTable;
pub use self::atom_table::AtomTableError;
pub use self::dest::Dest;
pub use self::exit::Exit;
pub use self::item::Item;
pub use self::parcel::Parcel;
pub use self::pid::InternalPid;
pub use self::reference::InternalRef;
pub use self::reference::MonitorRef;
pub use self::term::Term;
