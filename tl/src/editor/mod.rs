//! Task list editor
//!
//! Pure state transitions over an in-memory ordered list. No I/O happens
//! here; persistence is a side effect driven by `Change::Tasks` in the
//! session layer.

mod action;
mod filter;
mod state;

pub use action::{Action, Change};
pub use filter::Filter;
pub use state::{EMPTY_SUMMARY, EditSession, Editor};
