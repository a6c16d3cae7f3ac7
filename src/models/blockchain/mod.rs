//! Data produced by chain execution.
//!
//! The executor that polls chains lives outside this crate; it hands each method call or
//! event over as a [`CallResult`].

mod result;

pub use result::{CallResult, EventLog, ResultKind};
