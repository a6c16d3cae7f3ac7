//! Core domain models for schema evaluation.
//!
//! This module contains the schema tree:
//! - Schema: global window, variables and queries
//! - Query: chain-scoped contract and event bindings
//! - Contract, Method, Event: the bindings themselves
//! - Transform, Filter, Save: bodies evaluated per result

mod body;
mod chain;
mod contract;
mod options;
mod schema;

pub use body::{Filter, Save, Transform};
pub use chain::Chain;
pub use contract::{Contract, Event, Method};
pub use options::RunOptions;
pub use schema::{Query, Schema, Window};
