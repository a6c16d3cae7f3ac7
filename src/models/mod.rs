//! Domain models and data structures for schema evaluation.
//!
//! This module contains all the core data structures used throughout the application:
//!
//! - `blockchain`: Results produced by chain execution
//! - `config`: Schema loading, loop expansion, interface hydration and validation
//! - `core`: The schema tree (Schema, Query, Contract, Method, Event)

mod blockchain;
mod config;
mod core;

// Re-export blockchain types
pub use blockchain::{CallResult, EventLog, ResultKind};

// Re-export core types
pub use core::{
	Chain, Contract, Event, Filter, Method, Query, RunOptions, Save, Schema, Transform, Window,
};

// Re-export config types
pub use config::{
	expand as expand_loop, validate, ConfigError, ConfigLoader, InterfaceHydrator, LoopTemplate,
	ValidationError, SCHEMA_FILE,
};
