//! Evaluation core of a declarative on-chain query language.
//!
//! A schema (`schema.hcl`) declares queries bound to chains, with contract and event
//! bindings and transform, filter and save bodies. This crate loads and validates
//! schemas and evaluates the results an external executor produces for them.
//!
//! - `models`: the schema tree, results and configuration loading
//! - `services`: expression evaluation and runtime evaluation of results
//! - `utils`: logging, clocks and test helpers

pub mod models;
pub mod services;
pub mod utils;
