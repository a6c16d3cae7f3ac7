//! Utility modules for common functionality.
//!
//! - clock: Time source used to bind `now` at load time
//! - logging: Logging setup
//! - tests: Builders for test instances of models

pub mod clock;
pub mod logging;
pub mod tests;
