//! Mocks and fixtures shared by the integration tests.

mod providers;

pub use fixtures::*;
pub use providers::*;
