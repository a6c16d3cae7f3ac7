//! Clock capability used to bind `now` when a schema is loaded.

use chrono::{DateTime, TimeZone, Utc};

pub trait Clock: Send + Sync {
	fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> DateTime<Utc> {
		Utc::now()
	}
}

/// A clock frozen at a given instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
	/// Creates a clock from unix seconds, falling back to the epoch when out of range
	pub fn from_timestamp(secs: i64) -> Self {
		Self(Utc.timestamp_opt(secs, 0).single().unwrap_or_default())
	}
}

impl Clock for FixedClock {
	fn now(&self) -> DateTime<Utc> {
		self.0
	}
}
