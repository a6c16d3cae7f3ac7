//! Run invariants over a loaded schema.
//!
//! Checked against each query's effective window (query overrides on top of the
//! schema window), method rules across all queries before event rules:
//! - method calls need an interval in realtime mode and over a historical window
//! - historical event reads must not define an interval

use crate::models::{config::error::ValidationError, RunOptions, Schema};

/// Returns the first violation: method rules in query order, then event rules
pub fn validate(schema: &Schema, options: &RunOptions) -> Result<(), ValidationError> {
	for query in &schema.queries {
		let window = query.effective_window(&schema.window);
		if !query.has_contract_methods() || window.has_interval() {
			continue;
		}
		if options.realtime {
			return Err(ValidationError::NoIntervalRealtime {
				query: query.name.clone(),
			});
		}
		if window.has_historical_range() {
			return Err(ValidationError::NoIntervalHistorical {
				query: query.name.clone(),
			});
		}
	}

	if options.realtime {
		return Ok(());
	}

	for query in &schema.queries {
		let has_events = query.has_contract_events() || query.has_global_events();
		if has_events && query.effective_window(&schema.window).has_interval() {
			return Err(ValidationError::IntervalDefinedForHistoricalEvents {
				query: query.name.clone(),
			});
		}
	}

	Ok(())
}
