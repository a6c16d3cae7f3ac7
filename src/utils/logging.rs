//! Logging setup.
//!
//! Installs a `tracing_subscriber` registry with an `EnvFilter` and a compact fmt
//! layer. `RUST_LOG` takes precedence; otherwise the level passed by the caller is
//! used. Errors created through the `log` crate are forwarded to the same
//! subscriber.

use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

type SetupError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Default directive when neither `RUST_LOG` nor verbose mode is set
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Directive enabling debug output of the loader and evaluator
pub const VERBOSE_DIRECTIVE: &str = "info,chainquery=debug";

/// Builds the filter from `RUST_LOG`, falling back to `default_directive`
pub fn env_filter(default_directive: &str) -> EnvFilter {
	EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Setup logging to stdout
pub fn setup_logging(verbose: bool) -> Result<(), SetupError> {
	setup_logging_with_writer(verbose, std::io::stdout)
}

/// Setup logging with a custom writer
pub fn setup_logging_with_writer<W>(verbose: bool, writer: W) -> Result<(), SetupError>
where
	W: for<'writer> fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
	let directive = if verbose {
		VERBOSE_DIRECTIVE
	} else {
		DEFAULT_DIRECTIVE
	};

	tracing_subscriber::registry()
		.with(env_filter(directive))
		.with(
			fmt::layer().with_writer(writer).event_format(
				fmt::format()
					.with_level(true)
					.with_target(true)
					.with_thread_ids(false)
					.with_ansi(false)
					.compact(),
			),
		)
		.try_init()?;
	Ok(())
}
