/// How the loaded schema is going to be run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
	/// Follow the chain head instead of replaying a historical window
	pub realtime: bool,
}
