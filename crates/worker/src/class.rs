/// Execution classes used for task spawning and observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskClass {
	/// Quiescence timers that may be cancelled before they fire.
	Debounce,
	/// Diagram render work started after a debounce window elapsed.
	Render,
}

impl TaskClass {
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::Debounce => "debounce",
			Self::Render => "render",
		}
	}
}
