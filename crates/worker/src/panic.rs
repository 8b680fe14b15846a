use tokio::task::JoinError;

/// Extracts the panic message carried by a failed join.
///
/// Returns `None` when the task was cancelled rather than panicking.
pub fn join_error_panic_message(err: JoinError) -> Option<String> {
	if !err.is_panic() {
		return None;
	}
	let payload = err.into_panic();
	let message = if let Some(msg) = payload.downcast_ref::<&'static str>() {
		(*msg).to_string()
	} else if let Some(msg) = payload.downcast_ref::<String>() {
		msg.clone()
	} else {
		"task panicked with a non-string payload".to_string()
	};
	Some(message)
}

#[cfg(test)]
#[path = "panic_tests.rs"]
mod tests;
