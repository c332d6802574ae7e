use std::sync::Mutex;

/// Receiver for non-fatal diagnostics raised while staging files.
pub trait DiagnosticSink: Send + Sync {
	fn error(&self, message: &str);
}

/// Forwards diagnostics to `tracing` at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
	fn error(&self, message: &str) {
		tracing::error!("{}", message);
	}
}

/// Collects diagnostics in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
	messages: Mutex<Vec<String>>,
}

impl MemorySink {
	pub fn new() -> Self {
		Self::default()
	}

	/// Snapshot of the messages received so far.
	pub fn messages(&self) -> Vec<String> {
		self.messages
			.lock()
			.map(|m| m.clone())
			.unwrap_or_else(|poisoned| poisoned.into_inner().clone())
	}
}

impl DiagnosticSink for MemorySink {
	fn error(&self, message: &str) {
		let mut messages = self
			.messages
			.lock()
			.unwrap_or_else(std::sync::PoisonError::into_inner);
		messages.push(message.to_string());
	}
}
