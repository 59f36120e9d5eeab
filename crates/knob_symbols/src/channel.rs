//! Where call errors are reported.
//!
//! A failed call returns its [`CallError`] to the caller and also reports it
//! here, so a driver that only cares about results still gets the message in
//! front of the script author:
//! - Stderr: the default, for command-line drivers
//! - Buffer: captured for tests and embedding hosts
//! - Silent: discarded (speculative evaluation)
//!
//! Uses enum dispatch rather than trait objects; the set of sinks is closed.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::CallError;

/// Reports to stderr.
#[derive(Default)]
pub struct StderrChannel;

impl StderrChannel {
    pub fn report(&self, msg: &str) {
        eprintln!("error: {msg}");
    }
}

/// Captures reports in memory.
pub struct BufferChannel {
    buffer: Mutex<Vec<String>>,
}

impl BufferChannel {
    pub fn new() -> Self {
        BufferChannel {
            buffer: Mutex::new(Vec::new()),
        }
    }

    pub fn report(&self, msg: &str) {
        self.buffer.lock().push(msg.to_string());
    }

    /// All messages reported so far, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.buffer.lock().clone()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl Default for BufferChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Error channel implementation using enum dispatch.
pub enum ErrorChannel {
    Stderr(StderrChannel),
    Buffer(BufferChannel),
    Silent,
}

impl ErrorChannel {
    /// Report a failed call.
    pub fn report(&self, err: &CallError) {
        let msg = err.to_string();
        match self {
            Self::Stderr(c) => c.report(&msg),
            Self::Buffer(c) => c.report(&msg),
            Self::Silent => {}
        }
    }

    /// Captured messages; empty for channels that don't capture.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Buffer(c) => c.messages(),
            Self::Stderr(_) | Self::Silent => Vec::new(),
        }
    }

    /// Drop captured messages.
    pub fn clear(&self) {
        if let Self::Buffer(c) = self {
            c.clear();
        }
    }
}

/// Error channel shared between a table and the driver inspecting it.
pub type SharedErrorChannel = Arc<ErrorChannel>;

/// Create a channel that reports to stderr.
pub fn stderr_channel() -> SharedErrorChannel {
    Arc::new(ErrorChannel::Stderr(StderrChannel))
}

/// Create a channel that captures reports in memory.
pub fn buffer_channel() -> SharedErrorChannel {
    Arc::new(ErrorChannel::Buffer(BufferChannel::new()))
}

/// Create a channel that discards reports.
pub fn silent_channel() -> SharedErrorChannel {
    Arc::new(ErrorChannel::Silent)
}

#[cfg(test)]
mod tests;
