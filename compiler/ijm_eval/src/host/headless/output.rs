//! Log output destinations for the headless host.
//!
//! - `Stdout`: write lines as they are logged (CLI)
//! - `Buffer`: capture lines for later inspection (tests, parallel runs)

use std::sync::Arc;

use parking_lot::Mutex;

/// Where logged lines go.
pub enum OutputSink {
    Stdout,
    Buffer(Mutex<String>),
}

impl OutputSink {
    /// Write one line.
    pub fn println(&self, line: &str) {
        match self {
            OutputSink::Stdout => println!("{line}"),
            OutputSink::Buffer(buffer) => {
                let mut buffer = buffer.lock();
                buffer.push_str(line);
                buffer.push('\n');
            }
        }
    }

    /// Everything captured so far; empty for stdout.
    pub fn get_output(&self) -> String {
        match self {
            OutputSink::Stdout => String::new(),
            OutputSink::Buffer(buffer) => buffer.lock().clone(),
        }
    }

    /// Drop captured output.
    pub fn clear(&self) {
        if let OutputSink::Buffer(buffer) = self {
            buffer.lock().clear();
        }
    }
}

/// Output sink shared between a host and whoever reads it back.
pub type SharedOutput = Arc<OutputSink>;

/// Sink writing to stdout.
pub fn stdout_output() -> SharedOutput {
    Arc::new(OutputSink::Stdout)
}

/// Sink capturing into a buffer.
pub fn buffer_output() -> SharedOutput {
    Arc::new(OutputSink::Buffer(Mutex::new(String::new())))
}
