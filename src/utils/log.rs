use colored::Colorize;

/// Sink for the informational lines emitted while updating a pom.
pub trait UpdateLog {
    fn info(&mut self, message: &str);
}

/// Prints `[INFO]` lines to stdout.
#[derive(Debug, Default)]
pub struct ConsoleLog;

impl UpdateLog for ConsoleLog {
    fn info(&mut self, message: &str) {
        println!("{} {}", "[INFO]".blue().bold(), message);
    }
}

/// Keeps every line in memory so tests can inspect what was logged.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingLog {
    pub lines: Vec<String>,
}

#[cfg(test)]
impl UpdateLog for RecordingLog {
    fn info(&mut self, message: &str) {
        self.lines.push(message.to_string());
    }
}

pub fn is_verbose() -> bool {
    std::env::var("POMVER_VERBOSE").is_ok()
}
