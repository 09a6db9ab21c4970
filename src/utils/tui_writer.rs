use std::convert::Infallible;
use std::io;
use std::str::FromStr;
use tokio::sync::mpsc;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl FromStr for LogLevel {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_uppercase().as_str() {
            "ERROR" => LogLevel::Error,
            "WARN" => LogLevel::Warn,
            "DEBUG" => LogLevel::Debug,
            "TRACE" => LogLevel::Trace,
            _ => LogLevel::Info,
        })
    }
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Captures formatted tracing output and forwards it to the TUI, which owns stdout.
#[derive(Clone)]
pub struct TuiWriter {
    sender: mpsc::UnboundedSender<LogEntry>,
}

impl TuiWriter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<LogEntry>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (TuiWriter { sender }, receiver)
    }
}

impl io::Write for TuiWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let log_text = String::from_utf8_lossy(buf);

        // Expected format: "2025-08-24T16:43:07.498408Z  WARN jobsim::core::interview: Feedback ... failed"
        for line in log_text.lines() {
            if let Some(parsed) = parse_tracing_line(line) {
                let _ = self.sender.send(parsed);
            }
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for TuiWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn parse_tracing_line(line: &str) -> Option<LogEntry> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let mut parts = line.split_whitespace();
    let (Some(timestamp_str), Some(level_str)) = (parts.next(), parts.next()) else {
        return Some(plain_entry(line));
    };

    let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(timestamp_str) else {
        return Some(plain_entry(line));
    };

    // Everything after the level, with the module target stripped
    let after_level = line
        .split_once(level_str)
        .map(|(_, rest)| rest.trim_start())
        .unwrap_or_default();
    let message = match after_level.find(": ") {
        Some(colon_pos) => after_level[colon_pos + 2..].to_string(),
        None => after_level.to_string(),
    };

    Some(LogEntry {
        level: level_str.parse().unwrap_or(LogLevel::Info),
        message,
        timestamp: parsed.with_timezone(&chrono::Utc),
    })
}

fn plain_entry(line: &str) -> LogEntry {
    LogEntry {
        level: LogLevel::Info,
        message: line.to_string(),
        timestamp: chrono::Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_tracing_line() {
        let line = "2025-08-24T16:43:07.498408Z  WARN jobsim::core::interview: Feedback for question 1 failed: boom";
        let parsed = parse_tracing_line(line).unwrap();

        assert_eq!(parsed.level, LogLevel::Warn);
        assert_eq!(parsed.message, "Feedback for question 1 failed: boom");
    }

    #[test]
    fn test_parse_simple_line() {
        let line = "A simple log message with multiple words";
        let parsed = parse_tracing_line(line).unwrap();

        assert_eq!(parsed.level, LogLevel::Info);
        assert_eq!(parsed.message, "A simple log message with multiple words");
    }

    #[test]
    fn test_writer_splits_lines() {
        let (mut writer, mut rx) = TuiWriter::new();
        writer
            .write_all(b"2025-08-24T16:43:07Z ERROR jobsim::client::http: Error fetching jobs: 500\nsecond\n")
            .unwrap();

        let first = rx.try_recv().unwrap();
        assert_eq!(first.level, LogLevel::Error);
        assert_eq!(first.message, "Error fetching jobs: 500");
        assert_eq!(rx.try_recv().unwrap().message, "second");
    }
}
