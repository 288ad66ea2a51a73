use chrono::{DateTime, Local};

/// Severity of a log panel entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub at: DateTime<Local>,
    pub level: Level,
    pub text: String,
}

impl Entry {
    /// One line per entry, e.g. `[21:04:17] abcm2ps: ...`
    pub fn render(&self) -> String {
        format!("[{}] {}", self.at.format("%H:%M:%S"), self.text)
    }
}

/// Append-only log shown in the log panel.
/// Everything appended is mirrored to tracing.
#[derive(Debug, Default)]
pub struct LogSink {
    entries: Vec<Entry>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(Level::Info, text.into());
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(Level::Error, text.into());
    }

    fn push(&mut self, level: Level, text: String) {
        match level {
            Level::Info => tracing::info!("{}", text),
            Level::Error => tracing::error!("{}", text),
        }
        self.entries.push(Entry {
            at: Local::now(),
            level,
            text,
        });
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_clear() {
        let mut log = LogSink::new();
        log.info("engraving");
        log.error("abcm2ps exited with exit status: 1");

        assert_eq!(log.entries().len(), 2);
        assert_eq!(log.entries()[1].level, Level::Error);
        assert!(log.entries()[0].render().ends_with("] engraving"));

        log.clear();
        assert!(log.entries().is_empty());
    }
}
