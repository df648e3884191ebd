use serde::Serialize;

/// Produces the wall-clock stamp recorded on each log entry.
pub type Clock = fn() -> String;

/// Local time as `HH:MM:SS`.
pub fn local_clock() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub kind: LogKind,
    pub message: String,
    pub timestamp: String,
}

/// Append-only progress log for one session.
#[derive(Debug, Clone)]
pub struct LogAccumulator {
    entries: Vec<LogEntry>,
    clock: Clock,
}

impl LogAccumulator {
    pub fn new(clock: Clock) -> Self {
        Self {
            entries: Vec::new(),
            clock,
        }
    }

    pub fn append(&mut self, kind: LogKind, message: impl Into<String>) {
        self.entries.push(LogEntry {
            kind,
            message: message.into(),
            timestamp: (self.clock)(),
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for LogAccumulator {
    fn default() -> Self {
        Self::new(local_clock)
    }
}

// The clock is an injected dependency, not part of the observable log.
impl PartialEq for LogAccumulator {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_stamps_and_preserves_order() {
        let mut log = LogAccumulator::new(|| "10:00:00".to_string());
        log.append(LogKind::Info, "first");
        log.append(LogKind::Error, "second");

        let kinds: Vec<_> = log.entries().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![LogKind::Info, LogKind::Error]);
        assert_eq!(log.entries()[1].message, "second");
        assert!(log.entries().iter().all(|e| e.timestamp == "10:00:00"));
    }

    #[test]
    fn local_clock_has_time_shape() {
        let stamp = local_clock();
        assert_eq!(stamp.len(), 8);
        assert_eq!(stamp.matches(':').count(), 2);
    }
}
