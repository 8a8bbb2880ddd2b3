//! Append-only event log and the heartbeat flavor source

use chrono::{DateTime, SecondsFormat, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Built-in heartbeat lines.
///
/// These are decoration for the status feed. Nothing scans, probes or
/// monitors anything when one of them is logged.
pub const DEFAULT_HEARTBEAT_MESSAGES: &[&str] = &[
    "Scanning for vulnerabilities...",
    "Analyzing network traffic...",
    "Bypassing firewall...",
    "Decrypting data packets...",
    "Injecting payload...",
    "Escalating privileges...",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl LogEntry {
    /// ISO-8601 rendering of the timestamp
    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Ordered, append-only record. It grows without bound; a long-running
/// session keeps every entry in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    entries: Vec<LogEntry>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: impl Into<String>, at: DateTime<Utc>) {
        self.entries.push(LogEntry {
            timestamp: at,
            message: message.into(),
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

    /// The last `n` entries, oldest first
    pub fn latest(&self, n: usize) -> &[LogEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }
}

/// Picks decorative status lines uniformly at random
#[derive(Debug, Clone)]
pub struct Heartbeat {
    messages: Vec<String>,
    rng: StdRng,
}

impl Heartbeat {
    /// An empty message list falls back to [`DEFAULT_HEARTBEAT_MESSAGES`].
    /// A seed makes the sequence reproducible.
    pub fn new(messages: Vec<String>, seed: Option<u64>) -> Self {
        let messages = if messages.is_empty() {
            DEFAULT_HEARTBEAT_MESSAGES.iter().map(|s| s.to_string()).collect()
        } else {
            messages
        };
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { messages, rng }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn pick(&mut self) -> &str {
        let idx = self.rng.gen_range(0..self.messages.len());
        &self.messages[idx]
    }

    /// Appends one heartbeat line to the log
    pub fn beat(&mut self, log: &mut EventLog, at: DateTime<Utc>) {
        let message = self.pick().to_string();
        log.append(message, at);
    }
}

impl Default for Heartbeat {
    fn default() -> Self {
        Self::new(Vec::new(), None)
    }
}
