//! Notifications for records removed from a
//! [`SequenceSet`](crate::collection::SequenceSet).
//!
//! Removals are reported here, never returned as errors.

/// Reason reported for records pruned because they have no usable date.
pub const MISSING_DATE: &str = "Missing Date";
/// Reason reported for records removed by subsampling.
pub const SUBSAMPLED: &str = "subsampled";
/// Reason reported for records whose header has no strain word.
pub const MISSING_STRAIN: &str = "missing strain";
/// Reason reported for records whose strain name was already taken.
pub const DUPLICATE_STRAIN: &str = "duplicate strain";

/// Receiver of drop notifications and stage summaries.
pub trait DropLog {
    /// One record, identified by `name`, was removed from `segment`.
    fn drop_record(&mut self, name: &str, segment: &str, reason: &str);

    /// A human-readable progress message.
    fn notify(&mut self, message: &str);
}

/// Forwards every notification to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDropLog;

impl DropLog for TracingDropLog {
    fn drop_record(&mut self, name: &str, segment: &str, reason: &str) {
        tracing::debug!(name, segment, reason, "dropped record");
    }

    fn notify(&mut self, message: &str) {
        tracing::info!("{message}");
    }
}

/// One entry collected by [`DropRecorder`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
pub struct DroppedRecord {
    pub name: String,
    pub segment: String,
    pub reason: String,
}

/// Collects drops in memory, also forwarding them to `tracing`.
#[derive(Debug, Default, Clone)]
pub struct DropRecorder {
    pub dropped: Vec<DroppedRecord>,
    pub messages: Vec<String>,
}

impl DropRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names dropped for `reason`, sorted.
    pub fn names_for(&self, reason: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .dropped
            .iter()
            .filter(|d| d.reason == reason)
            .map(|d| d.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    pub fn count(&self, reason: &str) -> usize {
        self.dropped.iter().filter(|d| d.reason == reason).count()
    }
}

impl DropLog for DropRecorder {
    fn drop_record(&mut self, name: &str, segment: &str, reason: &str) {
        TracingDropLog.drop_record(name, segment, reason);
        self.dropped.push(DroppedRecord {
            name: name.to_string(),
            segment: segment.to_string(),
            reason: reason.to_string(),
        });
    }

    fn notify(&mut self, message: &str) {
        TracingDropLog.notify(message);
        self.messages.push(message.to_string());
    }
}
