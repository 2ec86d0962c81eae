//! Delivered-message records and the persistence seam.

use chrono::{Local, NaiveDate, NaiveTime, Timelike};

/// One successfully relayed application message, as handed to the
/// history collaborator.
///
/// Only built for `clientMessage`s that actually reached the partner's
/// channel; status traffic never produces a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredRecord {
    pub sender_address: String,
    pub receiver_address: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub content: String,
}

impl DeliveredRecord {
    /// Build a record stamped with the current local date and time
    /// (second precision).
    pub fn stamped_now(
        sender_address: impl Into<String>,
        receiver_address: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let now = Local::now().naive_local();
        let time = now.time().with_nanosecond(0).unwrap_or_else(|| now.time());

        DeliveredRecord {
            sender_address: sender_address.into(),
            receiver_address: receiver_address.into(),
            date: now.date(),
            time,
            content: content.into(),
        }
    }
}

/// Append-only store for delivered messages.
///
/// Fire-and-forget: an implementation deals with its own failures
/// (log and drop) and never reports back into the relay path.
pub trait HistorySink {
    fn record(&self, record: DeliveredRecord);
}

/// Sink that discards everything. Useful when history is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl HistorySink for NullSink {
    fn record(&self, _record: DeliveredRecord) {}
}
