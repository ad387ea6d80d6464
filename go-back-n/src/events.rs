//! Protocol event log.
//!
//! Both engines report every state transition to an [`EventSink`] as it
//! happens.  The sink is append-only: records are never reordered or
//! rewritten, so a reader tailing the log sees events in engine order.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::channel::Ack;
use crate::frame::SeqNum;

/// One observable protocol event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A transmission attempt for `seq` (1 = first try).  Followed by
    /// [`Event::Dropped`] when the loss model withholds it.
    Sending { seq: SeqNum, attempt: u32 },
    Dropped { seq: SeqNum },
    /// In-order ack that advanced the window.
    AckAccepted { seq: SeqNum },
    /// Duplicate, stale or sentinel ack; the window did not move.
    AckIgnored { ack: Ack },
    TimedOut { seq: SeqNum },
    Received { seq: SeqNum },
    OutOfOrder { seq: SeqNum, expected: usize },
    Malformed { reason: String },
    Written { bytes: usize },
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sending { seq, attempt: 1 } => write!(f, "sending packet {seq}"),
            Self::Sending { seq, attempt } => {
                write!(f, "resending packet {seq} (attempt {attempt})")
            }
            Self::Dropped { seq } => write!(f, "packet {seq} dropped"),
            Self::AckAccepted { seq } => write!(f, "ack {seq} received"),
            Self::AckIgnored { ack } => write!(f, "ack {ack} received, ignoring"),
            Self::TimedOut { seq } => write!(f, "packet {seq} timed out"),
            Self::Received { seq } => write!(f, "packet {seq} received"),
            Self::OutOfOrder { seq, expected } => {
                write!(f, "packet {seq} received out of order (expected {expected})")
            }
            Self::Malformed { reason } => write!(f, "discarding malformed datagram: {reason}"),
            Self::Written { bytes } => write!(f, "data successfully written ({bytes} bytes)"),
        }
    }
}

/// Destination for protocol events.
pub trait EventSink: Send + Sync {
    fn record(&self, event: Event);
}

impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    fn record(&self, event: Event) {
        (**self).record(event)
    }
}

/// Forwards each event to the `log` facade at `info` level, target `gbn`.
///
/// Where the lines end up (stderr, a log file) is the binary's choice.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn record(&self, event: Event) {
        log::info!(target: "gbn", "{event}");
    }
}

/// Keeps every event in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Event>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: Event) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_match_log_format() {
        let cases = [
            (Event::Sending { seq: 3, attempt: 1 }, "sending packet 3"),
            (
                Event::Sending { seq: 3, attempt: 2 },
                "resending packet 3 (attempt 2)",
            ),
            (Event::Dropped { seq: 3 }, "packet 3 dropped"),
            (Event::AckAccepted { seq: 2 }, "ack 2 received"),
            (
                Event::AckIgnored { ack: Ack::NoneYet },
                "ack -1 received, ignoring",
            ),
            (Event::TimedOut { seq: 3 }, "packet 3 timed out"),
            (
                Event::OutOfOrder { seq: 4, expected: 3 },
                "packet 4 received out of order (expected 3)",
            ),
            (
                Event::Written { bytes: 11 },
                "data successfully written (11 bytes)",
            ),
        ];
        for (event, line) in cases {
            assert_eq!(event.to_string(), line);
        }
    }

    #[test]
    fn memory_sink_keeps_order() {
        let sink = MemorySink::new();
        sink.record(Event::Received { seq: 0 });
        sink.record(Event::Received { seq: 1 });
        assert_eq!(
            sink.events(),
            vec![Event::Received { seq: 0 }, Event::Received { seq: 1 }]
        );
    }
}
