//! The two in-process queues linking sender and receiver.
//!
//! ```text
//!  ┌──────────┐   data channel (Datagram)   ┌──────────┐
//!  │  Sender  │────────────────────────────▶│ Receiver │
//!  │          │◀────────────────────────────│          │
//!  └──────────┘     ack channel (Ack)       └──────────┘
//! ```
//!
//! Both are unbounded FIFO `tokio::sync::mpsc` channels with one producer and
//! one consumer.  Loss is applied by the sender before it enqueues, so a
//! frame either arrives intact and in order or never arrives at all.

use std::fmt;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::frame::SeqNum;

/// A message on the data channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Datagram {
    /// An encoded [`crate::frame::Frame`] record.
    Frame(Vec<u8>),
    /// No more frames will follow.
    EndOfStream,
}

/// A message on the ack channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    /// Highest in-order sequence number accepted so far.
    Seq(SeqNum),
    /// The receiver rejected a frame before accepting any (`expected - 1 == -1`).
    NoneYet,
}

impl fmt::Display for Ack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seq(seq) => write!(f, "{seq}"),
            Self::NoneYet => f.write_str("-1"),
        }
    }
}

/// Sender-side ends: produce datagrams, consume acks.
#[derive(Debug)]
pub struct SenderLink {
    pub data_tx: UnboundedSender<Datagram>,
    pub ack_rx: UnboundedReceiver<Ack>,
}

/// Receiver-side ends: consume datagrams, produce acks.
#[derive(Debug)]
pub struct ReceiverLink {
    pub data_rx: UnboundedReceiver<Datagram>,
    pub ack_tx: UnboundedSender<Ack>,
}

/// Create a fresh data channel and ack channel.
pub fn channel_pair() -> (SenderLink, ReceiverLink) {
    let (data_tx, data_rx) = mpsc::unbounded_channel();
    let (ack_tx, ack_rx) = mpsc::unbounded_channel();
    (
        SenderLink { data_tx, ack_rx },
        ReceiverLink { data_rx, ack_tx },
    )
}
