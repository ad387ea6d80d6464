//! `go-back-n` — a Go-Back-N ARQ engine moving a byte stream across a
//! simulated lossy channel.
//!
//! # Architecture
//!
//! ```text
//!  source bytes
//!       │ FrameCodec::encode
//!  ┌────▼─────┐   data channel    ┌──────────┐
//!  │  Sender  │──────────────────▶│ Receiver │──▶ sink bytes
//!  └────┬─────┘  (loss applied    └─────┬────┘   (FrameCodec::decode)
//!       │         before enqueue)       │
//!       │◀──────── ack channel ─────────┘
//!       │
//!  ┌────▼──────────────────────────────┐
//!  │           EventSink               │
//!  │  (ordered, append-only event log) │
//!  └───────────────────────────────────┘
//! ```
//!
//! Each module has a single responsibility:
//! - [`bits`]          — MSB-first bit reader/writer
//! - [`frame`]         — frame type and data-channel record layout
//! - [`codec`]         — byte stream ⇄ numbered frames
//! - [`channel`]       — data/ack message types and the channel pair
//! - [`simulator`]     — loss models deciding which attempts are withheld
//! - [`timer`]         — retransmit deadline arithmetic
//! - [`state`]         — sender state-machine phases
//! - [`gbn_sender`]    — sliding window, acks, timeouts, retransmission
//! - [`gbn_receiver`]  — in-order acceptance, duplicate acks, reassembly
//! - [`events`]        — protocol event log sinks
//! - [`config`]        — validated transfer parameters
//! - [`transfer`]      — runs sender and receiver together
//! - [`error`]         — error types

pub mod bits;
pub mod channel;
pub mod codec;
pub mod config;
pub mod error;
pub mod events;
pub mod frame;
pub mod gbn_receiver;
pub mod gbn_sender;
pub mod simulator;
pub mod state;
pub mod timer;
pub mod transfer;

pub use channel::{Ack, Datagram};
pub use config::GbnConfig;
pub use error::{Error, Result};
pub use events::{Event, EventSink, LogSink, MemorySink};
pub use transfer::{transfer, transfer_file, TransferReport};
