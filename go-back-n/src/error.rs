//! Error types shared by every module of the crate.
//!
//! Only configuration and setup faults are fatal.  Faults inside a single
//! protocol operation (a malformed datagram, an unexpected ack) are logged by
//! the engines and never surface here.

use thiserror::Error;

/// Top-level error returned by constructors and engine run loops.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("frame codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("malformed datagram: {0}")]
    Wire(#[from] WireError),

    /// The task on the other end of a channel has gone away.
    #[error("{0} channel closed")]
    ChannelClosed(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A spawned engine task panicked or was cancelled.
    #[error("engine task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Configuration violations, detected before any frame is built.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("window size must be at least 1")]
    ZeroWindow,

    #[error("frame capacity of {capacity} bits must exceed the {header}-bit sequence field")]
    FrameTooSmall { capacity: usize, header: usize },

    #[error("frame capacity of {capacity} bits exceeds the {max}-bit maximum")]
    FrameTooLarge { capacity: usize, max: usize },

    #[error("drop period must be at least 1")]
    ZeroDropPeriod,

    #[error("timeout interval must be greater than zero")]
    ZeroTimeout,

    #[error("timer tick must be greater than zero")]
    ZeroTick,

    #[error("loss probability {0} is outside [0, 1]")]
    LossRate(f64),
}

/// Failures while slicing a byte stream into frames or regrouping it.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// More frames are needed than the 16-bit sequence field can number.
    #[error("{frames} frames needed but the sequence field only numbers {max}")]
    SequenceSpaceExhausted { frames: usize, max: usize },

    /// Reassembled payload bits do not form whole bytes.
    #[error("reassembled stream has {bits} bits, not a whole number of bytes")]
    TrailingBits { bits: usize },

    #[error("bit reader ran past the end of its input")]
    UnexpectedEof,
}

/// A data-channel record that does not parse as a frame.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("record of {0} bytes is shorter than the header")]
    BufferTooShort(usize),

    #[error("header declares {bits} payload bits but {bytes} payload bytes follow")]
    LengthMismatch { bits: usize, bytes: usize },

    #[error("padding bits in the last payload byte are not zero")]
    DirtyPadding,
}

pub type Result<T> = std::result::Result<T, Error>;
