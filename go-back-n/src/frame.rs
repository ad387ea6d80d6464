//! Frame type and its data-channel record layout.
//!
//! A [`Frame`] is one numbered slice of the source bit stream.  Frames are
//! built once by [`crate::codec::FrameCodec`] and never mutated; the sender
//! serialises them with [`Frame::encode`] every time it puts one on the data
//! channel and the receiver parses them back with [`Frame::decode`].
//!
//! No I/O happens here; this is pure data transformation.
//!
//! # Record layout
//!
//! All multi-byte integers are **big-endian**.
//!
//! ```text
//!  0               1               2               3
//!  0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |        Sequence Number        |      Payload Length (bits)    |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |            Payload, MSB-first, zero-padded to a byte ...      |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! Only the sequence number counts against the configured frame capacity;
//! the length field is framing overhead of the in-process channel.

use crate::error::WireError;

/// Width of the sequence-number field in bits.
pub const SEQ_FIELD_BITS: usize = 16;

/// Number of distinct sequence numbers, and so the most frames one transfer may use.
pub const MAX_FRAMES: usize = 1 << SEQ_FIELD_BITS;

/// Byte length of the record header.
pub const HEADER_LEN: usize = 4;

const OFF_SEQ: usize = 0;
const OFF_BITS: usize = 2;

/// Sequence number of a frame.  Never wraps within a transfer.
pub type SeqNum = u16;

/// One numbered slice of the source stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub seq: SeqNum,
    /// Payload bits packed MSB-first; unused low bits of the last byte are zero.
    payload: Vec<u8>,
    bits: usize,
}

impl Frame {
    /// Build a frame from packed payload bytes and their exact bit length.
    ///
    /// `bits` must fit the 16-bit length field and `payload` must hold exactly
    /// `bits.div_ceil(8)` bytes; the codec guarantees both.
    pub(crate) fn new(seq: SeqNum, payload: Vec<u8>, bits: usize) -> Self {
        debug_assert_eq!(payload.len(), bits.div_ceil(8));
        debug_assert!(bits <= u16::MAX as usize);
        Self { seq, payload, bits }
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Payload length in bits.
    pub fn bit_len(&self) -> usize {
        self.bits
    }

    /// Serialise into a freshly allocated record.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![0u8; HEADER_LEN + self.payload.len()];
        buf[OFF_SEQ..OFF_SEQ + 2].copy_from_slice(&self.seq.to_be_bytes());
        buf[OFF_BITS..OFF_BITS + 2].copy_from_slice(&(self.bits as u16).to_be_bytes());
        buf[HEADER_LEN..].copy_from_slice(&self.payload);
        buf
    }

    /// Parse a record produced by [`Frame::encode`].
    ///
    /// Returns [`Err`] if:
    /// - `buf` is shorter than [`HEADER_LEN`],
    /// - the bit-length field disagrees with the number of payload bytes, or
    /// - padding bits in the last payload byte are set.
    pub fn decode(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() < HEADER_LEN {
            return Err(WireError::BufferTooShort(buf.len()));
        }
        let seq = u16::from_be_bytes([buf[OFF_SEQ], buf[OFF_SEQ + 1]]);
        let bits = u16::from_be_bytes([buf[OFF_BITS], buf[OFF_BITS + 1]]) as usize;
        let payload = &buf[HEADER_LEN..];

        if payload.len() != bits.div_ceil(8) {
            return Err(WireError::LengthMismatch {
                bits,
                bytes: payload.len(),
            });
        }
        let tail = bits % 8;
        if tail != 0 {
            let last = payload[payload.len() - 1];
            if last & (0xff >> tail) != 0 {
                return Err(WireError::DirtyPadding);
            }
        }

        Ok(Self {
            seq,
            payload: payload.to_vec(),
            bits,
        })
    }
}
