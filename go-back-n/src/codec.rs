//! Frame codec: byte stream ⇄ numbered frames.
//!
//! The source is read as one MSB-first bit stream and cut into frames whose
//! payload is `frame_capacity_bits - SEQ_FIELD_BITS` bits; the final frame may
//! be shorter.  Decoding concatenates accepted payloads in order and regroups
//! the bits into bytes.
//!
//! The codec works on bytes, not characters, so any input round-trips.

use crate::bits::{BitReader, BitWriter};
use crate::error::{CodecError, ConfigError};
use crate::frame::{Frame, SeqNum, MAX_FRAMES, SEQ_FIELD_BITS};

/// Largest frame whose payload length still fits the 16-bit length field.
pub const MAX_FRAME_CAPACITY_BITS: usize = SEQ_FIELD_BITS + u16::MAX as usize;

#[derive(Debug, Clone, Copy)]
pub struct FrameCodec {
    payload_bits: usize,
}

impl FrameCodec {
    /// Build a codec for frames of `frame_capacity_bits` bits, header included.
    pub fn new(frame_capacity_bits: usize) -> Result<Self, ConfigError> {
        if frame_capacity_bits <= SEQ_FIELD_BITS {
            return Err(ConfigError::FrameTooSmall {
                capacity: frame_capacity_bits,
                header: SEQ_FIELD_BITS,
            });
        }
        if frame_capacity_bits > MAX_FRAME_CAPACITY_BITS {
            return Err(ConfigError::FrameTooLarge {
                capacity: frame_capacity_bits,
                max: MAX_FRAME_CAPACITY_BITS,
            });
        }
        Ok(Self {
            payload_bits: frame_capacity_bits - SEQ_FIELD_BITS,
        })
    }

    /// Payload bits carried by every frame except possibly the last.
    pub fn payload_bits(&self) -> usize {
        self.payload_bits
    }

    /// Number of frames `len` source bytes will occupy.
    pub fn frame_count(&self, len: usize) -> usize {
        (len * 8).div_ceil(self.payload_bits)
    }

    /// Slice `source` into frames numbered `0..n`.
    ///
    /// Fails without building anything when `n` exceeds the sequence space.
    pub fn encode(&self, source: &[u8]) -> Result<Vec<Frame>, CodecError> {
        let count = self.frame_count(source.len());
        if count > MAX_FRAMES {
            return Err(CodecError::SequenceSpaceExhausted {
                frames: count,
                max: MAX_FRAMES,
            });
        }

        let mut reader = BitReader::new(source);
        let mut frames = Vec::with_capacity(count);
        for seq in 0..count {
            let bits = self.payload_bits.min(reader.bits_remaining());
            let mut writer = BitWriter::with_capacity(bits);
            reader.copy_into(&mut writer, bits)?;
            let (payload, bits) = writer.finish();
            // count <= MAX_FRAMES, so seq fits the field
            frames.push(Frame::new(seq as SeqNum, payload, bits));
        }
        Ok(frames)
    }

    /// Concatenate payloads in order and regroup them into bytes.
    pub fn decode<'a, I>(&self, frames: I) -> Result<Vec<u8>, CodecError>
    where
        I: IntoIterator<Item = &'a Frame>,
    {
        let mut writer = BitWriter::new();
        for frame in frames {
            writer.write_bits(frame.payload(), frame.bit_len())?;
        }
        let (bytes, bits) = writer.finish();
        if bits % 8 != 0 {
            return Err(CodecError::TrailingBits { bits });
        }
        Ok(bytes)
    }
}
