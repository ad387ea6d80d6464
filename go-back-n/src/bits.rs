//! MSB-first bit cursor over byte buffers.
//!
//! Frame payloads are measured in bits, so a frame boundary can fall in the
//! middle of a source byte.  [`BitWriter`] packs bits into bytes (final partial
//! byte padded with zeros) and remembers the exact bit length; [`BitReader`]
//! walks a byte slice bit by bit and refuses to read past its declared end.

use crate::error::CodecError;

// ---------------------------------------------------------------------------
// BitWriter
// ---------------------------------------------------------------------------

/// Accumulates bits MSB-first.
///
/// # Invariants
/// - `bytes.len() == bit_len.div_ceil(8)`
/// - bits past `bit_len` in the last byte are zero
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer with room for `bits` bits before reallocating.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bits.div_ceil(8)),
            bit_len: 0,
        }
    }

    /// Append a single bit.
    pub fn push_bit(&mut self, bit: bool) {
        let offset = self.bit_len % 8;
        if offset == 0 {
            self.bytes.push(0);
        }
        if bit {
            let idx = self.bit_len / 8;
            self.bytes[idx] |= 0x80 >> offset;
        }
        self.bit_len += 1;
    }

    /// Append the first `bits` bits of `src`.
    ///
    /// Byte-aligned copies go straight through `extend_from_slice`.
    pub fn write_bits(&mut self, src: &[u8], bits: usize) -> Result<(), CodecError> {
        if bits > src.len() * 8 {
            return Err(CodecError::UnexpectedEof);
        }
        if self.bit_len % 8 == 0 && bits % 8 == 0 {
            self.bytes.extend_from_slice(&src[..bits / 8]);
            self.bit_len += bits;
            return Ok(());
        }
        let mut reader = BitReader::with_len(src, bits);
        while let Some(bit) = reader.read_bit() {
            self.push_bit(bit);
        }
        Ok(())
    }

    /// Number of bits written so far.
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Consume the writer, returning the packed bytes and the exact bit count.
    pub fn finish(self) -> (Vec<u8>, usize) {
        (self.bytes, self.bit_len)
    }
}

// ---------------------------------------------------------------------------
// BitReader
// ---------------------------------------------------------------------------

/// Reads bits MSB-first from a borrowed slice.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    position: usize,
    end: usize,
}

impl<'a> BitReader<'a> {
    /// Reader over every bit of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_len(data, data.len() * 8)
    }

    /// Reader over the first `bits` bits of `data` (clamped to the slice).
    pub fn with_len(data: &'a [u8], bits: usize) -> Self {
        Self {
            data,
            position: 0,
            end: bits.min(data.len() * 8),
        }
    }

    pub fn bits_remaining(&self) -> usize {
        self.end - self.position
    }

    /// Next bit, or `None` once the declared end is reached.
    pub fn read_bit(&mut self) -> Option<bool> {
        if self.position >= self.end {
            return None;
        }
        let byte = self.data[self.position / 8];
        let bit = byte & (0x80 >> (self.position % 8)) != 0;
        self.position += 1;
        Some(bit)
    }

    /// Move the next `count` bits into `writer`.
    pub fn copy_into(&mut self, writer: &mut BitWriter, count: usize) -> Result<(), CodecError> {
        if count > self.bits_remaining() {
            return Err(CodecError::UnexpectedEof);
        }
        if self.position % 8 == 0 && writer.bit_len() % 8 == 0 && count % 8 == 0 {
            let start = self.position / 8;
            writer.write_bits(&self.data[start..start + count / 8], count)?;
            self.position += count;
            return Ok(());
        }
        for _ in 0..count {
            if let Some(bit) = self.read_bit() {
                writer.push_bit(bit);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_bits_pack_msb_first() {
        let mut w = BitWriter::new();
        for bit in [true, false, true, true, false] {
            w.push_bit(bit);
        }
        let (bytes, bits) = w.finish();
        assert_eq!(bits, 5);
        assert_eq!(bytes, vec![0b1011_0000]);
    }

    #[test]
    fn unaligned_write_spans_bytes() {
        let mut w = BitWriter::new();
        w.write_bits(&[0b1110_0000], 3).unwrap();
        w.write_bits(&[0xff], 8).unwrap();
        let (bytes, bits) = w.finish();
        assert_eq!(bits, 11);
        assert_eq!(bytes, vec![0b1111_1111, 0b1110_0000]);
    }

    #[test]
    fn write_more_bits_than_source_fails() {
        let mut w = BitWriter::new();
        assert_eq!(w.write_bits(&[0xaa], 9), Err(CodecError::UnexpectedEof));
    }

    #[test]
    fn reader_stops_at_declared_length() {
        let mut r = BitReader::with_len(&[0b1010_1010], 3);
        assert_eq!(r.read_bit(), Some(true));
        assert_eq!(r.read_bit(), Some(false));
        assert_eq!(r.read_bit(), Some(true));
        assert_eq!(r.read_bit(), None);
    }

    #[test]
    fn copy_into_splits_a_byte() {
        let src = [b'H', b'i'];
        let mut r = BitReader::new(&src);
        let mut first = BitWriter::new();
        let mut rest = BitWriter::new();
        r.copy_into(&mut first, 4).unwrap();
        r.copy_into(&mut rest, 12).unwrap();
        assert_eq!(r.bits_remaining(), 0);

        let mut joined = BitWriter::new();
        let (a, a_bits) = first.finish();
        let (b, b_bits) = rest.finish();
        joined.write_bits(&a, a_bits).unwrap();
        joined.write_bits(&b, b_bits).unwrap();
        assert_eq!(joined.finish(), (src.to_vec(), 16));
    }

    #[test]
    fn copy_past_end_fails() {
        let mut r = BitReader::new(&[0u8]);
        let mut w = BitWriter::new();
        assert_eq!(r.copy_into(&mut w, 9), Err(CodecError::UnexpectedEof));
    }
}
