//! Go-Back-N receive-side engine.
//!
//! [`GbnReceiver`] implements the receiver side of Go-Back-N:
//!
//! - Only the frame numbered `expected` is accepted; its payload is appended
//!   and ack `expected` is sent.
//! - Anything else, ahead or behind, is discarded and answered with a
//!   duplicate ack for the last good frame (`expected - 1`), or
//!   [`Ack::NoneYet`] when nothing has been accepted.
//! - Records that do not parse are logged and dropped without an ack.
//! - On end-of-stream the accepted payloads are regrouped into bytes and
//!   written to the sink.

use std::sync::Arc;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::channel::{Ack, Datagram};
use crate::codec::FrameCodec;
use crate::config::GbnConfig;
use crate::error::{Error, Result};
use crate::events::{Event, EventSink};
use crate::frame::{Frame, SeqNum};

/// In-order reassembly state.
///
/// # Invariants
/// - `assembled.len() == expected`
#[derive(Debug, Default)]
pub struct ReceiverCursor {
    expected: usize,
    assembled: Vec<Frame>,
}

impl ReceiverCursor {
    /// Next sequence number required for acceptance.
    pub fn expected(&self) -> usize {
        self.expected
    }

    pub fn assembled(&self) -> &[Frame] {
        &self.assembled
    }

    /// Ack for the last accepted frame, `expected - 1`.
    pub fn last_good(&self) -> Ack {
        match self.expected.checked_sub(1) {
            Some(seq) => Ack::Seq(seq as SeqNum),
            None => Ack::NoneYet,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiverStats {
    pub accepted: u64,
    pub rejected: u64,
    pub malformed: u64,
    pub bytes_written: usize,
}

pub struct GbnReceiver {
    cursor: ReceiverCursor,
    codec: FrameCodec,
    ack_tx: UnboundedSender<Ack>,
    events: Arc<dyn EventSink>,
    stats: ReceiverStats,
}

impl GbnReceiver {
    pub fn new(
        config: &GbnConfig,
        ack_tx: UnboundedSender<Ack>,
        events: Arc<dyn EventSink>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cursor: ReceiverCursor::default(),
            codec: FrameCodec::new(config.frame_capacity_bits)?,
            ack_tx,
            events,
            stats: ReceiverStats::default(),
        })
    }

    pub fn cursor(&self) -> &ReceiverCursor {
        &self.cursor
    }

    pub fn stats(&self) -> ReceiverStats {
        self.stats
    }

    /// Accept or reject one frame and send the matching ack.
    ///
    /// Returns `true` if the frame was accepted.
    pub fn on_frame(&mut self, frame: Frame) -> bool {
        let seq = frame.seq;
        if seq as usize == self.cursor.expected {
            self.cursor.assembled.push(frame);
            self.cursor.expected += 1;
            self.stats.accepted += 1;
            self.events.record(Event::Received { seq });
            self.send_ack(Ack::Seq(seq));
            true
        } else {
            self.stats.rejected += 1;
            self.events.record(Event::OutOfOrder {
                seq,
                expected: self.cursor.expected,
            });
            self.send_ack(self.cursor.last_good());
            false
        }
    }

    /// Parse a data-channel record and hand it to [`GbnReceiver::on_frame`].
    ///
    /// Returns `None` for a malformed record, which is logged and discarded.
    pub fn on_datagram(&mut self, bytes: &[u8]) -> Option<bool> {
        match Frame::decode(bytes) {
            Ok(frame) => Some(self.on_frame(frame)),
            Err(e) => {
                log::warn!("[gbn:receiver] {e}");
                self.stats.malformed += 1;
                self.events.record(Event::Malformed {
                    reason: e.to_string(),
                });
                None
            }
        }
    }

    /// Regroup the accepted payloads into the transferred bytes.
    pub fn reassemble(&self) -> Result<Vec<u8>> {
        Ok(self.codec.decode(&self.cursor.assembled)?)
    }

    /// Stop consuming, reassemble and write everything to `sink`.
    pub async fn on_end_of_stream<W>(&mut self, sink: &mut W) -> Result<usize>
    where
        W: AsyncWrite + Unpin,
    {
        let bytes = self.reassemble()?;
        sink.write_all(&bytes).await?;
        sink.flush().await?;
        self.stats.bytes_written = bytes.len();
        self.events.record(Event::Written { bytes: bytes.len() });
        Ok(bytes.len())
    }

    /// Consume the data channel until end-of-stream, then flush to `sink`.
    pub async fn run<W>(
        mut self,
        mut data_rx: UnboundedReceiver<Datagram>,
        sink: &mut W,
    ) -> Result<ReceiverStats>
    where
        W: AsyncWrite + Unpin,
    {
        loop {
            match data_rx.recv().await {
                Some(Datagram::Frame(bytes)) => {
                    self.on_datagram(&bytes);
                }
                Some(Datagram::EndOfStream) => break,
                None => return Err(Error::ChannelClosed("data")),
            }
        }
        self.on_end_of_stream(sink).await?;
        log::debug!(
            "[gbn:receiver] done: {} accepted, {} rejected, {} bytes written",
            self.stats.accepted,
            self.stats.rejected,
            self.stats.bytes_written
        );
        Ok(self.stats)
    }

    /// The sender stops listening once it has every ack it needs, so late
    /// duplicate acks may have nowhere to go.
    fn send_ack(&self, ack: Ack) {
        if self.ack_tx.send(ack).is_err() {
            log::debug!("[gbn:receiver] ack {ack} not delivered; sender finished");
        }
    }
}
