//! Go-Back-N send-side engine.
//!
//! [`GbnSender`] owns the frame set and the sliding window for one transfer.
//! It is driven from a single task ([`GbnSender::run`]) that multiplexes ack
//! arrival and the retransmit deadline, so window state has exactly one
//! writer.
//!
//! # Protocol contract
//!
//! - Only frames with `base <= seq < base + window_size` are ever sent.
//! - An ack is accepted only when it names `base`; `base` then advances by
//!   one and the slot newly exposed at the trailing edge is sent.  Every other
//!   ack (stale, duplicate, ahead, sentinel) is logged and ignored.  There is
//!   no fast retransmit.
//! - When any slot in the window has gone unacknowledged for longer than the
//!   timeout, every unacknowledged frame in the window is resent.
//! - Once `base` reaches the frame count the end-of-stream marker is pushed.
//!
//! The synchronous methods take `now` explicitly so the state machine can be
//! stepped in tests without a runtime clock.

use std::ops::Range;
use std::sync::Arc;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::Instant;

use crate::channel::{Ack, Datagram};
use crate::codec::FrameCodec;
use crate::config::GbnConfig;
use crate::error::{Error, Result};
use crate::events::{Event, EventSink};
use crate::frame::Frame;
use crate::simulator::LossModel;
use crate::state::SenderState;
use crate::timer::RetransmitTimer;

// ---------------------------------------------------------------------------
// WindowState
// ---------------------------------------------------------------------------

/// Per-slot bookkeeping for the sliding window.
///
/// ```text
///            base            base + window_size
///  ───acked───┼──── active window ────┼──── not yet sendable ───▶ slots
/// ```
#[derive(Debug)]
pub struct WindowState {
    base: usize,
    window_size: usize,
    sent_at: Vec<Option<Instant>>,
    attempts: Vec<u32>,
    acked: Vec<bool>,
    dropped_once: Vec<bool>,
}

impl WindowState {
    fn new(total: usize, window_size: usize) -> Self {
        Self {
            base: 0,
            window_size,
            sent_at: vec![None; total],
            attempts: vec![0; total],
            acked: vec![false; total],
            dropped_once: vec![false; total],
        }
    }

    /// Oldest unacknowledged slot.
    pub fn base(&self) -> usize {
        self.base
    }

    pub fn total(&self) -> usize {
        self.acked.len()
    }

    /// Slots currently allowed in flight.
    pub fn active(&self) -> Range<usize> {
        self.base..(self.base + self.window_size).min(self.total())
    }

    /// Slots sent at least once and not yet acknowledged.
    pub fn in_flight(&self) -> usize {
        (self.base..self.total())
            .filter(|&slot| self.attempts[slot] > 0 && !self.acked[slot])
            .count()
    }

    pub fn is_acked(&self, slot: usize) -> bool {
        self.acked[slot]
    }

    pub fn attempts(&self, slot: usize) -> u32 {
        self.attempts[slot]
    }

    pub fn was_dropped(&self, slot: usize) -> bool {
        self.dropped_once[slot]
    }

    pub fn sent_at(&self, slot: usize) -> Option<Instant> {
        self.sent_at[slot]
    }
}

// ---------------------------------------------------------------------------
// SenderStats
// ---------------------------------------------------------------------------

/// Counters collected over one transfer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SenderStats {
    pub frames: usize,
    /// Transmission attempts, dropped ones included.
    pub attempts: u64,
    /// Attempts that actually reached the data channel.
    pub enqueued: u64,
    /// Attempts beyond the first for a slot.
    pub retransmissions: u64,
    pub drops: u64,
    pub timeouts: u64,
    pub acks_accepted: u64,
    pub acks_ignored: u64,
}

// ---------------------------------------------------------------------------
// GbnSender
// ---------------------------------------------------------------------------

pub struct GbnSender {
    frames: Vec<Frame>,
    window: WindowState,
    timer: RetransmitTimer,
    tick: std::time::Duration,
    loss: Box<dyn LossModel>,
    data_tx: UnboundedSender<Datagram>,
    events: Arc<dyn EventSink>,
    state: SenderState,
    stats: SenderStats,
}

impl GbnSender {
    /// Validate `config`, slice `source` into frames and prepare the window.
    ///
    /// Nothing is transmitted here.  Any configuration or codec error aborts
    /// construction before a single frame exists.
    pub fn new(
        source: &[u8],
        config: &GbnConfig,
        data_tx: UnboundedSender<Datagram>,
        events: Arc<dyn EventSink>,
    ) -> Result<Self> {
        config.validate()?;
        let codec = FrameCodec::new(config.frame_capacity_bits)?;
        let loss = config.loss.build(config.drop_period)?;
        let frames = codec.encode(source)?;
        log::debug!(
            "[gbn:sender] {} bytes -> {} frames of {} payload bits",
            source.len(),
            frames.len(),
            codec.payload_bits()
        );

        Ok(Self {
            window: WindowState::new(frames.len(), config.window_size),
            stats: SenderStats {
                frames: frames.len(),
                ..SenderStats::default()
            },
            frames,
            timer: RetransmitTimer::new(config.timeout, config.tick),
            tick: config.tick,
            loss,
            data_tx,
            events,
            state: SenderState::Filling,
        })
    }

    /// Replace the configured loss model.
    pub fn with_loss(mut self, loss: Box<dyn LossModel>) -> Self {
        self.loss = loss;
        self
    }

    pub fn window(&self) -> &WindowState {
        &self.window
    }

    pub fn state(&self) -> SenderState {
        self.state
    }

    pub fn stats(&self) -> SenderStats {
        self.stats
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// `true` once every frame has been acknowledged.
    pub fn is_done(&self) -> bool {
        self.window.base >= self.frames.len()
    }

    /// Transmit every unacknowledged slot of the active window.
    ///
    /// Every slot is stamped with `now`, dropped ones included, so their
    /// timers still govern when the next attempt happens.
    pub fn send_window(&mut self, now: Instant) -> Result<()> {
        for slot in self.window.active() {
            if !self.window.acked[slot] {
                self.transmit(slot, now)?;
            }
        }
        Ok(())
    }

    /// Handle one ack from the receiver.
    ///
    /// Returns `true` when the ack was accepted and the window slid.
    pub fn on_ack(&mut self, ack: Ack, now: Instant) -> Result<bool> {
        let base = self.window.base;
        let in_order = matches!(ack, Ack::Seq(seq) if seq as usize == base)
            && base < self.frames.len()
            && !self.window.acked[base];

        if !in_order {
            self.stats.acks_ignored += 1;
            self.events.record(Event::AckIgnored { ack });
            return Ok(false);
        }

        self.state = SenderState::Sliding;
        self.window.acked[base] = true;
        self.window.base += 1;
        self.stats.acks_accepted += 1;
        self.events.record(Event::AckAccepted {
            seq: self.frames[base].seq,
        });

        let exposed = self.window.base + self.window.window_size - 1;
        if exposed < self.frames.len() {
            self.transmit(exposed, now)?;
        }
        self.state = SenderState::Watching;
        Ok(true)
    }

    /// First slot in the active window whose timer has expired at `now`.
    pub fn check_timeouts(&self, now: Instant) -> Option<usize> {
        self.window.active().find(|&slot| {
            !self.window.acked[slot]
                && self
                    .window
                    .sent_at[slot]
                    .is_some_and(|sent| self.timer.expired(sent, now))
        })
    }

    /// Check timers and resend the whole window if any slot expired.
    ///
    /// Returns `true` when a retransmission happened.
    pub fn on_timer(&mut self, now: Instant) -> Result<bool> {
        let Some(slot) = self.check_timeouts(now) else {
            return Ok(false);
        };
        self.stats.timeouts += 1;
        self.events.record(Event::TimedOut {
            seq: self.frames[slot].seq,
        });

        self.state = SenderState::Retransmitting;
        log::debug!(
            "[gbn:sender] timeout on slot {slot}; resending window {:?}",
            self.window.active()
        );
        self.send_window(now)?;
        self.state = SenderState::Watching;
        Ok(true)
    }

    /// Instant at which the oldest unacknowledged slot should be checked.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.window
            .active()
            .filter(|&slot| !self.window.acked[slot])
            .filter_map(|slot| self.window.sent_at[slot])
            .min()
            .map(|sent| self.timer.deadline(sent))
    }

    /// Drive the transfer to completion.
    ///
    /// Sends the first window, then reacts to acks and deadlines until every
    /// frame is acknowledged, and finally pushes the end-of-stream marker.
    pub async fn run(mut self, mut ack_rx: UnboundedReceiver<Ack>) -> Result<SenderStats> {
        self.state = SenderState::Filling;
        self.send_window(Instant::now())?;
        self.state = SenderState::Watching;

        while !self.is_done() {
            let deadline = self
                .next_deadline()
                .unwrap_or_else(|| Instant::now() + self.tick);

            tokio::select! {
                ack = ack_rx.recv() => match ack {
                    Some(ack) => {
                        self.on_ack(ack, Instant::now())?;
                    }
                    None => return Err(Error::ChannelClosed("ack")),
                },
                _ = tokio::time::sleep_until(deadline) => {
                    self.on_timer(Instant::now())?;
                }
            }
        }

        self.state = SenderState::Done;
        self.data_tx
            .send(Datagram::EndOfStream)
            .map_err(|_| Error::ChannelClosed("data"))?;
        log::debug!(
            "[gbn:sender] done: {} frames, {} retransmissions, {} timeouts",
            self.stats.frames,
            self.stats.retransmissions,
            self.stats.timeouts
        );
        Ok(self.stats)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// One transmission attempt for `slot`, subject to the loss model.
    ///
    /// A slot is withheld at most once over the whole transfer.
    fn transmit(&mut self, slot: usize, now: Instant) -> Result<()> {
        let attempt = self.window.attempts[slot] + 1;
        let first_attempt = attempt == 1;
        let seq = self.frames[slot].seq;
        self.window.attempts[slot] = attempt;
        self.stats.attempts += 1;
        if !first_attempt {
            self.stats.retransmissions += 1;
        }
        self.events.record(Event::Sending { seq, attempt });

        let drop =
            !self.window.dropped_once[slot] && self.loss.should_drop(slot, first_attempt);
        if drop {
            self.window.dropped_once[slot] = true;
            self.stats.drops += 1;
            self.events.record(Event::Dropped { seq });
        } else {
            self.data_tx
                .send(Datagram::Frame(self.frames[slot].encode()))
                .map_err(|_| Error::ChannelClosed("data"))?;
            self.stats.enqueued += 1;
        }
        self.window.sent_at[slot] = Some(now);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
