//! One complete transfer: sender and receiver wired over a fresh channel pair.
//!
//! ```text
//!   source ──▶ GbnSender ──data──▶ GbnReceiver ──▶ sink
//!              (spawned)  ◀──ack──  (caller's task)
//! ```
//!
//! The sender runs as its own tokio task; the receiver runs on the caller's
//! task so it can borrow the sink.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWrite;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;

use crate::channel::{channel_pair, Ack, Datagram};
use crate::config::GbnConfig;
use crate::error::{Error, Result};
use crate::events::EventSink;
use crate::gbn_receiver::{GbnReceiver, ReceiverStats};
use crate::gbn_sender::{GbnSender, SenderStats};

/// Outcome of a finished transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferReport {
    pub sender: SenderStats,
    pub receiver: ReceiverStats,
    pub elapsed: Duration,
}

/// Both engines plus the channel ends they consume, ready to run.
struct Engines {
    sender: GbnSender,
    ack_rx: UnboundedReceiver<Ack>,
    receiver: GbnReceiver,
    data_rx: UnboundedReceiver<Datagram>,
}

impl Engines {
    /// Validate, frame the source and wire both engines. Nothing runs yet.
    fn build(source: &[u8], config: &GbnConfig, events: Arc<dyn EventSink>) -> Result<Self> {
        let (sender_link, receiver_link) = channel_pair();
        let sender = GbnSender::new(source, config, sender_link.data_tx, events.clone())?;
        let receiver = GbnReceiver::new(config, receiver_link.ack_tx, events)?;
        Ok(Self {
            sender,
            ack_rx: sender_link.ack_rx,
            receiver,
            data_rx: receiver_link.data_rx,
        })
    }

    async fn run<W>(self, sink: &mut W) -> Result<TransferReport>
    where
        W: AsyncWrite + Unpin,
    {
        let started = Instant::now();
        let sender_task = tokio::spawn(self.sender.run(self.ack_rx));

        let receiver_stats = match self.receiver.run(self.data_rx, sink).await {
            Ok(stats) => stats,
            Err(e @ Error::ChannelClosed(_)) => {
                // the sender hung up first; its own error is the cause
                sender_task.await??;
                return Err(e);
            }
            Err(e) => {
                sender_task.abort();
                return Err(e);
            }
        };
        let sender_stats = sender_task.await??;

        Ok(TransferReport {
            sender: sender_stats,
            receiver: receiver_stats,
            elapsed: started.elapsed(),
        })
    }
}

/// Move `source` to `sink` with Go-Back-N over a simulated lossy channel.
///
/// Configuration and framing errors surface before any task starts.
pub async fn transfer<W>(
    source: &[u8],
    config: &GbnConfig,
    sink: &mut W,
    events: Arc<dyn EventSink>,
) -> Result<TransferReport>
where
    W: AsyncWrite + Unpin,
{
    Engines::build(source, config, events)?.run(sink).await
}

/// [`transfer`] from one file to another.
///
/// The source is read and framed before `output` is opened, so a setup
/// failure leaves an existing output file untouched.
pub async fn transfer_file(
    input: &Path,
    output: &Path,
    config: &GbnConfig,
    events: Arc<dyn EventSink>,
) -> Result<TransferReport> {
    let source = tokio::fs::read(input).await?;
    let engines = Engines::build(&source, config, events)?;
    let mut sink = tokio::fs::File::create(output).await?;
    engines.run(&mut sink).await
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;
    use crate::events::MemorySink;

    #[tokio::test(start_paused = true)]
    async fn sender_failure_is_reported_over_receiver_hangup() {
        let config = GbnConfig::default();
        let mut engines =
            Engines::build(b"Hello World", &config, Arc::new(MemorySink::new())).unwrap();
        // an ack channel whose producer is already gone
        let (dead_tx, dead_rx) = mpsc::unbounded_channel();
        drop(dead_tx);
        engines.ack_rx = dead_rx;

        let mut out = Vec::new();
        let result = engines.run(&mut out).await;
        assert!(
            matches!(result, Err(Error::ChannelClosed("ack"))),
            "got {result:?}"
        );
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn sink_error_stops_the_sender() {
        struct Broken;

        impl AsyncWrite for Broken {
            fn poll_write(
                self: std::pin::Pin<&mut Self>,
                _: &mut std::task::Context<'_>,
                _: &[u8],
            ) -> std::task::Poll<std::io::Result<usize>> {
                std::task::Poll::Ready(Err(std::io::ErrorKind::BrokenPipe.into()))
            }

            fn poll_flush(
                self: std::pin::Pin<&mut Self>,
                _: &mut std::task::Context<'_>,
            ) -> std::task::Poll<std::io::Result<()>> {
                std::task::Poll::Ready(Ok(()))
            }

            fn poll_shutdown(
                self: std::pin::Pin<&mut Self>,
                _: &mut std::task::Context<'_>,
            ) -> std::task::Poll<std::io::Result<()>> {
                std::task::Poll::Ready(Ok(()))
            }
        }

        let config = GbnConfig {
            loss: crate::simulator::LossConfig::None,
            ..GbnConfig::default()
        };
        let result = transfer(b"Hello", &config, &mut Broken, Arc::new(MemorySink::new())).await;
        assert!(matches!(result, Err(Error::Io(_))), "got {result:?}");
    }
}
