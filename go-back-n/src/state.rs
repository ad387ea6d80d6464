//! Sender finite-state machine types.
//!
//! Transitions are driven by [`crate::gbn_sender::GbnSender`]; this module
//! only names the states so the sender can report where it is.

/// Phases of one transfer, as seen by the sender.
///
/// ```text
///  FILLING ──window sent──▶ WATCHING ──ack == base──▶ SLIDING
///                             ▲  │                       │
///                             │  └──timeout──▶ RETRANSMITTING
///                             └──────────────────────────┘
///                           base == total frames ──▶ DONE
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SenderState {
    /// Initial transmission of the first window.
    #[default]
    Filling,
    /// Window in flight; waiting for an ack or a deadline.
    Watching,
    /// In-order ack accepted; base advanced, trailing slot being sent.
    Sliding,
    /// A slot timed out; the whole window is being resent.
    Retransmitting,
    /// Every frame acknowledged; end-of-stream pushed.
    Done,
}

impl std::fmt::Display for SenderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Filling => "filling",
            Self::Watching => "watching",
            Self::Sliding => "sliding",
            Self::Retransmitting => "retransmitting",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}
