//! Entry point for `gbn-sim`.
//!
//! Parses CLI arguments, sets up logging and runs one Go-Back-N transfer from
//! the input file to the output file.  All protocol work is delegated to the
//! library; `main.rs` owns only process setup.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use go_back_n::simulator::LossConfig;
use go_back_n::{transfer_file, GbnConfig, LogSink};

/// Reliable file transfer over a simulated lossy channel using Go-Back-N.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// File to send.
    #[arg(short, long)]
    input: PathBuf,

    /// File the receiver writes.
    #[arg(short, long)]
    output: PathBuf,

    /// Append protocol events to this file instead of stderr.
    #[arg(short, long)]
    log: Option<PathBuf>,

    /// Maximum frames in flight.
    #[arg(short, long, default_value_t = 4)]
    window: usize,

    /// Frame size in bits, 16-bit sequence number included.
    #[arg(long, default_value_t = 32)]
    packet_bits: usize,

    /// Withhold every Nth frame once.
    #[arg(long, default_value_t = 4)]
    drop_every: usize,

    /// Seconds before an unacknowledged window is resent.
    #[arg(short, long, default_value_t = 1.0)]
    timeout: f64,

    /// Timer granularity in milliseconds.
    #[arg(long, default_value_t = 10)]
    tick_ms: u64,

    #[arg(long, value_enum, default_value_t = Loss::EveryNth)]
    loss: Loss,

    /// Drop probability for `--loss random`.
    #[arg(long, default_value_t = 0.2)]
    loss_rate: f64,

    /// Seed for `--loss random`.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

#[derive(Clone, Copy, ValueEnum)]
enum Loss {
    EveryNth,
    None,
    Random,
}

impl Cli {
    fn config(&self) -> Result<GbnConfig> {
        let timeout = Duration::try_from_secs_f64(self.timeout)
            .with_context(|| format!("invalid timeout {}", self.timeout))?;
        let config = GbnConfig {
            window_size: self.window,
            frame_capacity_bits: self.packet_bits,
            drop_period: self.drop_every,
            timeout,
            tick: Duration::from_millis(self.tick_ms),
            loss: match self.loss {
                Loss::EveryNth => LossConfig::EveryNth,
                Loss::None => LossConfig::None,
                Loss::Random => LossConfig::Random {
                    rate: self.loss_rate,
                    seed: self.seed,
                },
            },
        };
        config.validate()?;
        Ok(config)
    }
}

/// Route `log` output to stderr, or append `<timestamp> - <message>` lines to
/// `path`.  Set `RUST_LOG` to control verbosity; protocol events are `info`.
fn init_logging(path: Option<&PathBuf>) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(path) = path {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening log file {}", path.display()))?;
        builder
            .target(env_logger::Target::Pipe(Box::new(file)))
            .format(|buf, record| writeln!(buf, "{} - {}", buf.timestamp_millis(), record.args()));
    }
    builder.init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log.as_ref())?;
    let config = cli.config()?;

    log::debug!("config: {config:?}");
    let report = transfer_file(&cli.input, &cli.output, &config, Arc::new(LogSink))
        .await
        .with_context(|| format!("transferring {}", cli.input.display()))?;

    let sent = tokio::fs::read(&cli.input).await?;
    let received = tokio::fs::read(&cli.output).await?;
    println!(
        "{} frames, {} transmissions ({} dropped, {} retransmitted), {} timeouts in {:.2?}",
        report.sender.frames,
        report.sender.attempts,
        report.sender.drops,
        report.sender.retransmissions,
        report.sender.timeouts,
        report.elapsed
    );
    if sent == received {
        println!("Data transmitted successfully!");
        Ok(())
    } else {
        anyhow::bail!("output differs from input")
    }
}
