use bt_core::clock::SystemClock;
use bt_core::config::{load_config, AppConfig};
use bt_core::engine::Engine;
use bt_core::logging;
use bt_core::sequence::Sequence;
use bt_core::transport::{EventQueue, InMemoryQueue, RedisQueue};
use bt_protocol::config_models::TransportKind;
use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{bail, eyre};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{info, warn};

mod output;

#[derive(Parser)]
#[command(name = "batch-tracker")]
#[command(about = "Track manufacturing batches step by step from a message queue")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project root containing `.batch-tracker/`
    #[arg(short, long, global = true, default_value = ".")]
    root: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Track one batch from stdin JSON lines or a Redis list
    Run {
        /// Name of the routing to follow
        routing: String,

        /// Seconds between cycles (overrides config.toml)
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,

        /// Message source (overrides config.toml)
        #[arg(short, long, value_enum)]
        transport: Option<TransportArg>,

        /// Redis list to drain (overrides config.toml)
        #[arg(short, long)]
        queue: Option<String>,

        /// Print events as JSON lines instead of text
        #[arg(long)]
        json: bool,
    },

    /// List configured routings
    Routings,
}

#[derive(Clone, Copy, ValueEnum)]
enum TransportArg {
    Stdin,
    Redis,
}

impl From<TransportArg> for TransportKind {
    fn from(arg: TransportArg) -> Self {
        match arg {
            TransportArg::Stdin => TransportKind::Stdin,
            TransportArg::Redis => TransportKind::Redis,
        }
    }
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    // Configuration first, logging depends on it
    let config = load_config(&cli.root).await?;
    let _logging = logging::init_logging(&config.global.logging, cli.debug)
        .map_err(|e| eyre!(e))?;

    match cli.command {
        Commands::Run {
            routing,
            interval,
            transport,
            queue,
            json,
        } => {
            let opts = RunOptions {
                routing: &routing,
                interval,
                transport,
                queue,
                json,
            };
            cmd_run(&config, &cli.root, opts).await
        }
        Commands::Routings => {
            cmd_routings(&config, &cli.root);
            Ok(())
        }
    }
}

/// Options of the `run` subcommand.
struct RunOptions<'a> {
    routing: &'a str,
    interval: Option<u64>,
    transport: Option<TransportArg>,
    queue: Option<String>,
    json: bool,
}

async fn cmd_run(config: &AppConfig, root: &Path, opts: RunOptions<'_>) -> color_eyre::Result<()> {
    let routing_name = opts.routing;
    let routing = config.routing(routing_name).ok_or_else(|| {
        eyre!(
            "Routing '{routing_name}' not found under {}. Available: {}",
            root.display(),
            config.routing_names().join(", ")
        )
    })?;

    let interval_secs = opts.interval.unwrap_or(config.global.poll_interval_secs);
    if interval_secs == 0 {
        bail!("poll_interval_secs must be at least 1");
    }
    let interval = Duration::from_secs(interval_secs);

    let transport = opts
        .transport
        .map(TransportKind::from)
        .unwrap_or(config.global.transport);
    let queue_name = opts
        .queue
        .unwrap_or_else(|| config.global.queue_name.clone());

    let sequence = Sequence::from_routing(routing)?;
    info!(
        batch_id = %sequence.batch_id(),
        routing = %routing.name,
        transport = ?transport,
        "Tracking batch"
    );

    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
    let ctrl_c_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl-C");
            let _ = ctrl_c_tx.send(()).await;
        }
    });

    let tracker = Tracker {
        sequence,
        interval,
        buffer: config.global.snapshot_buffer.max(1),
        json: opts.json,
        shutdown: shutdown_rx,
    };

    match transport {
        TransportKind::Stdin => {
            let queue = InMemoryQueue::new();
            let stdin_closed = spawn_stdin_reader(queue.clone(), shutdown_tx);
            tracker.run(queue, Some(stdin_closed)).await
        }
        TransportKind::Redis => {
            let queue = RedisQueue::new(&config.global.redis_url, queue_name)?;
            info!(url = %config.global.redis_url, queue = %queue.queue_name(), "Polling Redis list");
            tracker.run(queue, None).await
        }
    }
}

/// An engine run wired to the console.
struct Tracker {
    sequence: Sequence,
    interval: Duration,
    buffer: usize,
    json: bool,
    shutdown: mpsc::Receiver<()>,
}

impl Tracker {
    /// Run until shutdown. When `input_closed` is set at that point, one
    /// more cycle picks up whatever arrived after the last tick.
    async fn run<Q: EventQueue>(
        self,
        queue: Q,
        input_closed: Option<Arc<AtomicBool>>,
    ) -> color_eyre::Result<()> {
        let (events_tx, events_rx) = mpsc::channel(self.buffer);
        let printer = tokio::spawn(output::print_events(events_rx, self.json));

        let mut engine = Engine::new(self.sequence, queue, SystemClock, events_tx);
        let cycles = engine.run_forever(self.interval, self.shutdown).await;

        if input_closed.is_some_and(|closed| closed.load(Ordering::SeqCst)) {
            engine.run_once().await;
        }
        info!(cycles = engine.frame(), run = cycles, "Engine stopped");

        drop(engine);
        printer.await?;
        Ok(())
    }
}

/// Feed stdin lines into `queue` from a plain thread.
///
/// A blocked read must not keep the runtime alive at exit, so this does not
/// use tokio's stdin. Returns a flag set once stdin reaches end of input.
fn spawn_stdin_reader(queue: InMemoryQueue, shutdown: mpsc::Sender<()>) -> Arc<AtomicBool> {
    let closed = Arc::new(AtomicBool::new(false));
    let flag = closed.clone();
    let handle = Handle::current();

    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) if line.trim().is_empty() => {}
                Ok(line) => handle.block_on(queue.push(line)),
                Err(e) => {
                    warn!(error = %e, "Failed to read stdin");
                    break;
                }
            }
        }
        flag.store(true, Ordering::SeqCst);
        let _ = shutdown.blocking_send(());
    });

    closed
}

fn cmd_routings(config: &AppConfig, root: &Path) {
    if config.routings.is_empty() {
        println!(
            "No routings found in {}",
            root.join(bt_core::config::CONFIG_DIR).join("routings").display()
        );
        return;
    }

    for routing in &config.routings {
        println!("{}", output::format_routing(routing));
    }
}
