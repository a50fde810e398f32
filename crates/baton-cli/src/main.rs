use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use rand::Rng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use baton_core::{Producer, QueueConfig, SerialQueue, TaskError, TaskState};

#[derive(Debug, Parser)]
#[command(name = "baton", about = "Run producers one at a time, in submission order")]
struct Args {
    /// Number of tasks per run
    #[arg(short, long, default_value_t = 4)]
    tasks: u32,

    /// Upper bound of each task's random latency
    #[arg(short, long, default_value_t = 100)]
    max_delay_ms: u64,

    /// JSON queue config, e.g. {"name": "demo", "initial_capacity": 16}
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Sleeps for a while, then prints its index.
struct Announce {
    index: u32,
    delay: Duration,
    started: Instant,
}

#[async_trait]
impl Producer for Announce {
    type Output = u32;
    type Error = std::convert::Infallible;

    async fn produce(self) -> Result<u32, Self::Error> {
        tokio::time::sleep(self.delay).await;
        println!(
            "  task {} (slept {:>3}ms, t+{}ms)",
            self.index,
            self.delay.as_millis(),
            self.started.elapsed().as_millis()
        );
        Ok(self.index)
    }
}

fn random_delay(max_ms: u64) -> Duration {
    Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
}

fn load_config(path: Option<&PathBuf>) -> Result<QueueConfig> {
    let Some(path) = path else {
        return Ok(QueueConfig::new("demo"));
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading queue config {}", path.display()))?;
    QueueConfig::from_json_str(&json)
        .with_context(|| format!("parsing queue config {}", path.display()))
}

/// Without the queue: every task starts at once and finishes whenever.
async fn run_unordered(args: &Args) {
    println!("[RANDOM]");
    let started = Instant::now();
    let runs: Vec<_> = (1..=args.tasks)
        .map(|index| {
            let task = Announce {
                index,
                delay: random_delay(args.max_delay_ms),
                started,
            };
            tokio::spawn(task.produce())
        })
        .collect();
    for run in runs {
        if let Err(e) = run.await {
            tracing::error!(error = %e, "unqueued task exited abnormally");
        }
    }
}

/// Through the queue: same tasks, printed in submission order.
async fn run_serial(queue: &SerialQueue, args: &Args) -> Result<()> {
    println!("[QUEUE]");
    let started = Instant::now();
    let handles: Vec<_> = (1..=args.tasks)
        .map(|index| {
            queue.submit_task(Announce {
                index,
                delay: random_delay(args.max_delay_ms),
                started,
            })
        })
        .collect();

    for (expected, handle) in (1..=args.tasks).zip(handles) {
        let index = handle.await?;
        anyhow::ensure!(index == expected, "task {index} settled out of order");
    }
    Ok(())
}

/// A failing task does not stop the one behind it.
async fn run_failure(queue: &SerialQueue) {
    println!("[FAILURE]");
    let second_ran = Arc::new(AtomicBool::new(false));

    let first = queue.submit(|| async { Err::<i32, _>("boom") });
    let flag = Arc::clone(&second_ran);
    let second = queue.submit(move || async move {
        flag.store(true, Ordering::SeqCst);
        Ok::<i32, &str>(42)
    });

    match first.await {
        Err(TaskError::Failed(e)) => println!("  task 1 failed: {e}"),
        other => println!("  task 1 unexpected: {other:?}"),
    }
    match second.await {
        Ok(v) => println!("  task 2 succeeded: {v}"),
        Err(e) => println!("  task 2 unexpected: {e}"),
    }
    println!(
        "  task 2 ran: {}",
        second_ran.load(Ordering::SeqCst)
    );
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "baton_cli=info,baton_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load_config(args.config.as_ref())?;
    let queue = SerialQueue::with_config(config)?;
    tracing::info!(queue = queue.name(), tasks = args.tasks, "starting demo");

    run_unordered(&args).await;
    run_serial(&queue, &args).await?;
    run_failure(&queue).await;

    let stats = queue.stats();
    println!("[STATS]");
    println!("  {}", serde_json::to_string(&stats)?);
    tracing::info!(
        submitted = stats.submitted(),
        settled = stats.settled(),
        succeeded = stats.count(TaskState::Succeeded),
        failed = stats.count(TaskState::Failed),
        "demo finished"
    );

    queue.shutdown().await;
    Ok(())
}
