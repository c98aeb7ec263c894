//! Scenelink CLI - drives a simulated receive-and-convert workflow.
//!
//! This binary exercises the library end to end: it receives a simulated
//! interchange commit with live console progress, converts it to native
//! objects, and prints the resulting tree. Ctrl-C maps to the progress
//! surface's cancel affordance.

mod error;
mod surface;

use clap::Parser;
use error::CliError;
use scenelink::graph::NativeObject;
use scenelink::log::TracingLogger;
use scenelink::orchestrator::ReceiveOrchestrator;
use scenelink::receiver::{FailureMode, Selection, SimulatedReceiver, SimulatedReceiverConfig};
use scenelink::surface::{IdleQueue, ProgressSurface};
use std::sync::Arc;
use std::time::Duration;
use surface::ConsoleSurface;
use tracing_subscriber::EnvFilter;

/// How often the idle queue stands in for the UI tick.
const TICK_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Parser)]
#[command(name = "scenelink")]
#[command(about = "Receive a simulated interchange commit and convert it", long_about = None)]
#[command(version = scenelink::VERSION)]
struct Args {
    /// Server URL shown in the progress title
    #[arg(long, default_value = "https://demo.scenelink.local")]
    server: String,

    /// Branch the commit lives on
    #[arg(long, default_value = "main")]
    branch: String,

    /// Commit identifier to receive
    #[arg(long, default_value = "c0ffee1")]
    commit: String,

    /// Number of child objects in the simulated commit
    #[arg(long, default_value = "24")]
    children: u64,

    /// Simulated deserialization workers
    #[arg(long, default_value = "4")]
    workers: usize,

    /// Delay between progress notifications, in milliseconds
    #[arg(long, default_value = "50")]
    step_delay_ms: u64,

    /// Inject a receive failure at the given object index
    #[arg(long, conflicts_with = "cancel_at")]
    fail_at: Option<u64>,

    /// Inject a server-side cancellation at the given object index
    #[arg(long)]
    cancel_at: Option<u64>,
}

impl Args {
    fn failure_mode(&self) -> FailureMode {
        match (self.fail_at, self.cancel_at) {
            (Some(step), _) => FailureMode::FailAt(step),
            (_, Some(step)) => FailureMode::CancelAt(step),
            _ => FailureMode::None,
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn print_tree(object: &NativeObject, depth: usize) {
    println!("{}{} ({})", "  ".repeat(depth), object.name, object.kind);
    for child in &object.children {
        print_tree(child, depth + 1);
    }
}

#[tokio::main]
async fn main() {
    init_logging();
    let args = Args::parse();

    let config = SimulatedReceiverConfig::default()
        .with_children(args.children)
        .with_workers(args.workers)
        .with_step_delay(Duration::from_millis(args.step_delay_ms))
        .with_failure(args.failure_mode());
    let receiver = SimulatedReceiver::new(config).with_selection(Selection {
        server_url: args.server,
        branch: args.branch,
        commit_id: args.commit,
    });

    let surface = Arc::new(ConsoleSurface::new(30));
    let idle = IdleQueue::new();
    let orchestrator = ReceiveOrchestrator::new(
        Arc::clone(&surface) as Arc<dyn ProgressSurface>,
        Arc::clone(&idle),
        Arc::new(TracingLogger),
    );

    // Ctrl-C acts as the cancel affordance on the progress surface.
    {
        let surface = Arc::clone(&surface);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                surface.request_cancel();
            }
        });
    }

    // Stand-in for the editor's idle tick: drain deferred UI updates.
    let ticker = {
        let idle = Arc::clone(&idle);
        tokio::spawn(async move {
            loop {
                idle.run_pending();
                tokio::time::sleep(TICK_INTERVAL).await;
            }
        })
    };

    let result = orchestrator.receive(&receiver).await;
    ticker.abort();
    while idle.run_pending() > 0 {}

    match result {
        Ok(Some(native)) => {
            print_tree(&native, 0);
            println!(
                "Converted {} objects, attached under '{}'",
                1 + native.descendant_count(),
                native.parent().map(|p| p.as_str()).unwrap_or("<none>")
            );
        }
        Ok(None) => CliError::NoResult.exit(),
        Err(error) => CliError::Receive(error).exit(),
    }
}
