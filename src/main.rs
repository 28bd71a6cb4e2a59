//! Helper quorum simulator.
//!
//! Spins up the controller and one session per simulated helper, lets the
//! pairing and keep-alive traffic run for a while, then prints the
//! controller's view.
//!
//! ```bash
//! helper-quorum --helpers 5 --loss 0.2 --duration 10
//! ```

use std::time::Duration;

use clap::Parser;
use helper_quorum::network::{SimulatedPeerConfig, SimulatedTransport};
use helper_quorum::{ControllerConfig, ControllerProcessor, HelperId, SessionConfig, SessionRunner};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "helper-quorum")]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of simulated helpers
    #[arg(short = 'n', long, default_value = "5")]
    helpers: usize,

    /// Seed for the simulated helpers
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Probability that a helper refuses pairing (0.0-1.0)
    #[arg(long, default_value = "0.1")]
    refuse: f64,

    /// Probability that a request goes unanswered (0.0-1.0)
    #[arg(long, default_value = "0.1")]
    loss: f64,

    /// How long to run, in seconds
    #[arg(short = 'd', long, default_value = "10")]
    duration: u64,

    /// Helpers to unpair halfway through
    #[arg(long, default_value = "0")]
    unpair: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,helper_quorum=info")),
        )
        .init();

    let args = Args::parse();

    let (processor, controller) = ControllerProcessor::new(&ControllerConfig::default());
    tokio::spawn(processor.run());

    let session_config = SessionConfig::default()
        .with_pair_timeout(Duration::from_millis(500))
        .with_keep_alive_timeout(Duration::from_millis(300))
        .with_keep_alive_delay(Duration::from_millis(200));
    let peer_config = SimulatedPeerConfig {
        refuse_probability: args.refuse,
        loss_probability: args.loss,
        ..Default::default()
    };

    let mut sessions = Vec::new();
    for index in 0..args.helpers {
        let name = format!("helper-{index}");
        controller.create_helper(name.clone()).await?;
        let transport = SimulatedTransport::new(peer_config.clone(), args.seed.wrapping_add(index as u64));
        let (handle, _task) = SessionRunner::spawn(
            HelperId::parse(&name)?,
            transport,
            session_config.clone(),
            controller.clone(),
        );
        sessions.push(handle);
    }

    let half = Duration::from_millis(args.duration * 500);
    tokio::time::sleep(half).await;

    for handle in sessions.iter().take(args.unpair) {
        info!(helper = %handle.helper(), "Unpairing helper");
        handle.unpair().await?;
    }

    tokio::time::sleep(half).await;

    let snapshot = controller.snapshot().await?;
    println!("State:    {}", snapshot.path());
    println!(
        "Helpers:  min {}, accepted {}, quorum {}, online {}",
        snapshot.min_helpers, snapshot.accepted_count, snapshot.quorum, snapshot.online_count
    );
    for record in &snapshot.helpers {
        println!(
            "  {:<12} accepted {:<5} online {}",
            record.id.to_string(),
            record.accepted,
            record.online
        );
    }
    if let Some(error) = &snapshot.last_error {
        warn!(%error, "Last rejected signal");
    }

    Ok(())
}
