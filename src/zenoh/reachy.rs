use std::time::Duration;

use clap::Parser;
use episode_nodes::{
    node::{Node, NodeKeys},
    reachy::{ReachyBridge, ACTION, AGENT_POS, TICK},
    simulated_reachy::SimulatedReachy,
    Result,
};
use tracing::info;

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "reachy/action")]
    action_key: String,

    #[arg(long, default_value = "reachy/tick")]
    tick_key: String,

    #[arg(long, default_value = "reachy/agent_pos")]
    agent_pos_key: String,

    /// Pause after turning on and after the initial pose.
    #[arg(long, default_value_t = 1000)]
    settle_ms: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "episode_nodes=info,zenoh_reachy=info".into()),
        )
        .init();

    let args = Args::parse();

    // no Rust binding for the vendor SDK yet
    let mut bridge = ReachyBridge::new(SimulatedReachy::default());
    bridge.start(Duration::from_millis(args.settle_ms))?;
    info!("robot ready");

    let keys = NodeKeys::default()
        .input(ACTION, &args.action_key)
        .input(TICK, &args.tick_key)
        .output(AGENT_POS, &args.agent_pos_key);
    let mut node = Node::init(&keys)?;

    while let Some(event) = node.recv() {
        bridge.handle(&event, &mut node)?;
    }
    Ok(())
}
