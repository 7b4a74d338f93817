//! Manipulator control daemon
//!
//! Connects the arm and gripper planning groups, subscribes to the
//! driver's joint-state telemetry, and runs the stdin/stdout command
//! stream until the UI closes stdin or the telemetry transport goes away.

use anyhow::{Context, Result};
use armd::{planning, ArmNode, CommandStream, Config, JointStateSource, PlannerClient};
use clap::Parser;
use tracing::info;

#[derive(Parser)]
#[command(name = "armd")]
#[command(about = "Manipulator control daemon - joint telemetry cache and motion-planning frontend")]
#[command(version)]
struct Args {
    /// Path to the daemon configuration file
    #[arg(short, long)]
    config: Option<String>,
}

impl Args {
    fn get_config_path(&self) -> String {
        self.config
            .clone()
            .or_else(|| std::env::var("ARMD_CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/default_config.yaml".to_string())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config_path = args.get_config_path();

    // Events go to stdout; logs stay on stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("Manipulator control daemon");
    info!("Using config: {}", config_path);

    let config = Config::load(&config_path).context("Failed to load configuration")?;

    let arm = PlannerClient::connect(
        &config.planner.host,
        config.planner.port,
        &config.planner.arm_group,
        config.planner.read_timeout(),
    )
    .context("Failed to connect arm planning group")?;
    info!("Arm planning group '{}' connected", config.planner.arm_group);

    let gripper = PlannerClient::connect(
        &config.planner.host,
        config.planner.port,
        &config.planner.gripper_group,
        config.planner.read_timeout(),
    )
    .context("Failed to connect gripper planning group")?;
    info!(
        "Gripper planning group '{}' connected",
        config.planner.gripper_group
    );

    let telemetry = JointStateSource::connect(&config.telemetry)
        .context("Failed to connect joint-state telemetry")?
        .subscribe(config.telemetry.queue_depth());

    let node = ArmNode::new(
        planning::shared(Box::new(arm)),
        planning::shared(Box::new(gripper)),
        telemetry,
        &config,
    );

    let publisher = CommandStream::spawn_state_publisher(
        node.state_view(),
        config.publishing.pub_rate_hz,
        config.publishing.decimal_places(),
    );

    info!("Ready for commands");
    let mut stream = CommandStream::new(node);
    let result = stream.run().await;

    publisher.abort();
    info!("Shutdown complete");
    result
}
