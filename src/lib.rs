//! armd - GUI-backing manipulator control daemon
//!
//! Thin glue between three collaborators: a robot driver publishing
//! joint-state telemetry, an external motion-planning service that owns
//! kinematics and trajectory execution, and a UI that displays cached
//! state and issues move commands. The daemon caches the latest joint
//! angles and end-effector position, and forwards joint-space, task-space,
//! and gripper goals through a plan-then-execute round trip.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use armd::{planning, ArmNode, CommandStream, Config, JointStateSource, PlannerClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/default_config.yaml")?;
//!
//!     let arm = PlannerClient::connect(
//!         &config.planner.host,
//!         config.planner.port,
//!         &config.planner.arm_group,
//!         config.planner.read_timeout(),
//!     )?;
//!     let gripper = PlannerClient::connect(
//!         &config.planner.host,
//!         config.planner.port,
//!         &config.planner.gripper_group,
//!         config.planner.read_timeout(),
//!     )?;
//!
//!     let telemetry = JointStateSource::connect(&config.telemetry)?
//!         .subscribe(config.telemetry.queue_depth());
//!
//!     let node = ArmNode::new(
//!         planning::shared(Box::new(arm)),
//!         planning::shared(Box::new(gripper)),
//!         telemetry,
//!         &config,
//!     );
//!     CommandStream::new(node).run().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **ArmNode**: snapshot getters and the three command entry points
//! - **TelemetryListener**: fixed-rate joint-state intake + pose queries
//! - **StateCache / StateView**: last-write-wins snapshot fan-out
//! - **PlanningGroup**: trait seam to the motion-planning service
//! - **PlannerClient**: JSON-lines TCP implementation of the seam
//! - **CommandStream**: stdin/stdout JSON boundary for the UI

pub mod config;
pub mod error;
pub mod json_output;
pub mod node;
pub mod planner_client;
pub mod planning;
pub mod state;
pub mod stream;
pub mod telemetry;

// High-level exports for easy usage
pub use config::{Config, JointConfig, PlannerConfig, PublishingConfig, TelemetryConfig};
pub use error::{ArmdError, Result};
pub use node::ArmNode;
pub use planner_client::PlannerClient;
pub use stream::{CommandStream, UiCommand};

// Core component exports for advanced usage
pub use json_output::{CommandStatus, CommandStatusEvent, ShutdownEvent, StateEvent};
pub use planning::{
    MotionPlan, MotionTarget, PlanOutcome, PlanningGroup, SharedPlanningGroup, TrajectoryPoint,
};
pub use state::{
    JointSnapshot, PositionSnapshot, StateCache, StateView, ARM_JOINT_COUNT, JOINT_SLOT_COUNT,
};
pub use telemetry::{JointStateMessage, JointStateSource, TelemetryListener};
