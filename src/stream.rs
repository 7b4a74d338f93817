//! UI command stream
//!
//! The UI boundary of the daemon: JSON commands arrive one per line on
//! stdin, JSON events leave on stdout. A background publisher emits the
//! cached state at a fixed rate; the stream loop dispatches commands to
//! the node and reports per-command status. Unparseable lines are
//! rejected with an event, never fatal.

use crate::json_output::{output_event, CommandStatusEvent, ShutdownEvent, StateEvent};
use crate::node::ArmNode;
use crate::state::{StateView, ARM_JOINT_COUNT};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{error, info};

fn default_path_time() -> f64 {
    2.0
}

/// Command accepted on stdin, one JSON object per line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum UiCommand {
    /// Move the arm to four joint angles (radians)
    JointSpace {
        angles: [f64; ARM_JOINT_COUNT],
        #[serde(default = "default_path_time")]
        path_time: f64,
    },
    /// Move the end effector to a Cartesian position (meters)
    TaskSpace {
        position: [f64; 3],
        #[serde(default = "default_path_time")]
        path_time: f64,
    },
    /// Move the gripper joint to an angle (radians)
    Gripper { angle: f64 },
}

/// Command streaming processor that reads from stdin and dispatches to the node
pub struct CommandStream {
    node: ArmNode,
    command_count: u32,
}

impl CommandStream {
    pub fn new(node: ArmNode) -> Self {
        Self {
            node,
            command_count: 0,
        }
    }

    /// Spawn the fixed-rate state publisher feeding the UI.
    pub fn spawn_state_publisher(
        view: StateView,
        pub_rate_hz: u32,
        decimal_places: u32,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let period = Duration::from_millis((1000 / u64::from(pub_rate_hz.max(1))).max(1));
            let mut ticker = tokio::time::interval(period);

            loop {
                ticker.tick().await;
                let event =
                    StateEvent::new_rounded(&view.joints(), &view.end_effector(), decimal_places);
                output_event(&event);
            }
        })
    }

    /// Process stdin until EOF or the telemetry transport goes away.
    pub async fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut lines = BufReader::new(stdin).lines();
        let mut shutdown_rx = self.node.shutdown_receiver();

        loop {
            tokio::select! {
                changed = shutdown_rx.changed() => {
                    if changed.is_ok() && !*shutdown_rx.borrow() {
                        continue;
                    }
                    info!("Telemetry transport lost, closing command stream");
                    output_event(&ShutdownEvent::new("telemetry transport disconnected"));
                    return Ok(());
                }
                line = lines.next_line() => {
                    match line? {
                        Some(line) => self.handle_line(&line).await,
                        None => {
                            info!("stdin closed, ending command stream");
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    async fn handle_line(&mut self, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }

        let command: UiCommand = match serde_json::from_str(trimmed) {
            Ok(command) => command,
            Err(e) => {
                output_event(&CommandStatusEvent::rejected(trimmed, &e.to_string()));
                return;
            }
        };

        self.command_count += 1;
        let command_id = self.command_count;
        output_event(&CommandStatusEvent::sent(command_id, trimmed));

        let result = match command {
            UiCommand::JointSpace { angles, path_time } => {
                self.node.send_joint_goal(angles, path_time).await
            }
            UiCommand::TaskSpace {
                position,
                path_time,
            } => self.node.send_position_goal(position, path_time).await,
            UiCommand::Gripper { angle } => self.node.send_gripper_goal(angle).await,
        };

        match result {
            Ok(true) => output_event(&CommandStatusEvent::completed(command_id)),
            Ok(false) => output_event(&CommandStatusEvent::failed(command_id, "Planning failed")),
            Err(e) => {
                error!("Command {} failed: {}", command_id, e);
                output_event(&CommandStatusEvent::failed(command_id, &e.to_string()));
            }
        }
    }
}
