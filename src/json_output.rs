//! JSON output for the UI stream
//!
//! Structured stdout events consumed by the GUI: periodic state snapshots,
//! per-command status, and the shutdown notification.

use crate::state::{JointSnapshot, PositionSnapshot, JOINT_SLOT_COUNT};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Get current timestamp as f64 seconds since UNIX epoch with consistent precision
pub fn current_timestamp() -> f64 {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64();

    // Round to 6 decimal places for consistent formatting
    (timestamp * 1_000_000.0).round() / 1_000_000.0
}

fn round_to(value: f64, decimal_places: u32) -> f64 {
    let multiplier = 10.0_f64.powi(decimal_places as i32);
    (value * multiplier).round() / multiplier
}

/// Command execution status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandStatus {
    Sent,
    Completed,
    Failed,
}

/// Command status event output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandStatusEvent {
    /// Timestamp when event occurred
    pub timestamp: f64,
    /// Event type for JSON parsing
    #[serde(rename = "type")]
    pub event_type: String,
    /// Sequence number assigned by the command stream
    pub command_id: u32,
    /// Current status of the command
    pub status: CommandStatus,
    /// Human-readable message
    pub message: String,
    /// Original command line (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

/// Periodic snapshot of the cached robot state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateEvent {
    /// Timestamp when event was emitted
    pub timestamp: f64,
    /// Event type for JSON parsing
    #[serde(rename = "type")]
    pub event_type: String,
    /// Joint angles in radians, arm joints first, tool joint last
    pub joint_positions: [f64; JOINT_SLOT_COUNT],
    /// End-effector position [x, y, z] in meters
    pub end_effector_position: [f64; 3],
}

/// Emitted once when the telemetry transport disconnects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShutdownEvent {
    /// Timestamp when event occurred
    pub timestamp: f64,
    /// Event type for JSON parsing
    #[serde(rename = "type")]
    pub event_type: String,
    /// Why the daemon is going down
    pub reason: String,
}

impl CommandStatusEvent {
    /// Create a new command status event
    pub fn new(command_id: u32, status: CommandStatus, message: &str, command: Option<String>) -> Self {
        Self {
            timestamp: current_timestamp(),
            event_type: "command_status".to_string(),
            command_id,
            status,
            message: message.to_string(),
            command,
        }
    }

    /// Create a command sent event
    pub fn sent(command_id: u32, command: &str) -> Self {
        Self::new(
            command_id,
            CommandStatus::Sent,
            "Command sent to planner",
            Some(command.to_string()),
        )
    }

    /// Create a command completed event
    pub fn completed(command_id: u32) -> Self {
        Self::new(
            command_id,
            CommandStatus::Completed,
            "Plan executed",
            None,
        )
    }

    /// Create a command failed event
    pub fn failed(command_id: u32, error_msg: &str) -> Self {
        Self::new(command_id, CommandStatus::Failed, error_msg, None)
    }

    /// Create a rejected event for an unparseable command line (command ID 0)
    pub fn rejected(command: &str, reason: &str) -> Self {
        Self::new(
            0,
            CommandStatus::Failed,
            &format!("Command rejected: {}", reason),
            Some(command.to_string()),
        )
    }
}

impl StateEvent {
    /// Build a state event from the cached snapshots, rounding values for
    /// stable output width.
    pub fn new_rounded(
        joints: &JointSnapshot,
        end_effector: &PositionSnapshot,
        decimal_places: u32,
    ) -> Self {
        let mut joint_positions = joints.positions;
        for value in joint_positions.iter_mut() {
            *value = round_to(*value, decimal_places);
        }

        let mut position = end_effector.position;
        for value in position.iter_mut() {
            *value = round_to(*value, decimal_places);
        }

        Self {
            timestamp: current_timestamp(),
            event_type: "state".to_string(),
            joint_positions,
            end_effector_position: position,
        }
    }
}

impl ShutdownEvent {
    pub fn new(reason: &str) -> Self {
        Self {
            timestamp: current_timestamp(),
            event_type: "shutdown".to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Output a JSON event to stdout
pub fn output_event<T: Serialize>(event: &T) {
    if let Ok(json) = serde_json::to_string(event) {
        println!("{}", json);
    }
}
