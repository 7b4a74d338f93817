//! Configuration loading for the manipulator node

use crate::{ArmdError, Result};
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub planner: PlannerConfig,
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub joints: JointConfig,
    pub publishing: PublishingConfig,
}

/// Connection settings for the motion-planning service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlannerConfig {
    pub host: String,
    pub port: u16,
    pub arm_group: String,
    pub gripper_group: String,
    pub goal_tolerance: Option<f64>,
    pub read_timeout_seconds: Option<u64>,
}

/// Connection settings for the robot driver's joint-state stream.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    pub host: String,
    pub port: u16,
    pub poll_rate_hz: Option<u32>,
    pub queue_depth: Option<usize>,
}

/// Names of the joints tracked in the state cache.
///
/// The arm joints fill the leading snapshot slots in order; the tool joint
/// takes the final slot.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JointConfig {
    pub arm_joint_names: Vec<String>,
    pub tool_joint_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PublishingConfig {
    pub pub_rate_hz: u32,
    pub decimal_places: Option<u32>,
}

impl Config {
    pub fn load(config_path: &str) -> Result<Self> {
        let contents = fs::read_to_string(config_path)
            .map_err(|e| ArmdError::Config(format!("Failed to read {}: {}", config_path, e)))?;

        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }
}

impl PlannerConfig {
    /// Get goal tolerance with default fallback
    pub fn goal_tolerance(&self) -> f64 {
        self.goal_tolerance.unwrap_or(0.1)
    }

    /// Get socket read timeout with default fallback
    pub fn read_timeout(&self) -> u64 {
        self.read_timeout_seconds.unwrap_or(5)
    }
}

impl TelemetryConfig {
    /// Get listener poll rate with default fallback
    pub fn poll_rate_hz(&self) -> u32 {
        self.poll_rate_hz.unwrap_or(10)
    }

    /// Get message queue depth with default fallback
    pub fn queue_depth(&self) -> usize {
        self.queue_depth.unwrap_or(10)
    }
}

impl Default for JointConfig {
    fn default() -> Self {
        Self {
            arm_joint_names: vec![
                "joint1".to_string(),
                "joint2".to_string(),
                "joint3".to_string(),
                "joint4".to_string(),
            ],
            tool_joint_name: "gripper".to_string(),
        }
    }
}

impl JointConfig {
    /// All tracked joint names in snapshot-slot order (arm joints then tool).
    pub fn slot_names(&self) -> Vec<String> {
        let mut names = self.arm_joint_names.clone();
        names.push(self.tool_joint_name.clone());
        names
    }
}

impl PublishingConfig {
    /// Get output decimal places with default fallback
    pub fn decimal_places(&self) -> u32 {
        self.decimal_places.unwrap_or(4)
    }
}
