//! Shared state cache between the telemetry listener and the UI layer
//!
//! Two last-write-wins snapshots: the tracked joint angles and the
//! end-effector position. The listener overwrites them wholesale; UI-side
//! readers observe the most recently published value through watch
//! receivers.

use crate::json_output::current_timestamp;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Number of actuated arm joints addressed by joint-space goals.
pub const ARM_JOINT_COUNT: usize = 4;

/// Snapshot slots: the arm joints followed by the tool joint.
pub const JOINT_SLOT_COUNT: usize = ARM_JOINT_COUNT + 1;

/// Latest known joint angles in radians, one slot per tracked joint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointSnapshot {
    pub positions: [f64; JOINT_SLOT_COUNT],
    /// Unix-epoch seconds when the snapshot was published
    pub last_updated: f64,
}

impl Default for JointSnapshot {
    fn default() -> Self {
        Self {
            positions: [0.0; JOINT_SLOT_COUNT],
            last_updated: 0.0,
        }
    }
}

/// Latest known end-effector position [x, y, z] in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub position: [f64; 3],
    /// Unix-epoch seconds when the snapshot was published
    pub last_updated: f64,
}

impl Default for PositionSnapshot {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            last_updated: 0.0,
        }
    }
}

/// Writer half of the cache, owned by the telemetry listener.
pub struct StateCache {
    joints_tx: watch::Sender<JointSnapshot>,
    position_tx: watch::Sender<PositionSnapshot>,
}

/// Cloneable read half handed to the UI layer.
#[derive(Clone)]
pub struct StateView {
    joints_rx: watch::Receiver<JointSnapshot>,
    position_rx: watch::Receiver<PositionSnapshot>,
}

impl StateCache {
    pub fn new() -> (StateCache, StateView) {
        let (joints_tx, joints_rx) = watch::channel(JointSnapshot::default());
        let (position_tx, position_rx) = watch::channel(PositionSnapshot::default());

        (
            StateCache {
                joints_tx,
                position_tx,
            },
            StateView {
                joints_rx,
                position_rx,
            },
        )
    }

    /// The joint snapshot most recently published by the writer.
    pub fn last_joints(&self) -> JointSnapshot {
        *self.joints_tx.borrow()
    }

    pub fn publish_joints(&self, positions: [f64; JOINT_SLOT_COUNT]) {
        self.joints_tx.send_replace(JointSnapshot {
            positions,
            last_updated: current_timestamp(),
        });
    }

    pub fn publish_end_effector(&self, position: [f64; 3]) {
        self.position_tx.send_replace(PositionSnapshot {
            position,
            last_updated: current_timestamp(),
        });
    }
}

impl StateView {
    /// Get the latest joint snapshot (non-blocking)
    pub fn joints(&self) -> JointSnapshot {
        *self.joints_rx.borrow()
    }

    /// Get the latest end-effector position snapshot (non-blocking)
    pub fn end_effector(&self) -> PositionSnapshot {
        *self.position_rx.borrow()
    }
}
