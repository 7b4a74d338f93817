//! GUI-backing manipulator node
//!
//! `ArmNode` ties the pieces together: it owns the shared planning-group
//! handles (one for the arm, one for the gripper), runs the telemetry
//! listener, and exposes the snapshot getters and command entry points the
//! UI layer calls.
//!
//! Commands follow one shape: read the group's current state, overwrite
//! the targeted values, request a plan, execute on planning success. The
//! returned boolean reports planning success only; execution faults after
//! a good plan are logged and do not change it.

use crate::config::Config;
use crate::planning::{MotionTarget, PlanOutcome, PlanningGroup, SharedPlanningGroup};
use crate::state::{JointSnapshot, PositionSnapshot, StateCache, StateView, ARM_JOINT_COUNT};
use crate::telemetry::{JointStateMessage, TelemetryListener};
use crate::Result;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

pub struct ArmNode {
    arm: SharedPlanningGroup,
    gripper: SharedPlanningGroup,
    view: StateView,
    shutdown_rx: watch::Receiver<bool>,
    goal_tolerance: f64,
    _listener: JoinHandle<()>,
}

impl ArmNode {
    /// Build the node and start the telemetry listener.
    pub fn new(
        arm: SharedPlanningGroup,
        gripper: SharedPlanningGroup,
        telemetry_rx: mpsc::Receiver<JointStateMessage>,
        config: &Config,
    ) -> Self {
        let (cache, view) = StateCache::new();
        let (listener, shutdown_rx) = TelemetryListener::new(
            telemetry_rx,
            arm.clone(),
            cache,
            &config.joints,
            config.telemetry.poll_rate_hz(),
        );

        Self {
            arm,
            gripper,
            view,
            shutdown_rx,
            goal_tolerance: config.planner.goal_tolerance(),
            _listener: listener.start(),
        }
    }

    /// Latest cached joint angles (arm joints first, tool joint last).
    pub fn present_joint_angles(&self) -> JointSnapshot {
        self.view.joints()
    }

    /// Latest cached end-effector position.
    pub fn present_end_effector_position(&self) -> PositionSnapshot {
        self.view.end_effector()
    }

    /// Cloneable read handle for the UI publishing loop.
    pub fn state_view(&self) -> StateView {
        self.view.clone()
    }

    /// Receiver that flips to true when the telemetry transport is gone.
    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown_rx.clone()
    }

    /// Joint-space move: overwrite the arm joints with the target angles,
    /// plan, execute on success.
    ///
    /// `_path_time` is accepted for UI compatibility and ignored; the
    /// planner owns trajectory timing.
    pub async fn send_joint_goal(
        &self,
        angles: [f64; ARM_JOINT_COUNT],
        _path_time: f64,
    ) -> Result<bool> {
        info!("Joint-space goal: {:?}", angles);

        let mut arm = self.arm.lock().await;
        let mut joints = arm.joint_values().await?;
        if joints.len() < ARM_JOINT_COUNT {
            joints.resize(ARM_JOINT_COUNT, 0.0);
        }
        joints[..ARM_JOINT_COUNT].copy_from_slice(&angles);

        plan_and_execute(arm.as_mut(), &MotionTarget::Joints { angles: joints }).await
    }

    /// Task-space move: plan to an end-effector position with the
    /// configured goal tolerance. Orientation is left unconstrained.
    pub async fn send_position_goal(&self, position: [f64; 3], _path_time: f64) -> Result<bool> {
        info!("Task-space goal: {:?}", position);

        let mut arm = self.arm.lock().await;
        arm.set_goal_tolerance(self.goal_tolerance).await?;

        plan_and_execute(arm.as_mut(), &MotionTarget::Position { position }).await
    }

    /// Gripper move: overwrite the first gripper joint, plan, execute on
    /// success.
    pub async fn send_gripper_goal(&self, angle: f64) -> Result<bool> {
        info!("Gripper goal: {}", angle);

        let mut gripper = self.gripper.lock().await;
        let mut joints = gripper.joint_values().await?;
        if joints.is_empty() {
            joints.push(angle);
        } else {
            joints[0] = angle;
        }

        plan_and_execute(gripper.as_mut(), &MotionTarget::Joints { angles: joints }).await
    }
}

async fn plan_and_execute(
    group: &mut (dyn PlanningGroup + '_),
    target: &MotionTarget,
) -> Result<bool> {
    match group.plan(target).await? {
        PlanOutcome::Planned(plan) => {
            info!(
                "Plan found for group {} ({} waypoints)",
                group.name(),
                plan.points.len()
            );
            if let Err(e) = group.execute(&plan).await {
                error!("Execution failed after successful plan: {}", e);
            }
            Ok(true)
        }
        PlanOutcome::Failed(reason) => {
            warn!("Planning failed for group {}: {}", group.name(), reason);
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PlannerConfig, PublishingConfig, TelemetryConfig};
    use crate::planning::stub::StubGroup;
    use crate::planning::{self, TrajectoryPoint};
    use std::time::Duration;

    fn test_config() -> Config {
        Config {
            planner: PlannerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                arm_group: "arm".to_string(),
                gripper_group: "gripper".to_string(),
                goal_tolerance: None,
                read_timeout_seconds: None,
            },
            telemetry: TelemetryConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                poll_rate_hz: Some(50),
                queue_depth: None,
            },
            joints: Default::default(),
            publishing: PublishingConfig {
                pub_rate_hz: 10,
                decimal_places: None,
            },
        }
    }

    fn node_with(
        arm: &StubGroup,
        gripper: &StubGroup,
    ) -> (ArmNode, mpsc::Sender<JointStateMessage>) {
        let (tx, rx) = mpsc::channel(10);
        let node = ArmNode::new(
            planning::shared(Box::new(arm.clone())),
            planning::shared(Box::new(gripper.clone())),
            rx,
            &test_config(),
        );
        (node, tx)
    }

    #[tokio::test]
    async fn planning_failure_returns_false_without_executing() {
        let arm = StubGroup::failing("arm", vec![0.0; 4]);
        let gripper = StubGroup::new("gripper", vec![0.0]);
        let (node, _tx) = node_with(&arm, &gripper);

        let moved = node.send_joint_goal([0.1, 0.2, 0.3, 0.4], 2.0).await.unwrap();

        assert!(!moved);
        let state = arm.state.lock().unwrap();
        assert_eq!(state.planned_targets.len(), 1);
        assert!(state.executed_plans.is_empty());
    }

    #[tokio::test]
    async fn planning_success_executes_the_produced_plan_once() {
        let arm = StubGroup::new("arm", vec![0.0; 4]);
        let gripper = StubGroup::new("gripper", vec![0.0]);
        let (node, _tx) = node_with(&arm, &gripper);

        let moved = node.send_joint_goal([0.1, 0.2, 0.3, 0.4], 2.0).await.unwrap();

        assert!(moved);
        let state = arm.state.lock().unwrap();
        assert_eq!(state.executed_plans.len(), 1);
        assert_eq!(
            state.executed_plans[0].points,
            vec![TrajectoryPoint {
                positions: vec![0.1, 0.2, 0.3, 0.4],
                time_from_start: 1.0,
            }]
        );
    }

    #[tokio::test]
    async fn joint_goal_overwrites_only_the_arm_joints() {
        // Backend reports more joints than the goal addresses; the extras
        // must pass through untouched.
        let arm = StubGroup::new("arm", vec![9.0, 9.0, 9.0, 9.0, 9.0, 9.0]);
        let gripper = StubGroup::new("gripper", vec![0.0]);
        let (node, _tx) = node_with(&arm, &gripper);

        node.send_joint_goal([1.0, 2.0, 3.0, 4.0], 2.0).await.unwrap();

        let state = arm.state.lock().unwrap();
        assert_eq!(
            state.planned_targets,
            vec![MotionTarget::Joints {
                angles: vec![1.0, 2.0, 3.0, 4.0, 9.0, 9.0]
            }]
        );
    }

    #[tokio::test]
    async fn gripper_goal_overwrites_the_first_gripper_joint() {
        let arm = StubGroup::new("arm", vec![0.0; 4]);
        let gripper = StubGroup::new("gripper", vec![0.3, 0.3]);
        let (node, _tx) = node_with(&arm, &gripper);

        let moved = node.send_gripper_goal(0.9).await.unwrap();

        assert!(moved);
        let state = gripper.state.lock().unwrap();
        assert_eq!(
            state.planned_targets,
            vec![MotionTarget::Joints {
                angles: vec![0.9, 0.3]
            }]
        );
        assert_eq!(state.executed_plans.len(), 1);
        // the arm group is untouched by a gripper command
        assert!(arm.state.lock().unwrap().planned_targets.is_empty());
    }

    #[tokio::test]
    async fn position_goal_applies_tolerance_before_planning() {
        let arm = StubGroup::new("arm", vec![0.0; 4]);
        let gripper = StubGroup::new("gripper", vec![0.0]);
        let (node, _tx) = node_with(&arm, &gripper);

        let moved = node.send_position_goal([0.28, 0.0, 0.2], 2.0).await.unwrap();

        assert!(moved);
        let state = arm.state.lock().unwrap();
        assert_eq!(state.tolerances, vec![0.1]);
        assert_eq!(
            state.planned_targets,
            vec![MotionTarget::Position {
                position: [0.28, 0.0, 0.2]
            }]
        );
    }

    #[tokio::test]
    async fn configured_tolerance_overrides_the_default() {
        let arm = StubGroup::new("arm", vec![0.0; 4]);
        let gripper = StubGroup::new("gripper", vec![0.0]);
        let (tx, rx) = mpsc::channel(10);
        let _keep = tx;

        let mut config = test_config();
        config.planner.goal_tolerance = Some(0.02);
        let node = ArmNode::new(
            planning::shared(Box::new(arm.clone())),
            planning::shared(Box::new(gripper.clone())),
            rx,
            &config,
        );

        node.send_position_goal([0.1, 0.1, 0.1], 2.0).await.unwrap();

        assert_eq!(arm.state.lock().unwrap().tolerances, vec![0.02]);
    }

    #[tokio::test]
    async fn telemetry_flows_into_the_snapshot_getters() {
        let arm = StubGroup::new("arm", vec![0.0; 4]);
        arm.state.lock().unwrap().position = [0.28, 0.0, 0.2];
        let gripper = StubGroup::new("gripper", vec![0.0]);
        let (node, tx) = node_with(&arm, &gripper);

        tx.send(JointStateMessage {
            name: vec!["joint1".to_string(), "gripper".to_string()],
            position: vec![0.4, 1.1],
            velocity: Vec::new(),
            effort: Vec::new(),
        })
        .await
        .unwrap();

        // listener runs at 50 Hz in tests; poll until it has caught up
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        loop {
            let joints = node.present_joint_angles();
            if joints.positions == [0.4, 0.0, 0.0, 0.0, 1.1] {
                break;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "snapshot never updated: {:?}",
                joints.positions
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(node.present_end_effector_position().position, [0.28, 0.0, 0.2]);
    }
}
