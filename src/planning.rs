//! Planning-backend seam
//!
//! The node never computes trajectories itself. Goals are forwarded to an
//! external motion-planning service through the [`PlanningGroup`] trait,
//! which also makes the backend swappable for a scripted stub in tests.

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// A goal handed to the planning backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MotionTarget {
    /// Desired angles for every joint of the group, in radians.
    Joints { angles: Vec<f64> },
    /// Desired end-effector position [x, y, z] in meters. Orientation is
    /// left unconstrained; the goal tolerance bounds the position error.
    Position { position: [f64; 3] },
}

/// One waypoint of a planned trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub positions: Vec<f64>,
    pub time_from_start: f64,
}

/// A trajectory computed by the planning service.
///
/// Opaque to this crate beyond serialization: plans are passed back to
/// [`PlanningGroup::execute`] verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionPlan {
    pub group: String,
    pub points: Vec<TrajectoryPoint>,
    pub planning_time: f64,
}

/// Result of a planning request.
///
/// The failure reason is surfaced in logs only; command entry points
/// collapse the outcome to a success boolean.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanOutcome {
    Planned(MotionPlan),
    Failed(String),
}

/// One planning group of the external motion-planning service.
///
/// The node holds two of these: one for the arm, one for the gripper.
#[async_trait]
pub trait PlanningGroup: Send {
    /// Planning group name (e.g. "arm", "gripper").
    fn name(&self) -> &str;

    /// Current joint values of the group as known to the planner.
    async fn joint_values(&mut self) -> Result<Vec<f64>>;

    /// Current end-effector position of the group.
    async fn end_effector_position(&mut self) -> Result<[f64; 3]>;

    /// Set the tolerance applied to subsequent position targets.
    async fn set_goal_tolerance(&mut self, tolerance: f64) -> Result<()>;

    /// Request a plan from the group's current state to the target.
    async fn plan(&mut self, target: &MotionTarget) -> Result<PlanOutcome>;

    /// Execute a previously computed plan, blocking until the planner
    /// reports completion.
    async fn execute(&mut self, plan: &MotionPlan) -> Result<()>;
}

/// Shared handle to a planning group.
///
/// The telemetry listener and the command entry points use the same arm
/// handle; the mutex serializes their backend calls.
pub type SharedPlanningGroup = Arc<Mutex<Box<dyn PlanningGroup>>>;

pub fn shared(group: Box<dyn PlanningGroup>) -> SharedPlanningGroup {
    Arc::new(Mutex::new(group))
}

#[cfg(test)]
pub(crate) mod stub {
    //! Scripted planning backend for tests.

    use super::*;
    use std::sync::Mutex as StdMutex;

    #[derive(Debug, Default)]
    pub struct StubState {
        pub joints: Vec<f64>,
        pub position: [f64; 3],
        pub fail_planning: bool,
        pub planned_targets: Vec<MotionTarget>,
        pub executed_plans: Vec<MotionPlan>,
        pub tolerances: Vec<f64>,
        pub pose_queries: u32,
    }

    /// Clone the handle before boxing to keep access to the recorded calls.
    #[derive(Clone)]
    pub struct StubGroup {
        pub group: String,
        pub state: Arc<StdMutex<StubState>>,
    }

    impl StubGroup {
        pub fn new(group: &str, joints: Vec<f64>) -> Self {
            Self {
                group: group.to_string(),
                state: Arc::new(StdMutex::new(StubState {
                    joints,
                    ..StubState::default()
                })),
            }
        }

        pub fn failing(group: &str, joints: Vec<f64>) -> Self {
            let stub = Self::new(group, joints);
            stub.state.lock().unwrap().fail_planning = true;
            stub
        }
    }

    #[async_trait]
    impl PlanningGroup for StubGroup {
        fn name(&self) -> &str {
            &self.group
        }

        async fn joint_values(&mut self) -> Result<Vec<f64>> {
            Ok(self.state.lock().unwrap().joints.clone())
        }

        async fn end_effector_position(&mut self) -> Result<[f64; 3]> {
            let mut state = self.state.lock().unwrap();
            state.pose_queries += 1;
            Ok(state.position)
        }

        async fn set_goal_tolerance(&mut self, tolerance: f64) -> Result<()> {
            self.state.lock().unwrap().tolerances.push(tolerance);
            Ok(())
        }

        async fn plan(&mut self, target: &MotionTarget) -> Result<PlanOutcome> {
            let mut state = self.state.lock().unwrap();
            state.planned_targets.push(target.clone());

            if state.fail_planning {
                return Ok(PlanOutcome::Failed("no plan found".to_string()));
            }

            let positions = match target {
                MotionTarget::Joints { angles } => angles.clone(),
                MotionTarget::Position { .. } => state.joints.clone(),
            };
            Ok(PlanOutcome::Planned(MotionPlan {
                group: self.group.clone(),
                points: vec![TrajectoryPoint {
                    positions,
                    time_from_start: 1.0,
                }],
                planning_time: 0.05,
            }))
        }

        async fn execute(&mut self, plan: &MotionPlan) -> Result<()> {
            self.state.lock().unwrap().executed_plans.push(plan.clone());
            Ok(())
        }
    }
}
