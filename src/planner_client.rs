//! Motion-planning service client
//!
//! JSON-lines request/reply client for the external planning service: one
//! tagged request object per line, one reply line per request. The reply
//! carries `ok` plus an op-specific payload. A reply with `ok: false`
//! means the service rejected the request itself; a plan reply with no
//! plan attached means planning ran and found nothing.

use crate::planning::{MotionPlan, MotionTarget, PlanOutcome, PlanningGroup};
use crate::{ArmdError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::time::Duration;

#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum PlannerRequest<'a> {
    JointValues {
        group: &'a str,
    },
    EndEffectorPosition {
        group: &'a str,
    },
    SetGoalTolerance {
        group: &'a str,
        tolerance: f64,
    },
    Plan {
        group: &'a str,
        target: &'a MotionTarget,
    },
    Execute {
        group: &'a str,
        plan: &'a MotionPlan,
    },
}

#[derive(Debug, Deserialize)]
struct PlannerReply {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    values: Option<Vec<f64>>,
    #[serde(default)]
    position: Option<[f64; 3]>,
    #[serde(default)]
    plan: Option<MotionPlan>,
}

/// Client for one planning group of the motion-planning service.
pub struct PlannerClient {
    group: String,
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl PlannerClient {
    /// Connect to the planning service and bind this client to a group.
    pub fn connect(host: &str, port: u16, group: &str, read_timeout_secs: u64) -> Result<Self> {
        let stream = TcpStream::connect((host, port)).map_err(|e| {
            ArmdError::Connection(format!("Failed to connect to planner at {}:{}: {}", host, port, e))
        })?;

        // Bounded reads so a hung planner surfaces as an error instead of
        // stalling the caller forever.
        stream
            .set_read_timeout(Some(Duration::from_secs(read_timeout_secs)))
            .map_err(|e| ArmdError::Connection(format!("Failed to set read timeout: {}", e)))?;

        let writer = stream
            .try_clone()
            .map_err(|e| ArmdError::Connection(format!("Failed to clone planner stream: {}", e)))?;

        Ok(Self {
            group: group.to_string(),
            reader: BufReader::new(stream),
            writer,
        })
    }

    fn request(&mut self, request: &PlannerRequest<'_>) -> Result<PlannerReply> {
        let mut line = serde_json::to_string(request)?;
        line.push('\n');

        self.writer
            .write_all(line.as_bytes())
            .map_err(|e| ArmdError::Connection(format!("Failed to send planner request: {}", e)))?;

        let mut reply_line = String::new();
        let bytes_read = self.reader.read_line(&mut reply_line).map_err(|e| {
            if e.kind() == std::io::ErrorKind::TimedOut || e.kind() == std::io::ErrorKind::WouldBlock
            {
                ArmdError::Connection("Planner response timeout".to_string())
            } else {
                ArmdError::Connection(format!("Failed to read planner reply: {}", e))
            }
        })?;

        if bytes_read == 0 {
            return Err(ArmdError::Connection(
                "Planner closed the connection".to_string(),
            ));
        }

        let reply: PlannerReply = serde_json::from_str(reply_line.trim())
            .map_err(|e| ArmdError::Protocol(format!("Invalid planner reply: {}", e)))?;

        if !reply.ok {
            return Err(ArmdError::Planning(
                reply
                    .error
                    .unwrap_or_else(|| "unspecified planner error".to_string()),
            ));
        }

        Ok(reply)
    }
}

#[async_trait]
impl PlanningGroup for PlannerClient {
    fn name(&self) -> &str {
        &self.group
    }

    async fn joint_values(&mut self) -> Result<Vec<f64>> {
        let group = self.group.clone();
        let reply = self.request(&PlannerRequest::JointValues { group: &group })?;
        reply
            .values
            .ok_or_else(|| ArmdError::Protocol("Reply missing joint values".to_string()))
    }

    async fn end_effector_position(&mut self) -> Result<[f64; 3]> {
        let group = self.group.clone();
        let reply = self.request(&PlannerRequest::EndEffectorPosition { group: &group })?;
        reply
            .position
            .ok_or_else(|| ArmdError::Protocol("Reply missing end-effector position".to_string()))
    }

    async fn set_goal_tolerance(&mut self, tolerance: f64) -> Result<()> {
        let group = self.group.clone();
        self.request(&PlannerRequest::SetGoalTolerance {
            group: &group,
            tolerance,
        })?;
        Ok(())
    }

    async fn plan(&mut self, target: &MotionTarget) -> Result<PlanOutcome> {
        let group = self.group.clone();
        let reply = self.request(&PlannerRequest::Plan {
            group: &group,
            target,
        })?;

        match reply.plan {
            Some(plan) => Ok(PlanOutcome::Planned(plan)),
            None => Ok(PlanOutcome::Failed(
                reply
                    .error
                    .unwrap_or_else(|| "planner reported no plan".to_string()),
            )),
        }
    }

    async fn execute(&mut self, plan: &MotionPlan) -> Result<()> {
        let group = self.group.clone();
        self.request(&PlannerRequest::Execute {
            group: &group,
            plan,
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    /// One-shot planner that answers each incoming line with the next
    /// scripted reply.
    fn scripted_planner(replies: Vec<&'static str>) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut writer = stream;

            for reply in replies {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap() == 0 {
                    break;
                }
                writer.write_all(reply.as_bytes()).unwrap();
                writer.write_all(b"\n").unwrap();
            }
        });

        port
    }

    #[tokio::test]
    async fn joint_values_come_from_the_reply_payload() {
        let port = scripted_planner(vec![r#"{"ok":true,"values":[0.1,0.2,0.3,0.4]}"#]);
        let mut client = PlannerClient::connect("127.0.0.1", port, "arm", 5).unwrap();

        let values = client.joint_values().await.unwrap();
        assert_eq!(values, vec![0.1, 0.2, 0.3, 0.4]);
    }

    #[tokio::test]
    async fn plan_reply_without_plan_is_a_planning_failure() {
        let port = scripted_planner(vec![r#"{"ok":true,"error":"goal in collision"}"#]);
        let mut client = PlannerClient::connect("127.0.0.1", port, "arm", 5).unwrap();

        let target = MotionTarget::Position {
            position: [0.1, 0.0, 0.2],
        };
        match client.plan(&target).await.unwrap() {
            PlanOutcome::Failed(reason) => assert_eq!(reason, "goal in collision"),
            PlanOutcome::Planned(_) => panic!("expected planning failure"),
        }
    }

    #[tokio::test]
    async fn rejected_request_maps_to_planning_error() {
        let port = scripted_planner(vec![r#"{"ok":false,"error":"unknown group"}"#]);
        let mut client = PlannerClient::connect("127.0.0.1", port, "claw", 5).unwrap();

        let err = client.joint_values().await.unwrap_err();
        assert!(matches!(err, ArmdError::Planning(_)));
        assert!(err.to_string().contains("unknown group"));
    }
}
