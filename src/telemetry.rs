//! Joint-state telemetry intake
//!
//! A background reader pulls newline-delimited JSON joint-state messages
//! from the driver's TCP stream into a bounded queue. The listener drains
//! the queue at a fixed rate, folds matched joint positions into the state
//! cache, and issues one end-effector pose query to the planning backend
//! per message. When the driver disconnects, the listener raises the
//! shutdown notification and exits.

use crate::config::{JointConfig, TelemetryConfig};
use crate::planning::SharedPlanningGroup;
use crate::state::{StateCache, JOINT_SLOT_COUNT};
use crate::{ArmdError, Result};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader};
use std::net::TcpStream;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Joint-state message published by the robot driver.
///
/// Parallel name/position arrays; entry order and length are owned by the
/// driver. Velocity and effort arrays are accepted and ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointStateMessage {
    pub name: Vec<String>,
    pub position: Vec<f64>,
    #[serde(default)]
    pub velocity: Vec<f64>,
    #[serde(default)]
    pub effort: Vec<f64>,
}

/// TCP source of joint-state telemetry, one JSON message per line.
pub struct JointStateSource {
    stream: TcpStream,
}

impl JointStateSource {
    /// Connect to the driver's telemetry port.
    pub fn connect(config: &TelemetryConfig) -> Result<Self> {
        let stream = TcpStream::connect((config.host.as_str(), config.port)).map_err(|e| {
            ArmdError::Connection(format!(
                "Failed to connect to telemetry at {}:{}: {}",
                config.host, config.port, e
            ))
        })?;
        info!("Connected to joint-state telemetry at {}:{}", config.host, config.port);
        Ok(Self { stream })
    }

    /// Spawn the reader and return the message queue.
    ///
    /// The queue is bounded; a stalled consumer backpressures the socket.
    /// Malformed lines are skipped. EOF or a read error ends the reader,
    /// which closes the queue.
    pub fn subscribe(self, queue_depth: usize) -> mpsc::Receiver<JointStateMessage> {
        let (tx, rx) = mpsc::channel(queue_depth.max(1));

        tokio::task::spawn_blocking(move || {
            let mut reader = BufReader::new(self.stream);
            let mut line = String::new();

            loop {
                line.clear();
                match reader.read_line(&mut line) {
                    Ok(0) => {
                        info!("Telemetry stream closed by driver");
                        break;
                    }
                    Ok(_) => {
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        match serde_json::from_str::<JointStateMessage>(trimmed) {
                            Ok(message) => {
                                if tx.blocking_send(message).is_err() {
                                    // Listener gone, nothing left to feed
                                    break;
                                }
                            }
                            Err(e) => warn!("Skipping malformed joint-state line: {}", e),
                        }
                    }
                    Err(e) => {
                        warn!("Telemetry read error: {}", e);
                        break;
                    }
                }
            }
        });

        rx
    }
}

/// Fixed-rate consumer of the telemetry queue.
pub struct TelemetryListener {
    receiver: mpsc::Receiver<JointStateMessage>,
    arm: SharedPlanningGroup,
    cache: StateCache,
    slot_names: Vec<String>,
    poll_rate_hz: u32,
    shutdown_tx: watch::Sender<bool>,
}

impl TelemetryListener {
    pub fn new(
        receiver: mpsc::Receiver<JointStateMessage>,
        arm: SharedPlanningGroup,
        cache: StateCache,
        joints: &JointConfig,
        poll_rate_hz: u32,
    ) -> (Self, watch::Receiver<bool>) {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        (
            Self {
                receiver,
                arm,
                cache,
                slot_names: joints.slot_names(),
                poll_rate_hz,
                shutdown_tx,
            },
            shutdown_rx,
        )
    }

    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    async fn run(mut self) {
        let period = Duration::from_millis((1000 / u64::from(self.poll_rate_hz.max(1))).max(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            loop {
                match self.receiver.try_recv() {
                    Ok(message) => self.process(message).await,
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        info!("Telemetry source gone, raising shutdown");
                        let _ = self.shutdown_tx.send(true);
                        return;
                    }
                }
            }
        }
    }

    async fn process(&mut self, message: JointStateMessage) {
        if message.name.len() != message.position.len() {
            warn!(
                "Joint-state arrays disagree ({} names, {} positions), pairing what lines up",
                message.name.len(),
                message.position.len()
            );
        }

        // Start from the previous snapshot: names absent from this message
        // keep their last known value.
        let mut positions = self.cache.last_joints().positions;
        for (name, &value) in message.name.iter().zip(message.position.iter()) {
            if let Some(slot) = self.slot_names.iter().position(|n| n == name) {
                if slot < JOINT_SLOT_COUNT {
                    positions[slot] = value;
                }
            }
        }
        self.cache.publish_joints(positions);

        // One pose query per message, at the cadence the driver publishes.
        let mut arm = self.arm.lock().await;
        match arm.end_effector_position().await {
            Ok(position) => self.cache.publish_end_effector(position),
            Err(e) => warn!("End-effector pose query failed: {}", e),
        }
    }
}
