// [apps/worker-node/src/connection.rs]
/*!
 * Duplex socket client driving `AWAITING_AUTH -> READY` from the worker's
 * side of spec.md §4.1/§4.3. Structured the same way as the control plane's
 * `handlers/socket.rs` (itself grounded in the teacher's triple-task
 * pattern): a sender task draining an outbound channel, a receiver task
 * processing inbound frames, and here a third task driving the heartbeat
 * ticker, raced with `tokio::select!` so any one exiting tears down the
 * session and falls through to reconnect.
 */

use std::time::Duration;

use futures::stream::Stream;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use vanguard_protocol::{now_ms, Frame, HeartbeatStatus, NodeSpecs};

use crate::config::WorkerConfig;
use crate::errors::ConnectionError;
use crate::hardware::HardwareMonitor;
use crate::sandbox;

const AUTH_ACK_DEADLINE: Duration = Duration::from_secs(10);
const DEFAULT_HEARTBEAT_INTERVAL_MS: u64 = 15_000;
const RECONNECT_BACKOFF: Duration = Duration::from_secs(5);

/// Connects, runs one session to completion, and reconnects after a fixed
/// backoff on every disconnect or auth failure. Runs until the process exits.
pub async fn run_forever(config: WorkerConfig) {
    loop {
        match run_once(&config).await {
            Ok(()) => info!("session ended, reconnecting"),
            Err(fault) => warn!(error = %fault, "connection attempt failed"),
        }
        tokio::time::sleep(RECONNECT_BACKOFF).await;
    }
}

#[instrument(skip(config), fields(url = %config.control_plane_url))]
async fn run_once(config: &WorkerConfig) -> Result<(), ConnectionError> {
    let node_id = config.resolved_node_id();

    let (ws_stream, _response) = tokio_tungstenite::connect_async(&config.control_plane_url)
        .await
        .map_err(|fault| ConnectionError::Socket(fault.to_string()))?;
    let (mut sink, mut stream) = ws_stream.split();

    let auth_frame = build_auth_frame(config, &node_id);
    sink.send(Message::Text(auth_frame.to_wire()?))
        .await
        .map_err(|fault| ConnectionError::Socket(fault.to_string()))?;

    let heartbeat_interval_ms = await_auth_ack(&mut stream).await?;
    info!(%node_id, heartbeat_interval_ms, "authenticated, entering READY");

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();

    let mut sender_task = tokio::spawn(async move {
        while let Some(wire_message) = outbound_rx.recv().await {
            if sink.send(Message::Text(wire_message)).await.is_err() {
                break;
            }
        }
    });

    let heartbeat_tx = outbound_tx.clone();
    let mut heartbeat_task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(heartbeat_interval_ms));
        loop {
            ticker.tick().await;
            let sample = HardwareMonitor::sample();
            let frame = Frame::Heartbeat {
                trace_id: Uuid::new_v4(),
                timestamp: now_ms(),
                status: HeartbeatStatus::Idle,
                cpu_usage: sample.cpu_percent,
                memory_usage: sample.memory_percent,
                active_jobs: 0,
            };
            let Ok(wire) = frame.to_wire() else { continue };
            if heartbeat_tx.send(wire).is_err() {
                break;
            }
        }
    });

    let config_for_receiver = config.clone();
    let node_id_for_receiver = node_id.clone();
    let receiver_outbound = outbound_tx.clone();
    let mut receiver_task = tokio::spawn(async move {
        while let Some(message) = stream.next().await {
            match message {
                Ok(Message::Text(raw)) => {
                    process_inbound_frame(&config_for_receiver, &node_id_for_receiver, &receiver_outbound, &raw).await;
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(fault) => {
                    warn!(node_id = %node_id_for_receiver, error = %fault, "socket read error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut sender_task) => { heartbeat_task.abort(); receiver_task.abort(); }
        _ = (&mut heartbeat_task) => { sender_task.abort(); receiver_task.abort(); }
        _ = (&mut receiver_task) => { sender_task.abort(); heartbeat_task.abort(); }
    }

    Ok(())
}

fn build_auth_frame(config: &WorkerConfig, node_id: &str) -> Frame {
    Frame::Auth {
        trace_id: Uuid::new_v4(),
        timestamp: now_ms(),
        node_id: node_id.to_string(),
        capabilities: config.capabilities.clone(),
        agent_types: if config.agent_types.is_empty() { None } else { Some(config.agent_types.clone()) },
        wallet: config.wallet.clone(),
        specs: NodeSpecs {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            cpu_cores: std::thread::available_parallelism().map(|n| n.get() as u32).unwrap_or(1),
            total_memory_gb: total_memory_gb(),
            runtime_version: env!("CARGO_PKG_VERSION").to_string(),
        },
        secret: config.node_secret.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

fn total_memory_gb() -> f64 {
    std::fs::read_to_string("/proc/meminfo")
        .ok()
        .and_then(|content| content.lines().find(|line| line.starts_with("MemTotal:")).map(str::to_string))
        .and_then(|line| line.split_whitespace().nth(1).and_then(|value| value.parse::<f64>().ok()))
        .map(|kb| kb / (1024.0 * 1024.0))
        .unwrap_or(0.0)
}

async fn await_auth_ack<S>(stream: &mut S) -> Result<u64, ConnectionError>
where
    S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    let first_message = tokio::time::timeout(AUTH_ACK_DEADLINE, stream.next()).await;

    let raw = match first_message {
        Ok(Some(Ok(Message::Text(raw)))) => raw,
        Ok(Some(Ok(_))) => return Err(ConnectionError::AuthDenied("expected a text AUTH_ACK frame".to_string())),
        Ok(Some(Err(fault))) => return Err(ConnectionError::Socket(fault.to_string())),
        Ok(None) | Err(_) => return Err(ConnectionError::AuthTimeout),
    };

    match Frame::parse(&raw)? {
        Frame::AuthAck { success: true, heartbeat_interval_ms, .. } => {
            Ok(heartbeat_interval_ms.unwrap_or(DEFAULT_HEARTBEAT_INTERVAL_MS))
        }
        Frame::AuthAck { success: false, message, .. } => {
            Err(ConnectionError::AuthDenied(message.unwrap_or_else(|| "invalid credentials".to_string())))
        }
        other => Err(ConnectionError::AuthDenied(format!("expected AUTH_ACK, got a {other:?} frame"))),
    }
}

async fn process_inbound_frame(config: &WorkerConfig, node_id: &str, outbound: &mpsc::UnboundedSender<String>, raw: &str) {
    let frame = match Frame::parse(raw) {
        Ok(frame) => frame,
        Err(fault) => {
            warn!(%node_id, error = %fault, "malformed frame from control plane");
            return;
        }
    };

    match frame {
        Frame::JobAssign { trace_id, job_id, run_id, input, timeout_ms, script, .. } => {
            let config = config.clone();
            let outbound = outbound.clone();
            tokio::spawn(async move {
                let outcome = sandbox::execute(
                    &config.sandbox_shell,
                    script.as_deref(),
                    &input,
                    timeout_ms.unwrap_or(config.default_timeout_ms),
                )
                .await;

                let result = Frame::JobResult {
                    trace_id,
                    timestamp: now_ms(),
                    job_id,
                    run_id,
                    status: outcome.status,
                    output: outcome.output,
                    logs: outcome.logs,
                    error: outcome.error,
                    metrics: outcome.metrics,
                    memory: None,
                };
                if let Ok(wire) = result.to_wire() {
                    let _ = outbound.send(wire);
                }
            });
        }
        Frame::AgentJob { trace_id, job_id, .. } => {
            let result = Frame::AgentJobResult {
                trace_id,
                timestamp: now_ms(),
                job_id,
                success: false,
                response: String::new(),
                tools_used: None,
                metrics: None,
                error: Some(vanguard_protocol::JobResultError {
                    code: "UNSUPPORTED".to_string(),
                    message: "this reference worker does not implement AGENT_JOB execution".to_string(),
                    stack: None,
                }),
            };
            if let Ok(wire) = result.to_wire() {
                let _ = outbound.send(wire);
            }
        }
        Frame::HeartbeatAck { .. } => {}
        Frame::Error { code, message, fatal, .. } => {
            if fatal {
                error!(%node_id, %code, %message, "control plane sent a fatal ERROR frame");
            } else {
                warn!(%node_id, %code, %message, "control plane sent a non-fatal ERROR frame");
            }
        }
        other => {
            warn!(%node_id, trace_id = %other.trace_id(), "unexpected frame on READY channel");
        }
    }
}
