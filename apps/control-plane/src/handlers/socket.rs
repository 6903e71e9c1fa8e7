// [apps/control-plane/src/handlers/socket.rs]
/*!
 * Worker duplex socket handler (spec.md §4.1, §4.3). Implements the
 * AWAITING_AUTH -> READY state machine over an Axum WebSocket, structured as
 * the teacher's triple-task pattern from `handlers/stream.rs`
 * (downstream sender / upstream receiver / internal processing, first task
 * to finish aborts the other two) — collapsed to two tasks here since a
 * worker session has no separate internal command queue to drain, only a
 * socket writer and a frame reader.
 */

use std::collections::HashSet;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use vanguard_models::{ConnectionEventKind, LogEntry, LogLevel, NodeMetrics};
use vanguard_protocol::{now_ms, Frame, HeartbeatStatus, JobResultStatus};

use crate::services::supervisor::{self, AuthRequest};
use crate::state::AppState;

pub async fn upgrade(websocket_upgrade: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    websocket_upgrade.on_upgrade(move |socket| handle_session(socket, state))
}

#[instrument(skip(socket, state))]
async fn handle_session(socket: WebSocket, state: AppState) {
    let (mut socket_sender, mut socket_receiver) = socket.split();
    let session_id = Uuid::new_v4().to_string();

    let node_id = match await_auth(&mut socket_sender, &mut socket_receiver, &state, &session_id).await {
        Some(node_id) => node_id,
        None => return,
    };

    state.monitor.record_connection(&node_id, ConnectionEventKind::Connected).await;
    info!(%node_id, "worker session entering READY");

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();
    if let Some(previous) = state.registry.replace_channel(&node_id, outbound_tx).await {
        let _ = previous.send(
            Frame::error(Uuid::new_v4(), "REPLACED", "superseded by a new connection", true)
                .to_wire()
                .unwrap_or_default(),
        );
    }

    let mut sender_task = tokio::spawn(async move {
        while let Some(wire_message) = outbound_rx.recv().await {
            if socket_sender.send(Message::Text(wire_message)).await.is_err() {
                break;
            }
        }
    });

    let node_id_for_receiver = node_id.clone();
    let state_for_receiver = state.clone();
    let mut receiver_task = tokio::spawn(async move {
        while let Some(message) = socket_receiver.next().await {
            match message {
                Ok(Message::Text(raw)) => {
                    if process_inbound_frame(&state_for_receiver, &node_id_for_receiver, &raw).await {
                        break;
                    }
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
        _ = (&mut sender_task) => { receiver_task.abort(); }
        _ = (&mut receiver_task) => { sender_task.abort(); }
    }

    state.registry.unregister(&node_id).await;
    state.monitor.record_connection(&node_id, ConnectionEventKind::Disconnected).await;
    info!(%node_id, "worker session closed");
}

/// Drives `AWAITING_AUTH -> READY`: waits for the first frame within
/// [`supervisor::AUTH_DEADLINE`], requires it to be `AUTH`, verifies the
/// secret, and either registers the node and acks or closes the socket.
/// The registry entry is created here with a throwaway channel; the real
/// outbound channel is installed by [`handle_session`] immediately after,
/// because the sender task (and therefore the channel) cannot exist before
/// the socket has been handed off to it.
async fn await_auth(
    socket_sender: &mut SplitSink<WebSocket, Message>,
    socket_receiver: &mut SplitStream<WebSocket>,
    state: &AppState,
    session_id: &str,
) -> Option<String> {
    let first_message = tokio::time::timeout(supervisor::AUTH_DEADLINE, socket_receiver.next()).await;

    let raw = match first_message {
        Ok(Some(Ok(Message::Text(raw)))) => raw,
        Ok(Some(Ok(_))) => {
            warn!(%session_id, "first message was not a text frame");
            return None;
        }
        Ok(Some(Err(fault))) => {
            warn!(%session_id, error = %fault, "socket read error awaiting AUTH");
            return None;
        }
        Ok(None) | Err(_) => {
            warn!(%session_id, "peer did not authenticate within the deadline");
            let _ = socket_sender
                .send(Message::Text(
                    Frame::error(Uuid::new_v4(), "AUTH_TIMEOUT", "authentication deadline exceeded", true)
                        .to_wire()
                        .unwrap_or_default(),
                ))
                .await;
            return None;
        }
    };

    let frame = match Frame::parse(&raw) {
        Ok(frame) => frame,
        Err(fault) => {
            warn!(%session_id, error = %fault, "malformed first frame, expected AUTH");
            return None;
        }
    };

    let Frame::Auth {
        trace_id,
        node_id,
        capabilities,
        agent_types,
        wallet,
        specs,
        secret,
        version,
        ..
    } = frame
    else {
        warn!(%session_id, "first frame was not AUTH, rejecting");
        return None;
    };

    let request = AuthRequest {
        node_id: node_id.clone(),
        capabilities: capabilities.into_iter().collect::<HashSet<_>>(),
        agent_types: agent_types.unwrap_or_default().into_iter().collect::<HashSet<_>>(),
        wallet,
        specs,
        secret,
        version,
    };

    if supervisor::verify_secret(&request, &state.config.node_secret).is_err() {
        warn!(%session_id, node_id = %request.node_id, "AUTH rejected: invalid secret");
        let ack = Frame::AuthAck {
            trace_id,
            timestamp: now_ms(),
            success: false,
            message: Some("Invalid credentials".to_string()),
            heartbeat_interval_ms: None,
        };
        let _ = socket_sender.send(Message::Text(ack.to_wire().unwrap_or_default())).await;
        return None;
    }

    let (placeholder_tx, _placeholder_rx) = mpsc::unbounded_channel::<String>();
    state
        .registry
        .register(
            request.node_id.clone(),
            placeholder_tx,
            request.capabilities,
            request.agent_types,
            request.wallet,
            request.version,
        )
        .await;

    let ack = Frame::AuthAck {
        trace_id,
        timestamp: now_ms(),
        success: true,
        message: None,
        heartbeat_interval_ms: Some(supervisor::HEARTBEAT_INTERVAL_MS),
    };
    let _ = socket_sender.send(Message::Text(ack.to_wire().unwrap_or_default())).await;

    Some(node_id)
}

/// Processes one inbound READY-channel frame. Returns `true` when the
/// session must close (spec.md §4.3's `HEARTBEAT from unregistered` row),
/// `false` otherwise.
async fn process_inbound_frame(state: &AppState, node_id: &str, raw: &str) -> bool {
    let frame = match Frame::parse(raw) {
        Ok(frame) => frame,
        Err(fault) => {
            state
                .monitor
                .record_log(LogEntry::new(LogLevel::Warn, "socket", fault.to_string()).with_node(node_id))
                .await;
            send_frame(state, node_id, Frame::error(Uuid::new_v4(), "INVALID_MESSAGE", fault.to_string(), false)).await;
            return false;
        }
    };

    match frame {
        Frame::Heartbeat {
            trace_id,
            status,
            cpu_usage,
            memory_usage,
            active_jobs,
            ..
        } => {
            let metrics = NodeMetrics {
                cpu_percent: cpu_usage,
                memory_percent: memory_usage,
                active_jobs,
            };
            let updated = state.registry.update_heartbeat(node_id, metrics).await;
            if !updated {
                warn!(%node_id, "heartbeat from unregistered node");
                send_frame(
                    state,
                    node_id,
                    Frame::error(trace_id, "NOT_REGISTERED", "no live registration for this node", true),
                )
                .await;
                return true;
            }
            debug!(%node_id, ?status, "heartbeat processed");
            if matches!(status, HeartbeatStatus::Draining) {
                info!(%node_id, "node reported DRAINING status");
            }
            let ack = Frame::HeartbeatAck { trace_id, timestamp: now_ms(), received: true };
            send_frame(state, node_id, ack).await;
        }
        Frame::JobResult {
            run_id,
            status,
            output,
            logs,
            error,
            metrics,
            ..
        } => {
            let succeeded = matches!(status, JobResultStatus::Success);
            state.monitor.record_job_outcome(node_id, succeeded).await;
            state
                .dispatcher
                .resolve_result(&run_id, status, output, logs, error, metrics)
                .await;
        }
        Frame::AgentJobResult { job_id, success, response, tools_used, metrics, error, .. } => {
            state
                .dispatcher
                .resolve_agent_result(&job_id, success, response, tools_used, metrics, error)
                .await;
        }
        other => {
            debug!(%node_id, trace_id = %other.trace_id(), "unexpected frame on READY channel");
        }
    }

    false
}

/// Sends one frame to `node_id`'s current outbound channel, if it still has
/// one registered. Silently drops the frame on a missing channel or a
/// serialization failure — the caller has already logged the reason.
async fn send_frame(state: &AppState, node_id: &str, frame: Frame) {
    let Some(channel) = state.registry.channel_of(node_id).await else { return };
    if let Ok(wire) = frame.to_wire() {
        let _ = channel.send(wire);
    }
}
