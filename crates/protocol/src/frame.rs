// [crates/protocol/src/frame.rs]
//! Wire representation of the worker duplex protocol.
//!
//! Frames are self-delimited UTF-8 JSON text messages. Every recognized
//! frame carries `type`, `traceId`, and `timestamp` at the top level; the
//! payload fields are flattened alongside them so the wire shape matches
//! spec.md's table exactly.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CodecError;

/// Ceiling enforced before a frame is handed to `serde_json` for parsing.
/// Mirrors the teacher transport crate's packet-size discipline; prevents
/// an oversized worker payload from driving an unbounded allocation.
pub const MAX_FRAME_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum HeartbeatStatus {
    Idle,
    Busy,
    Draining,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobResultStatus {
    Success,
    Error,
    Timeout,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpecs {
    pub os: String,
    pub arch: String,
    pub cpu_cores: u32,
    pub total_memory_gb: f64,
    pub runtime_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResultError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResultMetrics {
    pub start_time: i64,
    pub end_time: i64,
    pub duration_ms: i64,
}

/// Tagged sum of every recognized wire frame. `type` on the wire discriminates
/// the variant; `trace_id`/`timestamp_ms` are present on every variant because
/// every frame in spec.md carries them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Frame {
    #[serde(rename = "AUTH")]
    Auth {
        #[serde(rename = "traceId")]
        trace_id: Uuid,
        timestamp: i64,
        #[serde(rename = "nodeId")]
        node_id: String,
        capabilities: Vec<String>,
        #[serde(rename = "agentTypes", default, skip_serializing_if = "Option::is_none")]
        agent_types: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        wallet: Option<String>,
        specs: NodeSpecs,
        secret: String,
        version: String,
    },
    #[serde(rename = "AUTH_ACK")]
    AuthAck {
        #[serde(rename = "traceId")]
        trace_id: Uuid,
        timestamp: i64,
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(rename = "heartbeatIntervalMs", default, skip_serializing_if = "Option::is_none")]
        heartbeat_interval_ms: Option<u64>,
    },
    #[serde(rename = "HEARTBEAT")]
    Heartbeat {
        #[serde(rename = "traceId")]
        trace_id: Uuid,
        timestamp: i64,
        status: HeartbeatStatus,
        #[serde(rename = "cpuUsage")]
        cpu_usage: f64,
        #[serde(rename = "memoryUsage")]
        memory_usage: f64,
        #[serde(rename = "activeJobs")]
        active_jobs: u32,
    },
    #[serde(rename = "HEARTBEAT_ACK")]
    HeartbeatAck {
        #[serde(rename = "traceId")]
        trace_id: Uuid,
        timestamp: i64,
        received: bool,
    },
    #[serde(rename = "JOB_ASSIGN")]
    JobAssign {
        #[serde(rename = "traceId")]
        trace_id: Uuid,
        timestamp: i64,
        #[serde(rename = "jobId")]
        job_id: String,
        #[serde(rename = "runId")]
        run_id: String,
        #[serde(rename = "agentId")]
        agent_id: String,
        input: serde_json::Value,
        #[serde(rename = "timeoutMs", default, skip_serializing_if = "Option::is_none")]
        timeout_ms: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        context: Option<serde_json::Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        script: Option<String>,
        #[serde(rename = "toolCall", default, skip_serializing_if = "Option::is_none")]
        tool_call: Option<serde_json::Value>,
    },
    #[serde(rename = "JOB_RESULT")]
    JobResult {
        #[serde(rename = "traceId")]
        trace_id: Uuid,
        timestamp: i64,
        #[serde(rename = "jobId")]
        job_id: String,
        #[serde(rename = "runId")]
        run_id: String,
        status: JobResultStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output: Option<serde_json::Value>,
        #[serde(default)]
        logs: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<JobResultError>,
        metrics: JobResultMetrics,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        memory: Option<serde_json::Value>,
    },
    #[serde(rename = "AGENT_JOB")]
    AgentJob {
        #[serde(rename = "traceId")]
        trace_id: Uuid,
        timestamp: i64,
        #[serde(rename = "jobId")]
        job_id: String,
        #[serde(rename = "agentType")]
        agent_type: String,
        #[serde(rename = "userQuery")]
        user_query: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        context: Option<serde_json::Value>,
    },
    #[serde(rename = "AGENT_JOB_RESULT")]
    AgentJobResult {
        #[serde(rename = "traceId")]
        trace_id: Uuid,
        timestamp: i64,
        #[serde(rename = "jobId")]
        job_id: String,
        success: bool,
        response: String,
        #[serde(rename = "toolsUsed", default, skip_serializing_if = "Option::is_none")]
        tools_used: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metrics: Option<serde_json::Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<JobResultError>,
    },
    #[serde(rename = "ERROR")]
    Error {
        #[serde(rename = "traceId")]
        trace_id: Uuid,
        timestamp: i64,
        code: String,
        message: String,
        fatal: bool,
    },
}

impl Frame {
    /// `traceId` shared by every frame; used by callers to echo correlation
    /// ids back to the sender per spec.md's correlation-preservation invariant.
    pub fn trace_id(&self) -> Uuid {
        match self {
            Frame::Auth { trace_id, .. }
            | Frame::AuthAck { trace_id, .. }
            | Frame::Heartbeat { trace_id, .. }
            | Frame::HeartbeatAck { trace_id, .. }
            | Frame::JobAssign { trace_id, .. }
            | Frame::JobResult { trace_id, .. }
            | Frame::AgentJob { trace_id, .. }
            | Frame::AgentJobResult { trace_id, .. }
            | Frame::Error { trace_id, .. } => *trace_id,
        }
    }

    /// Builds a fatal or non-fatal `ERROR` frame echoing the caller's trace id.
    pub fn error(trace_id: Uuid, code: impl Into<String>, message: impl Into<String>, fatal: bool) -> Self {
        Frame::Error {
            trace_id,
            timestamp: Utc::now().timestamp_millis(),
            code: code.into(),
            message: message.into(),
            fatal,
        }
    }

    /// Parses a single wire frame, rejecting oversized payloads before
    /// `serde_json` ever sees them and rejecting any JSON value lacking the
    /// mandatory `type`/`traceId`/`timestamp` triad or carrying an unknown
    /// `type`.
    pub fn parse(raw: &str) -> Result<Frame, CodecError> {
        if raw.len() > MAX_FRAME_BYTES {
            return Err(CodecError::FrameTooLarge(raw.len(), MAX_FRAME_BYTES));
        }

        let probe: serde_json::Value = serde_json::from_str(raw)
            .map_err(|parse_fault| CodecError::MalformedFrame(parse_fault.to_string()))?;

        let object = probe
            .as_object()
            .ok_or_else(|| CodecError::MalformedFrame("frame is not a JSON object".to_string()))?;

        for required_field in ["type", "traceId", "timestamp"] {
            if !object.contains_key(required_field) {
                return Err(CodecError::MalformedFrame(format!(
                    "missing required field `{}`",
                    required_field
                )));
            }
        }

        match serde_json::from_value::<Frame>(probe) {
            Ok(frame) => Ok(frame),
            Err(decode_fault) => {
                let type_hint = object.get("type").and_then(|v| v.as_str()).unwrap_or("?");
                if decode_fault.to_string().contains("unknown variant") {
                    Err(CodecError::UnknownFrameType(type_hint.to_string()))
                } else {
                    Err(CodecError::MalformedFrame(decode_fault.to_string()))
                }
            }
        }
    }

    /// Serializes the frame back to its wire form.
    pub fn to_wire(&self) -> Result<String, CodecError> {
        serde_json::to_string(self).map_err(|fault| CodecError::MalformedFrame(fault.to_string()))
    }
}

/// Current sender-clock timestamp in milliseconds, used when constructing
/// outbound frames.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
