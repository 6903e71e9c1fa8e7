// [crates/protocol/src/lib.rs]
/*!
 * Wire codec for the duplex channel between the control plane and worker
 * nodes (spec §4.1). Generalized from the teacher's bincode-based
 * `prospector-infra-transport` crate into the self-delimited JSON frames
 * this protocol requires; the packet-size ceiling and the `thiserror`
 * error-enum shape survive unchanged from that teacher crate.
 */

pub mod errors;
pub mod frame;

pub use errors::CodecError;
pub use frame::{
    now_ms, Frame, HeartbeatStatus, JobResultError, JobResultMetrics, JobResultStatus, NodeSpecs,
    MAX_FRAME_BYTES,
};

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn round_trips_auth_frame() {
        let frame = Frame::Auth {
            trace_id: Uuid::new_v4(),
            timestamp: frame::now_ms(),
            node_id: "node-1".to_string(),
            capabilities: vec!["python-3.11".to_string()],
            agent_types: Some(vec!["travel-planner".to_string()]),
            wallet: None,
            specs: NodeSpecs {
                os: "linux".to_string(),
                arch: "x86_64".to_string(),
                cpu_cores: 8,
                total_memory_gb: 16.0,
                runtime_version: "1.0.0".to_string(),
            },
            secret: "s3cr3t".to_string(),
            version: "1".to_string(),
        };

        let wire = frame.to_wire().expect("serializes");
        let parsed = Frame::parse(&wire).expect("parses");
        assert_eq!(parsed.trace_id(), frame.trace_id());
        match parsed {
            Frame::Auth { node_id, .. } => assert_eq!(node_id, "node-1"),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn rejects_missing_required_fields() {
        let raw = r#"{"type":"AUTH"}"#;
        let err = Frame::parse(raw).unwrap_err();
        assert!(matches!(err, CodecError::MalformedFrame(_)));
    }

    #[test]
    fn rejects_unknown_frame_type() {
        let raw = format!(
            r#"{{"type":"TELEPORT","traceId":"{}","timestamp":1}}"#,
            Uuid::new_v4()
        );
        let err = Frame::parse(&raw).unwrap_err();
        assert!(matches!(err, CodecError::UnknownFrameType(_)));
    }

    #[test]
    fn rejects_oversized_frame() {
        let raw = "x".repeat(MAX_FRAME_BYTES + 1);
        let err = Frame::parse(&raw).unwrap_err();
        assert!(matches!(err, CodecError::FrameTooLarge(_, _)));
    }
}
