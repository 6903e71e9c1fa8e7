// [crates/protocol/src/errors.rs]
use thiserror::Error;

/// Fallos de decodificacion/codificacion del enlace duplex con los workers.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("MALFORMED_FRAME: {0}")]
    MalformedFrame(String),

    #[error("FRAME_TOO_LARGE: payload of {0} bytes exceeds the {1} byte ceiling")]
    FrameTooLarge(usize, usize),

    #[error("UNKNOWN_FRAME_TYPE: {0}")]
    UnknownFrameType(String),
}
