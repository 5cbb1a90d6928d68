//! JSON-lines encoding

use crate::call::{MethodCall, MethodReply};
use thiserror::Error;

/// Errors that can occur while encoding or decoding a line
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Empty line")]
    Empty,

    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Decodes one request line
pub fn decode_call(line: &str) -> Result<MethodCall, CodecError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(CodecError::Empty);
    }
    Ok(serde_json::from_str(line)?)
}

/// Encodes a request as a single line (without the newline)
pub fn encode_call(call: &MethodCall) -> Result<String, CodecError> {
    Ok(serde_json::to_string(call)?)
}

/// Decodes one reply line
pub fn decode_reply(line: &str) -> Result<MethodReply, CodecError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(CodecError::Empty);
    }
    Ok(serde_json::from_str(line)?)
}

/// Encodes a reply as a single line (without the newline)
pub fn encode_reply(reply: &MethodReply) -> Result<String, CodecError> {
    Ok(serde_json::to_string(reply)?)
}
