//! # Method Channel
//!
//! This crate defines the request/response shapes exchanged over the
//! directory picker channel.
//!
//! ## Philosophy
//!
//! - **Named methods, keyed arguments**: A call is a method name plus an
//!   argument map; nothing else crosses the channel
//! - **No errors for absent results**: Operations that fail report `null` or
//!   `false` as a successful value; channel errors are reserved for malformed
//!   requests
//! - **Unknown is not fatal**: Unknown method names answer "not implemented"
//!
//! ## Wire format
//!
//! One JSON object per line:
//!
//! ```text
//! {"id":1,"method":"listDirectory","arguments":{"directoryPath":"/data","recursive":true}}
//! {"id":1,"response":{"status":"success","value":["a.txt"]}}
//! ```

pub mod call;
pub mod codec;
pub mod method;

pub use call::{Arguments, ErrorCode, MethodCall, MethodError, MethodReply, MethodResponse};
pub use codec::{decode_call, decode_reply, encode_call, encode_reply, CodecError};
pub use method::{keys, Method, CHANNEL_NAME};
