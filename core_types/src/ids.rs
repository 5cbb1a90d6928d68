//! Identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag pairing a chooser presentation with its result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestCode(u32);

impl RequestCode {
    /// First code handed out by a session
    pub const FIRST: RequestCode = RequestCode(1001);

    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for RequestCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
