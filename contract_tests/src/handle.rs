//! Handle string contract tests
//!
//! Handles cross the channel as plain strings and must come back unchanged.
