//! Settings file contract tests
//!
//! Settings files written by one release must load in the next.
