//! Method channel contract tests
//!
//! These tests define the stable names, argument keys and reply shapes of
//! the directory picker channel.
