//! Entry record contract tests
//!
//! `getDirectoryDetails` returns a sequence of these records.
