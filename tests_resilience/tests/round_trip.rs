//! Round-trip Tests
//!
//! Validates that written content reads back exactly, for every handle kind.

use tests_resilience::{Fixture, ALL_KINDS};

/// Test: Written content reads back unchanged
#[test]
fn test_write_then_read_round_trip() {
    for kind in ALL_KINDS {
        let fixture = Fixture::granted(kind);
        let base = fixture.base();

        for (name, content) in [
            ("plain.txt", "hello"),
            ("empty.txt", ""),
            ("unicode.txt", "grüße 👋\nline two"),
            ("with space.txt", "spaced"),
        ] {
            assert!(
                fixture.service.write_file(&base, name, content),
                "{}: write of {} failed",
                kind,
                name
            );
            assert_eq!(
                fixture.service.read_file(&fixture.file(name)),
                Some(content.to_string()),
                "{}: {} did not round-trip",
                kind,
                name
            );
        }
    }
}

/// Test: Overwrite truncates the previous content
///
/// A longer file followed by a shorter one must not leave a tail behind.
#[test]
fn test_idempotent_overwrite() {
    for kind in ALL_KINDS {
        let fixture = Fixture::granted(kind);
        let base = fixture.base();

        assert!(fixture.service.write_file(&base, "a.txt", "AAAA"));
        assert!(fixture.service.write_file(&base, "a.txt", "B"));
        assert_eq!(
            fixture.service.read_file(&fixture.file("a.txt")),
            Some("B".to_string()),
            "{}: overwrite left stale bytes",
            kind
        );

        let listed = fixture.service.list_directory(&base, false).unwrap();
        assert_eq!(listed, vec!["a.txt".to_string()], "{}: duplicate entries", kind);
    }
}

/// Test: Names that would escape the directory are rejected
#[test]
fn test_invalid_names_are_rejected() {
    for kind in ALL_KINDS {
        let fixture = Fixture::granted(kind);
        let base = fixture.base();

        for name in ["", ".", "..", "a/b", "a\\b", "nul\0"] {
            assert!(
                !fixture.service.write_file(&base, name, "x"),
                "{}: accepted {:?}",
                kind,
                name
            );
        }
        assert_eq!(fixture.service.list_directory(&base, true), Some(Vec::new()));
    }
}

/// Test: Reading a missing file is absent, not an error
#[test]
fn test_missing_file_reads_absent() {
    for kind in ALL_KINDS {
        let fixture = Fixture::granted(kind);
        assert_eq!(
            fixture.service.read_file(&fixture.file("missing.txt")),
            None,
            "{}",
            kind
        );
    }
}

/// Test: Names near the filesystem limit are writable
#[test]
fn test_long_names_round_trip() {
    let name = format!("{}.txt", "a".repeat(240));
    for kind in ALL_KINDS {
        let fixture = Fixture::granted(kind);
        assert!(
            fixture.service.write_file(&fixture.base(), &name, "long"),
            "{}: long name rejected",
            kind
        );
        assert_eq!(
            fixture.service.read_file(&fixture.file(&name)),
            Some("long".to_string()),
            "{}",
            kind
        );
    }
}
