//! # Channel Contract Tests
//!
//! This crate provides "golden" tests for the directory picker channel to
//! ensure it doesn't drift accidentally over time.
//!
//! ## Philosophy
//!
//! - **Explicit over implicit**: Wire names and field shapes are written as code
//! - **Testability first**: Contract tests fail when interfaces change
//! - **Mechanism not policy**: Define what must be stable, not how to use it
//!
//! ## Structure
//!
//! Each module verifies one part of the contract:
//! - Method names and argument keys
//! - Response envelope shapes
//! - Entry record fields
//! - Handle string forms
//! - Settings file fields

pub mod channel;
pub mod entry;
pub mod handle;
pub mod settings;

/// Common test helpers for contract validation
pub mod test_helpers {
    use ipc::{decode_call, encode_call, Method, MethodCall};
    use serde::Serialize;
    use serde_json::Value;

    /// Builds a call for `method` with the given arguments and sends it
    /// through the line codec
    pub fn create_test_call(method: Method, arguments: &[(&str, Value)]) -> MethodCall {
        let call = arguments
            .iter()
            .fold(MethodCall::new(method.name()).with_id(1), |call, (k, v)| {
                call.with_argument(*k, v.clone())
            });
        let line = encode_call(&call).expect("Failed to encode call");
        decode_call(&line).expect("Failed to decode call")
    }

    /// Verifies a method keeps its wire name and argument keys
    pub fn verify_method_contract(method: Method, expected_name: &str, expected_keys: &[&str]) {
        assert_eq!(
            method.name(),
            expected_name,
            "Method name changed: expected '{}', got '{}'",
            expected_name,
            method.name()
        );
        assert_eq!(
            method.argument_keys(),
            expected_keys,
            "Argument keys of '{}' changed",
            expected_name
        );
    }

    /// Verifies a value serializes to exactly the expected set of object keys
    pub fn verify_field_names<T: Serialize>(value: &T, expected: &[&str]) {
        let json = serde_json::to_value(value).expect("Failed to serialize");
        let object = json.as_object().expect("Expected a JSON object");
        let mut actual: Vec<&str> = object.keys().map(String::as_str).collect();
        let mut expected = expected.to_vec();
        actual.sort_unstable();
        expected.sort_unstable();
        assert_eq!(actual, expected, "Field names changed");
    }
}
