//! Custom assertion macros and utilities
//!
//! Provides enhanced assertion macros for better test output and
//! more descriptive error messages.

use axum::http::StatusCode;
use axum_test::TestResponse;
use serde_json::Value;

/// Assert that a result is ok and return the value
///
/// This macro unwraps a Result, providing a better error message
/// if the result is an error.
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $message:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $message, e),
        }
    };
}

/// Assert that a string contains a substring
#[macro_export]
macro_rules! assert_contains {
    ($haystack:expr, $needle:expr) => {
        assert!(
            $haystack.contains($needle),
            "Expected '{}' to contain '{}'",
            $haystack,
            $needle
        );
    };
}

/// Assert the status of an error response and return its JSON body
///
/// Error bodies always carry `error` and a `status` matching the HTTP status.
pub fn assert_error(response: &TestResponse, expected: StatusCode) -> Value {
    assert_eq!(
        response.status_code(),
        expected,
        "unexpected status, body: {}",
        response.text()
    );
    let body: Value = response.json();
    assert!(body["error"].is_string(), "missing error message: {body}");
    assert_eq!(body["status"], expected.as_u16());
    body
}
