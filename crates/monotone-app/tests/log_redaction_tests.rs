//! Integration tests for log redaction.

use monotone_app::redact_sensitive;

#[test]
fn log_redaction_tests_remove_token_values() {
    let redacted = redact_sensitive("login ok access_token=abc123");
    assert!(redacted.contains("<redacted>"));
    assert!(!redacted.contains("abc123"));
}

#[test]
fn log_redaction_tests_avoid_password_leakage() {
    let redacted = redact_sensitive("form password=supersecret token=xyz");
    assert_eq!(redacted, "form password=<redacted>");
}

#[test]
fn log_redaction_tests_keep_plain_messages() {
    assert_eq!(
        redact_sensitive("request rejected with status 401"),
        "request rejected with status 401"
    );
}
