use super::*;

#[test]
fn new_has_sane_defaults() {
    let err = AppError::new(ErrorKind::Network, "net.timeout", "request timed out");
    assert_eq!(err.kind, ErrorKind::Network);
    assert!(!err.recoverable);
    assert!(err.suggestions.is_empty());
    assert!(err.retry_after_ms.is_none());
}

#[test]
fn with_retry_after_marks_recoverable() {
    let err = AppError::system("cb.open", "circuit open").with_retry_after(Duration::from_secs(5));
    assert!(err.recoverable);
    assert_eq!(err.retry_after(), Some(Duration::from_secs(5)));
}

#[test]
fn builder_methods_chain() {
    let err = AppError::validation("bad_input", "missing field")
        .with_detail("field", "name")
        .with_suggestion("provide a name")
        .with_correlation_id("corr-1")
        .with_severity(Severity::High);
    assert_eq!(err.details.get("field"), Some(&"name".to_string()));
    assert_eq!(err.suggestions, vec!["provide a name".to_string()]);
    assert_eq!(err.correlation_id.as_deref(), Some("corr-1"));
    assert_eq!(err.severity, Severity::High);
}

#[test]
fn looks_transient_matches_known_substrings() {
    let err = AppError::network("net.refused", "Connection refused by peer");
    assert!(err.looks_transient());
    let err = AppError::network("net.other", "malformed response body");
    assert!(!err.looks_transient());
}

#[test]
fn looks_transient_is_case_insensitive() {
    let err = AppError::network("net.timeout", "Request TIMEOUT after 30s");
    assert!(err.looks_transient());
}

#[test]
fn severity_orders_low_to_critical() {
    assert!(Severity::Low < Severity::Medium);
    assert!(Severity::Medium < Severity::High);
    assert!(Severity::High < Severity::Critical);
}

#[test]
fn display_formats_as_code_and_message() {
    let err = AppError::system("sys.io", "disk full");
    assert_eq!(err.to_string(), "sys.io: disk full");
}
