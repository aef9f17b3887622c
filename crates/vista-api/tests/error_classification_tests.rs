//! Integration tests for HTTP outcome classification.

mod common;

use vista_api::{
    ApiError, DEFAULT_UPLOAD_FAILURE_MESSAGE, NETWORK_MESSAGE, PROTOCOL_MESSAGE,
    REPORT_FAILURE_MESSAGE, SESSION_EXPIRED_MESSAGE, TransportError,
};
use vista_core::Credentials;

#[tokio::test]
async fn error_classification_tests_login_failures() {
    let transport = common::ScriptedTransport::new(vec![
        common::json(401, r#"{"error":"Invalid username or password"}"#),
        common::json(500, "<html>boom</html>"),
        Err(TransportError::Connect("refused".to_string())),
        common::json(200, r#"{"success":true}"#),
    ]);
    let gateway = common::gateway(transport);
    let credentials = Credentials::new("a", "b");

    let rejected = gateway.login(&credentials).await.expect_err("401 should fail");
    assert_eq!(rejected.user_message(), "Invalid username or password");

    let server_error = gateway.login(&credentials).await.expect_err("500 should fail");
    assert_eq!(server_error, ApiError::Auth("Invalid credentials".to_string()));

    let offline = gateway.login(&credentials).await.expect_err("offline should fail");
    assert!(matches!(offline, ApiError::Network(_)));
    assert_eq!(offline.user_message(), NETWORK_MESSAGE);

    let malformed = gateway.login(&credentials).await.expect_err("missing token should fail");
    assert!(matches!(malformed, ApiError::Protocol(_)));
    assert_eq!(malformed.user_message(), PROTOCOL_MESSAGE);
}

#[tokio::test]
async fn error_classification_tests_upload_failures() {
    let transport = common::ScriptedTransport::new(vec![
        common::json(401, r#"{"detail":"Invalid token."}"#),
        common::json(400, r#"{"error":"Invalid CSV format: no columns"}"#),
        common::json(500, ""),
        Err(TransportError::Timeout),
        common::json(201, "not json"),
    ]);
    let gateway = common::gateway(transport);

    let expired = gateway.upload_file("T", "a.csv", vec![1]).await.expect_err("401");
    assert!(expired.is_session_expired());
    assert_eq!(expired.user_message(), SESSION_EXPIRED_MESSAGE);

    let invalid = gateway.upload_file("T", "a.csv", vec![1]).await.expect_err("400");
    assert_eq!(
        invalid,
        ApiError::Validation("Invalid CSV format: no columns".to_string())
    );

    let server = gateway.upload_file("T", "a.csv", vec![1]).await.expect_err("500");
    assert_eq!(server.user_message(), DEFAULT_UPLOAD_FAILURE_MESSAGE);

    let timeout = gateway.upload_file("T", "a.csv", vec![1]).await.expect_err("timeout");
    assert!(matches!(timeout, ApiError::Network(_)));

    let garbled = gateway.upload_file("T", "a.csv", vec![1]).await.expect_err("garbled");
    assert!(matches!(garbled, ApiError::Protocol(_)));
}

#[tokio::test]
async fn error_classification_tests_history_and_report_failures() {
    let transport = common::ScriptedTransport::new(vec![
        common::json(401, ""),
        Err(TransportError::Connect("refused".to_string())),
        common::json(401, ""),
        common::json(404, r#"{"error":"No data found"}"#),
        Err(TransportError::Timeout),
    ]);
    let gateway = common::gateway(transport);

    assert_eq!(
        gateway.fetch_history("T").await.expect_err("401"),
        ApiError::SessionExpired
    );
    assert!(matches!(
        gateway.fetch_history("T").await.expect_err("offline"),
        ApiError::Network(_)
    ));

    assert_eq!(
        gateway.download_report("T").await.expect_err("401"),
        ApiError::SessionExpired
    );
    let missing = gateway.download_report("T").await.expect_err("404");
    assert_eq!(missing, ApiError::Report("No data found".to_string()));
    assert_eq!(missing.user_message(), REPORT_FAILURE_MESSAGE);

    let offline = gateway.download_report("T").await.expect_err("timeout");
    assert!(matches!(offline, ApiError::Report(_)));
}
