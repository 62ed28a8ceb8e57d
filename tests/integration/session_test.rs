//! Session state machine integration tests.
//!
//! Drives the full submit -> execute -> finish cycle against the mock
//! backend and checks the observable properties of the engine.

use pretty_assertions::assert_eq;
use serde_json::json;
use supaplay::client::{ApiError, ApiResponse, Credentials, MockBackend};
use supaplay::query::{run_to_outcome, Outcome, QueryExecutor};
use supaplay::session::{ExecutionPhase, QuerySession};

fn creds() -> Credentials {
    Credentials::new("https://xyzcompany.supabase.co", "anon-key")
}

/// Runs one expression through the session using the given backend.
async fn run(session: &mut QuerySession, backend: &MockBackend, expression: &str) {
    let ticket = session.begin(&creds(), expression).unwrap();
    assert_eq!(session.phase(), ExecutionPhase::Running);
    let outcome = QueryExecutor::new(backend).execute(&ticket.expression).await;
    assert!(session.finish(ticket.seq, outcome));
}

#[tokio::test]
async fn test_successful_run_stores_data_and_history() {
    let mut session = QuerySession::new();
    let backend = MockBackend::with_responses(vec![ApiResponse::success(
        json!([{"id": 1, "name": "Ada"}]),
    )]);

    run(&mut session, &backend, "supabase.from('users').select()").await;

    assert_eq!(session.phase(), ExecutionPhase::Succeeded);
    assert_eq!(
        session.outcome().unwrap().data(),
        Some(&json!([{"id": 1, "name": "Ada"}]))
    );
    assert_eq!(
        session.history().entries(),
        ["supabase.from('users').select()"]
    );
}

#[tokio::test]
async fn test_backend_error_stores_error_and_history() {
    let mut session = QuerySession::new();
    let backend = MockBackend::rejecting(ApiError {
        message: "permission denied for table users".to_string(),
        code: Some("42501".to_string()),
        ..Default::default()
    });

    run(&mut session, &backend, "supabase.from('users').select()").await;

    assert_eq!(session.phase(), ExecutionPhase::Failed);
    let error = session.outcome().unwrap().error().unwrap();
    assert_eq!(error["code"], "42501");
    // The failed expression is recorded too.
    assert_eq!(session.history().len(), 1);
}

#[tokio::test]
async fn test_malformed_expression_fails_with_unexpected_error() {
    let mut session = QuerySession::new();
    let backend = MockBackend::new();

    run(&mut session, &backend, "1+").await;

    assert_eq!(session.phase(), ExecutionPhase::Failed);
    let error = session.outcome().unwrap().error().unwrap();
    assert!(error.as_str().unwrap().contains("Unexpected error:"));
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_missing_credentials_never_start_a_run() {
    let mut session = QuerySession::new();

    for credentials in [
        Credentials::new("", "anon-key"),
        Credentials::new("https://x.supabase.co", ""),
        Credentials::new("", ""),
    ] {
        let err = session
            .begin(&credentials, "supabase.from('users').select()")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: Please provide both the API Key and URL."
        );
        assert_eq!(session.phase(), ExecutionPhase::Idle);
    }

    assert!(session.history().is_empty());
}

#[tokio::test]
async fn test_history_is_append_only_and_ordered() {
    let mut session = QuerySession::new();
    let backend = MockBackend::new();

    // Even expressions that fail to evaluate complete their run and are
    // recorded in submission order, duplicates included.
    for expression in ["a", "b", "a"] {
        let ticket = session.begin(&creds(), expression).unwrap();
        let outcome = QueryExecutor::new(&backend).execute(&ticket.expression).await;
        session.finish(ticket.seq, outcome);
    }

    assert_eq!(session.history().entries(), ["a", "b", "a"]);
}

#[tokio::test]
async fn test_resubmit_while_running_is_refused() {
    let mut session = QuerySession::new();

    let ticket = session
        .begin(&creds(), "supabase.from('a').select()")
        .unwrap();

    let err = session
        .begin(&creds(), "supabase.from('b').select()")
        .unwrap_err();
    assert!(err.to_string().contains("already running"));
    assert_eq!(session.phase(), ExecutionPhase::Running);

    // Completing the original run appends exactly one entry.
    session.finish(ticket.seq, Outcome::Success { data: json!([]) });
    assert_eq!(session.history().len(), 1);
}

#[tokio::test]
async fn test_last_submission_wins() {
    let mut session = QuerySession::new();

    let first = session
        .begin(&creds(), "supabase.from('a').select()")
        .unwrap();
    session.finish(first.seq, Outcome::Success { data: json!("first") });

    let second = session
        .begin(&creds(), "supabase.from('b').select()")
        .unwrap();

    // A late resolution of the superseded run is ignored.
    assert!(!session.finish(first.seq, Outcome::Success { data: json!("stale") }));
    assert!(session.outcome().is_none());

    assert!(session.finish(second.seq, Outcome::Success { data: json!("second") }));
    assert_eq!(session.outcome().unwrap().data(), Some(&json!("second")));
}

#[tokio::test]
async fn test_credentials_snapshot_at_submission() {
    let mut session = QuerySession::new();
    let mut credentials = creds();

    let ticket = session
        .begin(&credentials, "supabase.from('users').select()")
        .unwrap();

    // Edits after submission must not affect the in-flight run.
    credentials.key = "rotated".to_string();
    assert_eq!(ticket.credentials.key, "anon-key");
}

#[tokio::test]
async fn test_full_run_with_invalid_url_completes_as_failure() {
    let mut session = QuerySession::new();
    let credentials = Credentials::new("not a url", "anon-key");

    let outcome = run_to_outcome(&credentials, "supabase.from('users').select()", 1).await;
    let ticket = session.begin(&credentials, "supabase.from('users').select()").unwrap();
    session.finish(ticket.seq, outcome);

    assert_eq!(session.phase(), ExecutionPhase::Failed);
    let error = session.outcome().unwrap().error().unwrap();
    assert!(error.as_str().unwrap().contains("Unexpected error:"));
}
