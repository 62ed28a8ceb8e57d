//! Deep-link bootstrap integration tests.
//!
//! Checks parameter parsing, the one-shot confirmation gate, and the
//! accept/decline behavior against the session engine.

use pretty_assertions::assert_eq;
use serde_json::json;
use supaplay::client::{ApiResponse, MockBackend};
use supaplay::deeplink::{ConfirmationGate, ShareLink};
use supaplay::query::QueryExecutor;
use supaplay::session::{ExecutionPhase, QuerySession};

const LINK: &str = "https://play.example.com/?supabaseUrl=https%3A%2F%2Fxyz.supabase.co&supabaseKey=anon-key&query=supabase.from('users').select()";

#[test]
fn test_complete_link_offers_confirmation_once() {
    let link = ShareLink::parse(LINK).unwrap();
    assert!(link.is_complete());

    let mut gate = ConfirmationGate::new();
    // The trigger may be re-evaluated any number of times; the prompt is
    // offered exactly once.
    let offers: Vec<bool> = (0..5).map(|_| gate.try_arm()).collect();
    assert_eq!(offers, [true, false, false, false, false]);
}

#[test]
fn test_partial_link_never_auto_runs() {
    let link = ShareLink::parse(
        "https://play.example.com/?supabaseUrl=https%3A%2F%2Fxyz.supabase.co&query=supabase.from('users').select()",
    )
    .unwrap();

    assert!(!link.is_complete());
    // Partial bootstrap still pre-fills what it has.
    assert_eq!(link.base_url, Some("https://xyz.supabase.co".to_string()));
    assert_eq!(
        link.expression,
        Some("supabase.from('users').select()".to_string())
    );
}

#[test]
fn test_declining_leaves_session_untouched() {
    let link = ShareLink::parse(LINK).unwrap();
    let mut gate = ConfirmationGate::new();
    assert!(gate.try_arm());

    // Declining runs nothing: the session stays idle and the ledger empty;
    // the link values remain available for pre-filling the form.
    let session = QuerySession::new();
    assert_eq!(session.phase(), ExecutionPhase::Idle);
    assert!(session.history().is_empty());
    assert!(link.credentials().is_some());
}

#[tokio::test]
async fn test_accepting_runs_the_linked_query() {
    let link = ShareLink::parse(LINK).unwrap();
    let mut gate = ConfirmationGate::new();
    assert!(gate.try_arm());

    let mut session = QuerySession::new();
    let backend =
        MockBackend::with_responses(vec![ApiResponse::success(json!([{"id": 1}]))]);

    let credentials = link.credentials().unwrap();
    let expression = link.expression.clone().unwrap();
    let ticket = session.begin(&credentials, &expression).unwrap();
    let outcome = QueryExecutor::new(&backend).execute(&ticket.expression).await;
    session.finish(ticket.seq, outcome);

    assert_eq!(session.phase(), ExecutionPhase::Succeeded);
    assert_eq!(
        session.history().entries(),
        ["supabase.from('users').select()"]
    );
}

#[test]
fn test_link_with_encoded_expression() {
    let link = ShareLink::parse(
        "https://play.example.com/?supabaseUrl=https%3A%2F%2Fxyz.supabase.co&supabaseKey=k&query=supabase.from(%27users%27).select(%27id%2Cname%27).eq(%27active%27%2C%20true)",
    )
    .unwrap();

    assert_eq!(
        link.expression,
        Some("supabase.from('users').select('id,name').eq('active', true)".to_string())
    );
}
