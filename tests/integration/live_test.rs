//! Live PostgREST integration tests.
//!
//! These require a reachable Supabase project. Set SUPAPLAY_TEST_URL and
//! SUPAPLAY_TEST_KEY (and optionally SUPAPLAY_TEST_TABLE) to run them;
//! they are skipped otherwise.

use supaplay::client::Credentials;
use supaplay::query::run_to_outcome;

/// Helper to get test credentials from the environment.
fn get_test_credentials() -> Option<Credentials> {
    let url = std::env::var("SUPAPLAY_TEST_URL").ok()?;
    let key = std::env::var("SUPAPLAY_TEST_KEY").ok()?;
    Some(Credentials::new(url, key))
}

fn get_test_table() -> String {
    std::env::var("SUPAPLAY_TEST_TABLE").unwrap_or_else(|_| "playground_notes".to_string())
}

#[tokio::test]
async fn test_live_select() {
    let Some(credentials) = get_test_credentials() else {
        eprintln!("Skipping test: SUPAPLAY_TEST_URL / SUPAPLAY_TEST_KEY not set");
        return;
    };

    let expression = format!("supabase.from('{}').select().limit(1)", get_test_table());
    let outcome = run_to_outcome(&credentials, &expression, 30).await;

    assert!(
        outcome.is_success(),
        "live select failed: {}",
        outcome.pretty()
    );
    assert!(outcome.data().unwrap().is_array());
}

#[tokio::test]
async fn test_live_missing_table_reports_backend_error() {
    let Some(credentials) = get_test_credentials() else {
        eprintln!("Skipping test: SUPAPLAY_TEST_URL / SUPAPLAY_TEST_KEY not set");
        return;
    };

    let outcome = run_to_outcome(
        &credentials,
        "supabase.from('definitely_not_a_table_xyz').select()",
        30,
    )
    .await;

    // The backend rejects the relation; that is a domain error, not an
    // unexpected one.
    assert!(!outcome.is_success());
    let error = outcome.error().unwrap();
    assert!(error.get("message").is_some());
}
