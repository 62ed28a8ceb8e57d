//! Deep-link bootstrapping for shareable playground links.
//!
//! A link carries up to three query parameters: `supabaseUrl`,
//! `supabaseKey` and `query`. Any present subset pre-fills the form; only
//! a complete link may trigger automatic execution, and that is gated
//! behind a one-time user confirmation.

use crate::client::Credentials;
use crate::error::{PlayError, Result};
use std::time::Duration;
use url::Url;

/// Link parameter carrying the project URL.
pub const PARAM_URL: &str = "supabaseUrl";
/// Link parameter carrying the API key.
pub const PARAM_KEY: &str = "supabaseKey";
/// Link parameter carrying the query expression.
pub const PARAM_QUERY: &str = "query";

/// How long to let the interface settle before offering the auto-run
/// confirmation.
pub const SETTLE_DELAY: Duration = Duration::from_millis(400);

/// The values read from an incoming link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShareLink {
    pub base_url: Option<String>,
    pub key: Option<String>,
    pub expression: Option<String>,
}

impl ShareLink {
    /// Parses a shareable link, reading the recognized query parameters.
    ///
    /// Unknown parameters are ignored; empty values count as absent. The
    /// link itself must be a valid URL.
    pub fn parse(link: &str) -> Result<Self> {
        let url = Url::parse(link)
            .map_err(|e| PlayError::config(format!("Invalid link '{link}': {e}")))?;

        let mut parsed = Self::default();
        for (name, value) in url.query_pairs() {
            if value.is_empty() {
                continue;
            }
            match name.as_ref() {
                PARAM_URL => parsed.base_url = Some(value.into_owned()),
                PARAM_KEY => parsed.key = Some(value.into_owned()),
                PARAM_QUERY => parsed.expression = Some(value.into_owned()),
                _ => {}
            }
        }

        Ok(parsed)
    }

    /// Returns true when all three parameters are present; only then may
    /// the link trigger automatic execution.
    pub fn is_complete(&self) -> bool {
        self.base_url.is_some() && self.key.is_some() && self.expression.is_some()
    }

    /// Returns the credentials carried by the link, if both are present.
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.base_url, &self.key) {
            (Some(url), Some(key)) => Some(Credentials::new(url.clone(), key.clone())),
            _ => None,
        }
    }
}

/// One-shot gate for the auto-run confirmation.
///
/// The confirmation may be offered at most once per process, no matter how
/// often the triggering inputs are re-evaluated. Explicit session state,
/// owned by whoever drives the bootstrap.
#[derive(Debug, Default)]
pub struct ConfirmationGate {
    shown: bool,
}

impl ConfirmationGate {
    /// Creates an unarmed gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the gate. Returns true the first time only; every later call
    /// returns false.
    pub fn try_arm(&mut self) -> bool {
        !std::mem::replace(&mut self.shown, true)
    }

    /// Returns true once the confirmation has been offered.
    pub fn was_shown(&self) -> bool {
        self.shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_complete_link() {
        let link = ShareLink::parse(
            "https://play.example.com/?supabaseUrl=https%3A%2F%2Fxyz.supabase.co&supabaseKey=anon-key&query=supabase.from('users').select()",
        )
        .unwrap();

        assert_eq!(link.base_url, Some("https://xyz.supabase.co".to_string()));
        assert_eq!(link.key, Some("anon-key".to_string()));
        assert_eq!(
            link.expression,
            Some("supabase.from('users').select()".to_string())
        );
        assert!(link.is_complete());
    }

    #[test]
    fn test_parse_partial_link() {
        let link =
            ShareLink::parse("https://play.example.com/?supabaseUrl=https%3A%2F%2Fxyz.supabase.co")
                .unwrap();

        assert_eq!(link.base_url, Some("https://xyz.supabase.co".to_string()));
        assert_eq!(link.key, None);
        assert_eq!(link.expression, None);
        assert!(!link.is_complete());
    }

    #[test]
    fn test_parse_ignores_unknown_and_empty_params() {
        let link = ShareLink::parse(
            "https://play.example.com/?supabaseUrl=&theme=dark&supabaseKey=k",
        )
        .unwrap();

        assert_eq!(link.base_url, None);
        assert_eq!(link.key, Some("k".to_string()));
    }

    #[test]
    fn test_parse_no_params() {
        let link = ShareLink::parse("https://play.example.com/").unwrap();
        assert_eq!(link, ShareLink::default());
    }

    #[test]
    fn test_parse_invalid_link() {
        let err = ShareLink::parse("not a link").unwrap_err();
        assert_eq!(err.category(), "Configuration Error");
    }

    #[test]
    fn test_credentials_need_both_values() {
        let mut link = ShareLink {
            base_url: Some("https://xyz.supabase.co".to_string()),
            key: None,
            expression: None,
        };
        assert!(link.credentials().is_none());

        link.key = Some("anon-key".to_string());
        let credentials = link.credentials().unwrap();
        assert_eq!(credentials.base_url, "https://xyz.supabase.co");
        assert_eq!(credentials.key, "anon-key");
    }

    #[test]
    fn test_gate_fires_once() {
        let mut gate = ConfirmationGate::new();
        assert!(!gate.was_shown());

        assert!(gate.try_arm());
        assert!(gate.was_shown());

        // Re-evaluating the trigger must not offer the prompt again.
        assert!(!gate.try_arm());
        assert!(!gate.try_arm());
    }
}
