//! Command-line argument parsing for Supaplay.
//!
//! Uses clap to parse CLI arguments. A shareable playground link can be
//! passed as the positional argument; individual flags override whatever
//! the link or the config file provides.

use crate::deeplink::ShareLink;
use crate::error::Result;
use clap::Parser;
use std::path::PathBuf;

/// A terminal playground for Supabase queries.
#[derive(Parser, Debug)]
#[command(name = "supaplay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Shareable playground link (carries supabaseUrl, supabaseKey and query)
    #[arg(value_name = "LINK")]
    pub link: Option<String>,

    /// Supabase project URL
    #[arg(short = 'u', long, value_name = "URL")]
    pub url: Option<String>,

    /// Supabase API key
    #[arg(short = 'k', long, value_name = "KEY")]
    pub key: Option<String>,

    /// Query expression to pre-fill, e.g. "supabase.from('table').select()"
    #[arg(short = 'q', long, value_name = "EXPR")]
    pub query: Option<String>,

    /// Use named credential profile from config
    #[arg(short = 'p', long, value_name = "NAME")]
    pub profile: Option<String>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Run the query once, print the result as JSON, and exit (no TUI)
    #[arg(long)]
    pub exec: bool,

    /// Accept the deep-link confirmation without prompting
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Request timeout in seconds (overrides config)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::Config::default_path)
    }

    /// Returns the named profile to use, if specified.
    pub fn profile_name(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    /// Parses the positional shareable link, if one was given.
    pub fn parse_link(&self) -> Result<Option<ShareLink>> {
        match &self.link {
            Some(link) => Ok(Some(ShareLink::parse(link)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_args(args: &[&str]) -> Cli {
        Cli::parse_from(args)
    }

    #[test]
    fn test_parse_link_positional() {
        let cli = parse_args(&[
            "supaplay",
            "https://play.example.com/?supabaseUrl=https%3A%2F%2Fx.supabase.co&supabaseKey=k&query=supabase.from('t').select()",
        ]);

        let link = cli.parse_link().unwrap().unwrap();
        assert_eq!(link.base_url, Some("https://x.supabase.co".to_string()));
        assert_eq!(link.key, Some("k".to_string()));
        assert!(link.is_complete());
    }

    #[test]
    fn test_parse_link_none() {
        let cli = parse_args(&["supaplay"]);
        assert!(cli.parse_link().unwrap().is_none());
    }

    #[test]
    fn test_parse_link_invalid() {
        let cli = parse_args(&["supaplay", "not a link"]);
        assert!(cli.parse_link().is_err());
    }

    #[test]
    fn test_parse_individual_args() {
        let cli = parse_args(&[
            "supaplay",
            "--url",
            "https://x.supabase.co",
            "--key",
            "anon",
            "--query",
            "supabase.from('users').select()",
        ]);

        assert_eq!(cli.url, Some("https://x.supabase.co".to_string()));
        assert_eq!(cli.key, Some("anon".to_string()));
        assert_eq!(cli.query, Some("supabase.from('users').select()".to_string()));
    }

    #[test]
    fn test_parse_short_args() {
        let cli = parse_args(&["supaplay", "-u", "https://x.supabase.co", "-k", "anon"]);

        assert_eq!(cli.url, Some("https://x.supabase.co".to_string()));
        assert_eq!(cli.key, Some("anon".to_string()));
    }

    #[test]
    fn test_parse_named_profile() {
        let cli = parse_args(&["supaplay", "--profile", "prod"]);
        assert_eq!(cli.profile_name(), Some("prod"));

        let cli = parse_args(&["supaplay", "-p", "staging"]);
        assert_eq!(cli.profile_name(), Some("staging"));
    }

    #[test]
    fn test_parse_config_path() {
        let cli = parse_args(&["supaplay", "--config", "/path/to/config.toml"]);
        assert_eq!(cli.config_path(), PathBuf::from("/path/to/config.toml"));
    }

    #[test]
    fn test_parse_exec_and_yes() {
        let cli = parse_args(&["supaplay", "--exec", "--yes"]);
        assert!(cli.exec);
        assert!(cli.yes);

        let cli = parse_args(&["supaplay"]);
        assert!(!cli.exec);
        assert!(!cli.yes);
    }

    #[test]
    fn test_parse_timeout() {
        let cli = parse_args(&["supaplay", "--timeout", "5"]);
        assert_eq!(cli.timeout, Some(5));
    }
}
