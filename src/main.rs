//! Supaplay - a terminal playground for Supabase queries.

use std::io::{BufRead, Write};

use supaplay::cli::Cli;
use supaplay::client::Credentials;
use supaplay::config::{Config, ProfileConfig};
use supaplay::deeplink::ShareLink;
use supaplay::error::{PlayError, Result};
use supaplay::query::Outcome;
use supaplay::session::QuerySession;
use supaplay::tui::{self, TuiOptions};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Pick up SUPABASE_URL / SUPABASE_KEY from a local .env, if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Load configuration file
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    // Parse the shareable link, if one was given
    let link = cli.parse_link()?;

    let inputs = resolve_inputs(&cli, &config, link.as_ref())?;
    let timeout_secs = cli.timeout.unwrap_or(config.http.timeout_secs);

    if cli.exec {
        run_once(&cli, inputs, timeout_secs).await
    } else {
        let pending_link = link.filter(ShareLink::is_complete);
        tui::run(TuiOptions {
            url: inputs.url,
            key: inputs.key,
            query: inputs.query,
            pending_link,
            timeout_secs,
        })
        .await
    }
}

/// The credential and query values resolved for this invocation.
#[derive(Debug, Default)]
struct ResolvedInputs {
    url: Option<String>,
    key: Option<String>,
    query: Option<String>,
    /// The query came from the deep link, not from a flag.
    query_from_link: bool,
}

/// Resolves the startup inputs with precedence:
/// 1. CLI flags (highest)
/// 2. Deep-link parameters
/// 3. Named or default profile from config
/// 4. Environment variables
fn resolve_inputs(cli: &Cli, config: &Config, link: Option<&ShareLink>) -> Result<ResolvedInputs> {
    let mut profile = match cli.profile_name() {
        Some(name) => config
            .get_profile(Some(name))
            .cloned()
            .ok_or_else(|| {
                PlayError::config(format!("Profile '{name}' not found in config file"))
            })?,
        None => config.get_profile(None).cloned().unwrap_or_default(),
    };

    // Environment variables fill whatever the profile left open
    profile.apply_env_defaults();

    let link = link.cloned().unwrap_or_default();

    let url = cli.url.clone().or(link.base_url).or(profile.url);
    let key = cli.key.clone().or(link.key).or(profile.key);
    let query_from_link = cli.query.is_none() && link.expression.is_some();
    let query = cli.query.clone().or(link.expression);

    if let (Some(url), Some(key)) = (&url, &key) {
        let resolved = ProfileConfig {
            url: Some(url.clone()),
            key: Some(key.clone()),
        };
        info!("Using project: {}", resolved.display_string());
    }

    Ok(ResolvedInputs {
        url,
        key,
        query,
        query_from_link,
    })
}

/// One-shot mode: run a single expression and print the outcome as JSON.
async fn run_once(cli: &Cli, inputs: ResolvedInputs, timeout_secs: u64) -> Result<()> {
    let credentials = Credentials::new(
        inputs.url.unwrap_or_default(),
        inputs.key.unwrap_or_default(),
    );
    let expression = inputs.query.unwrap_or_default();

    // A linked query is an automatic run; it still needs the one-time
    // confirmation unless --yes was passed.
    if inputs.query_from_link && !cli.yes && !confirm_on_stdin(&credentials.base_url)? {
        info!("Linked query declined");
        return Ok(());
    }

    let mut session = QuerySession::new();
    let outcome = session.run(&credentials, &expression, timeout_secs).await?;

    match outcome {
        Outcome::Success { .. } => {
            println!("{}", outcome.pretty());
            Ok(())
        }
        Outcome::Failure { .. } => {
            eprintln!("Error: {}", outcome.pretty());
            std::process::exit(1);
        }
    }
}

/// Blocking yes/no prompt on stderr/stdin for one-shot deep-link runs.
fn confirm_on_stdin(base_url: &str) -> Result<bool> {
    eprint!("Run the linked query against {base_url}? [y/N] ");
    std::io::stderr()
        .flush()
        .map_err(|e| PlayError::internal(format!("Failed to flush prompt: {e}")))?;

    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(|e| PlayError::internal(format!("Failed to read confirmation: {e}")))?;

    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}
