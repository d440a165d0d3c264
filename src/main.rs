// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Build the shared state once: repo store, GitHub fetcher, model cache
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = success, 1 = not found, 2 = error)
//
// Logs go to stderr, results go to stdout, so `file` output and `--json`
// output can be piped safely.
// =============================================================================

mod cli;
mod error;
mod github;
mod registry;
mod repo;

use std::io::Write;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Commands};
use error::RegistryError;
use github::ContentFetcher;
use registry::{ModelCache, ModelRecord, ModelStatus};
use repo::{RepoCoordinates, RepoStore};

// The registry service as wired up for real use
type Registry = ModelCache<ContentFetcher>;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            // A missing file or repo is "not found", everything else is an error
            let not_found = e
                .downcast_ref::<RegistryError>()
                .is_some_and(RegistryError::is_not_found);
            if not_found {
                1
            } else {
                2
            }
        }
    };

    std::process::exit(exit_code);
}

// Runs one subcommand and returns the exit code
// Errors bubble up to main(), which prints them and picks the exit code
async fn run() -> Result<i32> {
    // Parse command-line arguments (clap exits on --help or bad flags)
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Owner/repo (or URL) are required for every subcommand
    let coords = cli.repo.coordinates()?;

    // One store, one fetcher, one cache for the whole process
    let store = Arc::new(RepoStore::new());
    let fetcher = ContentFetcher::new(Arc::clone(&store), &cli.api_url)?;
    let registry = ModelCache::new(Arc::clone(&store), fetcher);

    // An empty token means anonymous access
    let token = cli.token.trim();
    debug!(authenticated = !token.is_empty(), "starting");

    // Dispatch to the appropriate handler
    match cli.command {
        Commands::Test => handle_test(&store, &registry, coords, token).await,
        Commands::Models { refresh, json } => {
            store.set(coords);
            handle_models(&registry, token, refresh, json).await
        }
        Commands::Show { ids, json } => {
            store.set(coords);
            handle_show(&registry, token, &ids, json).await
        }
        Commands::File { path } => {
            store.set(coords);
            handle_file(&registry, token, &path).await
        }
    }
}

// Logging setup: RUST_LOG wins, otherwise warnings only (debug with -v)
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "model_registry=debug" } else { "warn" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// Handles the 'test' subcommand
//
// Mirrors connecting a repository: the coordinates only stay active if the
// registry can actually be fetched and parsed.
async fn handle_test(
    store: &RepoStore,
    registry: &Registry,
    coords: RepoCoordinates,
    token: &str,
) -> Result<i32> {
    println!(
        "🔍 Testing {}/{} (branch {}, config {})",
        coords.owner, coords.repo, coords.branch, coords.config_path
    );
    // Private repos answer 404 to anonymous requests, so say so up front
    if token.is_empty() {
        println!("   No token given: only public repositories are reachable");
    }

    store.set(coords);

    // test_connection always goes to GitHub, never the cache
    match registry.test_connection(token).await {
        Ok(count) => {
            println!("✅ Connected: {} model(s) found", count);
            Ok(0)
        }
        Err(e) => {
            // Don't leave broken coordinates active
            store.clear();
            Err(e).context("Connection test failed")
        }
    }
}

// Handles the 'models' subcommand
async fn handle_models(registry: &Registry, token: &str, refresh: bool, json: bool) -> Result<i32> {
    let models = registry.get_models(token, refresh).await?;

    // JSON output: the normalized records as-is, for scripts
    if json {
        println!("{}", serde_json::to_string_pretty(&models)?);
        return Ok(0);
    }

    // A valid but empty registry is not an error
    if models.is_empty() {
        println!("⚠️  The registry has no models");
        return Ok(0);
    }

    // Otherwise a human-readable table
    print_table(&models);
    Ok(0)
}

// Handles the 'show' subcommand
//
// Every lookup goes through get_models(refresh = false); only the first
// one reaches GitHub, the rest are answered by the cache.
async fn handle_show(registry: &Registry, token: &str, ids: &[String], json: bool) -> Result<i32> {
    let mut found = Vec::new();
    let mut missing = 0;

    // Look up each id in order, collecting the ones we find
    for id in ids {
        let models = registry.get_models(token, false).await?;
        match models.into_iter().find(|m| &m.id == id) {
            Some(model) => found.push(model),
            None => {
                eprintln!("❌ model not found: {}", id);
                missing += 1;
            }
        }
    }

    // Found models are printed even when some ids were missing
    if json {
        println!("{}", serde_json::to_string_pretty(&found)?);
    } else {
        for model in &found {
            print_model(model);
        }
    }

    // Exit code 1 if any id was missing
    Ok(if missing > 0 { 1 } else { 0 })
}

// Handles the 'file' subcommand: raw bytes straight to stdout
//
// The fetcher itself answers NotConfigured when no coordinates are active.
async fn handle_file(registry: &Registry, token: &str, path: &str) -> Result<i32> {
    // "/train.py" and "train.py" name the same file
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        bail!("file path required");
    }

    let content = registry.fetch_file_content(token, path).await?;

    // Write bytes, not a String: the file may not be UTF-8

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(&content)
        .context("Failed to write file to stdout")?;
    stdout.flush()?;

    Ok(0)
}

// Prints models as a human-readable table
fn print_table(models: &[ModelRecord]) {
    // Print table header
    println!(
        "{:<24} {:<28} {:<10} {:<12} {:<14} {:<16}",
        "ID", "NAME", "VERSION", "STATUS", "FRAMEWORK", "OWNER"
    );
    println!("{}", "=".repeat(109));

    // One row per model, long values cut to the column width
    for m in models {
        println!(
            "{:<24} {:<28} {:<10} {:<12} {:<14} {:<16}",
            truncate(&m.id, 24),
            truncate(&m.name, 28),
            truncate(&m.version, 10),
            m.status,
            truncate(&m.framework, 14),
            truncate(&m.owner, 16),
        );
    }

    // Count per status, skipping statuses with no models
    println!();
    println!("📊 Summary:");
    for status in [
        ModelStatus::Production,
        ModelStatus::Staging,
        ModelStatus::Development,
        ModelStatus::Archived,
    ] {
        let count = models.iter().filter(|m| m.status == status).count();
        if count > 0 {
            println!("   {}: {}", status, count);
        }
    }
    println!("   📋 Total: {}", models.len());
}

// Prints everything we know about one model
fn print_model(m: &ModelRecord) {
    println!("📦 {} ({})", m.name, m.id);
    println!("   Version:   {}", m.version);
    println!("   Status:    {}", m.status);
    println!("   Framework: {}", m.framework);
    println!("   Owner:     {}", m.owner);
    println!("   Created:   {}", m.created_at);
    println!("   Updated:   {}", m.updated_at);

    // Optional parts are only printed when the config has them
    if let Some(description) = &m.description {
        println!("   {}", description);
    }

    if let Some(metrics) = &m.metrics {
        if let Some(accuracy) = metrics.accuracy {
            println!("   Accuracy:  {}", accuracy);
        }
        if let Some(latency) = metrics.latency {
            println!("   Latency:   {} ms", latency);
        }
    }

    if let Some(files) = &m.files {
        for (label, path) in files.entries() {
            println!("   📄 {}: {}", label, path);
        }
    }

    // Version history, in config order
    for version in m.versions.iter().flatten() {
        println!("   🏷️  {} ({})", version.version, version.created_at);
        if let Some(notes) = &version.notes {
            println!("      {}", notes);
        }
        for dataset in &version.datasets {
            let rows = dataset
                .row_count
                .map(|n| format!(", {} rows", n))
                .unwrap_or_default();
            println!("      🗂️  {} [{}{}]", dataset.name, dataset.file_path, rows);
        }
    }

    println!();
}

// Shortens `s` to at most `width` characters for table display
fn truncate(s: &str, width: usize) -> String {
    // Count characters, not bytes, so multi-byte text is never split
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        s.to_string()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why does run() return Result<i32> instead of calling exit() itself?
//    - std::process::exit skips destructors
//    - Returning lets everything drop normally before main() exits
//
// 2. What is `e.downcast_ref::<RegistryError>()`?
//    - anyhow::Error can hold any error type
//    - downcast_ref checks whether it holds a RegistryError and borrows it
//
// 3. Why `{:#}` when printing the error?
//    - The alternate form prints the whole context chain on one line,
//      e.g. "Connection test failed: invalid GitHub token: Bad credentials"
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a-very-long-model-identifier", 10), "a-very-...");
        // Multi-byte characters are counted, not bytes
        assert_eq!(truncate("ñññññ", 5), "ñññññ");
    }
}
