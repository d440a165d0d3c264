// src/github/fetch.rs
// =============================================================================
// This module fetches single files from the configured GitHub repository.
//
// Strategy:
// - Read the active owner/repo/branch from the RepoStore
// - GET {base}/repos/{owner}/{repo}/contents/{path}?ref={branch}
// - Send the bearer token only when we have one (public repos work without)
// - base64-decode the `content` field of the JSON reply
//
// One request per call, no retries. A 15 second timeout is baked into the
// client; hitting it surfaces as an Upstream error.
//
// Rust concepts:
// - async_trait: lets a trait have async methods
// - Arc: shared ownership of the RepoStore across components
// - match on status codes: turning HTTP failures into typed errors
// =============================================================================

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::{header, Client, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::{RegistryError, Result};
use crate::repo::RepoStore;

// Public GitHub; override with --api-url for GitHub Enterprise
pub const DEFAULT_API_URL: &str = "https://api.github.com";

// Whole-request limit: connect + send + read the body
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

// GitHub rejects API requests that carry no User-Agent
const USER_AGENT: &str = concat!("model-registry/", env!("CARGO_PKG_VERSION"));

// Anything that can hand back the raw bytes of a file in the active repo
//
// ContentFetcher is the real one; the cache tests plug in an in-memory fake.
#[async_trait]
pub trait ContentSource: Send + Sync {
    // Fetches `path` from the active repository
    // An empty `token` means anonymous access
    async fn fetch(&self, token: &str, path: &str) -> Result<Vec<u8>>;
}

// The success body of the contents endpoint (only the field we need)
#[derive(Debug, Deserialize)]
struct ContentsResponse {
    #[serde(default)]
    content: String,
}

// GitHub's error body: {"message": "...", "documentation_url": "..."}
#[derive(Debug, Default, Deserialize)]
struct GitHubErrorBody {
    #[serde(default)]
    message: String,
}

// Talks to the GitHub contents API
pub struct ContentFetcher {
    // One client for every request (reuses connections)
    client: Client,
    // Read on every fetch, so new coordinates apply immediately
    store: Arc<RepoStore>,
    // API root without a trailing slash
    base_url: String,
}

impl ContentFetcher {
    // Creates a fetcher talking to `base_url` (api.github.com, a GitHub
    // Enterprise host, or a local stub)
    pub fn new(store: Arc<RepoStore>, base_url: &str) -> anyhow::Result<Self> {
        // Fail at startup rather than on the first request
        Url::parse(base_url).with_context(|| format!("Invalid GitHub API URL '{}'", base_url))?;

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            store,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ContentSource for ContentFetcher {
    async fn fetch(&self, token: &str, path: &str) -> Result<Vec<u8>> {
        // Step 1: where are we reading from?
        let coords = self.store.get().ok_or(RegistryError::NotConfigured)?;

        // Step 2: build the request
        // The branch goes in the query string as ?ref=<branch>
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.base_url,
            coords.owner,
            coords.repo,
            path.trim_start_matches('/')
        );

        let mut request = self
            .client
            .get(&url)
            .query(&[("ref", coords.branch.as_str())])
            .header(header::ACCEPT, GITHUB_ACCEPT);

        // Anonymous requests carry no Authorization header at all
        if token.is_empty() {
            debug!(%url, branch = %coords.branch, "GET (no token)");
        } else {
            debug!(%url, branch = %coords.branch, token = %token_prefix(token), "GET");
            request = request.bearer_auth(token);
        }

        // Step 3: send it
        // Transport failures and timeouts convert via From<reqwest::Error>
        let response = request.send().await?;
        let status = response.status();

        // Step 4: anything but 200 becomes a typed error
        if status != StatusCode::OK {
            let message = upstream_message(response).await;
            debug!(status = status.as_u16(), %message, "GitHub returned an error");
            return Err(map_upstream_error(
                status.as_u16(),
                &message,
                !token.is_empty(),
                path,
            ));
        }

        // Step 5: pull `content` out of the JSON and decode it
        let body: ContentsResponse = response.json().await.map_err(|e| {
            RegistryError::Upstream(format!("failed to parse GitHub response: {}", e))
        })?;

        decode_content(&body.content)
    }
}

// First 8 characters of the token, enough to tell tokens apart in logs
fn token_prefix(token: &str) -> String {
    let prefix: String = token.chars().take(8).collect();
    format!("{}...", prefix)
}

// Reads GitHub's `message` field; an unreadable body gives an empty message
async fn upstream_message(response: Response) -> String {
    response
        .json::<GitHubErrorBody>()
        .await
        .unwrap_or_default()
        .message
}

// Maps a non-200 status to the matching RegistryError
//
//   404 -> NotFound (wording depends on whether we sent a token)
//   401 -> InvalidToken
//   403 -> AccessDenied
//   *   -> Upstream with the status code
fn map_upstream_error(status: u16, message: &str, has_token: bool, path: &str) -> RegistryError {
    match status {
        404 if !has_token => RegistryError::NotFound(format!(
            "file not found: {} (no auth token; if this is a private repo, sign in first)",
            path
        )),
        404 => RegistryError::NotFound(format!(
            "not found: {} (GitHub says: {}; check repo name, branch, and that your token has 'repo' scope)",
            path, message
        )),
        401 => RegistryError::InvalidToken(message.to_string()),
        403 => RegistryError::AccessDenied(message.to_string()),
        _ => RegistryError::upstream_status(status, message),
    }
}

// Decodes GitHub's base64 payload
//
// GitHub wraps the encoded content at 60 columns, so the first attempt
// usually fails on the newlines; strip them and try once more.
fn decode_content(content: &str) -> Result<Vec<u8>> {
    match STANDARD.decode(content) {
        Ok(bytes) => Ok(bytes),
        Err(_) => {
            // Second and last attempt: same text without line breaks
            let cleaned: String = content
                .chars()
                .filter(|c| *c != '\n' && *c != '\r')
                .collect();
            STANDARD
                .decode(cleaned)
                .map_err(|e| RegistryError::Decode(e.to_string()))
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a trait (ContentSource) in front of the HTTP client?
//    - The cache only needs "give me the bytes of this path"
//    - Tests can implement the trait with an in-memory fake and count calls
//    - #[async_trait] rewrites `async fn` into a boxed future so the trait
//      can be used as a generic bound
//
// 2. What does `self.store.get().ok_or(...)?` do?
//    - store.get() returns Option<RepoCoordinates>
//    - ok_or turns None into Err(RegistryError::NotConfigured)
//    - ? returns that error early, or unwraps the coordinates
//
// 3. Why does `request.send().await?` work with RegistryError?
//    - send() fails with reqwest::Error
//    - error.rs has `impl From<reqwest::Error> for RegistryError`
//    - ? calls that conversion automatically
//
// 4. What is `404 if !has_token =>`?
//    - A match guard: the arm only matches when the condition is true
//    - Arms are tried top to bottom, so the guarded 404 comes first
// -----------------------------------------------------------------------------
