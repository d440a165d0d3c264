// src/repo/coords.rs
// =============================================================================
// Repository coordinates: which repo, which branch, which config file.
//
// The caller fills in owner and repo; branch and config path fall back to
// "main" and "models.yaml" when left empty. The coordinates also produce the
// cache key, so switching any of the four fields makes cached models stale.
//
// Rust concepts:
// - Option<String>: "maybe the caller gave us a value"
// - url::Url: parsing GitHub URLs instead of splitting strings by hand
// =============================================================================

use anyhow::{anyhow, bail, Result};
use serde::Serialize;
use url::Url;

// Used when no branch / config path is given (or an empty one is)
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_CONFIG_PATH: &str = "models.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoCoordinates {
    // e.g. "acme" in github.com/acme/ml-registry
    pub owner: String,
    pub repo: String,
    pub branch: String,
    // Path of the registry file inside the repo, e.g. "models.yaml"
    pub config_path: String,
}

impl RepoCoordinates {
    // Builds coordinates, applying the branch/config path defaults
    //
    // owner and repo are taken as given; checking that they are
    // non-empty is the caller's job.
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: Option<String>,
        config_path: Option<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: non_empty_or(branch, DEFAULT_BRANCH),
            config_path: non_empty_or(config_path, DEFAULT_CONFIG_PATH),
        }
    }

    // Builds coordinates from a GitHub repository URL
    //
    // Supported formats:
    //   - https://github.com/owner/repo
    //   - https://github.com/owner/repo.git
    //   - github.com/owner/repo
    //   - https://github.com/owner/repo/tree/dev  (extra segments ignored)
    pub fn from_github_url(
        repo_url: &str,
        branch: Option<String>,
        config_path: Option<String>,
    ) -> Result<Self> {
        let trimmed = repo_url.trim();

        // Url::parse needs a scheme
        let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("https://{}", trimmed)
        };

        let parsed = Url::parse(&with_scheme)
            .map_err(|e| anyhow!("Invalid GitHub URL '{}': {}", repo_url, e))?;

        // Only github.com itself; Enterprise hosts go through --owner/--repo
        match parsed.host_str() {
            Some("github.com") | Some("www.github.com") => {}
            _ => bail!("Not a GitHub URL: {}", repo_url),
        }

        // "/acme/ml-registry/" -> ["acme", "ml-registry"]
        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|parts| parts.filter(|p| !p.is_empty()).collect())
            .unwrap_or_default();

        if segments.len() < 2 {
            bail!("Invalid GitHub URL format: {}", repo_url);
        }

        let owner = segments[0];
        // Remove .git suffix if present
        let repo = segments[1].trim_end_matches(".git");

        Ok(Self::new(owner, repo, branch, config_path))
    }

    // Deterministic key over all four fields
    pub fn cache_key(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.owner, self.repo, self.branch, self.config_path
        )
    }
}

// Some("") counts as missing
fn non_empty_or(value: Option<String>, fallback: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => fallback.to_string(),
    }
}
