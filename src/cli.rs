// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Global options say WHERE the registry lives (owner/repo or a GitHub URL,
// branch, config path) and HOW to reach it (token, API base URL). Every one
// of them can also come from an environment variable, so CI jobs can set
// them once.
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - Enums: Types that can be one of several variants
// - Derive macros: Automatically generate code for our types
// =============================================================================

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};

use crate::github::DEFAULT_API_URL;
use crate::repo::RepoCoordinates;

#[derive(Parser, Debug)]
#[command(
    name = "model-registry",
    version,
    about = "Browse an ML model registry stored in a GitHub repository",
    long_about = "model-registry reads a models.yaml / models.json file from a GitHub repository \
                  and shows the models it describes. It can also print any file from the repo, \
                  such as a training script or model card."
)]
pub struct Cli {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// GitHub token (only needed for private repositories)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true, default_value = "")]
    pub token: String,

    /// GitHub API base URL (change for GitHub Enterprise)
    #[arg(long, env = "GITHUB_API_URL", global = true, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

// Where the registry lives
#[derive(Args, Debug)]
pub struct RepoArgs {
    /// Repository owner (user or organization)
    #[arg(long, env = "MODEL_REGISTRY_OWNER", global = true)]
    pub owner: Option<String>,

    /// Repository name
    #[arg(long, env = "MODEL_REGISTRY_REPO", global = true)]
    pub repo: Option<String>,

    /// Repository URL, instead of --owner and --repo
    ///
    /// Example: --repo-url https://github.com/acme/ml-registry
    #[arg(long, env = "MODEL_REGISTRY_URL", global = true, conflicts_with_all = ["owner", "repo"])]
    pub repo_url: Option<String>,

    /// Branch to read from (default: main)
    #[arg(long, env = "MODEL_REGISTRY_BRANCH", global = true)]
    pub branch: Option<String>,

    /// Path of the registry config file (default: models.yaml)
    #[arg(long, env = "MODEL_REGISTRY_CONFIG", global = true)]
    pub config_path: Option<String>,
}

impl RepoArgs {
    // Turns the flags into coordinates, checking owner/repo are present
    pub fn coordinates(&self) -> Result<RepoCoordinates> {
        if let Some(url) = &self.repo_url {
            return RepoCoordinates::from_github_url(
                url,
                self.branch.clone(),
                self.config_path.clone(),
            );
        }

        let owner = self.owner.as_deref().unwrap_or("").trim();
        let repo = self.repo.as_deref().unwrap_or("").trim();
        if owner.is_empty() || repo.is_empty() {
            bail!("repoOwner and repoName are required (use --owner and --repo, or --repo-url)");
        }

        Ok(RepoCoordinates::new(
            owner,
            repo,
            self.branch.clone(),
            self.config_path.clone(),
        ))
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every model in the registry
    ///
    /// Example: model-registry --owner acme --repo ml-registry models
    Models {
        /// Skip the cache and fetch the config file again
        #[arg(long)]
        refresh: bool,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one or more models by id
    ///
    /// Example: model-registry show fraud-detector churn-model
    Show {
        /// Model ids to look up
        #[arg(required = true)]
        ids: Vec<String>,

        /// Output results in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Print a file from the repository, byte for byte
    ///
    /// Example: model-registry file src/train.py
    File {
        /// Path of the file inside the repository
        path: String,
    },

    /// Check that the registry can be fetched and parsed
    Test,
}
