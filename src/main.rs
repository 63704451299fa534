//! librarian - CLI entry point.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use git2::Repository;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use librarian::changelog::ReleaseNotes;
use librarian::changelog::writer::{ReleaseLinks, format_version_section};
use librarian::config::{CONFIG_FILE, Config, LEGACY_STATE_FILE, LegacyState, derive_library_name};
use librarian::conventional::{RawCommit, parse_commit};
use librarian::fetch::SourceCache;
use librarian::generate::{GenerateOptions, generate_libraries};
use librarian::github::{GitHubClient, OctocrabClient, get_github_token};
use librarian::logging::init_logging;
use librarian::release::{
    ReleasePlan, collect_library_commits, pending_tags, plan_release, push_release, stage_release,
    tag_releases,
};

/// Configure, version and release generated client libraries.
#[derive(Parser, Debug)]
#[command(name = "librarian")]
#[command(about = "Configure, version and release generated client libraries")]
#[command(version)]
struct Cli {
    /// Show debug logs (overridden by LIBRARIAN_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the configuration for duplicate libraries and channels
    Validate {
        #[arg(long, default_value = CONFIG_FILE)]
        config: PathBuf,
    },

    /// Rewrite the configuration in canonical order
    Format {
        #[arg(long, default_value = CONFIG_FILE)]
        config: PathBuf,
    },

    /// Print the library name for an API path, e.g. google/cloud/kms/v1
    DeriveName { api_path: String },

    /// Parse a commit message and print the change records as JSON
    ParseCommit {
        /// Library id for records without an explicit [id]
        #[arg(long, default_value = "")]
        library: String,

        /// Commit hash to attach to the records
        #[arg(long, default_value = "")]
        hash: String,

        /// Read the message from a file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Plan and stage releases for libraries with new commits
    Release {
        #[arg(long, default_value = CONFIG_FILE)]
        config: PathBuf,

        #[arg(long, default_value = LEGACY_STATE_FILE)]
        state: PathBuf,

        /// Only release this library
        #[arg(long)]
        library: Option<String>,

        /// Print the plan without changing any files
        #[arg(long)]
        dry_run: bool,

        /// Commit on a release branch, push it and open a pull request
        #[arg(long, conflicts_with = "dry_run")]
        push: bool,

        /// Base branch for the pull request
        #[arg(long, default_value = "main")]
        base: String,
    },

    /// Tag released versions and create GitHub releases
    Tag {
        #[arg(long, default_value = CONFIG_FILE)]
        config: PathBuf,

        #[arg(long, default_value = LEGACY_STATE_FILE)]
        state: PathBuf,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Only create local tags; do not push or create GitHub releases
        #[arg(long)]
        local: bool,
    },

    /// Regenerate libraries with an external generator
    Generate {
        #[arg(long, default_value = CONFIG_FILE)]
        config: PathBuf,

        /// Only generate this library
        #[arg(long)]
        library: Option<String>,

        /// Generator program to run for each library
        #[arg(long)]
        generator: String,

        /// Arguments passed to the generator
        #[arg(last = true)]
        args: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose).context("Failed to initialize logging")?;

    match cli.command {
        Command::Validate { config } => {
            Config::read(&config)
                .with_context(|| format!("Invalid configuration {}", config.display()))?;
            println!("✓ {} is valid", config.display());
        }
        Command::Format { config: path } => {
            let config = Config::read(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            config
                .write(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        Command::DeriveName { api_path } => println!("{}", derive_library_name(&api_path)),
        Command::ParseCommit {
            library,
            hash,
            file,
        } => parse_commit_command(&library, &hash, file.as_deref())?,
        Command::Release {
            config,
            state,
            library,
            dry_run,
            push,
            base,
        } => release_command(&config, &state, library.as_deref(), dry_run, push, &base).await?,
        Command::Tag {
            config,
            state,
            yes,
            local,
        } => tag_command(&config, &state, yes, local).await?,
        Command::Generate {
            config,
            library,
            generator,
            args,
        } => {
            let config = Config::read(&config)
                .with_context(|| format!("Failed to read {}", config.display()))?;
            let options = GenerateOptions {
                library,
                program: generator,
                args,
            };
            let cancel = cancel_on_ctrl_c();
            let generated = generate_libraries(&config, &options, &SourceCache::from_env(), &cancel)
                .await
                .context("Generation failed")?;
            println!("✓ Generated {} libraries", generated.len());
        }
    }

    Ok(())
}

fn parse_commit_command(library: &str, hash: &str, file: Option<&Path>) -> Result<()> {
    let message = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read commit message from stdin")?;
            buf
        }
    };

    let raw = RawCommit::new(message, hash, Utc::now());
    let records = parse_commit(&raw, library).context("Failed to parse commit message")?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

async fn release_command(
    config_path: &Path,
    state_path: &Path,
    library: Option<&str>,
    dry_run: bool,
    push: bool,
    base: &str,
) -> Result<()> {
    let mut config = Config::read(config_path)
        .with_context(|| format!("Failed to read {}", config_path.display()))?;
    let state = LegacyState::read_optional(state_path)
        .with_context(|| format!("Failed to read {}", state_path.display()))?;
    let repo = Repository::discover(".")
        .context("Not a git repository. Run librarian from within a git repository.")?;
    let repo_dir = repo
        .workdir()
        .context("Repository has no working directory")?
        .to_path_buf();

    let commits = collect_library_commits(&repo, &config, &state)
        .context("Failed to collect commits")?;
    let mut plan = plan_release(&config, &state, &commits);
    if let Some(name) = library {
        plan.releases.retain(|r| r.name == name);
    }

    if plan.is_empty() {
        println!("No libraries have changes to release.");
        return Ok(());
    }

    let today = Utc::now().date_naive();
    if dry_run {
        print_plan(&plan, &config.repo);
        return Ok(());
    }

    let staged = stage_release(&repo_dir, config_path, &mut config, &plan, today)
        .context("Failed to stage release")?;
    for release in &plan.releases {
        println!(
            "✓ {} {} -> {}",
            release.name, release.previous_version, release.next_version
        );
    }
    println!(
        "Updated {} changelogs and {} manifests",
        staged.changelogs.len(),
        staged.manifests.len()
    );

    if push {
        let client = github_client(&config)?;
        match push_release(&repo_dir, &plan, &client, base, today)
            .await
            .context("Failed to publish release branch")?
        {
            Some(number) => println!("✓ Opened pull request #{}", number),
            None => println!("Nothing to commit; no pull request opened."),
        }
    }

    Ok(())
}

async fn tag_command(config_path: &Path, state_path: &Path, yes: bool, local: bool) -> Result<()> {
    let config = Config::read(config_path)
        .with_context(|| format!("Failed to read {}", config_path.display()))?;
    let state = LegacyState::read_optional(state_path)
        .with_context(|| format!("Failed to read {}", state_path.display()))?;
    let repo = Repository::discover(".")
        .context("Not a git repository. Run librarian from within a git repository.")?;
    let repo_dir = repo
        .workdir()
        .context("Repository has no working directory")?
        .to_path_buf();

    let pending = pending_tags(&repo, &config, &state).context("Failed to list tags")?;
    if pending.is_empty() {
        println!("All released versions are tagged.");
        return Ok(());
    }

    println!("Tags to create:");
    for entry in &pending {
        println!("  {}", entry.tag);
    }
    if !yes {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!("Create {} tags?", pending.len()))
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;
        if !confirmed {
            bail!("Tagging cancelled");
        }
    }

    if local {
        tag_releases(&repo_dir, &config, &pending, None, None).await?;
    } else {
        let client = github_client(&config)?;
        tag_releases(
            &repo_dir,
            &config,
            &pending,
            Some(&client as &dyn GitHubClient),
            Some("origin"),
        )
        .await?;
    }
    println!("✓ Created {} tags", pending.len());
    Ok(())
}

fn github_client(config: &Config) -> Result<OctocrabClient> {
    if config.repo.is_empty() {
        bail!("Configuration has no 'repo' entry; cannot reach GitHub");
    }
    let token = get_github_token().context("GitHub authentication required")?;
    OctocrabClient::new(&token, &config.repo).context("Failed to create GitHub client")
}

fn print_plan(plan: &ReleasePlan, repo: &str) {
    let today = Utc::now().date_naive();
    println!("\n--- Dry Run Output ---\n");
    for release in &plan.releases {
        println!(
            "{}: {} -> {} ({})",
            release.name, release.previous_version, release.next_version, release.tag
        );
        let links = ReleaseLinks {
            repo,
            tag: &release.tag,
            previous_tag: release.previous_tag.as_deref(),
        };
        let notes = ReleaseNotes::from_commits(&release.changes);
        if notes.is_empty() {
            warn!(library = %release.name, "No changelog entries for release");
        }
        println!("{}", format_version_section(&release.next_version, today, &notes, &links));
    }
}

fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });
    cancel
}
