//! Writing, pushing and tagging planned releases.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use git2::Repository;
use semver::Version;
use tracing::{debug, info};

use crate::changelog::{ReleaseLinks, ReleaseNotes, read_changelog, section_for_version, write_changelog};
use crate::config::{Config, LegacyState, determine_tag_format, format_tag};
use crate::error::ReleaseError;
use crate::git::{commit_all, create_branch, create_tag, push, tag_exists};
use crate::github::GitHubClient;
use crate::version::update_manifest_version;

use super::planner::ReleasePlan;

/// Changelog file name inside each library's output directory.
pub const CHANGELOG_FILE: &str = "CHANGELOG.md";

/// Files touched by [`stage_release`].
#[derive(Debug, Default)]
pub struct StagedRelease {
    pub changelogs: Vec<PathBuf>,
    pub manifests: Vec<PathBuf>,
}

/// Apply a plan to the working tree.
///
/// Updates library versions in the configuration file, prepends a section
/// to each library's changelog and bumps the version in its manifest.
pub fn stage_release(
    repo_dir: &Path,
    config_path: &Path,
    config: &mut Config,
    plan: &ReleasePlan,
    date: NaiveDate,
) -> Result<StagedRelease, ReleaseError> {
    plan.apply(config);
    config.write(config_path)?;

    let mut staged = StagedRelease::default();
    for release in &plan.releases {
        let output = repo_dir.join(config.library_output(&release.name));
        let notes = ReleaseNotes::from_commits(&release.changes);
        let links = ReleaseLinks {
            repo: &config.repo,
            tag: &release.tag,
            previous_tag: release.previous_tag.as_deref(),
        };

        let changelog = output.join(CHANGELOG_FILE);
        if write_changelog(&changelog, &notes, &release.next_version, date, &links)? {
            staged.changelogs.push(changelog);
        }
        if let Some(manifest) = update_manifest_version(&output, &release.next_version)? {
            staged.manifests.push(manifest);
        }
        info!(library = %release.name, version = %release.next_version, "Staged release");
    }

    Ok(staged)
}

/// Pull request title for a plan.
pub fn release_title(plan: &ReleasePlan) -> String {
    match plan.releases.as_slice() {
        [single] => format!("chore: release {} {}", single.name, single.next_version),
        _ => "chore: release libraries".to_string(),
    }
}

/// Markdown summary of a plan, used as the pull request body.
pub fn release_summary(plan: &ReleasePlan) -> String {
    let mut body = String::from("Release the following libraries:\n\n");
    for release in &plan.releases {
        body.push_str(&format!(
            "* `{}`: {} -> {} ({} change{})\n",
            release.name,
            release.previous_version,
            release.next_version,
            release.changes.len(),
            if release.changes.len() == 1 { "" } else { "s" }
        ));
    }
    body
}

pub fn release_branch_name(date: NaiveDate) -> String {
    format!("librarian-release-{}", date.format("%Y%m%d"))
}

/// Commit the staged release on a new branch, push it and open a pull
/// request against `base`.
///
/// Returns the pull request number, or `None` when there was nothing to
/// commit.
pub async fn push_release(
    repo_dir: &Path,
    plan: &ReleasePlan,
    client: &dyn GitHubClient,
    base: &str,
    date: NaiveDate,
) -> Result<Option<u64>, ReleaseError> {
    let branch = release_branch_name(date);
    let title = release_title(plan);

    create_branch(repo_dir, &branch)?;
    if !commit_all(repo_dir, &title)? {
        info!("Nothing to commit; no pull request opened");
        return Ok(None);
    }
    push(repo_dir, "origin", &branch)?;

    let number = client
        .create_pull_request(&title, &branch, base, &release_summary(plan))
        .await?;
    Ok(Some(number))
}

/// A released version that has no tag yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTag {
    pub library: String,
    pub version: Version,
    pub tag: String,
}

impl PendingTag {
    /// 0.x versions and pre-releases are published as GitHub pre-releases.
    pub fn is_prerelease(&self) -> bool {
        self.version.major == 0 || !self.version.pre.is_empty()
    }
}

/// Libraries whose current version has not been tagged.
pub fn pending_tags(
    repo: &Repository,
    config: &Config,
    state: &LegacyState,
) -> Result<Vec<PendingTag>, ReleaseError> {
    let mut pending = Vec::new();
    for library in config.effective_libraries() {
        if library.skip_release || library.version.is_empty() {
            continue;
        }
        let Ok(version) = Version::parse(&library.version) else {
            debug!(library = %library.name, version = %library.version, "Unparseable version; not tagging");
            continue;
        };

        let tag_format = determine_tag_format(&library.name, &state.library(&library.name), Some(config));
        let tag = format_tag(&tag_format, &library.name, &library.version);
        if tag_exists(repo, &tag)? {
            continue;
        }
        pending.push(PendingTag {
            library: library.name,
            version,
            tag,
        });
    }
    Ok(pending)
}

/// Create tags (and, with a client, GitHub releases) for pending versions.
///
/// Tags are pushed to `remote` when one is given. Release bodies come from
/// the library's changelog section for the version.
pub async fn tag_releases(
    repo_dir: &Path,
    config: &Config,
    pending: &[PendingTag],
    client: Option<&dyn GitHubClient>,
    remote: Option<&str>,
) -> Result<(), ReleaseError> {
    for entry in pending {
        let title = format!("{} {}", entry.library, entry.version);
        create_tag(repo_dir, &entry.tag, &title)?;
        if let Some(remote) = remote {
            push(repo_dir, remote, &format!("refs/tags/{}", entry.tag))?;
        }
        info!(library = %entry.library, tag = %entry.tag, "Tagged release");

        let Some(client) = client else { continue };
        let changelog = repo_dir
            .join(config.library_output(&entry.library))
            .join(CHANGELOG_FILE);
        let body = read_changelog(&changelog)?
            .and_then(|parsed| section_for_version(&parsed.raw_content, &entry.version))
            .unwrap_or_else(|| format!("Release {}", title));
        client
            .create_release(&entry.tag, &title, &body, entry.is_prerelease())
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Library;
    use crate::conventional::ConventionalCommit;
    use crate::github::client::MockGitHubClient;
    use crate::release::planner::LibraryRelease;
    use crate::version::BumpType;
    use std::collections::BTreeMap;
    use std::process::Command;

    fn git(dir: &Path, args: &[&str]) {
        let status = Command::new("git").arg("-C").arg(dir).args(args).status().unwrap();
        assert!(status.success(), "git {:?} failed", args);
    }

    fn init_repo(dir: &Path) {
        git(dir, &["init", "-q"]);
        git(dir, &["config", "user.name", "Test User"]);
        git(dir, &["config", "user.email", "test@example.com"]);
        git(dir, &["config", "commit.gpgsign", "false"]);
        git(dir, &["config", "tag.gpgsign", "false"]);
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn feat(subject: &str) -> ConventionalCommit {
        ConventionalCommit {
            commit_type: "feat".to_string(),
            scope: None,
            subject: subject.to_string(),
            body: String::new(),
            library_id: "google-cloud-kms-v1".to_string(),
            footers: BTreeMap::new(),
            is_breaking: false,
            is_nested: false,
            commit_hash: "0123456789abcdef".to_string(),
            when: chrono::Utc::now(),
        }
    }

    fn config() -> Config {
        let mut lib = Library::named("google-cloud-kms-v1");
        lib.version = "1.0.0".to_string();
        let mut config = Config {
            repo: "googleapis/google-cloud-rust".to_string(),
            libraries: vec![lib],
            ..Config::default()
        };
        config.default.output = "src/generated".to_string();
        config.default.tag_format = "{id}-v{version}".to_string();
        config
    }

    fn plan() -> ReleasePlan {
        ReleasePlan {
            releases: vec![LibraryRelease {
                name: "google-cloud-kms-v1".to_string(),
                previous_version: Version::new(1, 0, 0),
                next_version: Version::new(1, 1, 0),
                bump: BumpType::Minor,
                tag: "google-cloud-kms-v1-v1.1.0".to_string(),
                previous_tag: Some("google-cloud-kms-v1-v1.0.0".to_string()),
                changes: vec![feat("add key rotation")],
            }],
        }
    }

    #[test]
    fn test_stage_release_writes_config_changelog_and_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let lib_dir = dir.path().join("src/generated/google-cloud-kms-v1");
        std::fs::create_dir_all(&lib_dir).unwrap();
        std::fs::write(
            lib_dir.join("Cargo.toml"),
            "[package]\nname = \"google-cloud-kms-v1\"\nversion = \"1.0.0\"\n",
        )
        .unwrap();
        let config_path = dir.path().join("librarian.yaml");
        let mut config = config();

        let staged = stage_release(dir.path(), &config_path, &mut config, &plan(), date()).unwrap();

        assert_eq!(staged.changelogs, vec![lib_dir.join(CHANGELOG_FILE)]);
        assert_eq!(staged.manifests, vec![lib_dir.join("Cargo.toml")]);
        let written = Config::read(&config_path).unwrap();
        assert_eq!(written.library("google-cloud-kms-v1").unwrap().version, "1.1.0");
        let changelog = std::fs::read_to_string(lib_dir.join(CHANGELOG_FILE)).unwrap();
        assert!(changelog.contains("compare/google-cloud-kms-v1-v1.0.0...google-cloud-kms-v1-v1.1.0"));
        assert!(changelog.contains("* add key rotation"));
        let manifest = std::fs::read_to_string(lib_dir.join("Cargo.toml")).unwrap();
        assert!(manifest.contains("version = \"1.1.0\""));
    }

    #[test]
    fn test_release_title_and_summary() {
        let plan = plan();
        assert_eq!(release_title(&plan), "chore: release google-cloud-kms-v1 1.1.0");
        assert!(release_summary(&plan).contains("* `google-cloud-kms-v1`: 1.0.0 -> 1.1.0 (1 change)"));
        assert_eq!(release_title(&ReleasePlan::default()), "chore: release libraries");
    }

    #[tokio::test]
    async fn test_push_release_opens_pull_request() {
        let remote = tempfile::tempdir().unwrap();
        git(remote.path(), &["init", "-q", "--bare"]);
        let work = tempfile::tempdir().unwrap();
        init_repo(work.path());
        std::fs::write(work.path().join("README.md"), "readme\n").unwrap();
        git(work.path(), &["add", "--all"]);
        git(work.path(), &["commit", "-q", "-m", "chore: initial"]);
        git(work.path(), &["remote", "add", "origin", &remote.path().display().to_string()]);
        std::fs::write(work.path().join("librarian.yaml"), "repo: a/b\n").unwrap();

        let mut client = MockGitHubClient::new();
        client
            .expect_create_pull_request()
            .withf(|title, head, base, body| {
                title.to_string() == "chore: release google-cloud-kms-v1 1.1.0"
                    && head.to_string() == "librarian-release-20240101"
                    && base.to_string() == "main"
                    && body.contains("google-cloud-kms-v1")
            })
            .times(1)
            .returning(|_, _, _, _| Ok(42));

        let number = push_release(work.path(), &plan(), &client, "main", date())
            .await
            .unwrap();
        assert_eq!(number, Some(42));
    }

    #[tokio::test]
    async fn test_tag_releases_creates_tags_and_releases() {
        let work = tempfile::tempdir().unwrap();
        init_repo(work.path());
        let lib_dir = work.path().join("src/generated/google-cloud-kms-v1");
        std::fs::create_dir_all(&lib_dir).unwrap();
        std::fs::write(
            lib_dir.join(CHANGELOG_FILE),
            "# Changelog\n\n## [1.0.0](https://x) (2024-01-01)\n\n### Features\n\n* first\n",
        )
        .unwrap();
        git(work.path(), &["add", "--all"]);
        git(work.path(), &["commit", "-q", "-m", "chore: release"]);

        let config = config();
        let repo = Repository::open(work.path()).unwrap();
        let pending = pending_tags(&repo, &config, &LegacyState::default()).unwrap();
        assert_eq!(
            pending,
            vec![PendingTag {
                library: "google-cloud-kms-v1".to_string(),
                version: Version::new(1, 0, 0),
                tag: "google-cloud-kms-v1-v1.0.0".to_string(),
            }]
        );

        let mut client = MockGitHubClient::new();
        client
            .expect_create_release()
            .withf(|tag, name, body, prerelease| {
                tag.to_string() == "google-cloud-kms-v1-v1.0.0"
                    && name.to_string() == "google-cloud-kms-v1 1.0.0"
                    && body.contains("* first")
                    && !*prerelease
            })
            .times(1)
            .returning(|_, _, _, _| Ok(()));

        tag_releases(work.path(), &config, &pending, Some(&client as &dyn GitHubClient), None)
            .await
            .unwrap();

        assert!(tag_exists(&repo, "google-cloud-kms-v1-v1.0.0").unwrap());
        assert!(pending_tags(&repo, &config, &LegacyState::default()).unwrap().is_empty());
    }

    #[test]
    fn test_prerelease_detection() {
        let tag = |v: &str| PendingTag {
            library: "x".into(),
            version: Version::parse(v).unwrap(),
            tag: String::new(),
        };
        assert!(tag("0.3.0").is_prerelease());
        assert!(tag("1.0.0-rc.1").is_prerelease());
        assert!(!tag("1.0.0").is_prerelease());
    }
}
