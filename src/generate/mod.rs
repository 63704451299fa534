//! Driving an external code generator over configured libraries.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{Config, Library};
use crate::error::GenerateError;
use crate::fetch::SourceCache;

/// Remove everything below `dir` except the relative paths in `keep`.
///
/// Directories that contain a kept path are descended into rather than
/// removed. A missing `dir` is not an error.
pub fn clean_output(dir: &Path, keep: &[String]) -> Result<(), GenerateError> {
    if !dir.exists() {
        return Ok(());
    }
    let keep: HashSet<PathBuf> = keep
        .iter()
        .map(|k| PathBuf::from(k.trim_end_matches('/')))
        .collect();
    clean_dir(dir, Path::new(""), &keep)
}

fn clean_dir(root: &Path, relative: &Path, keep: &HashSet<PathBuf>) -> Result<(), GenerateError> {
    let dir = root.join(relative);
    let clean_err = |source: std::io::Error| GenerateError::Clean {
        path: dir.clone(),
        source,
    };

    for entry in std::fs::read_dir(&dir).map_err(clean_err)? {
        let entry = entry.map_err(clean_err)?;
        let rel = relative.join(entry.file_name());
        if keep.contains(&rel) {
            debug!(path = %rel.display(), "Keeping");
            continue;
        }

        let path = entry.path();
        let is_dir = entry.file_type().map_err(clean_err)?.is_dir();
        if is_dir && keep.iter().any(|k| k.starts_with(&rel)) {
            clean_dir(root, &rel, keep)?;
        } else if is_dir {
            std::fs::remove_dir_all(&path).map_err(clean_err)?;
        } else {
            std::fs::remove_file(&path).map_err(clean_err)?;
        }
    }
    Ok(())
}

/// Run `program` to generate one library.
///
/// The generator receives the library through the environment:
/// `LIBRARIAN_LIBRARY`, `LIBRARIAN_OUTPUT` and `LIBRARIAN_SOURCE`, plus
/// `LIBRARIAN_CHANNELS` with the channel paths separated by commas.
pub async fn run_generator(
    program: &str,
    args: &[String],
    library: &Library,
    output: &Path,
    source_dir: &Path,
) -> Result<(), GenerateError> {
    let channels = library
        .channels
        .iter()
        .map(|c| c.path.as_str())
        .collect::<Vec<_>>()
        .join(",");

    debug!(library = %library.name, program, ?args, "Running generator");
    let status = Command::new(program)
        .args(args)
        .env("LIBRARIAN_LIBRARY", &library.name)
        .env("LIBRARIAN_OUTPUT", output)
        .env("LIBRARIAN_SOURCE", source_dir)
        .env("LIBRARIAN_CHANNELS", channels)
        .stdin(Stdio::null())
        .status()
        .await
        .map_err(GenerateError::SpawnFailed)?;

    if !status.success() {
        return Err(GenerateError::NonZeroExit {
            library: library.name.clone(),
            code: status.code(),
        });
    }
    Ok(())
}

/// Options for [`generate_libraries`].
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Only generate this library.
    pub library: Option<String>,
    pub program: String,
    pub args: Vec<String>,
}

/// Clean and regenerate libraries one at a time.
///
/// Libraries marked `skip_generate` are left alone. Returns the names of the
/// libraries that were generated.
pub async fn generate_libraries(
    config: &Config,
    options: &GenerateOptions,
    cache: &SourceCache,
    cancel: &CancellationToken,
) -> Result<Vec<String>, GenerateError> {
    which::which(&options.program)
        .map_err(|_| GenerateError::GeneratorNotFound(options.program.clone()))?;

    let libraries: Vec<Library> = match &options.library {
        Some(name) => vec![config.effective_library(name)],
        None => config.effective_libraries(),
    };

    let mut source_dir: Option<PathBuf> = None;
    let mut generated = Vec::new();
    for library in libraries {
        if library.skip_generate {
            info!(library = %library.name, "Skipping generation (skip_generate)");
            continue;
        }
        if cancel.is_cancelled() {
            warn!("Generation cancelled");
            break;
        }

        let source = match &source_dir {
            Some(dir) => dir.clone(),
            None => {
                let dir = cache.resolve_named(&config.sources, "googleapis", cancel).await?;
                source_dir = Some(dir.clone());
                dir
            }
        };

        let output = config.library_output(&library.name);
        clean_output(&output, &library.keep)?;
        std::fs::create_dir_all(&output).map_err(|source| GenerateError::Clean {
            path: output.clone(),
            source,
        })?;
        run_generator(&options.program, &options.args, &library, &output, &source).await?;
        info!(library = %library.name, output = %output.display(), "Generated");
        generated.push(library.name);
    }

    Ok(generated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Channel, Source, Sources};

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_clean_output_keeps_listed_paths() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("Cargo.toml"));
        touch(&root.join("README.md"));
        touch(&root.join("src/model.rs"));
        touch(&root.join("src/lib.rs"));
        touch(&root.join("src/generated/stub.rs"));
        touch(&root.join("tests/driver.rs"));

        clean_output(
            root,
            &["Cargo.toml".to_string(), "src/lib.rs".to_string(), "tests/".to_string()],
        )
        .unwrap();

        assert!(root.join("Cargo.toml").exists());
        assert!(root.join("src/lib.rs").exists());
        assert!(root.join("tests/driver.rs").exists());
        assert!(!root.join("README.md").exists());
        assert!(!root.join("src/model.rs").exists());
        assert!(!root.join("src/generated").exists());
    }

    #[test]
    fn test_clean_missing_output_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        clean_output(&dir.path().join("missing"), &[]).unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_generator_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let library = Library::named("google-cloud-kms-v1");
        let err = run_generator("false", &[], &library, dir.path(), dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::NonZeroExit { code: Some(1), .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_generate_libraries_skips_and_passes_environment() {
        let work = tempfile::tempdir().unwrap();
        let source = work.path().join("googleapis");
        std::fs::create_dir_all(&source).unwrap();
        let out = work.path().join("out");

        let mut kms = Library::named("google-cloud-kms-v1");
        kms.channels.push(Channel::new("google/cloud/kms/v1"));
        kms.keep.push("Cargo.toml".to_string());
        let mut skipped = Library::named("google-cloud-skipped");
        skipped.skip_generate = true;

        let mut config = Config {
            libraries: vec![kms, skipped],
            sources: Sources {
                googleapis: Some(Source {
                    dir: source.display().to_string(),
                    ..Source::default()
                }),
                discovery: None,
            },
            ..Config::default()
        };
        config.default.output = out.display().to_string();

        let kms_dir = out.join("google-cloud-kms-v1");
        touch(&kms_dir.join("Cargo.toml"));
        touch(&kms_dir.join("src/stale.rs"));

        let options = GenerateOptions {
            library: None,
            program: "sh".to_string(),
            args: vec![
                "-c".to_string(),
                "echo \"$LIBRARIAN_CHANNELS\" > \"$LIBRARIAN_OUTPUT/channels.txt\"".to_string(),
            ],
        };
        let generated = generate_libraries(
            &config,
            &options,
            &SourceCache::new(work.path().join("cache")),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(generated, vec!["google-cloud-kms-v1".to_string()]);
        assert!(kms_dir.join("Cargo.toml").exists());
        assert!(!kms_dir.join("src/stale.rs").exists());
        assert_eq!(
            std::fs::read_to_string(kms_dir.join("channels.txt")).unwrap().trim(),
            "google/cloud/kms/v1"
        );
        assert!(!out.join("google-cloud-skipped").exists());
    }

    #[tokio::test]
    async fn test_missing_generator() {
        let options = GenerateOptions {
            program: "librarian-no-such-generator".to_string(),
            ..GenerateOptions::default()
        };
        let err = generate_libraries(
            &Config::default(),
            &options,
            &SourceCache::new("/nonexistent"),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GenerateError::GeneratorNotFound(_)));
    }
}
