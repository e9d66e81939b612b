//! Load prompts from a directory of YAML files.
//!
//! **Canonical source**: default prompt text lives in `ramify/prompts/*.yaml`; it is
//! embedded at compile time and used when no `PROMPTS_DIR` or directory is present.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use serde::Deserialize;

use super::{BaselinePromptsFile, Prompts, TotPromptsFile};

const EMBED_TOT: &str = include_str!("../../prompts/tot.yaml");
const EMBED_BASELINE: &str = include_str!("../../prompts/baseline.yaml");

const TOT_FILE: &str = "tot.yaml";
const BASELINE_FILE: &str = "baseline.yaml";

/// Default directory name when `PROMPTS_DIR` is not set.
const DEFAULT_PROMPTS_DIR: &str = "prompts";

static EMBEDDED: Lazy<Prompts> = Lazy::new(default_from_embedded);

pub(super) fn embedded() -> &'static Prompts {
    &EMBEDDED
}

/// Error when loading prompts from a directory (missing dir, invalid YAML).
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("prompts directory not found or not readable: {0}")]
    DirNotFound(String),
    #[error("failed to read prompts file {path}: {message}")]
    ReadFile { path: String, message: String },
    #[error("failed to parse YAML in {path}: {message}")]
    ParseYaml { path: String, message: String },
}

/// `dir` if `Some`, else `PROMPTS_DIR` env, else `./prompts`.
fn prompts_dir(dir: Option<&Path>) -> PathBuf {
    dir.map(PathBuf::from).unwrap_or_else(|| {
        std::env::var("PROMPTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_PROMPTS_DIR))
    })
}

/// Reads and parses one YAML file. A missing file is `Ok(None)`.
fn read_yaml_file<T>(dir: &Path, name: &str) -> Result<Option<T>, LoadError>
where
    T: for<'de> Deserialize<'de>,
{
    let path = dir.join(name);
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(LoadError::ReadFile {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        }
    };
    let value: T = serde_yaml::from_str(&content).map_err(|e| LoadError::ParseYaml {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(Some(value))
}

/// Loads `tot.yaml` and `baseline.yaml` from `dir` (or `PROMPTS_DIR`, or `./prompts`).
///
/// Missing files keep the embedded defaults. Errors only when the directory itself is
/// missing or a present file fails to parse.
pub fn load(dir: Option<&Path>) -> Result<Prompts, LoadError> {
    let base = prompts_dir(dir);
    if !base.is_dir() {
        return Err(LoadError::DirNotFound(base.display().to_string()));
    }
    let tot = read_yaml_file::<TotPromptsFile>(&base, TOT_FILE)?.unwrap_or_default();
    let baseline =
        read_yaml_file::<BaselinePromptsFile>(&base, BASELINE_FILE)?.unwrap_or_default();
    tracing::debug!(dir = %base.display(), "prompts loaded");
    Ok(Prompts { tot, baseline })
}

/// Parses the embedded YAML.
pub fn default_from_embedded() -> Prompts {
    Prompts {
        tot: serde_yaml::from_str(EMBED_TOT).unwrap_or_default(),
        baseline: serde_yaml::from_str(EMBED_BASELINE).unwrap_or_default(),
    }
}

/// [`load`], falling back to the embedded defaults on any error.
///
/// A missing directory is expected and logged at debug; an unreadable or malformed file
/// in an existing directory is logged as a warning before falling back.
pub fn load_or_default(dir: Option<&Path>) -> Prompts {
    match load(dir) {
        Ok(p) => p,
        Err(e @ LoadError::DirNotFound(_)) => {
            tracing::debug!(error = %e, "no prompts dir; using embedded prompts");
            default_from_embedded()
        }
        Err(e) => {
            tracing::warn!(error = %e, "prompt override ignored; using embedded prompts");
            default_from_embedded()
        }
    }
}
