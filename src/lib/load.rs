//! Env file loading functionality.
//!
//! This module reads one or more env files from disk, parses each one, and
//! merges the results into an environment-like target.
//!
//! # Load Logic
//!
//! The load process:
//! 1. Resolves the configured paths, defaulting to `.env` in the current
//!    working directory
//! 2. Parses each file in order and accumulates the results, with later
//!    files winning on shared keys
//! 3. Merges the accumulated mapping into the target, where existing keys
//!    are kept unless overriding was requested
//!
//! Parsing is tolerant and never fails; an unreadable file is the only
//! error this module reports.
//!
//! # Examples
//!
//! ```rust,no_run
//! use env_seed::env::EnvTarget;
//! use env_seed::load::{EnvLoad, EnvLoadOptions};
//! use std::path::PathBuf;
//!
//! let options = EnvLoadOptions {
//!   paths: vec![PathBuf::from(".env"), PathBuf::from(".env.local")],
//!   override_existing: false,
//! };
//!
//! let mut target = EnvTarget::memory();
//! EnvLoad::load_into(&mut target, &options).unwrap();
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

#[cfg(feature = "tracing")]
use tracing::{debug, info};

use crate::env::EnvTarget;
use crate::merge::{MergeOptions, merge};
use crate::parse::ParsedEnv;

const DEFAULT_FILENAME: &str = ".env";

/// Main loading service for env files.
pub struct EnvLoad;

impl EnvLoad {
  /// Load the configured files into the process environment.
  ///
  /// # Safety
  ///
  /// Mutates the process environment; the caller must guarantee no
  /// concurrent process-environment access, see [`EnvTarget::process`].
  pub unsafe fn load_with_options(options: EnvLoadOptions) -> Result<LoadResult, EnvLoadError> {
    let mut target = unsafe { EnvTarget::process() };
    Self::load_into(&mut target, &options)
  }

  /// Load the configured files into a caller-supplied target.
  ///
  /// Use this with [`EnvTarget::memory`] or [`EnvTarget::from_memory`] to
  /// keep the process environment untouched.
  pub fn load_into(
    target: &mut EnvTarget,
    options: &EnvLoadOptions,
  ) -> Result<LoadResult, EnvLoadError> {
    #[cfg(feature = "tracing")]
    info!("Starting env load");

    let mut accumulated = EnvTarget::memory();

    for path in options.effective_paths() {
      let text = std::fs::read_to_string(&path).map_err(|source| {
        EnvLoadError::SourceUnreadable {
          path: path.clone(),
          source,
        }
      })?;

      let parsed = ParsedEnv::from(text.as_str());

      #[cfg(feature = "tracing")]
      debug!(?path, "Parsed {} keys", parsed.len());

      // Later files win while accumulating.
      merge(
        &mut accumulated,
        &parsed.vars,
        &MergeOptions {
          override_existing: true,
        },
      );
    }

    let parsed = accumulated.into_memory().unwrap_or_default();
    merge(
      target,
      &parsed,
      &MergeOptions {
        override_existing: options.override_existing,
      },
    );

    #[cfg(feature = "tracing")]
    info!("Load completed with {} keys", parsed.len());

    Ok(LoadResult { parsed })
  }
}

/// Configuration options for loading env files.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnvLoadOptions {
  /// Paths to env files, applied in order with later files winning on
  /// shared keys. Empty means a single `.env` in the current directory.
  pub paths: Vec<PathBuf>,
  /// Whether loaded values may replace keys already present in the target.
  pub override_existing: bool,
}

impl EnvLoadOptions {
  fn effective_paths(&self) -> Vec<PathBuf> {
    if self.paths.is_empty() {
      vec![PathBuf::from(DEFAULT_FILENAME)]
    } else {
      self.paths.clone()
    }
  }
}

/// Result of a load: every key merged from the input paths in this call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadResult {
  pub parsed: BTreeMap<String, String>,
}

/// Errors that can occur while loading env files.
#[derive(Debug, thiserror::Error)]
pub enum EnvLoadError {
  /// A configured env file could not be read
  #[error("Unreadable env file {path}: {source}")]
  SourceUnreadable {
    path: PathBuf,
    source: std::io::Error,
  },
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_missing_file_is_reported() {
    let options = EnvLoadOptions {
      paths: vec![PathBuf::from("definitely-missing.env")],
      override_existing: false,
    };

    let mut target = EnvTarget::memory();
    let result = EnvLoad::load_into(&mut target, &options);

    match result.unwrap_err() {
      EnvLoadError::SourceUnreadable { path, .. } => {
        assert_eq!(path, PathBuf::from("definitely-missing.env"));
      }
    }
  }

  #[test]
  fn test_effective_paths_default_to_dotenv() {
    let options = EnvLoadOptions::default();
    assert_eq!(options.effective_paths(), vec![PathBuf::from(".env")]);

    let explicit = EnvLoadOptions {
      paths: vec![PathBuf::from("a.env")],
      override_existing: false,
    };
    assert_eq!(explicit.effective_paths(), vec![PathBuf::from("a.env")]);
  }

  #[test]
  fn test_load_merges_files_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join(".env");
    let local = dir.path().join(".env.local");
    std::fs::write(&base, "A=base\nB=base\n").unwrap();
    std::fs::write(&local, "B=local\nC=local\n").unwrap();

    let options = EnvLoadOptions {
      paths: vec![base, local],
      override_existing: false,
    };

    let mut target = EnvTarget::memory();
    let result = EnvLoad::load_into(&mut target, &options).unwrap();

    assert_eq!(result.parsed.get("A").unwrap(), "base");
    assert_eq!(result.parsed.get("B").unwrap(), "local");
    assert_eq!(result.parsed.get("C").unwrap(), "local");

    let map = target.into_memory().unwrap();
    assert_eq!(map.len(), 3);
  }

  #[test]
  fn test_load_respects_existing_target_keys() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join(".env");
    std::fs::write(&file, "A=from_file\nB=from_file\n").unwrap();

    let mut initial = BTreeMap::new();
    initial.insert("A".to_string(), "existing".to_string());
    let mut target = EnvTarget::from_memory(initial);

    let options = EnvLoadOptions {
      paths: vec![file],
      override_existing: false,
    };

    let result = EnvLoad::load_into(&mut target, &options).unwrap();

    // The parsed result reports what the files contained, while the target
    // keeps its pre-existing value.
    assert_eq!(result.parsed.get("A").unwrap(), "from_file");
    let map = target.into_memory().unwrap();
    assert_eq!(map.get("A").unwrap(), "existing");
    assert_eq!(map.get("B").unwrap(), "from_file");
  }

  #[test]
  fn test_load_override_replaces_target_keys() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join(".env");
    std::fs::write(&file, "A=from_file\n").unwrap();

    let mut initial = BTreeMap::new();
    initial.insert("A".to_string(), "existing".to_string());
    let mut target = EnvTarget::from_memory(initial);

    let options = EnvLoadOptions {
      paths: vec![file],
      override_existing: true,
    };

    EnvLoad::load_into(&mut target, &options).unwrap();

    let map = target.into_memory().unwrap();
    assert_eq!(map.get("A").unwrap(), "from_file");
  }
}
