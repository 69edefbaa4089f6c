use std::collections::BTreeMap;

#[cfg(feature = "tracing")]
use tracing::trace;

use crate::env::EnvTarget;

/// Controls whether merging may replace keys already present in the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeOptions {
  pub override_existing: bool,
}

/// Write every `source` key into `target`.
///
/// Keys missing from the target are always written; keys already present
/// are replaced only when `options.override_existing` is set. Each key is
/// handled independently, so the result does not depend on iteration order
/// and merging the same source twice changes nothing.
pub fn merge(target: &mut EnvTarget, source: &BTreeMap<String, String>, options: &MergeOptions) {
  for (key, value) in source {
    if !options.override_existing && target.contains_key(key) {
      #[cfg(feature = "tracing")]
      trace!("Keeping existing value for {}", key);

      continue;
    }

    target.set(key, value);
  }
}
