use std::collections::BTreeMap;

#[cfg(feature = "tracing")]
use tracing::trace;

/// Destination for loaded variables.
///
/// Either the real process environment or an in-memory map. The in-memory
/// form keeps library code free of process-global state; the process form is
/// the thin adapter that syncs writes to the OS environment at the process
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvTarget {
  kind: TargetKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TargetKind {
  Process,
  Memory(BTreeMap<String, String>),
}

impl Default for EnvTarget {
  fn default() -> Self {
    Self::memory()
  }
}

impl EnvTarget {
  /// Target the current process environment.
  ///
  /// # Safety
  ///
  /// Writes go through [`std::env::set_var`]. The caller must guarantee that
  /// no other thread reads or writes the process environment while this
  /// target is in use.
  pub unsafe fn process() -> Self {
    Self {
      kind: TargetKind::Process,
    }
  }

  /// Target a fresh in-memory map.
  pub fn memory() -> Self {
    Self::from_memory(BTreeMap::new())
  }

  /// Target an existing in-memory map, e.g. a snapshot of the process
  /// environment.
  pub fn from_memory(map: BTreeMap<String, String>) -> Self {
    Self {
      kind: TargetKind::Memory(map),
    }
  }

  pub fn contains_key(&self, key: &str) -> bool {
    match &self.kind {
      TargetKind::Process => std::env::var_os(key).is_some(),
      TargetKind::Memory(map) => map.contains_key(key),
    }
  }

  pub fn get(&self, key: &str) -> Option<String> {
    match &self.kind {
      TargetKind::Process => std::env::var(key).ok(),
      TargetKind::Memory(map) => map.get(key).cloned(),
    }
  }

  pub fn set(&mut self, key: &str, value: &str) {
    #[cfg(feature = "tracing")]
    trace!("Setting {}", key);

    match &mut self.kind {
      TargetKind::Process => unsafe { std::env::set_var(key, value) },
      TargetKind::Memory(map) => {
        map.insert(key.to_owned(), value.to_owned());
      }
    }
  }

  /// The underlying map of an in-memory target.
  pub fn as_memory(&self) -> Option<&BTreeMap<String, String>> {
    match &self.kind {
      TargetKind::Memory(map) => Some(map),
      TargetKind::Process => None,
    }
  }

  /// Consume an in-memory target, returning its map.
  pub fn into_memory(self) -> Option<BTreeMap<String, String>> {
    match self.kind {
      TargetKind::Memory(map) => Some(map),
      TargetKind::Process => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_memory_target_roundtrip() {
    let mut target = EnvTarget::memory();
    assert!(!target.contains_key("KEY"));

    target.set("KEY", "value");
    assert!(target.contains_key("KEY"));
    assert_eq!(target.get("KEY"), Some("value".to_string()));

    target.set("KEY", "other");
    let map = target.into_memory().unwrap();
    assert_eq!(map.get("KEY").unwrap(), "other");
  }

  #[test]
  fn test_from_memory_preserves_entries() {
    let mut initial = BTreeMap::new();
    initial.insert("A".to_string(), "1".to_string());

    let target = EnvTarget::from_memory(initial);
    assert!(target.contains_key("A"));
    assert_eq!(target.as_memory().unwrap().len(), 1);
  }

  #[test]
  fn test_default_is_empty_memory() {
    let target = EnvTarget::default();
    assert_eq!(target.as_memory().unwrap().len(), 0);
  }
}
