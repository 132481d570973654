//! Hierarchical TOML configuration manager.
//!
//! Spec §6 treats the on-disk config loader as an external collaborator
//! specified only by this interface: `get_all`, `get`/`has` over dotted
//! paths, `set`, `load`, `save`. This crate is the minimal implementation of
//! that interface needed to drive the orchestrator and (eventually) an admin
//! surface; it is not a general-purpose config framework.

mod error;
mod path;

pub use error::ConfigError;

use std::path::PathBuf;

use parking_lot::RwLock;
use toml::Table;
use toml::Value;

/// Hierarchical key/value store of scalars, lists and nested tables,
/// persisted as a TOML file (spec §1, §6).
pub struct ConfigManager {
    file_path: PathBuf,
    table: RwLock<Table>,
}

impl ConfigManager {
    /// Create a manager bound to `path`. Does not read the file; call
    /// [`ConfigManager::load`] to populate it.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: path.into(),
            table: RwLock::new(Table::new()),
        }
    }

    /// Read `self.file_path` and replace the in-memory table.
    ///
    /// A missing file is tolerated and leaves the config empty (spec §6);
    /// malformed TOML is a hard failure.
    pub fn load(&self) -> Result<(), ConfigError> {
        let contents = match std::fs::read_to_string(&self.file_path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %self.file_path.display(), "config file missing, starting empty");
                *self.table.write() = Table::new();
                return Ok(());
            }
            Err(e) => {
                return Err(ConfigError::Io {
                    path: self.file_path.clone(),
                    source: e,
                });
            }
        };

        let table: Table = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: self.file_path.clone(),
            source,
        })?;
        *self.table.write() = table;
        Ok(())
    }

    /// Write the in-memory table back to `self.file_path`, creating parent
    /// directories if needed.
    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        let serialized =
            toml::to_string_pretty(&*self.table.read()).map_err(|source| ConfigError::Serialize {
                path: self.file_path.clone(),
                source,
            })?;
        std::fs::write(&self.file_path, serialized).map_err(|source| ConfigError::Io {
            path: self.file_path.clone(),
            source,
        })
    }

    /// A deep copy of the entire configuration table.
    pub fn get_all(&self) -> Table {
        self.table.read().clone()
    }

    /// Dotted-path traversal (e.g. `"plugins.sources"`). Returns `default`
    /// on any missing segment; the returned value is always a deep copy.
    pub fn get(&self, dotted_path: &str, default: Value) -> Value {
        let table = self.table.read();
        path::traverse(&table, dotted_path).cloned().unwrap_or(default)
    }

    /// Typed convenience wrapper over [`ConfigManager::get`].
    pub fn get_typed<T: serde::de::DeserializeOwned>(&self, dotted_path: &str) -> Option<T> {
        let table = self.table.read();
        path::traverse(&table, dotted_path)
            .cloned()
            .and_then(|v| v.try_into().ok())
    }

    /// Whether a value exists at `dotted_path`.
    pub fn has(&self, dotted_path: &str) -> bool {
        let table = self.table.read();
        path::traverse(&table, dotted_path).is_some()
    }

    /// Set `value` at `dotted_path`, creating intermediate tables as needed.
    /// Fails if a non-table value already occupies an intermediate segment.
    pub fn set(&self, dotted_path: &str, value: Value) -> Result<(), ConfigError> {
        let mut table = self.table.write();
        path::set(&mut table, dotted_path, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let cfg = ConfigManager::new(dir.path().join("missing.toml"));
        cfg.load().unwrap();
        assert!(cfg.get_all().is_empty());
    }

    #[test]
    fn malformed_file_fails() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("bad.toml");
        std::fs::write(&file, "not [ valid toml").unwrap();
        let cfg = ConfigManager::new(file);
        assert!(cfg.load().is_err());
    }

    #[test]
    fn dotted_get_set_has() {
        let dir = tempdir().unwrap();
        let cfg = ConfigManager::new(dir.path().join("config.toml"));
        assert!(!cfg.has("plugins.sources"));
        assert_eq!(
            cfg.get("plugins.sources", Value::Array(vec![])),
            Value::Array(vec![])
        );

        cfg.set(
            "plugins.sources",
            Value::Array(vec![Value::String("mock_message_source".into())]),
        )
        .unwrap();

        assert!(cfg.has("plugins.sources"));
        let got = cfg.get("plugins.sources", Value::Array(vec![]));
        assert_eq!(got, Value::Array(vec![Value::String("mock_message_source".into())]));
    }

    #[test]
    fn set_fails_on_non_table_intermediate() {
        let dir = tempdir().unwrap();
        let cfg = ConfigManager::new(dir.path().join("config.toml"));
        cfg.set("a", Value::Integer(1)).unwrap();
        assert!(cfg.set("a.b", Value::Integer(2)).is_err());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = ConfigManager::new(&path);
        cfg.set("SYSTEM.max_tracked", Value::Integer(50)).unwrap();
        cfg.save().unwrap();

        let reloaded = ConfigManager::new(&path);
        reloaded.load().unwrap();
        assert_eq!(
            reloaded.get("SYSTEM.max_tracked", Value::Integer(0)),
            Value::Integer(50)
        );
    }

    #[test]
    fn get_all_is_a_deep_copy() {
        let dir = tempdir().unwrap();
        let cfg = ConfigManager::new(dir.path().join("config.toml"));
        cfg.set("a", Value::Integer(1)).unwrap();
        let mut snapshot = cfg.get_all();
        snapshot.insert("a".into(), Value::Integer(99));
        assert_eq!(cfg.get("a", Value::Integer(0)), Value::Integer(1));
    }
}
