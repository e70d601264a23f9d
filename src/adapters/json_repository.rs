//! JSON implementation of the snapshot repository.
//!
//! Writes the nested `{state: {action: value}}` object consumed by the
//! Q-table heat-map script.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use crate::{Result, error::Error, ports::SnapshotRepository, q_learning::QSnapshot};

/// Pretty-printed JSON snapshot repository.
///
/// JSON has no encoding for NaN or infinities; saving a snapshot that holds
/// them fails with [`Error::Serialization`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRepository;

impl JsonRepository {
    pub fn new() -> Self {
        Self
    }
}

impl SnapshotRepository for JsonRepository {
    fn save(&self, snapshot: &QSnapshot, path: &Path) -> Result<()> {
        // serde_json would quietly write `null` for non-finite floats
        if let Some((state, action, value)) = snapshot.iter().find_map(|(state, actions)| {
            actions
                .iter()
                .find(|(_, value)| !value.is_finite())
                .map(|(action, value)| (state, action, *value))
        }) {
            return Err(Error::Serialization(serde::ser::Error::custom(format!(
                "Q({state}, {action}) = {value} cannot be represented in JSON"
            ))));
        }

        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create file {path:?}"),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, snapshot)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<QSnapshot> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open file {path:?}"),
            source,
        })?;
        let snapshot = serde_json::from_reader(BufReader::new(file))?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_json_layout_is_nested_object() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("qtable.json");

        let mut snapshot = QSnapshot::new();
        snapshot.insert(
            "s1".to_string(),
            BTreeMap::from([("0".to_string(), 5.0), ("1".to_string(), 3.0)]),
        );
        JsonRepository::new().save(&snapshot, &path).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw, serde_json::json!({"s1": {"0": 5.0, "1": 3.0}}));

        let loaded = JsonRepository::new().load(&path).unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("qtable.json");

        let mut snapshot = QSnapshot::new();
        snapshot.insert(
            "s1".to_string(),
            BTreeMap::from([("0".to_string(), f64::NAN)]),
        );
        let result = JsonRepository::new().save(&snapshot, &path);
        assert!(matches!(result, Err(Error::Serialization(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_malformed_file_returns_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        std::fs::write(&path, "{\"s1\": [1, 2]}").unwrap();
        assert!(JsonRepository::new().load(&path).is_err());
    }
}
