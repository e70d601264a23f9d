//! Snapshot persistence
//!
//! Picks a storage adapter from a [`SnapshotFormat`], usually inferred from
//! the file extension.

use std::{fmt, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    adapters::{JsonRepository, MsgPackRepository},
    ports::SnapshotRepository,
    q_learning::q_table::QSnapshot,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotFormat {
    /// Nested JSON object, readable by the heat-map tooling
    #[default]
    Json,
    /// MessagePack; also carries non-finite values
    MsgPack,
}

impl SnapshotFormat {
    /// Infer the format from a path's extension (`.msgpack`/`.mpk` or JSON)
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("msgpack" | "mpk") => SnapshotFormat::MsgPack,
            _ => SnapshotFormat::Json,
        }
    }

    pub fn repository(self) -> Box<dyn SnapshotRepository> {
        match self {
            SnapshotFormat::Json => Box::new(JsonRepository::new()),
            SnapshotFormat::MsgPack => Box::new(MsgPackRepository::new()),
        }
    }
}

impl fmt::Display for SnapshotFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotFormat::Json => write!(f, "json"),
            SnapshotFormat::MsgPack => write!(f, "msgpack"),
        }
    }
}

impl FromStr for SnapshotFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(SnapshotFormat::Json),
            "msgpack" | "mpk" => Ok(SnapshotFormat::MsgPack),
            other => Err(Error::invalid_config(format!(
                "unknown snapshot format '{other}' (expected json or msgpack)"
            ))),
        }
    }
}

/// Save `snapshot` in the format implied by `path`
pub fn save_snapshot<P: AsRef<Path>>(snapshot: &QSnapshot, path: P) -> Result<()> {
    let path = path.as_ref();
    SnapshotFormat::from_path(path)
        .repository()
        .save(snapshot, path)
}

/// Load a snapshot in the format implied by `path`
pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<QSnapshot> {
    let path = path.as_ref();
    SnapshotFormat::from_path(path).repository().load(path)
}
