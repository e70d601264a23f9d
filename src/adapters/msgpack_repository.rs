//! MessagePack implementation of the snapshot repository.
//!
//! This adapter implements the SnapshotRepository port using rmp_serde for
//! compact binary serialization.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use crate::{Result, error::Error, ports::SnapshotRepository, q_learning::QSnapshot};

/// MessagePack-based snapshot repository.
///
/// Unlike JSON, MessagePack stores NaN and infinities verbatim.
///
/// # Examples
///
/// ```no_run
/// use qlearn::adapters::MsgPackRepository;
/// use qlearn::ports::SnapshotRepository;
/// use qlearn::q_learning::QSnapshot;
/// use std::path::Path;
///
/// let repo = MsgPackRepository;
/// repo.save(&QSnapshot::new(), Path::new("qtable.msgpack"))?;
/// let loaded = repo.load(Path::new("qtable.msgpack"))?;
/// # Ok::<(), qlearn::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackRepository;

impl MsgPackRepository {
    /// Create a new MessagePack repository.
    pub fn new() -> Self {
        Self
    }
}

impl SnapshotRepository for MsgPackRepository {
    fn save(&self, snapshot: &QSnapshot, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create file {path:?}"),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        rmp_serde::encode::write(&mut writer, snapshot)?;
        writer.flush().map_err(|source| Error::Io {
            operation: format!("flush file {path:?}"),
            source,
        })?;
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<QSnapshot> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open file {path:?}"),
            source,
        })?;

        let snapshot = rmp_serde::decode::from_read(BufReader::new(file))?;
        Ok(snapshot)
    }
}
