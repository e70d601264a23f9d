//! Repository port for Q-value snapshot persistence.
//!
//! This module defines the trait boundary between the learning core and the
//! storage formats used to persist exported Q-values.

use std::path::Path;

use crate::{Result, q_learning::QSnapshot};

/// Port for persisting and loading Q-value snapshots.
///
/// Only the flat state -> action -> value mapping is stored; encoders,
/// learning parameters and policies are not part of a snapshot.
///
/// # Examples
///
/// ```no_run
/// use qlearn::ports::SnapshotRepository;
/// use qlearn::q_learning::QSnapshot;
/// use std::path::Path;
///
/// fn save_snapshot<R: SnapshotRepository>(
///     repo: &R,
///     snapshot: &QSnapshot,
///     path: &Path,
/// ) -> qlearn::Result<()> {
///     repo.save(snapshot, path)
/// }
/// ```
pub trait SnapshotRepository {
    /// Save a snapshot to persistent storage.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path cannot be created or written to
    /// - Serialization fails (e.g. non-finite values in a JSON snapshot)
    fn save(&self, snapshot: &QSnapshot, path: &Path) -> Result<()>;

    /// Load a snapshot from persistent storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid snapshot.
    fn load(&self, path: &Path) -> Result<QSnapshot>;
}
