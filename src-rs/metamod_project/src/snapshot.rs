//! The on-disk project snapshot.
//!
//! One versioned JSON document per project root, at a fixed hidden
//! filename. The format is private to this tool; the only contract is that
//! a persisted project restores structurally equal. A version bump
//! invalidates old snapshots, which restore as "no prior state" so callers
//! fall back to a fresh scan.

use std::{fs, io, path::Path};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{error::PersistenceError, project::ProjectState};

/// The snapshot's filename inside the project root.
pub const SNAPSHOT_FILE: &str = ".mmproject.json";

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    state: &'a ProjectState,
}

#[derive(Deserialize)]
struct Snapshot {
    version: u32,
    state: ProjectState,
}

/// Writes the snapshot document into the project root.
pub(crate) fn persist(state: &ProjectState) -> Result<(), PersistenceError> {
    let document = SnapshotRef {
        version: SNAPSHOT_VERSION,
        state,
    };
    let json = serde_json::to_string_pretty(&document).map_err(PersistenceError::Format)?;

    let path = state.root().join(SNAPSHOT_FILE);
    fs::write(&path, json).map_err(PersistenceError::Io)?;
    debug!("persisted project snapshot to {}", path.display());

    Ok(())
}

/// Reads the snapshot document from a project root, if a usable one exists.
///
/// Every failure mode (no file, unreadable, unparseable, version mismatch)
/// restores as `None` so callers fall back to a fresh scan.
pub(crate) fn restore(root: &Path) -> Option<ProjectState> {
    let path = root.join(SNAPSHOT_FILE);

    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
        Err(err) => {
            warn!("could not read {}: {err}", path.display());
            return None;
        }
    };

    let snapshot = match serde_json::from_str::<Snapshot>(&text) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            warn!("discarding unreadable snapshot {}: {err}", path.display());
            return None;
        }
    };

    if snapshot.version != SNAPSHOT_VERSION {
        warn!(
            "discarding snapshot {} with version {} (expected {SNAPSHOT_VERSION})",
            path.display(),
            snapshot.version
        );
        return None;
    }

    let mut state = snapshot.state;
    // the project directory may have moved since the snapshot was written
    state.rebind_root(root);
    Some(state)
}
