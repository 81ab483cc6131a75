use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use rocket::serde::json::serde_json;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{candidate::Candidate, settings::ElectionSettings, voter::Voter, Id};

use super::Records;

/// The on-disk form of the store.
#[derive(Serialize, Deserialize)]
struct Snapshot {
    candidates: Vec<Candidate>,
    voters: Vec<Voter>,
    settings: ElectionSettings,
    next_candidate_id: Id,
    next_voter_id: Id,
}

impl From<&Records> for Snapshot {
    fn from(records: &Records) -> Self {
        Self {
            candidates: records.candidates.values().cloned().collect(),
            voters: records.voters.values().cloned().collect(),
            settings: records.settings.clone(),
            next_candidate_id: records.next_candidate_id,
            next_voter_id: records.next_voter_id,
        }
    }
}

impl TryFrom<Snapshot> for Records {
    type Error = Error;

    fn try_from(snapshot: Snapshot) -> Result<Self> {
        let mut records = Records {
            candidates: snapshot.candidates.into_iter().map(|c| (c.id, c)).collect(),
            voters: snapshot.voters.into_iter().map(|v| (v.id, v)).collect(),
            handles: Default::default(),
            settings: snapshot.settings,
            next_candidate_id: snapshot.next_candidate_id,
            next_voter_id: snapshot.next_voter_id,
        };
        records.reindex()?;
        Ok(records)
    }
}

/// A JSON file mirroring the committed store.
///
/// Saves go to a sibling temporary file which is flushed to disk and then
/// renamed over the target, so a crash mid-write leaves the previous
/// snapshot intact. The rename itself is only durable once the directory
/// entry reaches the disk, which is not forced here.
#[derive(Debug)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot, or `None` if there isn't one yet.
    pub(crate) fn load(&self) -> Result<Option<Records>> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.unavailable("read", e)),
        };
        let snapshot: Snapshot =
            serde_json::from_slice(&raw).map_err(|e| self.unavailable("parse", e))?;
        Records::try_from(snapshot).map(Some)
    }

    pub(crate) fn save(&self, records: &Records) -> Result<()> {
        let raw = serde_json::to_vec_pretty(&Snapshot::from(records))
            .map_err(|e| self.unavailable("serialize", e))?;
        let staging = self.path.with_extension("tmp");
        let mut file = File::create(&staging).map_err(|e| self.unavailable("create", e))?;
        file.write_all(&raw)
            .and_then(|_| file.sync_all())
            .map_err(|e| self.unavailable("write", e))?;
        fs::rename(&staging, &self.path).map_err(|e| self.unavailable("replace", e))
    }

    fn unavailable(&self, action: &str, err: impl std::fmt::Display) -> Error {
        error!("Failed to {action} snapshot {}: {err}", self.path.display());
        Error::StoreUnavailable(format!("Could not {action} the election snapshot"))
    }
}
