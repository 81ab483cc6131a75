//! The election engine: a single authoritative store of candidates, voters and
//! settings, with every mutation funnelled through phase-guarded operations.
//!
//! Each mutating operation is one transaction. It takes the write lock, works
//! on a copy of the records, persists the copy if a snapshot file is
//! configured, and only then commits it. An error at any step discards the
//! copy, so no failure can leave a half-applied change behind. Readers take
//! the read lock and therefore only ever see committed states.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use rocket::tokio::task;

use crate::error::{Error, Result};
use crate::model::{
    candidate::{Candidate, CandidateId},
    settings::{ElectionSettings, ResetPolicy},
    voter::{Voter, VoterId},
    Id,
};

mod candidates;
mod lifecycle;
mod results;
mod snapshot;
mod tally;
mod voters;

pub use results::ElectionResults;
pub use snapshot::SnapshotFile;

/// The secret issued to every provisioned voter unless configured otherwise.
pub const DEFAULT_VOTER_SECRET: &str = "123";

/// Behaviour that is chosen per deployment rather than per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElectionOptions {
    pub reset_policy: ResetPolicy,
    /// Secret handed to each newly provisioned voter.
    pub voter_secret: String,
}

impl Default for ElectionOptions {
    fn default() -> Self {
        Self {
            reset_policy: ResetPolicy::default(),
            voter_secret: DEFAULT_VOTER_SECRET.to_string(),
        }
    }
}

/// Everything the store holds.
#[derive(Debug, Clone, Default)]
pub(crate) struct Records {
    pub(crate) candidates: BTreeMap<CandidateId, Candidate>,
    pub(crate) voters: BTreeMap<VoterId, Voter>,
    /// Unique index from public handle to voter.
    pub(crate) handles: HashMap<String, VoterId>,
    pub(crate) settings: ElectionSettings,
    pub(crate) next_candidate_id: Id,
    pub(crate) next_voter_id: Id,
}

impl Records {
    /// Rebuild the handle index from the voter table.
    pub(crate) fn reindex(&mut self) -> Result<()> {
        self.handles.clear();
        for voter in self.voters.values() {
            if self.handles.insert(voter.handle.clone(), voter.id).is_some() {
                return Err(Error::StoreUnavailable(format!(
                    "Duplicate voter handle {} in stored records",
                    voter.handle
                )));
            }
        }
        Ok(())
    }
}

/// A handle on the election store. Cloning is cheap; all clones share the
/// same records.
#[derive(Clone)]
pub struct Election {
    records: Arc<RwLock<Records>>,
    snapshot: Option<Arc<SnapshotFile>>,
    options: Arc<ElectionOptions>,
}

impl Election {
    /// Create an empty, purely in-memory store.
    pub fn new(options: ElectionOptions) -> Self {
        Self {
            records: Default::default(),
            snapshot: None,
            options: Arc::new(options),
        }
    }

    /// Open a store mirrored to the given snapshot file, resuming from it if
    /// it already exists.
    pub fn open(path: impl Into<PathBuf>, options: ElectionOptions) -> Result<Self> {
        let snapshot = SnapshotFile::new(path);
        let records = match snapshot.load()? {
            Some(records) => {
                info!(
                    "Resumed election from {} ({} candidates, {} voters, phase {})",
                    snapshot.path().display(),
                    records.candidates.len(),
                    records.voters.len(),
                    records.settings.phase
                );
                records
            }
            None => {
                info!("Starting new election store at {}", snapshot.path().display());
                let records = Records::default();
                snapshot.save(&records)?;
                records
            }
        };
        Ok(Self {
            records: Arc::new(RwLock::new(records)),
            snapshot: Some(Arc::new(snapshot)),
            options: Arc::new(options),
        })
    }

    pub fn options(&self) -> &ElectionOptions {
        &self.options
    }

    /// Run a read-only query against the committed records.
    fn read<T>(&self, query: impl FnOnce(&Records) -> T) -> Result<T> {
        let records = self
            .records
            .read()
            .map_err(|_| Error::StoreUnavailable("election store lock poisoned".to_string()))?;
        Ok(query(&records))
    }

    /// Run a mutation as a single all-or-nothing transaction.
    fn transact<T>(&self, mutation: impl FnOnce(&mut Records) -> Result<T>) -> Result<T> {
        let mut records = self
            .records
            .write()
            .map_err(|_| Error::StoreUnavailable("election store lock poisoned".to_string()))?;
        let mut working = records.clone();
        let value = mutation(&mut working)?;
        if let Some(snapshot) = &self.snapshot {
            // Holds the write lock throughout. Other tasks queued on this
            // worker are moved to another thread while the file is written.
            task::block_in_place(|| snapshot.save(&working))?;
        }
        *records = working;
        Ok(value)
    }
}

/// Reject the operation unless its phase guard holds.
fn guard(allowed: bool, settings: &ElectionSettings, action: &str) -> Result<()> {
    if allowed {
        Ok(())
    } else {
        Err(Error::PreconditionFailed(format!(
            "Cannot {action} while the election is {}",
            settings.phase
        )))
    }
}
