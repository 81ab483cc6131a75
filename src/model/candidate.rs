use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::Id;

pub type CandidateId = Id;

/// Maximum number of candidates that may stand at any one time.
pub const MAX_CANDIDATES: usize = 5;

/// A candidate standing in the election, together with their running tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub party: String,
    /// Only ever incremented by a successful vote, and cleared by a reset.
    pub votes: u32,
}

impl Candidate {
    /// Create a candidate with no votes from a validated spec.
    pub fn new(id: CandidateId, spec: CandidateSpec) -> Self {
        Self {
            id,
            name: spec.name,
            party: spec.party,
            votes: 0,
        }
    }

    /// Apply a partial update. Fields absent from the update are left alone.
    pub fn apply(&mut self, update: CandidateUpdate) -> Result<()> {
        if let Some(name) = update.name {
            self.name = checked_name(name)?;
        }
        if let Some(party) = update.party {
            self.party = party.trim().to_string();
        }
        Ok(())
    }
}

/// A candidate as submitted by an admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSpec {
    pub name: String,
    #[serde(default)]
    pub party: String,
}

impl CandidateSpec {
    pub fn new(name: impl Into<String>, party: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            party: party.into(),
        }
    }

    /// Trim the fields and reject a blank name.
    pub fn validated(self) -> Result<Self> {
        Ok(Self {
            name: checked_name(self.name)?,
            party: self.party.trim().to_string(),
        })
    }
}

/// Changes to an existing candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub party: Option<String>,
}

/// The public view of a candidate: everything except the tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub id: CandidateId,
    pub name: String,
    pub party: String,
}

impl From<Candidate> for CandidateSummary {
    fn from(candidate: Candidate) -> Self {
        Self {
            id: candidate.id,
            name: candidate.name,
            party: candidate.party,
        }
    }
}

fn checked_name(name: String) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::BadRequest(
            "Candidate name must not be blank".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}
