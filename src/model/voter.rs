use serde::{Deserialize, Serialize};

use super::Id;

pub type VoterId = Id;

/// Maximum size of the voter roster.
pub const MAX_VOTERS: usize = 69;

/// Prefix of every public voter handle.
pub const HANDLE_PREFIX: &str = "USN";

/// A provisioned voter credential and its voting status.
///
/// Deliberately holds no reference to the candidate the voter chose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    pub id: VoterId,
    /// Public handle the voter signs in with, unique across the roster.
    pub handle: String,
    pub secret: String,
    pub has_voted: bool,
}

impl Voter {
    /// Issue a fresh credential for the given ID.
    pub fn new(id: VoterId, secret: &str) -> Self {
        Self {
            id,
            handle: handle_for(id),
            secret: secret.to_string(),
            has_voted: false,
        }
    }

    /// Does the presented secret match this voter's?
    pub fn verify_secret(&self, secret: &str) -> bool {
        self.secret == secret
    }
}

/// The public handle for a voter ID: the prefix followed by the ID, zero-padded
/// to three digits.
pub fn handle_for(id: VoterId) -> String {
    format!("{HANDLE_PREFIX}{:03}", id.get())
}

/// Credentials presented by a voter signing in.
#[derive(Clone, Deserialize, Serialize)]
pub struct VoterCredentials {
    pub handle: String,
    pub secret: String,
}

impl From<&Voter> for VoterCredentials {
    fn from(voter: &Voter) -> Self {
        Self {
            handle: voter.handle.clone(),
            secret: voter.secret.clone(),
        }
    }
}

/// What a signed-in voter may see about themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterDescription {
    pub id: VoterId,
    pub handle: String,
    pub has_voted: bool,
}

impl From<Voter> for VoterDescription {
    fn from(voter: Voter) -> Self {
        Self {
            id: voter.id,
            handle: voter.handle,
            has_voted: voter.has_voted,
        }
    }
}
