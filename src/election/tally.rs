use crate::error::{Error, Result};
use crate::model::{candidate::CandidateId, voter::VoterId};

use super::Election;

impl Election {
    /// Record one vote from `voter_id` for `candidate_id`.
    ///
    /// The voted flag and the tally change together or not at all. The choice
    /// itself is not stored anywhere; only the candidate's count moves.
    pub fn cast_vote(&self, voter_id: VoterId, candidate_id: CandidateId) -> Result<()> {
        let result = self.transact(|records| {
            if !records.settings.can_vote() {
                return Err(Error::ElectionNotOngoing);
            }
            let voter = records
                .voters
                .get_mut(&voter_id)
                .ok_or(Error::VoterNotFound(voter_id))?;
            if voter.has_voted {
                return Err(Error::AlreadyVoted(voter_id));
            }
            let candidate = records
                .candidates
                .get_mut(&candidate_id)
                .ok_or(Error::CandidateNotFound(candidate_id))?;

            voter.has_voted = true;
            candidate.votes = candidate.votes.checked_add(1).ok_or_else(|| {
                Error::StoreUnavailable(format!("Tally overflow for candidate {candidate_id}"))
            })?;
            Ok(())
        });
        match &result {
            Ok(()) => debug!("Accepted vote from voter {voter_id}"),
            Err(e) => debug!("Rejected vote from voter {voter_id}: {e}"),
        }
        result
    }
}
