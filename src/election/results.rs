use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{candidate::Candidate, voter::Voter};

use super::Election;

/// A consistent view of the tallies, derived from a single committed state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectionResults {
    /// Every candidate, most votes first. Ties keep registration order.
    pub ranking: Vec<Candidate>,
    /// All candidates sharing the top count. Empty while nobody has votes.
    pub winners: Vec<Candidate>,
    /// Fraction of the roster that has voted, in `[0, 1]`.
    pub turnout: f64,
    pub voted_count: usize,
    pub total_voters: usize,
    pub total_votes: u64,
}

impl ElectionResults {
    pub fn compute<'a>(
        candidates: impl IntoIterator<Item = &'a Candidate>,
        voters: impl IntoIterator<Item = &'a Voter>,
    ) -> Self {
        let mut ranking: Vec<Candidate> = candidates.into_iter().cloned().collect();
        ranking.sort_by_key(|c| (Reverse(c.votes), c.id));

        let top = ranking.first().map_or(0, |c| c.votes);
        let winners = if top == 0 {
            Vec::new()
        } else {
            ranking.iter().take_while(|c| c.votes == top).cloned().collect()
        };

        let (total_voters, voted_count) = voters
            .into_iter()
            .fold((0, 0), |(total, voted), v| (total + 1, voted + usize::from(v.has_voted)));
        let turnout = if total_voters == 0 {
            0.0
        } else {
            voted_count as f64 / total_voters as f64
        };
        let total_votes = ranking.iter().map(|c| u64::from(c.votes)).sum();

        Self {
            ranking,
            winners,
            turnout,
            voted_count,
            total_voters,
            total_votes,
        }
    }

    pub fn winner_names(&self) -> Vec<String> {
        self.winners.iter().map(|c| c.name.clone()).collect()
    }
}

impl Election {
    /// Compute the results as of now. Callers decide who may see them.
    pub fn results(&self) -> Result<ElectionResults> {
        self.read(|records| {
            ElectionResults::compute(records.candidates.values(), records.voters.values())
        })
    }
}
