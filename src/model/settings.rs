use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Phases in the election lifecycle.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElectionPhase {
    /// Candidates and voters are being set up. Nobody can vote.
    #[default]
    NotStarted,
    /// Voting is open; the rosters are frozen.
    Ongoing,
    /// Voting is closed and results are public.
    Ended,
}

impl Display for ElectionPhase {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}",
            match self {
                Self::NotStarted => "not started",
                Self::Ongoing => "ongoing",
                Self::Ended => "ended",
            }
        )
    }
}

/// A concluded election, archived at the moment it was ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub name: String,
    pub ended_at: DateTime<Utc>,
    /// Names of every candidate sharing the winning tally. Empty if no votes
    /// were cast.
    pub winners: Vec<String>,
}

/// The single live settings record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionSettings {
    pub phase: ElectionPhase,
    /// Set exactly when the phase becomes `Ended`.
    pub results_visible: bool,
    pub name: String,
    /// Append-only archive of ended elections, oldest first.
    pub history: Vec<HistoryEntry>,
}

impl ElectionSettings {
    pub fn can_modify_candidates(&self) -> bool {
        self.phase == ElectionPhase::NotStarted
    }

    pub fn can_modify_voters(&self) -> bool {
        self.phase == ElectionPhase::NotStarted
    }

    pub fn can_vote(&self) -> bool {
        self.phase == ElectionPhase::Ongoing
    }
}

/// What a reset does to the candidate and voter rosters.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetPolicy {
    /// Keep both rosters, clearing tallies and voted flags.
    #[default]
    ClearVotes,
    /// Delete every candidate and voter.
    FullWipe,
}

#[cfg(test)]
mod tests {
    use rocket::serde::json::serde_json;

    use super::*;

    #[test]
    fn phase_wire_names() {
        assert_eq!(
            serde_json::to_string(&ElectionPhase::NotStarted).unwrap(),
            "\"not_started\""
        );
        assert_eq!(
            serde_json::from_str::<ElectionPhase>("\"ongoing\"").unwrap(),
            ElectionPhase::Ongoing
        );
        assert_eq!(
            serde_json::from_str::<ResetPolicy>("\"full_wipe\"").unwrap(),
            ResetPolicy::FullWipe
        );
    }

    #[test]
    fn guards_follow_phase() {
        let mut settings = ElectionSettings::default();
        assert!(settings.can_modify_candidates());
        assert!(settings.can_modify_voters());
        assert!(!settings.can_vote());

        settings.phase = ElectionPhase::Ongoing;
        assert!(!settings.can_modify_candidates());
        assert!(!settings.can_modify_voters());
        assert!(settings.can_vote());

        settings.phase = ElectionPhase::Ended;
        assert!(!settings.can_modify_candidates());
        assert!(!settings.can_vote());
    }
}
