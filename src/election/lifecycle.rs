use chrono::Utc;

use crate::error::{Error, Result};
use crate::model::settings::{ElectionPhase, ElectionSettings, HistoryEntry, ResetPolicy};

use super::{guard, results::ElectionResults, Election};

impl Election {
    pub fn settings(&self) -> Result<ElectionSettings> {
        self.read(|records| records.settings.clone())
    }

    /// Archived summaries of every ended election, oldest first.
    pub fn history(&self) -> Result<Vec<HistoryEntry>> {
        self.read(|records| records.settings.history.clone())
    }

    /// Set the name of the election being prepared.
    pub fn rename(&self, name: String) -> Result<ElectionSettings> {
        self.transact(|records| {
            let settings = &mut records.settings;
            guard(settings.phase == ElectionPhase::NotStarted, settings, "rename the election")?;
            settings.name = name.trim().to_string();
            Ok(settings.clone())
        })
    }

    /// Open voting. Requires at least one candidate and one voter.
    ///
    /// A non-blank `name` replaces the current election name.
    pub fn start(&self, name: Option<String>) -> Result<ElectionSettings> {
        let (settings, candidates, voters) = self.transact(|records| {
            let phase = records.settings.phase;
            if phase != ElectionPhase::NotStarted {
                return Err(Error::PreconditionFailed(format!(
                    "Cannot start an election that is {phase}"
                )));
            }
            if records.candidates.is_empty() {
                return Err(Error::PreconditionFailed(
                    "Add at least one candidate before starting".to_string(),
                ));
            }
            if records.voters.is_empty() {
                return Err(Error::PreconditionFailed(
                    "Provision voters before starting".to_string(),
                ));
            }

            let settings = &mut records.settings;
            if let Some(name) = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
                settings.name = name;
            }
            settings.phase = ElectionPhase::Ongoing;
            settings.results_visible = false;
            Ok((settings.clone(), records.candidates.len(), records.voters.len()))
        })?;
        info!(
            "Election '{}' started with {candidates} candidates and {voters} voters",
            settings.name
        );
        Ok(settings)
    }

    /// Close voting, publish the results, and archive the winners.
    pub fn end(&self) -> Result<ElectionSettings> {
        let settings = self.transact(|records| {
            let phase = records.settings.phase;
            if phase != ElectionPhase::Ongoing {
                return Err(Error::PreconditionFailed(format!(
                    "Cannot end an election that is {phase}"
                )));
            }

            // The winners must be taken now: a later reset clears the tallies.
            let results = ElectionResults::compute(records.candidates.values(), records.voters.values());
            let settings = &mut records.settings;
            settings.history.push(HistoryEntry {
                name: settings.name.clone(),
                ended_at: Utc::now(),
                winners: results.winner_names(),
            });
            settings.phase = ElectionPhase::Ended;
            settings.results_visible = true;
            Ok(settings.clone())
        })?;
        if let Some(entry) = settings.history.last() {
            info!(
                "Election '{}' ended; winners: {}",
                entry.name,
                if entry.winners.is_empty() {
                    "none".to_string()
                } else {
                    entry.winners.join(", ")
                }
            );
        }
        Ok(settings)
    }

    /// Return to `NotStarted`, clearing every vote. Depending on the reset
    /// policy, the rosters are either kept or deleted. History is untouched.
    pub fn reset(&self) -> Result<ElectionSettings> {
        let policy = self.options.reset_policy;
        let settings = self.transact(|records| {
            let phase = records.settings.phase;
            if phase == ElectionPhase::NotStarted {
                return Err(Error::PreconditionFailed(
                    "Cannot reset an election that has not started".to_string(),
                ));
            }

            match policy {
                ResetPolicy::ClearVotes => {
                    for candidate in records.candidates.values_mut() {
                        candidate.votes = 0;
                    }
                    for voter in records.voters.values_mut() {
                        voter.has_voted = false;
                    }
                }
                ResetPolicy::FullWipe => {
                    // ID counters are kept so that handles are never reissued.
                    records.candidates.clear();
                    records.voters.clear();
                    records.handles.clear();
                }
            }
            let settings = &mut records.settings;
            settings.phase = ElectionPhase::NotStarted;
            settings.results_visible = false;
            Ok(settings.clone())
        })?;
        warn!("Election reset ({policy:?})");
        Ok(settings)
    }
}
