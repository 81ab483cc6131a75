use crate::error::{Error, Result};
use crate::model::candidate::{
    Candidate, CandidateId, CandidateSpec, CandidateUpdate, MAX_CANDIDATES,
};

use super::{guard, Election};

impl Election {
    /// All candidates, in registration order.
    pub fn candidates(&self) -> Result<Vec<Candidate>> {
        self.read(|records| records.candidates.values().cloned().collect())
    }

    pub fn candidate(&self, id: CandidateId) -> Result<Option<Candidate>> {
        self.read(|records| records.candidates.get(&id).cloned())
    }

    /// Register a new candidate with a zero tally.
    pub fn create_candidate(&self, spec: CandidateSpec) -> Result<Candidate> {
        let spec = spec.validated()?;
        let candidate = self.transact(|records| {
            let settings = &records.settings;
            guard(settings.can_modify_candidates(), settings, "add candidates")?;
            if records.candidates.len() >= MAX_CANDIDATES {
                return Err(Error::CapacityExceeded(format!(
                    "At most {MAX_CANDIDATES} candidates may stand"
                )));
            }

            let id = records.next_candidate_id;
            records.next_candidate_id = id.successor();
            let candidate = Candidate::new(id, spec);
            records.candidates.insert(id, candidate.clone());
            Ok(candidate)
        })?;
        info!("Registered candidate {} ({})", candidate.id, candidate.name);
        Ok(candidate)
    }

    /// Change a candidate's name and/or party.
    pub fn update_candidate(&self, id: CandidateId, update: CandidateUpdate) -> Result<Candidate> {
        self.transact(|records| {
            let settings = &records.settings;
            guard(settings.can_modify_candidates(), settings, "edit candidates")?;
            let candidate = records
                .candidates
                .get_mut(&id)
                .ok_or(Error::CandidateNotFound(id))?;
            candidate.apply(update)?;
            Ok(candidate.clone())
        })
    }

    pub fn delete_candidate(&self, id: CandidateId) -> Result<()> {
        self.transact(|records| {
            let settings = &records.settings;
            guard(settings.can_modify_candidates(), settings, "remove candidates")?;
            records
                .candidates
                .remove(&id)
                .map(|_| ())
                .ok_or(Error::CandidateNotFound(id))
        })?;
        info!("Removed candidate {id}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::election::ElectionOptions;
    use crate::model::Id;

    use super::*;

    fn election() -> Election {
        Election::new(ElectionOptions::default())
    }

    fn ongoing(election: &Election) {
        election.provision_voters(1).unwrap();
        election.start(None).unwrap();
    }

    #[test]
    fn sixth_candidate_exceeds_capacity() {
        let election = election();
        for i in 0..MAX_CANDIDATES {
            election
                .create_candidate(CandidateSpec::new(format!("Candidate {i}"), "Party"))
                .unwrap();
        }
        let result = election.create_candidate(CandidateSpec::example1());
        assert!(matches!(result, Err(Error::CapacityExceeded(_))));
        assert_eq!(election.candidates().unwrap().len(), MAX_CANDIDATES);
    }

    #[test]
    fn ids_are_sequential_and_never_reused() {
        let election = election();
        let a = election.create_candidate(CandidateSpec::example1()).unwrap();
        let b = election.create_candidate(CandidateSpec::example2()).unwrap();
        assert_eq!(a.id, Id::new(1));
        assert_eq!(b.id, Id::new(2));
        assert_eq!(a.votes, 0);

        election.delete_candidate(b.id).unwrap();
        let c = election.create_candidate(CandidateSpec::example3()).unwrap();
        assert_eq!(c.id, Id::new(3));

        let names: Vec<_> = election
            .candidates()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Ada Lovelace", "Grace Hopper"]);
    }

    #[test]
    fn update_and_delete_unknown_candidate() {
        let election = election();
        let result = election.update_candidate(Id::new(9), CandidateUpdate::default());
        assert!(matches!(result, Err(Error::CandidateNotFound(id)) if id == Id::new(9)));
        let result = election.delete_candidate(Id::new(9));
        assert!(matches!(result, Err(Error::CandidateNotFound(_))));
    }

    #[test]
    fn update_changes_only_given_fields() {
        let election = election();
        let a = election.create_candidate(CandidateSpec::example1()).unwrap();
        let updated = election
            .update_candidate(
                a.id,
                CandidateUpdate {
                    name: Some("Augusta Ada King".to_string()),
                    party: None,
                },
            )
            .unwrap();
        assert_eq!(updated.name, "Augusta Ada King");
        assert_eq!(updated.party, "Analytical Party");
        assert_eq!(election.candidate(a.id).unwrap(), Some(updated));
    }

    #[test]
    fn roster_frozen_once_started() {
        let election = election();
        let a = election.create_candidate(CandidateSpec::example1()).unwrap();
        ongoing(&election);

        assert!(matches!(
            election.create_candidate(CandidateSpec::example2()),
            Err(Error::PreconditionFailed(_))
        ));
        assert!(matches!(
            election.update_candidate(a.id, CandidateUpdate::default()),
            Err(Error::PreconditionFailed(_))
        ));
        assert!(matches!(
            election.delete_candidate(a.id),
            Err(Error::PreconditionFailed(_))
        ));
        assert_eq!(election.candidates().unwrap().len(), 1);
    }

    #[test]
    fn blank_name_rejected_before_touching_store() {
        let election = election();
        let result = election.create_candidate(CandidateSpec::new(" ", "Party"));
        assert!(matches!(result, Err(Error::BadRequest(_))));
        assert!(election.candidates().unwrap().is_empty());
    }
}
