use crate::error::{Error, Result};
use crate::model::voter::{Voter, VoterCredentials, VoterId, MAX_VOTERS};

use super::{guard, Election};

impl Election {
    /// The whole roster, in provisioning order.
    pub fn voters(&self) -> Result<Vec<Voter>> {
        self.read(|records| records.voters.values().cloned().collect())
    }

    pub fn voter(&self, id: VoterId) -> Result<Option<Voter>> {
        self.read(|records| records.voters.get(&id).cloned())
    }

    /// Issue up to `count` new voter credentials, stopping at the roster cap.
    ///
    /// Returns exactly the voters created. A non-positive `count` creates
    /// nothing, but is still refused once the election has started.
    pub fn provision_voters(&self, count: i64) -> Result<Vec<Voter>> {
        let secret = self.options.voter_secret.as_str();
        let (batch, roster) = self.transact(|records| {
            let settings = &records.settings;
            guard(settings.can_modify_voters(), settings, "provision voters")?;
            if count <= 0 {
                return Ok((Vec::new(), records.voters.len()));
            }

            let remaining = MAX_VOTERS.saturating_sub(records.voters.len());
            if remaining == 0 {
                return Err(Error::CapacityExceeded(format!(
                    "The roster is full at {MAX_VOTERS} voters"
                )));
            }

            let issue = usize::try_from(count).unwrap_or(usize::MAX).min(remaining);
            let mut batch = Vec::with_capacity(issue);
            for _ in 0..issue {
                let id = records.next_voter_id;
                records.next_voter_id = id.successor();
                let voter = Voter::new(id, secret);
                if records.handles.insert(voter.handle.clone(), id).is_some() {
                    return Err(Error::StoreUnavailable(format!(
                        "Voter handle {} already issued",
                        voter.handle
                    )));
                }
                records.voters.insert(id, voter.clone());
                batch.push(voter);
            }
            Ok((batch, records.voters.len()))
        })?;
        if !batch.is_empty() {
            info!(
                "Provisioned {} voters (requested {count}, roster now {roster})",
                batch.len()
            );
        }
        Ok(batch)
    }

    /// Look up the voter holding these credentials.
    pub fn validate_voter(&self, credentials: &VoterCredentials) -> Result<Option<Voter>> {
        self.read(|records| {
            records
                .handles
                .get(&credentials.handle)
                .and_then(|id| records.voters.get(id))
                .filter(|voter| voter.verify_secret(&credentials.secret))
                .cloned()
        })
    }
}
