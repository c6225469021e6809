use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::VotingConfig;
use crate::error::ServiceError;
use crate::models::ballot::{Ballot, Choice, VoteResults};
use crate::models::vote::{Vote, VoteChanges};
use crate::repository::{CitizenRepository, VoteRepository};
use crate::validation::require_id;

/// Business rules for votes and ballots.
#[derive(Clone)]
pub struct VoteService {
    repository: Arc<dyn VoteRepository>,
    citizens: Arc<dyn CitizenRepository>,
    policy: VotingConfig,
}

impl VoteService {
    pub fn new(
        repository: Arc<dyn VoteRepository>,
        citizens: Arc<dyn CitizenRepository>,
        policy: VotingConfig,
    ) -> Self {
        Self {
            repository,
            citizens,
            policy,
        }
    }

    pub async fn create_vote(&self, vote: Vote) -> Result<(), ServiceError> {
        vote.validate()?;
        let id = vote.id.clone();
        self.repository.save(vote).await?;
        info!(vote_id = %id, "vote created");
        Ok(())
    }

    pub async fn find_vote(&self, vote_id: &str) -> Result<Vote, ServiceError> {
        self.repository
            .find_by_id(vote_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Vote {vote_id} not found")))
    }

    pub async fn update_vote(
        &self,
        vote_id: &str,
        changes: VoteChanges,
    ) -> Result<Vote, ServiceError> {
        if changes.is_empty() {
            return Err(ServiceError::validation("no fields to update"));
        }
        let updated = self
            .repository
            .update(vote_id, changes)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Vote {vote_id} not found")))?;
        info!(vote_id, status = updated.status.as_str(), "vote updated");
        Ok(updated)
    }

    pub async fn remove_vote(&self, vote_id: &str) -> Result<(), ServiceError> {
        if !self.repository.delete(vote_id).await? {
            return Err(ServiceError::not_found(format!("Vote {vote_id} not found")));
        }
        info!(vote_id, "vote removed");
        Ok(())
    }

    /// Every stored vote, in whatever order the backend yields them.
    pub async fn list_votes(&self) -> Result<Vec<Vote>, ServiceError> {
        Ok(self.repository.list_all().await?)
    }

    pub async fn cast_vote(
        &self,
        vote_id: &str,
        citizen_id: &str,
        choice: Choice,
    ) -> Result<Ballot, ServiceError> {
        self.cast_vote_at(vote_id, citizen_id, choice, Utc::now()).await
    }

    /// The status check and the ballot write are not atomic; concurrent
    /// writers are serialized only by the backend.
    pub(crate) async fn cast_vote_at(
        &self,
        vote_id: &str,
        citizen_id: &str,
        choice: Choice,
        now: DateTime<Utc>,
    ) -> Result<Ballot, ServiceError> {
        let citizen_id = require_id(Some(citizen_id), "citizen_id")?;
        let vote = self.find_vote(vote_id).await?;
        vote.ensure_open()?;

        let citizen = self
            .citizens
            .find_by_id(&citizen_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Citizen {citizen_id} not found")))?;
        let age = citizen.age_on(now.date_naive());
        if !vote.admits_age(age) {
            return Err(ServiceError::invalid_state(format!(
                "Citizen {citizen_id} is too young for vote {} (minimum age {})",
                vote.id, vote.minimum_age
            )));
        }

        if self.policy.enforce_deadline && vote.deadline_passed(now.date_naive()) {
            return Err(ServiceError::invalid_state(format!(
                "Vote {} closed on {}",
                vote.id, vote.deadline
            )));
        }

        if self.policy.reject_duplicate_ballots {
            let ballots = self.repository.ballots_for_vote(&vote.id).await?;
            if ballots.iter().any(|ballot| ballot.citizen_id == citizen_id) {
                return Err(ServiceError::invalid_state(format!(
                    "Citizen {citizen_id} has already voted on vote {}",
                    vote.id
                )));
            }
        }

        let ballot = Ballot::new(vote.id, citizen_id, choice, now);
        self.repository.record_ballot(ballot.clone()).await?;
        info!(
            vote_id = %ballot.vote_id,
            citizen_id = %ballot.citizen_id,
            choice = ballot.choice.as_str(),
            "ballot recorded"
        );
        Ok(ballot)
    }

    pub async fn ballots_for_vote(&self, vote_id: &str) -> Result<Vec<Ballot>, ServiceError> {
        let vote = self.find_vote(vote_id).await?;
        Ok(self.repository.ballots_for_vote(&vote.id).await?)
    }

    /// Counts every recorded ballot of the vote, whatever its status.
    pub async fn results(&self, vote_id: &str) -> Result<VoteResults, ServiceError> {
        let ballots = self.ballots_for_vote(vote_id).await?;
        let results = VoteResults::count(vote_id, &ballots);
        debug!(vote_id, total = results.total, "results counted");
        Ok(results)
    }

    /// Votes the citizen has cast a ballot on, each listed once. Votes removed
    /// since are skipped.
    pub async fn votes_cast_by(&self, citizen_id: &str) -> Result<Vec<Vote>, ServiceError> {
        let ballots = self.repository.ballots_for_citizen(citizen_id).await?;
        let mut seen = HashSet::new();
        let mut votes = Vec::new();
        for ballot in ballots {
            if !seen.insert(ballot.vote_id.clone()) {
                continue;
            }
            match self.repository.find_by_id(&ballot.vote_id).await? {
                Some(vote) => votes.push(vote),
                None => debug!(vote_id = %ballot.vote_id, "skipping ballot for removed vote"),
            }
        }
        Ok(votes)
    }

    pub async fn ping(&self) -> Result<(), ServiceError> {
        Ok(self.repository.ping().await?)
    }
}
