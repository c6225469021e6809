use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::RepositoryError;
use crate::models::ballot::Ballot;
use crate::models::citizen::Citizen;
use crate::models::vote::{Vote, VoteChanges};

use super::{CitizenRepository, VoteRepository};

/// Votes and ballots kept in insertion order.
#[derive(Debug, Default)]
pub struct MemoryVoteRepository {
    votes: RwLock<Vec<Vote>>,
    ballots: RwLock<Vec<Ballot>>,
}

#[async_trait]
impl VoteRepository for MemoryVoteRepository {
    async fn save(&self, vote: Vote) -> Result<(), RepositoryError> {
        let mut votes = self.votes.write().await;
        if votes.iter().any(|existing| existing.id == vote.id) {
            return Err(RepositoryError::Conflict(format!(
                "Vote {} already exists",
                vote.id
            )));
        }
        votes.push(vote);
        Ok(())
    }

    async fn find_by_id(&self, vote_id: &str) -> Result<Option<Vote>, RepositoryError> {
        let votes = self.votes.read().await;
        Ok(votes.iter().find(|vote| vote.id == vote_id).cloned())
    }

    async fn update(
        &self,
        vote_id: &str,
        changes: VoteChanges,
    ) -> Result<Option<Vote>, RepositoryError> {
        let mut votes = self.votes.write().await;
        let Some(vote) = votes.iter_mut().find(|vote| vote.id == vote_id) else {
            return Ok(None);
        };
        vote.apply(changes);
        Ok(Some(vote.clone()))
    }

    async fn delete(&self, vote_id: &str) -> Result<bool, RepositoryError> {
        let mut votes = self.votes.write().await;
        let before = votes.len();
        votes.retain(|vote| vote.id != vote_id);
        Ok(votes.len() < before)
    }

    async fn list_all(&self) -> Result<Vec<Vote>, RepositoryError> {
        Ok(self.votes.read().await.clone())
    }

    async fn record_ballot(&self, ballot: Ballot) -> Result<(), RepositoryError> {
        self.ballots.write().await.push(ballot);
        Ok(())
    }

    async fn ballots_for_vote(&self, vote_id: &str) -> Result<Vec<Ballot>, RepositoryError> {
        let ballots = self.ballots.read().await;
        Ok(ballots
            .iter()
            .filter(|ballot| ballot.vote_id == vote_id)
            .cloned()
            .collect())
    }

    async fn ballots_for_citizen(&self, citizen_id: &str) -> Result<Vec<Ballot>, RepositoryError> {
        let ballots = self.ballots.read().await;
        Ok(ballots
            .iter()
            .filter(|ballot| ballot.citizen_id == citizen_id)
            .cloned()
            .collect())
    }
}

#[derive(Debug, Default)]
pub struct MemoryCitizenRepository {
    citizens: RwLock<Vec<Citizen>>,
}

#[async_trait]
impl CitizenRepository for MemoryCitizenRepository {
    async fn save(&self, citizen: Citizen) -> Result<(), RepositoryError> {
        let mut citizens = self.citizens.write().await;
        if citizens.iter().any(|existing| existing.id == citizen.id) {
            return Err(RepositoryError::Conflict(format!(
                "Citizen {} already exists",
                citizen.id
            )));
        }
        if citizens.iter().any(|existing| existing.email == citizen.email) {
            return Err(RepositoryError::Conflict(format!(
                "Email {} is already registered",
                citizen.email
            )));
        }
        citizens.push(citizen);
        Ok(())
    }

    async fn find_by_id(&self, citizen_id: &str) -> Result<Option<Citizen>, RepositoryError> {
        let citizens = self.citizens.read().await;
        Ok(citizens
            .iter()
            .find(|citizen| citizen.id == citizen_id)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Citizen>, RepositoryError> {
        let citizens = self.citizens.read().await;
        Ok(citizens
            .iter()
            .find(|citizen| citizen.email == email)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::*;
    use crate::models::ballot::Choice;
    use crate::models::citizen::{Role, Verification};
    use crate::models::vote::VoteStatus;

    fn vote(id: &str) -> Vote {
        Vote {
            id: id.into(),
            title: "Schulreform".into(),
            description: "Soll die neue Schulreform eingeführt werden?".into(),
            deadline: NaiveDate::from_ymd_opt(2024, 2, 28).unwrap(),
            minimum_age: 16,
            status: VoteStatus::Active,
        }
    }

    #[tokio::test]
    async fn vote_crud() {
        let repository = MemoryVoteRepository::default();
        repository.save(vote("1")).await.unwrap();
        repository.save(vote("2")).await.unwrap();

        let conflict = repository.save(vote("1")).await;
        assert!(matches!(conflict, Err(RepositoryError::Conflict(_))));

        let updated = repository
            .update("2", VoteChanges::status(VoteStatus::Closed))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, VoteStatus::Closed);
        assert!(
            repository
                .update("9", VoteChanges::status(VoteStatus::Closed))
                .await
                .unwrap()
                .is_none()
        );

        assert!(repository.delete("1").await.unwrap());
        assert!(!repository.delete("1").await.unwrap());
        let remaining = repository.list_all().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "2");
    }

    #[tokio::test]
    async fn ballots_filter_by_vote_and_citizen() {
        let repository = MemoryVoteRepository::default();
        let now = Utc::now();
        repository.record_ballot(Ballot::new("1", "a", Choice::Yes, now)).await.unwrap();
        repository.record_ballot(Ballot::new("1", "b", Choice::No, now)).await.unwrap();
        repository.record_ballot(Ballot::new("2", "a", Choice::Yes, now)).await.unwrap();

        assert_eq!(repository.ballots_for_vote("1").await.unwrap().len(), 2);
        assert_eq!(repository.ballots_for_citizen("a").await.unwrap().len(), 2);
        assert!(repository.ballots_for_citizen("c").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn citizen_email_is_unique() {
        let repository = MemoryCitizenRepository::default();
        let citizen = Citizen {
            id: "b-1".into(),
            first_name: "Anna".into(),
            last_name: "Meier".into(),
            birthdate: NaiveDate::from_ymd_opt(1990, 5, 1).unwrap(),
            address: "Hauptstr. 1".into(),
            postal_code: "10115".into(),
            email: "anna@example.de".into(),
            password_hash: "hash".into(),
            role: Role::Citizen,
            verification: Verification::Pending,
        };
        repository.save(citizen.clone()).await.unwrap();

        let mut same_email = citizen.clone();
        same_email.id = "b-2".into();
        assert!(matches!(
            repository.save(same_email).await,
            Err(RepositoryError::Conflict(_))
        ));

        let found = repository.find_by_email("anna@example.de").await.unwrap();
        assert_eq!(found, Some(citizen));
        assert!(repository.find_by_id("b-2").await.unwrap().is_none());
    }
}
