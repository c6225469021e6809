//! Storage contracts for votes, ballots and citizens.
//!
//! Services only see the traits below. Two backends implement them:
//! - [`memory`]: owned, lock-protected vectors, used for local runs and tests
//! - [`postgres`]: SeaORM tables created by the `migration` crate

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::error::RepositoryError;
use crate::models::ballot::Ballot;
use crate::models::citizen::Citizen;
use crate::models::vote::{Vote, VoteChanges};

pub mod memory;
pub mod postgres;

#[async_trait]
pub trait VoteRepository: Send + Sync {
    /// Fails with [`RepositoryError::Conflict`] when the id is taken.
    async fn save(&self, vote: Vote) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, vote_id: &str) -> Result<Option<Vote>, RepositoryError>;

    /// Returns the updated vote, or `None` when no vote has this id.
    async fn update(
        &self,
        vote_id: &str,
        changes: VoteChanges,
    ) -> Result<Option<Vote>, RepositoryError>;

    /// Returns whether a vote was removed.
    async fn delete(&self, vote_id: &str) -> Result<bool, RepositoryError>;

    /// No ordering is guaranteed.
    async fn list_all(&self) -> Result<Vec<Vote>, RepositoryError>;

    async fn record_ballot(&self, ballot: Ballot) -> Result<(), RepositoryError>;

    async fn ballots_for_vote(&self, vote_id: &str) -> Result<Vec<Ballot>, RepositoryError>;

    async fn ballots_for_citizen(&self, citizen_id: &str) -> Result<Vec<Ballot>, RepositoryError>;

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[async_trait]
pub trait CitizenRepository: Send + Sync {
    /// Fails with [`RepositoryError::Conflict`] when the id or email is taken.
    async fn save(&self, citizen: Citizen) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, citizen_id: &str) -> Result<Option<Citizen>, RepositoryError>;

    /// `email` must already be normalized.
    async fn find_by_email(&self, email: &str) -> Result<Option<Citizen>, RepositoryError>;
}

/// The pair of repositories a running server works against.
#[derive(Clone)]
pub struct Repositories {
    pub votes: Arc<dyn VoteRepository>,
    pub citizens: Arc<dyn CitizenRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            votes: Arc::new(memory::MemoryVoteRepository::default()),
            citizens: Arc::new(memory::MemoryCitizenRepository::default()),
        }
    }

    pub fn postgres(database: DatabaseConnection) -> Self {
        Self {
            votes: Arc::new(postgres::PgVoteRepository::new(database.clone())),
            citizens: Arc::new(postgres::PgCitizenRepository::new(database)),
        }
    }
}
