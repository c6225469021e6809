use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, SqlErr,
};

use crate::entities::{ballot, citizen, vote};
use crate::error::RepositoryError;
use crate::models::ballot::{Ballot, Choice};
use crate::models::citizen::{Citizen, Role, Verification};
use crate::models::vote::{Vote, VoteChanges, VoteStatus};

use super::{CitizenRepository, VoteRepository};

#[derive(Clone)]
pub struct PgVoteRepository {
    database: DatabaseConnection,
}

impl PgVoteRepository {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }
}

#[async_trait]
impl VoteRepository for PgVoteRepository {
    async fn save(&self, vote: Vote) -> Result<(), RepositoryError> {
        let id = vote.id.clone();
        vote::Entity::insert(vote_active_model(&vote)?)
            .exec_without_returning(&self.database)
            .await
            .map_err(|err| map_unique_violation(err, || format!("Vote {id} already exists")))?;
        Ok(())
    }

    async fn find_by_id(&self, vote_id: &str) -> Result<Option<Vote>, RepositoryError> {
        vote::Entity::find_by_id(vote_id.to_owned())
            .one(&self.database)
            .await?
            .map(vote_from_model)
            .transpose()
    }

    async fn update(
        &self,
        vote_id: &str,
        changes: VoteChanges,
    ) -> Result<Option<Vote>, RepositoryError> {
        let Some(mut current) = self.find_by_id(vote_id).await? else {
            return Ok(None);
        };
        current.apply(changes);
        vote_active_model(&current)?.update(&self.database).await?;
        Ok(Some(current))
    }

    async fn delete(&self, vote_id: &str) -> Result<bool, RepositoryError> {
        let result = vote::Entity::delete_by_id(vote_id.to_owned())
            .exec(&self.database)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn list_all(&self) -> Result<Vec<Vote>, RepositoryError> {
        vote::Entity::find()
            .all(&self.database)
            .await?
            .into_iter()
            .map(vote_from_model)
            .collect()
    }

    async fn record_ballot(&self, ballot: Ballot) -> Result<(), RepositoryError> {
        let model = ballot::ActiveModel {
            id: NotSet,
            vote_id: Set(ballot.vote_id),
            citizen_id: Set(ballot.citizen_id),
            choice: Set(ballot.choice.as_str().to_string()),
            cast_at: Set(ballot.cast_at.fixed_offset()),
        };
        model.insert(&self.database).await?;
        Ok(())
    }

    async fn ballots_for_vote(&self, vote_id: &str) -> Result<Vec<Ballot>, RepositoryError> {
        let ballots = ballot::Entity::find()
            .filter(ballot::Column::VoteId.eq(vote_id))
            .order_by_asc(ballot::Column::CastAt)
            .all(&self.database)
            .await?;
        ballots.into_iter().map(ballot_from_model).collect()
    }

    async fn ballots_for_citizen(&self, citizen_id: &str) -> Result<Vec<Ballot>, RepositoryError> {
        let ballots = ballot::Entity::find()
            .filter(ballot::Column::CitizenId.eq(citizen_id))
            .order_by_asc(ballot::Column::CastAt)
            .all(&self.database)
            .await?;
        ballots.into_iter().map(ballot_from_model).collect()
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.database.ping().await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgCitizenRepository {
    database: DatabaseConnection,
}

impl PgCitizenRepository {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }
}

#[async_trait]
impl CitizenRepository for PgCitizenRepository {
    async fn save(&self, citizen: Citizen) -> Result<(), RepositoryError> {
        let id = citizen.id.clone();
        let model = citizen::ActiveModel {
            citizen_id: Set(citizen.id),
            first_name: Set(citizen.first_name),
            last_name: Set(citizen.last_name),
            birthdate: Set(citizen.birthdate),
            address: Set(citizen.address),
            postal_code: Set(citizen.postal_code),
            email: Set(citizen.email),
            password_hash: Set(citizen.password_hash),
            role: Set(citizen.role.as_str().to_string()),
            verification: Set(citizen.verification.as_str().to_string()),
        };
        citizen::Entity::insert(model)
            .exec_without_returning(&self.database)
            .await
            .map_err(|err| {
                map_unique_violation(err, || {
                    format!("Citizen {id} or its email is already registered")
                })
            })?;
        Ok(())
    }

    async fn find_by_id(&self, citizen_id: &str) -> Result<Option<Citizen>, RepositoryError> {
        citizen::Entity::find_by_id(citizen_id.to_owned())
            .one(&self.database)
            .await?
            .map(citizen_from_model)
            .transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Citizen>, RepositoryError> {
        citizen::Entity::find()
            .filter(citizen::Column::Email.eq(email))
            .one(&self.database)
            .await?
            .map(citizen_from_model)
            .transpose()
    }
}

fn vote_active_model(vote: &Vote) -> Result<vote::ActiveModel, RepositoryError> {
    let minimum_age = i32::try_from(vote.minimum_age).map_err(|_| {
        RepositoryError::Corrupt(format!("minimum age of vote {} exceeds i32", vote.id))
    })?;
    Ok(vote::ActiveModel {
        vote_id: Set(vote.id.clone()),
        title: Set(vote.title.clone()),
        description: Set(vote.description.clone()),
        deadline: Set(vote.deadline),
        minimum_age: Set(minimum_age),
        status: Set(vote.status.as_str().to_string()),
    })
}

fn vote_from_model(model: vote::Model) -> Result<Vote, RepositoryError> {
    let status = VoteStatus::parse(&model.status).ok_or_else(|| {
        RepositoryError::Corrupt(format!(
            "vote {} has unknown status {}",
            model.vote_id, model.status
        ))
    })?;
    let minimum_age = u32::try_from(model.minimum_age).map_err(|_| {
        RepositoryError::Corrupt(format!("vote {} has a negative minimum age", model.vote_id))
    })?;
    Ok(Vote {
        id: model.vote_id,
        title: model.title,
        description: model.description,
        deadline: model.deadline,
        minimum_age,
        status,
    })
}

fn citizen_from_model(model: citizen::Model) -> Result<Citizen, RepositoryError> {
    let role = Role::parse(&model.role).ok_or_else(|| {
        RepositoryError::Corrupt(format!(
            "citizen {} has unknown role {}",
            model.citizen_id, model.role
        ))
    })?;
    let verification = Verification::parse(&model.verification).ok_or_else(|| {
        RepositoryError::Corrupt(format!(
            "citizen {} has unknown verification status {}",
            model.citizen_id, model.verification
        ))
    })?;
    Ok(Citizen {
        id: model.citizen_id,
        first_name: model.first_name,
        last_name: model.last_name,
        birthdate: model.birthdate,
        address: model.address,
        postal_code: model.postal_code,
        email: model.email,
        password_hash: model.password_hash,
        role,
        verification,
    })
}

fn ballot_from_model(model: ballot::Model) -> Result<Ballot, RepositoryError> {
    let choice = Choice::parse(&model.choice).ok_or_else(|| {
        RepositoryError::Corrupt(format!(
            "ballot {} has unknown choice {}",
            model.id, model.choice
        ))
    })?;
    Ok(Ballot {
        vote_id: model.vote_id,
        citizen_id: model.citizen_id,
        choice,
        cast_at: model.cast_at.with_timezone(&Utc),
    })
}

fn map_unique_violation(err: DbErr, message: impl FnOnce() -> String) -> RepositoryError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => RepositoryError::Conflict(message()),
        _ => RepositoryError::Database(err),
    }
}
