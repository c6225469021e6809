use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::validation::{
    MAX_DESCRIPTION_LEN, MAX_TITLE_LEN, format_date, optional_text, parse_date,
    parse_minimum_age, require_id, require_text,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteStatus {
    #[serde(alias = "entwurf")]
    Draft,
    #[serde(alias = "aktiv")]
    Active,
    #[serde(alias = "geschlossen")]
    Closed,
}

impl VoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Closed => "closed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" | "entwurf" => Some(Self::Draft),
            "active" | "aktiv" => Some(Self::Active),
            "closed" | "geschlossen" => Some(Self::Closed),
            _ => None,
        }
    }

    fn from_field(value: &str) -> Result<Self, ServiceError> {
        Self::parse(value).ok_or_else(|| {
            ServiceError::validation(format!(
                "status must be one of draft, active, closed (got {})",
                value.trim()
            ))
        })
    }
}

/// A ballot item ("Abstimmung").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Voting closes after this date ("Frist").
    pub deadline: NaiveDate,
    /// Citizens younger than this never see or vote on it ("Altersgrenze").
    pub minimum_age: u32,
    pub status: VoteStatus,
}

impl Vote {
    /// Fails unless the vote currently accepts ballots. Every layer that
    /// gates casting goes through here.
    pub fn ensure_open(&self) -> Result<(), ServiceError> {
        if self.status != VoteStatus::Active {
            return Err(ServiceError::invalid_state(format!(
                "Vote {} is not active",
                self.id
            )));
        }
        Ok(())
    }

    pub fn admits_age(&self, age: u32) -> bool {
        self.minimum_age <= age
    }

    pub fn deadline_passed(&self, today: NaiveDate) -> bool {
        today > self.deadline
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        require_id(Some(&self.id), "id")?;
        require_text(Some(&self.title), "title", MAX_TITLE_LEN)?;
        require_text(Some(&self.description), "description", MAX_DESCRIPTION_LEN)?;
        parse_minimum_age(i64::from(self.minimum_age))?;
        Ok(())
    }

    pub fn apply(&mut self, changes: VoteChanges) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(deadline) = changes.deadline {
            self.deadline = deadline;
        }
        if let Some(minimum_age) = changes.minimum_age {
            self.minimum_age = minimum_age;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
    }
}

/// Partial update of a vote. The id is never part of it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub minimum_age: Option<u32>,
    pub status: Option<VoteStatus>,
}

impl VoteChanges {
    #[cfg(test)]
    pub fn status(status: VoteStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.deadline.is_none()
            && self.minimum_age.is_none()
            && self.status.is_none()
    }
}

/// Field map accepted when creating a vote. Every field is optional at the
/// wire level so that missing fields surface as validation failures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoteCreateRequest {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<String>,
    pub minimum_age: Option<i64>,
    pub status: Option<String>,
}

impl VoteCreateRequest {
    pub fn into_vote(self) -> Result<Vote, ServiceError> {
        let id = require_id(self.id.as_deref(), "id")?;
        let title = require_text(self.title.as_deref(), "title", MAX_TITLE_LEN)?;
        let description = require_text(
            self.description.as_deref(),
            "description",
            MAX_DESCRIPTION_LEN,
        )?;
        let deadline = parse_date(
            &require_text(self.deadline.as_deref(), "deadline", 10)?,
            "deadline",
        )?;
        let minimum_age = parse_minimum_age(
            self.minimum_age
                .ok_or_else(|| ServiceError::validation("minimum_age is required"))?,
        )?;
        let status = VoteStatus::from_field(&require_text(self.status.as_deref(), "status", 16)?)?;

        Ok(Vote {
            id,
            title,
            description,
            deadline,
            minimum_age,
            status,
        })
    }
}

/// Field map accepted when updating a vote.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VoteUpdateRequest {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<String>,
    pub minimum_age: Option<i64>,
    pub status: Option<String>,
}

impl VoteUpdateRequest {
    pub fn into_changes(self) -> Result<VoteChanges, ServiceError> {
        if self.id.is_some() {
            return Err(ServiceError::validation("id cannot be changed"));
        }
        let changes = VoteChanges {
            title: optional_text(self.title.as_deref(), "title", MAX_TITLE_LEN)?,
            description: optional_text(
                self.description.as_deref(),
                "description",
                MAX_DESCRIPTION_LEN,
            )?,
            deadline: self
                .deadline
                .as_deref()
                .map(|raw| parse_date(raw, "deadline"))
                .transpose()?,
            minimum_age: self.minimum_age.map(parse_minimum_age).transpose()?,
            status: self
                .status
                .as_deref()
                .map(VoteStatus::from_field)
                .transpose()?,
        };
        Ok(changes)
    }
}

/// Outward representation of a vote with the deadline as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub deadline: String,
    pub minimum_age: u32,
    pub status: VoteStatus,
}

impl From<&Vote> for VoteView {
    fn from(vote: &Vote) -> Self {
        Self {
            id: vote.id.clone(),
            title: vote.title.clone(),
            description: vote.description.clone(),
            deadline: format_date(vote.deadline),
            minimum_age: vote.minimum_age,
            status: vote.status,
        }
    }
}
