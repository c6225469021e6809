use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// What a citizen answered on a vote ("Stimme").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    #[serde(alias = "ja")]
    Yes,
    #[serde(alias = "nein")]
    No,
}

impl Choice {
    pub const ALL: [Choice; 2] = [Choice::Yes, Choice::No];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "yes" | "ja" => Some(Self::Yes),
            "no" | "nein" => Some(Self::No),
            _ => None,
        }
    }

    pub fn from_field(value: Option<&str>) -> Result<Self, ServiceError> {
        let raw = value.ok_or_else(|| ServiceError::validation("choice is required"))?;
        Self::parse(raw).ok_or_else(|| {
            ServiceError::validation(format!("choice must be yes or no (got {})", raw.trim()))
        })
    }
}

/// One recorded ballot of a citizen in a vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ballot {
    pub vote_id: String,
    pub citizen_id: String,
    pub choice: Choice,
    pub cast_at: DateTime<Utc>,
}

impl Ballot {
    pub fn new(
        vote_id: impl Into<String>,
        citizen_id: impl Into<String>,
        choice: Choice,
        cast_at: DateTime<Utc>,
    ) -> Self {
        Self {
            vote_id: vote_id.into(),
            citizen_id: citizen_id.into(),
            choice,
            cast_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BallotView {
    pub vote_id: String,
    pub citizen_id: String,
    pub choice: Choice,
    pub cast_at: String,
}

impl From<&Ballot> for BallotView {
    fn from(ballot: &Ballot) -> Self {
        Self {
            vote_id: ballot.vote_id.clone(),
            citizen_id: ballot.citizen_id.clone(),
            choice: ballot.choice,
            cast_at: ballot.cast_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChoiceTally {
    pub choice: Choice,
    pub count: u64,
}

/// Ballot counts of one vote ("Ergebnis"). Every choice is listed, including
/// those nobody picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteResults {
    pub vote_id: String,
    pub total: u64,
    pub tallies: Vec<ChoiceTally>,
}

impl VoteResults {
    pub fn count(vote_id: impl Into<String>, ballots: &[Ballot]) -> Self {
        let tallies = Choice::ALL
            .iter()
            .map(|&choice| ChoiceTally {
                choice,
                count: ballots.iter().filter(|ballot| ballot.choice == choice).count() as u64,
            })
            .collect::<Vec<_>>();
        Self {
            vote_id: vote_id.into(),
            total: ballots.len() as u64,
            tallies,
        }
    }

    #[cfg(test)]
    pub fn count_for(&self, choice: Choice) -> u64 {
        self.tallies
            .iter()
            .find(|tally| tally.choice == choice)
            .map_or(0, |tally| tally.count)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn german_choices_are_accepted() {
        assert_eq!(Choice::parse("Ja"), Some(Choice::Yes));
        assert_eq!(Choice::parse(" nein "), Some(Choice::No));
        assert_eq!(Choice::parse("vielleicht"), None);
        assert!(matches!(
            Choice::from_field(None),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn results_count_every_choice() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        let ballots = [
            Ballot::new("2", "a", Choice::Yes, now),
            Ballot::new("2", "b", Choice::Yes, now),
            Ballot::new("2", "c", Choice::Yes, now),
        ];
        let results = VoteResults::count("2", &ballots);
        assert_eq!(results.total, 3);
        assert_eq!(results.count_for(Choice::Yes), 3);
        assert_eq!(results.count_for(Choice::No), 0);
        assert_eq!(results.tallies.len(), Choice::ALL.len());

        let empty = VoteResults::count("3", &[]);
        assert_eq!(empty.total, 0);
        assert!(empty.tallies.iter().all(|tally| tally.count == 0));
    }
}
