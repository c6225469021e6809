use chrono::{NaiveDate, Utc};

use crate::error::ServiceError;
use crate::models::ballot::{BallotView, Choice, VoteResults};
use crate::models::reply::Reply;
use crate::models::vote::{VoteCreateRequest, VoteUpdateRequest, VoteView};
use crate::service::{CitizenService, VoteService};

use super::intercept;

#[derive(Clone)]
pub struct VoteController {
    votes: VoteService,
    citizens: CitizenService,
}

impl VoteController {
    pub fn new(votes: VoteService, citizens: CitizenService) -> Self {
        Self { votes, citizens }
    }

    pub async fn create_vote(&self, request: VoteCreateRequest) -> Reply {
        intercept("create_vote", async {
            let vote = request.into_vote()?;
            self.votes.create_vote(vote).await?;
            Ok::<_, ServiceError>(Reply::message("Vote created successfully"))
        })
        .await
    }

    pub async fn find_vote(&self, vote_id: &str) -> Reply<VoteView> {
        intercept("find_vote", async {
            let vote = self.votes.find_vote(vote_id).await?;
            Ok::<_, ServiceError>(Reply::Data(VoteView::from(&vote)))
        })
        .await
    }

    pub async fn update_vote(&self, vote_id: &str, request: VoteUpdateRequest) -> Reply {
        intercept("update_vote", async {
            let changes = request.into_changes()?;
            self.votes.update_vote(vote_id, changes).await?;
            let message = format!("Vote {vote_id} updated successfully");
            Ok::<_, ServiceError>(Reply::message(message))
        })
        .await
    }

    pub async fn remove_vote(&self, vote_id: &str) -> Reply {
        intercept("remove_vote", async {
            self.votes.remove_vote(vote_id).await?;
            let message = format!("Vote {vote_id} removed successfully");
            Ok::<_, ServiceError>(Reply::message(message))
        })
        .await
    }

    pub async fn list_votes(&self) -> Reply<Vec<VoteView>> {
        intercept("list_votes", async {
            let votes = self.votes.list_votes().await?;
            let views = votes.iter().map(VoteView::from).collect::<Vec<_>>();
            Ok::<_, ServiceError>(Reply::Data(views))
        })
        .await
    }

    /// Votes the authenticated citizen is old enough for, in repository order.
    pub async fn list_votes_for_citizen(
        &self,
        email: &str,
        password: &str,
    ) -> Reply<Vec<VoteView>> {
        self.list_votes_for_citizen_on(email, password, Utc::now().date_naive())
            .await
    }

    pub(crate) async fn list_votes_for_citizen_on(
        &self,
        email: &str,
        password: &str,
        today: NaiveDate,
    ) -> Reply<Vec<VoteView>> {
        intercept("list_votes_for_citizen", async {
            let citizen = self.citizens.authenticate(email, password).await?;
            let age = citizen.age_on(today);
            let votes = self.votes.list_votes().await?;
            let eligible = votes
                .iter()
                .filter(|vote| vote.admits_age(age))
                .map(VoteView::from)
                .collect::<Vec<_>>();
            Ok::<_, ServiceError>(Reply::Data(eligible))
        })
        .await
    }

    pub async fn cast_vote(
        &self,
        vote_id: &str,
        citizen_id: &str,
        choice: Option<&str>,
    ) -> Reply {
        intercept("cast_vote", async {
            let choice = Choice::from_field(choice)?;
            // Boundary re-check; the service applies the same rule again.
            let vote = self.votes.find_vote(vote_id).await?;
            vote.ensure_open()?;
            self.votes.cast_vote(&vote.id, citizen_id, choice).await?;
            Ok::<_, ServiceError>(Reply::message("Vote cast successfully"))
        })
        .await
    }

    pub async fn ballots_for_vote(&self, vote_id: &str) -> Reply<Vec<BallotView>> {
        intercept("ballots_for_vote", async {
            let ballots = self.votes.ballots_for_vote(vote_id).await?;
            let views = ballots.iter().map(BallotView::from).collect::<Vec<_>>();
            Ok::<_, ServiceError>(Reply::Data(views))
        })
        .await
    }

    pub async fn results(&self, vote_id: &str) -> Reply<VoteResults> {
        intercept("results", async {
            let results = self.votes.results(vote_id).await?;
            Ok::<_, ServiceError>(Reply::Data(results))
        })
        .await
    }

    pub async fn votes_for_citizen(&self, citizen_id: &str) -> Reply<Vec<VoteView>> {
        intercept("votes_for_citizen", async {
            let votes = self.votes.votes_cast_by(citizen_id).await?;
            let views = votes.iter().map(VoteView::from).collect::<Vec<_>>();
            Ok::<_, ServiceError>(Reply::Data(views))
        })
        .await
    }

    pub async fn storage_ready(&self) -> Result<(), ServiceError> {
        self.votes.ping().await
    }
}
