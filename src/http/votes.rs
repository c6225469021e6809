use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::models::ballot::{BallotView, VoteResults};
use crate::models::citizen::Credentials;
use crate::models::reply::Reply;
use crate::models::vote::{VoteCreateRequest, VoteUpdateRequest, VoteView};
use crate::state::AppState;

use super::{created, json_body};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_votes).post(create_vote))
        .route("/eligible", post(eligible_votes))
        .route(
            "/{vote_id}",
            get(get_vote).patch(update_vote).delete(remove_vote),
        )
        .route("/{vote_id}/ballots", get(list_ballots).post(cast_ballot))
        .route("/{vote_id}/results", get(vote_results))
}

#[derive(Debug, Deserialize)]
struct BallotRequest {
    citizen_id: String,
    choice: Option<String>,
}

async fn list_votes(State(state): State<AppState>) -> Reply<Vec<VoteView>> {
    state.votes.list_votes().await
}

async fn create_vote(
    State(state): State<AppState>,
    payload: Result<Json<VoteCreateRequest>, JsonRejection>,
) -> Response {
    match json_body(payload) {
        Ok(request) => created(state.votes.create_vote(request).await),
        Err(rejected) => rejected,
    }
}

async fn eligible_votes(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Response {
    match json_body(payload) {
        Ok(credentials) => state
            .votes
            .list_votes_for_citizen(&credentials.email, &credentials.password)
            .await
            .into_response(),
        Err(rejected) => rejected,
    }
}

async fn get_vote(
    Path(vote_id): Path<String>,
    State(state): State<AppState>,
) -> Reply<VoteView> {
    if let Some(cached) = state.cache.votes.get(&vote_id).await {
        return Reply::Data((*cached).clone());
    }

    let seen = state.cache.generation();
    let reply = state.votes.find_vote(&vote_id).await;
    if let Some(view) = reply.data() {
        state.cache.store_vote(vote_id, view.clone(), seen).await;
    }
    reply
}

async fn update_vote(
    Path(vote_id): Path<String>,
    State(state): State<AppState>,
    payload: Result<Json<VoteUpdateRequest>, JsonRejection>,
) -> Response {
    let request = match json_body(payload) {
        Ok(request) => request,
        Err(rejected) => return rejected,
    };
    let reply = state.votes.update_vote(&vote_id, request).await;
    state.cache.invalidate_vote(&vote_id).await;
    reply.into_response()
}

async fn remove_vote(Path(vote_id): Path<String>, State(state): State<AppState>) -> Reply {
    let reply = state.votes.remove_vote(&vote_id).await;
    state.cache.invalidate_vote(&vote_id).await;
    reply
}

async fn list_ballots(
    Path(vote_id): Path<String>,
    State(state): State<AppState>,
) -> Reply<Vec<BallotView>> {
    state.votes.ballots_for_vote(&vote_id).await
}

async fn cast_ballot(
    Path(vote_id): Path<String>,
    State(state): State<AppState>,
    payload: Result<Json<BallotRequest>, JsonRejection>,
) -> Response {
    match json_body(payload) {
        Ok(request) => created(
            state
                .votes
                .cast_vote(&vote_id, &request.citizen_id, request.choice.as_deref())
                .await,
        ),
        Err(rejected) => rejected,
    }
}

async fn vote_results(
    Path(vote_id): Path<String>,
    State(state): State<AppState>,
) -> Reply<VoteResults> {
    state.votes.results(&vote_id).await
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::http::{Method, StatusCode};
    use serde_json::{Value, json};

    use crate::http::tests::{send, test_router};

    fn park_vote(status: &str) -> Value {
        json!({
            "id": "1",
            "title": "Neue Parkanlage",
            "description": "Soll eine neue Parkanlage im Stadtzentrum gebaut werden?",
            "deadline": "2024-01-31",
            "minimum_age": 18,
            "status": status,
        })
    }

    async fn register(router: &Router, id: &str, birthdate: &str) {
        let (status, _) = send(
            router,
            Method::POST,
            "/citizens",
            Some(json!({
                "id": id,
                "first_name": "Anna",
                "last_name": "Meier",
                "birthdate": birthdate,
                "address": "Hauptstr. 1",
                "postal_code": "10115",
                "email": format!("{id}@example.de"),
                "password": "geheim-genug",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn create_and_fetch_vote() {
        let router = test_router();
        let (status, body) =
            send(&router, Method::POST, "/votes", Some(park_vote("active"))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(
            body,
            json!({"status": "success", "message": "Vote created successfully"})
        );

        let (status, body) = send(&router, Method::GET, "/votes/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["deadline"], "2024-01-31");
        assert_eq!(body["data"]["status"], "active");

        let (_, body) = send(&router, Method::GET, "/votes", None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_vote_is_bad_request() {
        let router = test_router();
        let mut vote = park_vote("active");
        vote["deadline"] = json!("31.01.2024");
        let (status, body) = send(&router, Method::POST, "/votes", Some(vote)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "failure");
    }

    #[tokio::test]
    async fn vote_ids_stay_single_path_segments() {
        let router = test_router();
        for id in ["a/b", "..", "park anlage"] {
            let mut vote = park_vote("active");
            vote["id"] = json!(id);
            let (status, body) = send(&router, Method::POST, "/votes", Some(vote)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["status"], "failure");
        }
        let (_, body) = send(&router, Method::GET, "/votes", None).await;
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_is_visible_despite_cache() {
        let router = test_router();
        send(&router, Method::POST, "/votes", Some(park_vote("draft"))).await;
        let (_, body) = send(&router, Method::GET, "/votes/1", None).await;
        assert_eq!(body["data"]["status"], "draft");

        let (status, body) = send(
            &router,
            Method::PATCH,
            "/votes/1",
            Some(json!({"status": "active"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Vote 1 updated successfully");

        let (_, body) = send(&router, Method::GET, "/votes/1", None).await;
        assert_eq!(body["data"]["status"], "active");

        let (status, _) = send(&router, Method::DELETE, "/votes/1", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = send(&router, Method::GET, "/votes/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Vote 1 not found");
    }

    #[tokio::test]
    async fn update_rejects_id_and_unknown_fields() {
        let router = test_router();
        send(&router, Method::POST, "/votes", Some(park_vote("draft"))).await;

        for patch in [json!({"id": "2"}), json!({"colour": "green"}), json!({})] {
            let (status, body) = send(&router, Method::PATCH, "/votes/1", Some(patch)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["status"], "failure");
        }
    }

    #[tokio::test]
    async fn ballots_on_closed_votes_conflict() {
        let router = test_router();
        send(&router, Method::POST, "/votes", Some(park_vote("active"))).await;
        register(&router, "b-1", "1990-05-01").await;

        let ballot = json!({"citizen_id": "b-1", "choice": "yes"});
        let (status, _) = send(
            &router,
            Method::POST,
            "/votes/1/ballots",
            Some(ballot.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        send(
            &router,
            Method::PATCH,
            "/votes/1",
            Some(json!({"status": "closed"})),
        )
        .await;
        let (status, body) = send(&router, Method::POST, "/votes/1/ballots", Some(ballot)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["status"], "failure");

        let (_, body) = send(&router, Method::GET, "/votes/1/ballots", None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["citizen_id"], "b-1");
    }

    #[tokio::test]
    async fn ballots_are_checked_against_the_citizen() {
        let router = test_router();
        send(&router, Method::POST, "/votes", Some(park_vote("active"))).await;
        register(&router, "teen", "2024-02-29").await;

        let cases = [
            (json!({"citizen_id": "nobody", "choice": "yes"}), StatusCode::NOT_FOUND),
            (json!({"citizen_id": "teen", "choice": "yes"}), StatusCode::CONFLICT),
            (json!({"citizen_id": "teen"}), StatusCode::BAD_REQUEST),
            (json!({"citizen_id": "teen", "choice": "maybe"}), StatusCode::BAD_REQUEST),
        ];
        for (ballot, expected) in cases {
            let (status, body) =
                send(&router, Method::POST, "/votes/1/ballots", Some(ballot)).await;
            assert_eq!(status, expected);
            assert_eq!(body["status"], "failure");
        }

        let (_, body) = send(&router, Method::GET, "/votes/1/ballots", None).await;
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn results_count_each_choice() {
        let router = test_router();
        send(&router, Method::POST, "/votes", Some(park_vote("active"))).await;
        for (id, choice) in [("b-1", "ja"), ("b-2", "nein"), ("b-3", "yes")] {
            register(&router, id, "1980-01-01").await;
            let ballot = json!({"citizen_id": id, "choice": choice});
            let (status, _) =
                send(&router, Method::POST, "/votes/1/ballots", Some(ballot)).await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = send(&router, Method::GET, "/votes/1/results", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["data"],
            json!({
                "vote_id": "1",
                "total": 3,
                "tallies": [
                    {"choice": "yes", "count": 2},
                    {"choice": "no", "count": 1},
                ],
            })
        );

        let (status, _) = send(&router, Method::GET, "/votes/404/results", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
