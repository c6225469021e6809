use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::models::citizen::{CitizenView, RegistrationRequest};
use crate::models::reply::Reply;
use crate::models::vote::VoteView;
use crate::state::AppState;

use super::{created, json_body};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(register))
        .route("/{citizen_id}", get(get_citizen))
        .route("/{citizen_id}/votes", get(get_participation))
}

async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegistrationRequest>, JsonRejection>,
) -> Response {
    match json_body(payload) {
        Ok(request) => created(state.citizens.register(request).await),
        Err(rejected) => rejected,
    }
}

async fn get_citizen(
    Path(citizen_id): Path<String>,
    State(state): State<AppState>,
) -> Reply<CitizenView> {
    state.citizens.find_citizen(&citizen_id).await
}

async fn get_participation(
    Path(citizen_id): Path<String>,
    State(state): State<AppState>,
) -> Reply<Vec<VoteView>> {
    state.votes.votes_for_citizen(&citizen_id).await
}
