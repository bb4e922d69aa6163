use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use mediator_core::{CancellationToken, Mediator};

use crate::error::ApiError;
use crate::requests::{GetUserByIdRequest, UserDto};

pub struct AppState {
    pub mediator: Mediator,
    /// Cancelled when the server shuts down; each request gets a child.
    pub shutdown: CancellationToken,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/users/{id}", get(get_user))
        .with_state(state)
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<UserDto>, ApiError> {
    let cancel = state.shutdown.child_token();
    let user = state
        .mediator
        .send_with(GetUserByIdRequest { user_id: id }, &cancel)
        .await?;
    Ok(Json(user))
}
