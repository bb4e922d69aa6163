//! mediator-api
//!
//! HTTP host for the mediator: builds the handler registry once at startup
//! and turns `GET /api/users/{id}` into a single `send`.

pub mod config;
pub mod error;
pub mod requests;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use mediator_core::{CancellationToken, Mediator, MediatorBuilder};

use crate::requests::{GetUserByIdRequest, UsersModule};
use crate::routes::AppState;

/// Register every handler module and freeze the registry.
pub fn build_mediator() -> anyhow::Result<Mediator> {
    let mediator = MediatorBuilder::new()
        .install(&UsersModule)?
        .expect_request::<GetUserByIdRequest>()
        .build()?;
    Ok(mediator)
}

pub fn app(mediator: Mediator, shutdown: CancellationToken) -> Router {
    routes::router(Arc::new(AppState { mediator, shutdown }))
}
