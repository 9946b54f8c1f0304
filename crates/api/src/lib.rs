use std::sync::Arc;

use axum::{routing::get, Router};
use sea_orm::DatabaseConnection;

pub mod auth;
pub mod error;
pub mod kpi;
pub mod org;
pub mod pagination;
pub mod people;
pub mod rating;
pub mod reviews;
pub mod seed;
pub mod teams;
pub mod tenant;
pub mod users;
pub mod workflow;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub auth: Arc<auth::AuthConfig>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .merge(users::router())
        .merge(org::router())
        .merge(people::router())
        .merge(teams::router())
        .merge(kpi::router())
        .merge(reviews::router())
        .with_state(state)
}
