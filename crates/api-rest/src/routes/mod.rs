//! Route handlers, one module per entity.
//!
//! Every entity gets the same five endpoints:
//!
//! ```text
//! GET    /{entity}        list (filters, limit, offset)
//! GET    /{entity}/:id    get
//! POST   /{entity}        create   -> 201
//! PUT    /{entity}/:id    update   (partial)
//! DELETE /{entity}/:id    delete   -> 204
//! ```

pub mod conditions;
pub mod encounters;
pub mod health;
pub mod observations;
pub mod organizations;
pub mod patients;
pub mod practitioners;

use crate::AppState;
use axum::Router;

/// All API routes, relative to the version prefix.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(organizations::routes())
        .merge(patients::routes())
        .merge(practitioners::routes())
        .merge(encounters::routes())
        .merge(conditions::routes())
        .merge(observations::routes())
}
