use axum::Router;

use crate::state::AppState;

pub mod analytics;
pub mod auth;
pub mod blockchain;
pub mod doc;
pub mod health;
pub mod inventory;
pub mod params;
pub mod products;
pub mod suppliers;
pub mod tracking;
pub mod ws;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/products", products::router())
        .nest("/suppliers", suppliers::router())
        .nest("/tracking", tracking::router())
        .nest("/analytics", analytics::router())
        .nest("/blockchain", blockchain::router())
        .nest("/inventory", inventory::router())
}
