//! hue-api - Dashboard REST API layer
//!
//! Serves the room state accumulated by the poller to the browser
//! dashboard. The room-detail endpoint runs the sampling algorithm from
//! `hue-core` server-side when a chart time range is requested.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use hue_api::{create_router, AppState, DataStore};
//!
//! let store = Arc::new(DataStore::new());
//! let state = AppState::new(store);
//! let router = create_router(state);
//! ```

pub mod error;
pub mod handlers;
pub mod state;
pub mod store;

pub use error::ApiError;
pub use state::AppState;
pub use store::DataStore;

use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the dashboard REST API router with the given application state
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/rooms", get(handlers::rooms::list_rooms))
        .route("/api/rooms/{room_id}", get(handlers::rooms::get_room))
        .route("/api/health", get(handlers::health::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
