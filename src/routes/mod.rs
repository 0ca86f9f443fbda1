use axum::Router;

use crate::state::AppState;

pub mod catalog;
pub mod customers;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod stores;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/stores", stores::router())
        .nest("/services", catalog::router())
        .nest("/customers", customers::router())
        .nest("/orders", orders::router())
}
