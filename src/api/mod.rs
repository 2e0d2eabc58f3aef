pub mod fees;
pub mod health;
pub mod instruments;
pub mod investors;
pub mod movements;
pub mod portfolio_fees;

use crate::db::Repository;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
}

impl AppState {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/fees/timeseries", post(fees::calculate_timeseries_fees))
        .route(
            "/v1/fees/portfolio/by-date",
            post(portfolio_fees::calculate_by_date),
        )
        .route(
            "/v1/fees/portfolio/by-investor",
            post(portfolio_fees::calculate_by_investor),
        )
        .route(
            "/v1/investors",
            post(investors::create_investor).get(investors::list_investors),
        )
        .route("/v1/investors/:id", get(investors::get_investor))
        .route(
            "/v1/investors/:id/movements",
            get(movements::list_investor_movements),
        )
        .route(
            "/v1/investors/:id/portfolio",
            get(movements::get_portfolio_summary),
        )
        .route(
            "/v1/instruments",
            post(instruments::create_instrument).get(instruments::list_instruments),
        )
        .route(
            "/v1/movements",
            post(movements::create_movement).get(movements::list_movements),
        )
        .route("/v1/movements/:id", get(movements::get_movement))
        .layer(cors)
        .with_state(state)
}
