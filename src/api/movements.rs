//! Movement recording, listing, and holdings summary endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{Decimal, InstrumentId, InvestorId, MovementEvent};
use crate::engine;
use crate::error::AppError;

use super::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMovementRequest {
    pub investor_id: i64,
    pub instrument_id: i64,
    pub recorded_value: Decimal,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementsQuery {
    pub investor_id: Option<i64>,
    pub instrument_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioQuery {
    pub as_of: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementDto {
    pub id: i64,
    pub investor_id: i64,
    pub investor_name: String,
    pub instrument_id: i64,
    pub symbol: String,
    pub instrument_name: String,
    pub recorded_value: Decimal,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementListResponse {
    pub movements: Vec<MovementDto>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingDto {
    pub name: String,
    pub summed_value: Decimal,
    pub movement_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummaryResponse {
    pub investor_id: i64,
    pub as_of: DateTime<Utc>,
    pub portfolio: BTreeMap<String, HoldingDto>,
    pub total_value: Decimal,
    pub movement_count: usize,
    pub instrument_count: usize,
}

impl From<MovementEvent> for MovementDto {
    fn from(movement: MovementEvent) -> Self {
        MovementDto {
            id: movement.id,
            investor_id: movement.investor_id.as_i64(),
            investor_name: movement.investor_name,
            instrument_id: movement.instrument_id.as_i64(),
            symbol: movement.symbol.as_str().to_string(),
            instrument_name: movement.instrument_name,
            recorded_value: movement.recorded_value,
            occurred_at: movement.occurred_at,
            created_at: movement.created_at,
        }
    }
}

pub async fn create_movement(
    State(state): State<AppState>,
    Json(request): Json<CreateMovementRequest>,
) -> Result<(StatusCode, Json<MovementDto>), AppError> {
    if !request.recorded_value.is_positive() {
        return Err(AppError::InvalidInput(
            "recordedValue: must be positive".to_string(),
        ));
    }

    let investor_id = InvestorId::new(request.investor_id);
    if state.repo.get_investor(investor_id).await?.is_none() {
        return Err(AppError::InvalidInput(format!(
            "investorId: investor {} does not exist",
            request.investor_id
        )));
    }

    let instrument_id = InstrumentId::new(request.instrument_id);
    if state.repo.get_instrument(instrument_id).await?.is_none() {
        return Err(AppError::InvalidInput(format!(
            "instrumentId: instrument {} does not exist",
            request.instrument_id
        )));
    }

    let movement = state
        .repo
        .insert_movement(
            investor_id,
            instrument_id,
            request.recorded_value,
            request.occurred_at,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(movement.into())))
}

pub async fn get_movement(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MovementDto>, AppError> {
    let movement = state
        .repo
        .get_movement(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("movement {} not found", id)))?;

    Ok(Json(movement.into()))
}

pub async fn list_movements(
    State(state): State<AppState>,
    Query(params): Query<MovementsQuery>,
) -> Result<Json<MovementListResponse>, AppError> {
    let investor_id = params.investor_id.map(InvestorId::new);
    let instrument_id = params.instrument_id.map(InstrumentId::new);

    let movements = state
        .repo
        .query_movements(investor_id, instrument_id, None)
        .await?;
    let total = movements.len();

    Ok(Json(MovementListResponse {
        movements: movements.into_iter().map(MovementDto::from).collect(),
        total,
    }))
}

pub async fn list_investor_movements(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MovementListResponse>, AppError> {
    let movements = state
        .repo
        .query_movements(Some(InvestorId::new(id)), None, None)
        .await?;
    let total = movements.len();

    Ok(Json(MovementListResponse {
        movements: movements.into_iter().map(MovementDto::from).collect(),
        total,
    }))
}

/// Holdings view: what does this investor hold, by value, as of a date.
/// No fee is derived here.
pub async fn get_portfolio_summary(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<PortfolioQuery>,
) -> Result<Json<PortfolioSummaryResponse>, AppError> {
    let investor_id = InvestorId::new(id);
    if state.repo.get_investor(investor_id).await?.is_none() {
        return Err(AppError::NotFound(format!("investor {} not found", id)));
    }

    let as_of = params.as_of.unwrap_or_else(Utc::now);
    let events = state
        .repo
        .query_movements(Some(investor_id), None, Some(as_of))
        .await?;

    let summary = engine::summarize_holdings(&events, as_of);

    Ok(Json(PortfolioSummaryResponse {
        investor_id: id,
        as_of,
        portfolio: summary
            .breakdown
            .into_iter()
            .map(|(symbol, group)| {
                (
                    symbol.as_str().to_string(),
                    HoldingDto {
                        name: group.instrument_name,
                        summed_value: group.summed_value,
                        movement_count: group.movement_count,
                    },
                )
            })
            .collect(),
        total_value: summary.total_value,
        movement_count: summary.movement_count,
        instrument_count: summary.instrument_count,
    }))
}
