//! Portfolio fee endpoints over recorded movements.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{Decimal, InvestorId};
use crate::engine::{self, InvestorFeeResult};
use crate::error::AppError;

use super::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByDateRequest {
    pub calculation_date: DateTime<Utc>,
    pub annual_rate: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByInvestorRequest {
    pub investor_id: i64,
    pub annual_rate: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ByDateResponse {
    pub results: Vec<InvestorFeeResultDto>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorFeeResultDto {
    pub investor_id: i64,
    pub investor_name: String,
    pub calculation_date: DateTime<Utc>,
    pub annual_rate: Decimal,
    pub total_basis_value: Decimal,
    pub derived_fee: Decimal,
    pub movement_count: usize,
    pub instrument_count: usize,
    pub breakdown: BTreeMap<String, InstrumentBreakdownDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentBreakdownDto {
    pub name: String,
    pub summed_value: Decimal,
    pub movement_count: usize,
}

impl From<InvestorFeeResult> for InvestorFeeResultDto {
    fn from(result: InvestorFeeResult) -> Self {
        InvestorFeeResultDto {
            investor_id: result.investor_id.as_i64(),
            investor_name: result.investor_name,
            calculation_date: result.calculation_date,
            annual_rate: result.annual_rate,
            total_basis_value: result.total_basis_value,
            derived_fee: result.derived_fee,
            movement_count: result.movement_count,
            instrument_count: result.instrument_count,
            breakdown: result
                .breakdown
                .into_iter()
                .map(|(symbol, group)| {
                    (
                        symbol.as_str().to_string(),
                        InstrumentBreakdownDto {
                            name: group.instrument_name,
                            summed_value: group.summed_value,
                            movement_count: group.movement_count,
                        },
                    )
                })
                .collect(),
        }
    }
}

/// Aggregate fees for every investor with movements at or before the
/// calculation date. An empty store yields an empty result list.
pub async fn calculate_by_date(
    State(state): State<AppState>,
    Json(request): Json<ByDateRequest>,
) -> Result<Json<ByDateResponse>, AppError> {
    if request.annual_rate.is_negative() {
        return Err(AppError::InvalidInput(
            "annualRate: must be non-negative".to_string(),
        ));
    }

    let events = state
        .repo
        .query_movements(None, None, Some(request.calculation_date))
        .await?;

    let results =
        engine::compute_for_all_investors(&events, request.calculation_date, request.annual_rate)?;

    let results: Vec<InvestorFeeResultDto> =
        results.into_iter().map(InvestorFeeResultDto::from).collect();
    let total = results.len();
    Ok(Json(ByDateResponse { results, total }))
}

/// Aggregate the fee for a single investor over all their movements.
/// An investor with no movements is a 404, never a zero-valued result.
pub async fn calculate_by_investor(
    State(state): State<AppState>,
    Json(request): Json<ByInvestorRequest>,
) -> Result<Json<InvestorFeeResultDto>, AppError> {
    if request.annual_rate.is_negative() {
        return Err(AppError::InvalidInput(
            "annualRate: must be non-negative".to_string(),
        ));
    }

    let investor_id = InvestorId::new(request.investor_id);
    let events = state
        .repo
        .query_movements(Some(investor_id), None, None)
        .await?;

    let result = engine::compute_for_investor(investor_id, &events, request.annual_rate)?;
    Ok(Json(result.into()))
}
