//! Investor registration and lookup endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Email, Investor, InvestorId};
use crate::error::AppError;

use super::AppState;

const MAX_NAME_LEN: usize = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvestorRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorDto {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorListResponse {
    pub investors: Vec<InvestorDto>,
    pub total: usize,
}

impl From<Investor> for InvestorDto {
    fn from(investor: Investor) -> Self {
        InvestorDto {
            id: investor.id.as_i64(),
            name: investor.name,
            email: investor.email.as_str().to_string(),
            created_at: investor.created_at,
        }
    }
}

pub async fn create_investor(
    State(state): State<AppState>,
    Json(request): Json<CreateInvestorRequest>,
) -> Result<(StatusCode, Json<InvestorDto>), AppError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("name: must not be empty".to_string()));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(AppError::InvalidInput(format!(
            "name: must be at most {} characters",
            MAX_NAME_LEN
        )));
    }

    let email = Email::parse(&request.email)
        .map_err(|e| AppError::InvalidInput(format!("email: {}", e)))?;

    if state.repo.get_investor_by_email(&email).await?.is_some() {
        return Err(AppError::InvalidInput(
            "email: an investor with this email already exists".to_string(),
        ));
    }

    let investor = state.repo.insert_investor(name, &email).await?;
    Ok((StatusCode::CREATED, Json(investor.into())))
}

pub async fn get_investor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<InvestorDto>, AppError> {
    let investor = state
        .repo
        .get_investor(InvestorId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("investor {} not found", id)))?;

    Ok(Json(investor.into()))
}

pub async fn list_investors(
    State(state): State<AppState>,
) -> Result<Json<InvestorListResponse>, AppError> {
    let investors = state.repo.list_investors().await?;
    let total = investors.len();

    Ok(Json(InvestorListResponse {
        investors: investors.into_iter().map(InvestorDto::from).collect(),
        total,
    }))
}
