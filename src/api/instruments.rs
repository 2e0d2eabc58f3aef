//! Instrument registration and listing endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Instrument, Symbol};
use crate::error::AppError;

use super::AppState;

const MAX_SYMBOL_LEN: usize = 20;
const MAX_NAME_LEN: usize = 200;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInstrumentRequest {
    pub symbol: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentDto {
    pub id: i64,
    pub symbol: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentListResponse {
    pub instruments: Vec<InstrumentDto>,
    pub total: usize,
}

impl From<Instrument> for InstrumentDto {
    fn from(instrument: Instrument) -> Self {
        InstrumentDto {
            id: instrument.id.as_i64(),
            symbol: instrument.symbol.as_str().to_string(),
            name: instrument.name,
            created_at: instrument.created_at,
        }
    }
}

pub async fn create_instrument(
    State(state): State<AppState>,
    Json(request): Json<CreateInstrumentRequest>,
) -> Result<(StatusCode, Json<InstrumentDto>), AppError> {
    let symbol = Symbol::new(&request.symbol);
    if symbol.as_str().is_empty() {
        return Err(AppError::InvalidInput(
            "symbol: must not be empty".to_string(),
        ));
    }
    if symbol.as_str().len() > MAX_SYMBOL_LEN {
        return Err(AppError::InvalidInput(format!(
            "symbol: must be at most {} characters",
            MAX_SYMBOL_LEN
        )));
    }

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

    if state
        .repo
        .get_instrument_by_symbol(&symbol)
        .await?
        .is_some()
    {
        return Err(AppError::InvalidInput(
            "symbol: an instrument with this symbol already exists".to_string(),
        ));
    }

    let instrument = state.repo.insert_instrument(&symbol, name).await?;
    Ok((StatusCode::CREATED, Json(instrument.into())))
}

pub async fn list_instruments(
    State(state): State<AppState>,
) -> Result<Json<InstrumentListResponse>, AppError> {
    let instruments = state.repo.list_instruments().await?;
    let total = instruments.len();

    Ok(Json(InstrumentListResponse {
        instruments: instruments.into_iter().map(InstrumentDto::from).collect(),
        total,
    }))
}
