//! Time-series fee endpoint.

use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::{Decimal, Sample};
use crate::engine;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesFeeRequest {
    pub annual_rate: Decimal,
    pub samples: Vec<SampleDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleDto {
    pub unit_value: Decimal,
    pub quantities: Vec<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct TimeSeriesFeeResponse {
    pub fees: Vec<Decimal>,
}

pub async fn calculate_timeseries_fees(
    Json(request): Json<TimeSeriesFeeRequest>,
) -> Result<Json<TimeSeriesFeeResponse>, AppError> {
    let samples = validate_request(&request)?;
    let fees = engine::compute_fees(request.annual_rate, &samples)?;
    Ok(Json(TimeSeriesFeeResponse { fees }))
}

// Full validation pass before any computation; failures carry the field
// path of the offending value.
fn validate_request(request: &TimeSeriesFeeRequest) -> Result<Vec<Sample>, AppError> {
    if request.annual_rate.is_negative() {
        return Err(AppError::InvalidInput(
            "annualRate: must be non-negative".to_string(),
        ));
    }

    let mut samples = Vec::with_capacity(request.samples.len());
    for (i, sample) in request.samples.iter().enumerate() {
        if !sample.unit_value.is_positive() {
            return Err(AppError::InvalidInput(format!(
                "samples[{}].unitValue: must be positive",
                i
            )));
        }
        if sample.quantities.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "samples[{}].quantities: must not be empty",
                i
            )));
        }
        for (j, quantity) in sample.quantities.iter().enumerate() {
            if quantity.is_negative() {
                return Err(AppError::InvalidInput(format!(
                    "samples[{}].quantities[{}]: must be non-negative",
                    i, j
                )));
            }
        }
        samples.push(Sample::new(sample.unit_value, sample.quantities.clone()));
    }

    Ok(samples)
}
