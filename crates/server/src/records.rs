//! Refuel API endpoints.

use api_types::{
    Created,
    record::{RecordList, RecordNew, RecordView},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{EngineError, FuelRecord, MoneyCents, NewFuelRecord, PriceInput, Volume};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn parse_price(value: Option<&str>) -> Result<Option<MoneyCents>, ServerError> {
    value
        .map(|value| value.parse::<MoneyCents>().map_err(ServerError::from))
        .transpose()
}

fn price_input(payload: &RecordNew) -> Result<PriceInput, ServerError> {
    let total = parse_price(payload.total_price.as_deref())?;
    let per_liter = parse_price(payload.price_per_liter.as_deref())?;

    match (total, per_liter) {
        (Some(total), Some(per_liter)) => Ok(PriceInput::Both { total, per_liter }),
        (Some(total), None) => Ok(PriceInput::Total(total)),
        (None, Some(per_liter)) => Ok(PriceInput::PerLiter(per_liter)),
        (None, None) => Err(ServerError::Engine(EngineError::InvalidAmount(
            "total_price or price_per_liter required".to_string(),
        ))),
    }
}

fn record_view(record: FuelRecord) -> RecordView {
    RecordView {
        id: record.id,
        car_id: record.car_id,
        car: record.car,
        date: record.date,
        mileage: record.mileage,
        liters: record.liters.liters(),
        price_per_liter_minor: record.price_per_liter.cents(),
        total_price_minor: record.total_price.cents(),
    }
}

/// List refuels, newest first.
pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<RecordList>, ServerError> {
    let records = state
        .engine
        .records(&user.username)
        .await?
        .into_iter()
        .map(record_view)
        .collect();

    Ok(Json(RecordList { records }))
}

pub async fn record_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<RecordNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let liters: Volume = payload.liters.parse()?;
    let price = price_input(&payload)?;

    let new = NewFuelRecord::new(payload.car_id, payload.date, payload.mileage, liters, price);
    let id = state.engine.add_record(new, &user.username).await?;

    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_record(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
