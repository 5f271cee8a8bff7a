//! Cars API endpoints.

use api_types::{
    Created,
    car::{CarList, CarNew, CarView},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<CarList>, ServerError> {
    let cars = state
        .engine
        .cars(&user.username)
        .await?
        .into_iter()
        .map(|car| CarView {
            id: car.id,
            name: car.name,
            created_at: car.created_at,
        })
        .collect();

    Ok(Json(CarList { cars }))
}

pub async fn car_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CarNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let id = state.engine.new_car(&payload.name, &user.username).await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

/// Delete a car and all of its refuels.
pub async fn delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_car(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
