//! Statistics API endpoints

use api_types::stats::{CarStats, FleetStats, Statistics};
use axum::{Extension, Json, extract::State};
use engine::{CarKey, CarReport, FleetSummary, StatisticsReport};

use crate::{ServerError, server::ServerState, user};

fn fleet_stats(fleet: FleetSummary) -> FleetStats {
    FleetStats {
        record_count: fleet.record_count,
        total_liters: fleet.total_liters.liters(),
        total_spent_minor: fleet.total_spent.cents(),
        average_price_per_liter: fleet.average_price_per_liter.value(),
        has_data: fleet.has_data,
    }
}

fn car_stats(line: CarReport) -> CarStats {
    let car_id = match line.key {
        CarKey::Car(id) => Some(id),
        CarKey::Unknown => None,
    };
    let summary = line.summary;
    CarStats {
        car_id,
        name: line.name,
        record_count: summary.record_count,
        liters: summary.liters.liters(),
        total_spent_minor: summary.total_spent.cents(),
        average_price_per_liter: summary.average_price_per_liter.value(),
        min_mileage: summary.min_mileage,
        max_mileage: summary.max_mileage,
        average_consumption_per_100: summary.average_consumption_per_100.value(),
    }
}

/// The JSON shape of a report, shared by every surface that prints one.
pub fn statistics_view(report: StatisticsReport) -> Statistics {
    Statistics {
        fleet: fleet_stats(report.fleet),
        cars: report.cars.into_iter().map(car_stats).collect(),
    }
}

/// Handle requests for user statistics
pub async fn get_stats(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Statistics>, ServerError> {
    let report = state.engine.statistics(&user.username).await?;
    Ok(Json(statistics_view(report)))
}
