use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};
pub use statistics::statistics_view;

mod cars;
mod records;
mod server;
mod statistics;
mod user;

pub mod types {
    pub use api_types::Created;

    pub mod car {
        pub use api_types::car::{CarList, CarNew, CarView};
    }

    pub mod record {
        pub use api_types::record::{RecordList, RecordNew, RecordView};
    }

    pub mod stats {
        pub use api_types::stats::{CarStats, FleetStats, Statistics};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) | EngineError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidName(_) | EngineError::InvalidAmount(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Store(store_err) => {
            tracing::error!("store error: {store_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
