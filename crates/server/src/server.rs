use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::sync::Arc;

use crate::{cars, records, statistics, user};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

impl ServerState {
    pub fn new(engine: Engine, db: DatabaseConnection) -> Self {
        Self {
            engine: Arc::new(engine),
            db,
        }
    }
}

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(auth_header)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user: Option<user::Model> = user::Entity::find()
        .filter(user::Column::Username.eq(auth_header.username()))
        .filter(user::Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(|err| {
            tracing::error!("failed to look up user: {err}");
            StatusCode::UNAUTHORIZED
        })?;

    let Some(user) = user else {
        tracing::debug!(user = auth_header.username(), "rejected credentials");
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Every route, behind basic authentication.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/cars", get(cars::list).post(cars::car_new))
        .route("/cars/{id}", delete(cars::delete))
        .route("/records", get(records::list).post(records::record_new))
        .route("/records/{id}", delete(records::delete))
        .route("/stats", get(statistics::get_stats))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Engine, db: DatabaseConnection, address: &str) {
    let listener = match tokio::net::TcpListener::bind(address).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {address}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(ServerState::new(engine, db))).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
