use api_types::ErrorBody;
use axum::{Json, extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use server::{ServerState, router, run_with_listener, spawn_with_listener};

mod accounts;
mod customer;
mod link;
mod server;
mod transfers;

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_) => StatusCode::BAD_REQUEST,
        EngineError::Aggregator(_)
        | EngineError::Payment(_)
        | EngineError::NotFound(_)
        | EngineError::ExistingKey(_)
        | EngineError::MissingDependency(_)
        | EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        err @ (EngineError::Validation(_) | EngineError::NotFound(_)) => {
            let message = err.to_string();
            tracing::warn!("request failed: {message}");
            message
        }
        other => {
            let message = other.to_string();
            tracing::error!("request failed: {message}");
            message
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!("rejected request body: {rejection}");
        Self::Generic(format!("invalid request - {}", rejection.body_text()))
    }
}
