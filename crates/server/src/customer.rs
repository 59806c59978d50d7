use api_types::customer::{CustomerCreated, CustomerNew};
use axum::{Json, extract::State, extract::rejection::JsonRejection};
use engine::CustomerProfile;

use crate::{ServerError, server::ServerState};

/// Handle requests for registering a payment-rail customer
pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<CustomerNew>, JsonRejection>,
) -> Result<Json<CustomerCreated>, ServerError> {
    let Json(payload) = payload?;
    let customer = state
        .engine
        .create_customer(CustomerProfile {
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
        })
        .await?;

    Ok(Json(CustomerCreated {
        customer_id: customer.id,
        customer_url: customer.url,
    }))
}
