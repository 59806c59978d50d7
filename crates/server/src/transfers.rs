use api_types::transaction::{TransferCreated, TransferNew, TransferTransaction};
use axum::{Json, extract::State, extract::rejection::JsonRejection};
use engine::TransferRequest;

use crate::{ServerError, server::ServerState};

/// Handle requests for moving money between two linked accounts
pub async fn transfer(
    State(state): State<ServerState>,
    payload: Result<Json<TransferNew>, JsonRejection>,
) -> Result<Json<TransferCreated>, ServerError> {
    let Json(payload) = payload?;
    let outcome = state
        .engine
        .transfer(TransferRequest {
            source_track_id: payload.source_track_id,
            destination_track_id: payload.destination_track_id,
            receiver_shareable_id: payload.receiver_shareable_id,
            amount: payload.amount,
            name: payload.name,
        })
        .await?;

    let tx = outcome.transaction;
    Ok(Json(TransferCreated {
        message: "transfer created successfully".to_string(),
        transfer_url: outcome.receipt.transfer_url,
        transaction: TransferTransaction {
            date: tx.created_at.format("%Y-%m-%d").to_string(),
            transaction_id: tx.transaction_id,
            name: tx.name,
            amount: tx.amount,
            channel: tx.channel,
            category: tx.category,
            sender_id: tx.sender_id,
            receiver_id: tx.receiver_id,
            sender_bank_id: tx.sender_bank_id,
            receiver_bank_id: tx.receiver_bank_id,
        },
    }))
}
