//! Account API endpoints

use api_types::{
    account::{AccountDetailResponse, AccountGet, AccountList, AccountListResponse, AccountView},
    transaction::{Direction, TransactionView},
};
use axum::{Json, extract::State, extract::rejection::JsonRejection};

use crate::{ServerError, server::ServerState};

/// Handle requests for listing the linked accounts of a user
pub async fn list(
    State(state): State<ServerState>,
    payload: Result<Json<AccountList>, JsonRejection>,
) -> Result<Json<AccountListResponse>, ServerError> {
    let Json(payload) = payload?;
    let summary = state.engine.list_accounts(&payload.user_id).await?;

    Ok(Json(AccountListResponse {
        accounts: summary.accounts.into_iter().map(account_view).collect(),
        total_banks: summary.total_banks,
        total_current_balance: summary.total_current_balance,
    }))
}

/// Handle requests for one account and its transaction timeline
pub async fn detail(
    State(state): State<ServerState>,
    payload: Result<Json<AccountGet>, JsonRejection>,
) -> Result<Json<AccountDetailResponse>, ServerError> {
    let Json(payload) = payload?;
    let detail = state.engine.account_detail(&payload.track_id).await?;

    Ok(Json(AccountDetailResponse {
        account: account_view(detail.account),
        transactions: detail
            .transactions
            .into_iter()
            .map(transaction_view)
            .collect(),
    }))
}

fn account_view(account: engine::AccountView) -> AccountView {
    AccountView {
        id: account.id,
        available_balance: account
            .available_balance
            .map(|balance| balance.to_string())
            .unwrap_or_default(),
        current_balance: account.current_balance.to_string(),
        institution_id: account.institution_id,
        name: account.name,
        official_name: account.official_name,
        mask: account.mask,
        kind: account.kind,
        subtype: account.subtype,
        track_id: account.track_id,
        shareable_id: account.shareable_id,
    }
}

fn transaction_view(tx: engine::TransactionView) -> TransactionView {
    TransactionView {
        id: tx.id,
        name: tx.name,
        payment_channel: tx.payment_channel,
        direction: match tx.direction {
            engine::Direction::Debit => Direction::Debit,
            engine::Direction::Credit => Direction::Credit,
        },
        account_id: tx.account_id,
        amount: tx.amount,
        pending: tx.pending,
        category: tx.category,
        date: tx.date,
    }
}
