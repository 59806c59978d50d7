//! Link flow endpoints: link token, public-token exchange and the sandbox
//! public-token shortcut.

use api_types::link::{
    LinkTokenCreate, LinkTokenCreated, LinkedAccount, SandboxPublicTokenCreate,
    SandboxPublicTokenCreated, TokenExchange, TokenExchanged,
};
use axum::{Json, extract::State, extract::rejection::JsonRejection};
use engine::{LinkProfile, LinkTokenUser};

use crate::{ServerError, server::ServerState};

/// Handle requests for a new link token
pub async fn create_link_token(
    State(state): State<ServerState>,
    payload: Result<Json<LinkTokenCreate>, JsonRejection>,
) -> Result<Json<LinkTokenCreated>, ServerError> {
    let Json(payload) = payload?;
    let link_token = state
        .engine
        .create_link_token(LinkTokenUser {
            user_id: payload.user_id,
            email: payload.email,
            name: payload.name,
        })
        .await?;

    Ok(Json(LinkTokenCreated { link_token }))
}

/// Exchange a public token and run the linking workflow for `payload.user`.
pub async fn exchange_token(
    State(state): State<ServerState>,
    payload: Result<Json<TokenExchange>, JsonRejection>,
) -> Result<Json<TokenExchanged>, ServerError> {
    let Json(payload) = payload?;
    let linked = state
        .engine
        .link_account(
            &payload.public_token,
            LinkProfile {
                user_id: payload.user.user_id,
                first_name: payload.user.first_name,
                customer_url: payload.user.dwolla_customer_url,
            },
        )
        .await?;

    Ok(Json(TokenExchanged {
        message: "bank account linked successfully".to_string(),
        linked_account: LinkedAccount {
            track_id: linked.track_id,
            account_id: linked.account_id,
            bank_id: linked.bank_id,
            funding_source_url: linked.funding_source_url,
            shareable_id: linked.shareable_id,
            user_id: linked.user_id,
        },
    }))
}

pub async fn create_sandbox_public_token(
    State(state): State<ServerState>,
    payload: Result<Json<SandboxPublicTokenCreate>, JsonRejection>,
) -> Result<Json<SandboxPublicTokenCreated>, ServerError> {
    let Json(payload) = payload?;
    let public_token = state
        .engine
        .create_sandbox_public_token(payload.institution_id.as_deref())
        .await?;

    Ok(Json(SandboxPublicTokenCreated { public_token }))
}
