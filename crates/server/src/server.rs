use axum::{
    Router,
    routing::{get, post},
};

use std::sync::Arc;

use crate::{accounts, customer, link, transfers};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    /// Route the sandbox-only helpers.
    pub sandbox: bool,
}

async fn health() -> &'static str {
    "ok"
}

pub fn router(state: ServerState) -> Router {
    let mut router = Router::new()
        .route("/health", get(health))
        .route("/linktoken/create", post(link::create_link_token))
        .route("/token/exchange", post(link::exchange_token))
        .route("/customer/create", post(customer::create))
        .route("/accounts/list", post(accounts::list))
        .route("/account/detail", post(accounts::detail))
        .route("/transfer", post(transfers::transfer));

    if state.sandbox {
        router = router.route(
            "/sandbox/publictoken/create",
            post(link::create_sandbox_public_token),
        );
    }

    router.with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    sandbox: bool,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(sandbox, "Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        sandbox,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    sandbox: bool,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, sandbox, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
