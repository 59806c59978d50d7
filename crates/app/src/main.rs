use std::sync::Arc;

use clap::Parser;
use migration::{Migrator, MigratorTrait};
use providers::{DwollaClient, PlaidClient};

use settings::{Args, Command, MigrateAction};

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();
    let settings = settings::Settings::new(&args)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "bankbridge={level},server={level},engine={level},providers={level}",
            level = settings.app.level
        ))
        .init();

    if let Some(Command::Migrate { action }) = args.command {
        return migrate(&settings.database, action)
            .await
            .inspect_err(|err| tracing::error!(?action, "migration failed: {err}"));
    }

    let db = connect_database(&settings.database)
        .await
        .inspect_err(|err| tracing::error!("failed to initialize database: {err}"))?;

    let http = reqwest::Client::new();
    let sandbox = settings.plaid.environment.is_sandbox();
    let engine = engine::Engine::builder()
        .database(db)
        .aggregator(Arc::new(PlaidClient::new(http.clone(), settings.plaid)))
        .payments(Arc::new(DwollaClient::new(http, settings.dwolla)))
        .build()
        .await
        .inspect_err(|err| tracing::error!("failed to build engine: {err}"))?;

    let addr = format!("{}:{}", settings.server.bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .inspect_err(|err| tracing::error!("failed to bind server listener on {addr}: {err}"))?;

    server::run_with_listener(engine, sandbox, listener)
        .await
        .inspect_err(|err| tracing::error!("server failed: {err}"))?;

    Ok(())
}

async fn connect_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let database = sea_orm::Database::connect(config.url()?.to_string()).await?;
    Migrator::up(&database, None).await?;
    tracing::info!(host = %config.host, name = %config.name, "database ready");
    Ok(database)
}

async fn migrate(
    config: &settings::Database,
    action: MigrateAction,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let database = sea_orm::Database::connect(config.url()?.to_string()).await?;
    match action {
        MigrateAction::Up => Migrator::up(&database, None).await?,
        MigrateAction::Down => Migrator::down(&database, None).await?,
        MigrateAction::Fresh => Migrator::fresh(&database).await?,
        MigrateAction::Status => Migrator::status(&database).await?,
    }
    tracing::info!(?action, host = %config.host, name = %config.name, "migration finished");
    Ok(())
}
