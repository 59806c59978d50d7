use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{AggregatorGateway, EngineError, LinkageStore, PaymentGateway, ResultEngine};

mod accounts;
mod linking;
mod onboarding;
mod transfers;

pub use linking::LinkProfile;
pub use onboarding::DEFAULT_SANDBOX_INSTITUTION;
pub use transfers::{TransferOutcome, TransferRequest};

/// Orchestrates the aggregator, the payment rail and the linkage store.
///
/// Every operation runs its steps strictly in sequence and aborts on the
/// first error.
pub struct Engine {
    store: LinkageStore,
    aggregator: Arc<dyn AggregatorGateway>,
    payments: Arc<dyn PaymentGateway>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn store(&self) -> &LinkageStore {
        &self.store
    }
}

fn normalize_required_text<'a>(value: &'a str, label: &str) -> ResultEngine<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!("{label} must not be empty")));
    }
    Ok(trimmed)
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: Option<DatabaseConnection>,
    aggregator: Option<Arc<dyn AggregatorGateway>>,
    payments: Option<Arc<dyn PaymentGateway>>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = Some(db);
        self
    }

    /// Pass the banking-data aggregator client
    pub fn aggregator(mut self, aggregator: Arc<dyn AggregatorGateway>) -> EngineBuilder {
        self.aggregator = Some(aggregator);
        self
    }

    /// Pass the payment-rail client
    pub fn payments(mut self, payments: Arc<dyn PaymentGateway>) -> EngineBuilder {
        self.payments = Some(payments);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let database = self
            .database
            .ok_or(EngineError::MissingDependency("database"))?;
        let aggregator = self
            .aggregator
            .ok_or(EngineError::MissingDependency("aggregator gateway"))?;
        let payments = self
            .payments
            .ok_or(EngineError::MissingDependency("payment gateway"))?;

        Ok(Engine {
            store: LinkageStore::new(database),
            aggregator,
            payments,
        })
    }
}
