#![allow(dead_code)]

use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::{Database, DatabaseConnection};

use engine::{
    Engine, LinkProfile, LinkedAccount,
    testing::{FAKE_RAIL_URL, FakeAggregator, FakePayments, sample_account, sample_item},
};
use migration::MigratorTrait;

pub struct Harness {
    pub engine: Engine,
    pub db: DatabaseConnection,
    pub aggregator: Arc<FakeAggregator>,
    pub payments: Arc<FakePayments>,
}

pub async fn harness() -> Harness {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let aggregator = Arc::new(FakeAggregator::new());
    let payments = Arc::new(FakePayments::new());
    let engine = Engine::builder()
        .database(db.clone())
        .aggregator(aggregator.clone())
        .payments(payments.clone())
        .build()
        .await
        .unwrap();
    Harness {
        engine,
        db,
        aggregator,
        payments,
    }
}

pub fn profile(user_id: &str, first_name: &str) -> LinkProfile {
    LinkProfile {
        user_id: user_id.to_string(),
        first_name: first_name.to_string(),
        customer_url: format!("{FAKE_RAIL_URL}/customers/{user_id}"),
    }
}

impl Harness {
    /// Register a bank behind `public_token` holding one account with the
    /// given current balance (in cents).
    pub fn bank(&self, public_token: &str, account_id: &str, cents: i64) {
        self.aggregator.add_account(
            public_token,
            sample_account(account_id, "Plaid Checking", Decimal::new(cents, 2)),
            sample_item(&format!("item-{account_id}"), Some("ins_109508")),
        );
    }

    pub async fn link(&self, public_token: &str, user_id: &str, first_name: &str) -> LinkedAccount {
        self.engine
            .link_account(public_token, profile(user_id, first_name))
            .await
            .unwrap()
    }
}
