//! Seams towards the two third-party providers.
//!
//! The engine never talks HTTP itself: the banking-data aggregator and the
//! payment rail are reached through [`AggregatorGateway`] and
//! [`PaymentGateway`], built once at startup and injected through
//! [`EngineBuilder`](crate::EngineBuilder).

use std::collections::BTreeMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::AccessToken;

/// Failure reported by (or while talking to) the aggregator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregatorError {
    #[error("aggregator unreachable: {0}")]
    Transport(String),
    #[error("aggregator error {code}: {message}")]
    Api { code: String, message: String },
    #[error("malformed aggregator response: {0}")]
    Malformed(String),
}

/// Failure reported by (or while talking to) the payment rail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    #[error("payment rail unreachable: {0}")]
    Transport(String),
    #[error("payment rail error {code}: {message}")]
    Api { code: String, message: String },
    #[error("malformed payment rail response: {0}")]
    Malformed(String),
}

/// Identity the link token is scoped to.
#[derive(Clone, Debug)]
pub struct LinkTokenUser {
    pub user_id: String,
    pub email: String,
    pub name: String,
}

/// A bank account as reported live by the aggregator.
#[derive(Clone, Debug, PartialEq)]
pub struct AccountData {
    pub account_id: String,
    pub name: String,
    pub official_name: Option<String>,
    pub mask: Option<String>,
    pub kind: String,
    pub subtype: Option<String>,
    pub available_balance: Option<Decimal>,
    pub current_balance: Option<Decimal>,
}

/// Metadata of the aggregator item (one bank connection).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemData {
    pub item_id: String,
    pub institution_id: Option<String>,
    /// Free-text institution name, used when `institution_id` is missing.
    pub institution_name: Option<String>,
}

/// A transaction as reported by the aggregator.
///
/// `amount` follows the aggregator convention: positive values are money
/// leaving the account.
#[derive(Clone, Debug, PartialEq)]
pub struct AggregatorTransaction {
    pub transaction_id: String,
    pub account_id: String,
    pub name: String,
    pub payment_channel: String,
    pub amount: Decimal,
    pub pending: bool,
    pub category: String,
    pub date: String,
}

/// Link relations a funding source is attached with, `rel -> href`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthLinks(pub BTreeMap<String, String>);

/// Payer / payee registration data.
#[derive(Clone, Debug)]
pub struct CustomerProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl CustomerProfile {
    pub fn business_name(&self) -> String {
        format!("{} {}'s Business", self.first_name, self.last_name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Customer {
    pub id: String,
    pub url: String,
}

/// Receipt of a created transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferReceipt {
    pub transfer_id: String,
    pub transfer_url: String,
}

#[async_trait]
pub trait AggregatorGateway: Send + Sync {
    /// Short-lived token for the client-side link widget.
    async fn create_link_token(&self, user: &LinkTokenUser) -> Result<String, AggregatorError>;

    /// One-shot exchange, returns `(access_token, item_id)`.
    async fn exchange_public_token(
        &self,
        public_token: &str,
    ) -> Result<(AccessToken, String), AggregatorError>;

    /// First account of the item plus the item metadata.
    async fn fetch_primary_account(
        &self,
        access_token: &AccessToken,
    ) -> Result<(AccountData, ItemData), AggregatorError>;

    async fn resolve_institution_id(&self, institution_id: &str)
    -> Result<String, AggregatorError>;

    async fn fetch_transactions(
        &self,
        access_token: &AccessToken,
    ) -> Result<Vec<AggregatorTransaction>, AggregatorError>;

    /// Token binding `(access_token, account_id)` to the payment rail.
    async fn create_processor_token(
        &self,
        access_token: &AccessToken,
        account_id: &str,
    ) -> Result<String, AggregatorError>;

    /// Sandbox only: mint a public token without the link widget.
    async fn create_sandbox_public_token(
        &self,
        institution_id: &str,
    ) -> Result<String, AggregatorError>;
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_on_demand_authorization(&self) -> Result<AuthLinks, PaymentError>;

    async fn create_customer(&self, profile: &CustomerProfile) -> Result<Customer, PaymentError>;

    /// Returns the URL of the new funding source.
    async fn create_funding_source(
        &self,
        customer_url: &str,
        processor_token: &str,
        auth_links: &AuthLinks,
        name: &str,
    ) -> Result<String, PaymentError>;

    async fn create_transfer(
        &self,
        source_funding_source_url: &str,
        destination_funding_source_url: &str,
        amount: &str,
    ) -> Result<TransferReceipt, PaymentError>;

    async fn remove_funding_source(&self, funding_source_url: &str) -> Result<(), PaymentError>;
}
