//! In-process gateway doubles.
//!
//! Both fakes record the name of every call they receive and can be told to
//! fail a given operation, so tests can assert on ordering and on what was
//! (not) called after a failure.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::{
    AccessToken, AccountData, AggregatorError, AggregatorGateway, AggregatorTransaction,
    AuthLinks, Customer, CustomerProfile, ItemData, LinkTokenUser, PaymentError, PaymentGateway,
    TransferReceipt,
};

pub const FAKE_RAIL_URL: &str = "https://rail.test";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A depository account with the given current balance.
pub fn sample_account(account_id: &str, name: &str, current: Decimal) -> AccountData {
    AccountData {
        account_id: account_id.to_string(),
        name: name.to_string(),
        official_name: Some(format!("{name} Official")),
        mask: Some("0000".to_string()),
        kind: "depository".to_string(),
        subtype: Some("checking".to_string()),
        available_balance: Some(current),
        current_balance: Some(current),
    }
}

/// Item metadata with the given reported institution id.
pub fn sample_item(item_id: &str, institution_id: Option<&str>) -> ItemData {
    ItemData {
        item_id: item_id.to_string(),
        institution_id: institution_id.map(ToString::to_string),
        institution_name: None,
    }
}

#[derive(Default)]
struct AggregatorState {
    /// public token -> item id
    items: HashMap<String, String>,
    /// access token -> account
    accounts: HashMap<String, (AccountData, ItemData)>,
    transactions: HashMap<String, Vec<AggregatorTransaction>>,
    institutions: HashMap<String, String>,
    failing: HashSet<&'static str>,
    calls: Vec<String>,
}

/// Aggregator double. Each registered public token `p` exchanges to the
/// access token `access-p`.
#[derive(Default)]
pub struct FakeAggregator {
    state: Mutex<AggregatorState>,
}

impl FakeAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn access_token_for(public_token: &str) -> AccessToken {
        AccessToken::new(format!("access-{public_token}"))
    }

    /// Register the account that `public_token` links to.
    pub fn add_account(&self, public_token: &str, account: AccountData, item: ItemData) {
        let mut state = lock(&self.state);
        state
            .items
            .insert(public_token.to_string(), item.item_id.clone());
        let access_token = Self::access_token_for(public_token);
        state
            .accounts
            .insert(access_token.get().to_string(), (account, item));
    }

    pub fn add_transactions(&self, public_token: &str, transactions: Vec<AggregatorTransaction>) {
        let access_token = Self::access_token_for(public_token);
        lock(&self.state)
            .transactions
            .insert(access_token.get().to_string(), transactions);
    }

    pub fn add_institution(&self, raw: &str, canonical: &str) {
        lock(&self.state)
            .institutions
            .insert(raw.to_string(), canonical.to_string());
    }

    /// Make `operation` (a trait method name) fail from now on.
    pub fn fail_on(&self, operation: &'static str) {
        lock(&self.state).failing.insert(operation);
    }

    pub fn calls(&self) -> Vec<String> {
        lock(&self.state).calls.clone()
    }

    fn enter(
        &self,
        operation: &'static str,
    ) -> Result<MutexGuard<'_, AggregatorState>, AggregatorError> {
        let mut state = lock(&self.state);
        state.calls.push(operation.to_string());
        if state.failing.contains(operation) {
            return Err(AggregatorError::Api {
                code: "INTERNAL_SERVER_ERROR".to_string(),
                message: format!("{operation} failed"),
            });
        }
        Ok(state)
    }
}

fn item_not_found() -> AggregatorError {
    AggregatorError::Api {
        code: "ITEM_NOT_FOUND".to_string(),
        message: "unknown access token".to_string(),
    }
}

#[async_trait]
impl AggregatorGateway for FakeAggregator {
    async fn create_link_token(&self, user: &LinkTokenUser) -> Result<String, AggregatorError> {
        self.enter("create_link_token")?;
        Ok(format!("link-sandbox-{}", user.user_id))
    }

    async fn exchange_public_token(
        &self,
        public_token: &str,
    ) -> Result<(AccessToken, String), AggregatorError> {
        let state = self.enter("exchange_public_token")?;
        let item_id = state
            .items
            .get(public_token)
            .cloned()
            .ok_or_else(|| AggregatorError::Api {
                code: "INVALID_PUBLIC_TOKEN".to_string(),
                message: "provided public token is in an invalid format".to_string(),
            })?;
        Ok((Self::access_token_for(public_token), item_id))
    }

    async fn fetch_primary_account(
        &self,
        access_token: &AccessToken,
    ) -> Result<(AccountData, ItemData), AggregatorError> {
        let state = self.enter("fetch_primary_account")?;
        state
            .accounts
            .get(access_token.get())
            .cloned()
            .ok_or_else(item_not_found)
    }

    async fn resolve_institution_id(
        &self,
        institution_id: &str,
    ) -> Result<String, AggregatorError> {
        let state = self.enter("resolve_institution_id")?;
        state
            .institutions
            .get(institution_id)
            .cloned()
            .ok_or_else(|| AggregatorError::Api {
                code: "INVALID_INSTITUTION".to_string(),
                message: format!("unknown institution {institution_id}"),
            })
    }

    async fn fetch_transactions(
        &self,
        access_token: &AccessToken,
    ) -> Result<Vec<AggregatorTransaction>, AggregatorError> {
        let state = self.enter("fetch_transactions")?;
        if !state.accounts.contains_key(access_token.get()) {
            return Err(item_not_found());
        }
        Ok(state
            .transactions
            .get(access_token.get())
            .cloned()
            .unwrap_or_default())
    }

    async fn create_processor_token(
        &self,
        access_token: &AccessToken,
        account_id: &str,
    ) -> Result<String, AggregatorError> {
        let state = self.enter("create_processor_token")?;
        if !state.accounts.contains_key(access_token.get()) {
            return Err(item_not_found());
        }
        Ok(format!("processor-sandbox-{account_id}"))
    }

    async fn create_sandbox_public_token(
        &self,
        institution_id: &str,
    ) -> Result<String, AggregatorError> {
        self.enter("create_sandbox_public_token")?;
        Ok(format!("public-sandbox-{institution_id}"))
    }
}

#[derive(Default)]
struct PaymentState {
    next_id: u64,
    funding_sources: Vec<String>,
    removed: Vec<String>,
    transfers: Vec<(String, String, String)>,
    failing: HashSet<&'static str>,
    calls: Vec<String>,
}

/// Payment-rail double handing out sequential resource URLs under
/// [`FAKE_RAIL_URL`].
#[derive(Default)]
pub struct FakePayments {
    state: Mutex<PaymentState>,
}

impl FakePayments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(&self, operation: &'static str) {
        lock(&self.state).failing.insert(operation);
    }

    pub fn calls(&self) -> Vec<String> {
        lock(&self.state).calls.clone()
    }

    /// Funding sources created and not removed.
    pub fn funding_sources(&self) -> Vec<String> {
        let state = lock(&self.state);
        state
            .funding_sources
            .iter()
            .filter(|url| !state.removed.contains(url))
            .cloned()
            .collect()
    }

    pub fn removed_funding_sources(&self) -> Vec<String> {
        lock(&self.state).removed.clone()
    }

    /// `(source, destination, amount)` of every accepted transfer.
    pub fn transfers(&self) -> Vec<(String, String, String)> {
        lock(&self.state).transfers.clone()
    }

    fn enter(
        &self,
        operation: &'static str,
    ) -> Result<MutexGuard<'_, PaymentState>, PaymentError> {
        let mut state = lock(&self.state);
        state.calls.push(operation.to_string());
        if state.failing.contains(operation) {
            return Err(PaymentError::Api {
                code: "ServerError".to_string(),
                message: format!("{operation} failed"),
            });
        }
        state.next_id += 1;
        Ok(state)
    }
}

#[async_trait]
impl PaymentGateway for FakePayments {
    async fn create_on_demand_authorization(&self) -> Result<AuthLinks, PaymentError> {
        let state = self.enter("create_on_demand_authorization")?;
        let href = format!("{FAKE_RAIL_URL}/on-demand-authorizations/{}", state.next_id);
        Ok(AuthLinks(BTreeMap::from([(
            "on-demand-authorization".to_string(),
            href,
        )])))
    }

    async fn create_customer(&self, profile: &CustomerProfile) -> Result<Customer, PaymentError> {
        let state = self.enter("create_customer")?;
        let id = format!("customer-{}-{}", profile.last_name.to_lowercase(), state.next_id);
        Ok(Customer {
            url: format!("{FAKE_RAIL_URL}/customers/{id}"),
            id,
        })
    }

    async fn create_funding_source(
        &self,
        customer_url: &str,
        processor_token: &str,
        auth_links: &AuthLinks,
        _name: &str,
    ) -> Result<String, PaymentError> {
        let mut state = self.enter("create_funding_source")?;
        if customer_url.is_empty() || processor_token.is_empty() || auth_links.0.is_empty() {
            return Err(PaymentError::Api {
                code: "ValidationError".to_string(),
                message: "missing customer, token or authorization".to_string(),
            });
        }
        let url = format!("{FAKE_RAIL_URL}/funding-sources/fs-{}", state.next_id);
        state.funding_sources.push(url.clone());
        Ok(url)
    }

    async fn create_transfer(
        &self,
        source_funding_source_url: &str,
        destination_funding_source_url: &str,
        amount: &str,
    ) -> Result<TransferReceipt, PaymentError> {
        let mut state = self.enter("create_transfer")?;
        let transfer_id = format!("transfer-{}", state.next_id);
        state.transfers.push((
            source_funding_source_url.to_string(),
            destination_funding_source_url.to_string(),
            amount.to_string(),
        ));
        Ok(TransferReceipt {
            transfer_url: format!("{FAKE_RAIL_URL}/transfers/{transfer_id}"),
            transfer_id,
        })
    }

    async fn remove_funding_source(&self, funding_source_url: &str) -> Result<(), PaymentError> {
        let mut state = self.enter("remove_funding_source")?;
        state.removed.push(funding_source_url.to_string());
        Ok(())
    }
}
