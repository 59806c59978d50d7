use async_trait::async_trait;
use engine::{
    AccessToken, AccountData, AggregatorError, AggregatorGateway, AggregatorTransaction,
    ItemData, LinkTokenUser,
};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::join_url;

const PRODUCTS: [&str; 3] = ["auth", "transactions", "identity"];
const COUNTRY_CODES: [&str; 1] = ["US"];
const DEPOSITORY_SUBTYPES: [&str; 2] = ["checking", "savings"];
const PROCESSOR: &str = "dwolla";

/// Plaid deployment the credentials belong to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaidEnvironment {
    #[default]
    Sandbox,
    Development,
    Production,
}

impl PlaidEnvironment {
    pub fn base_url(self) -> &'static str {
        match self {
            PlaidEnvironment::Sandbox => "https://sandbox.plaid.com",
            PlaidEnvironment::Development => "https://development.plaid.com",
            PlaidEnvironment::Production => "https://production.plaid.com",
        }
    }

    pub fn is_sandbox(self) -> bool {
        self == PlaidEnvironment::Sandbox
    }
}

#[derive(Clone, Deserialize)]
pub struct PlaidConfig {
    pub client_id: String,
    pub secret: String,
    #[serde(default)]
    pub environment: PlaidEnvironment,
}

#[derive(Clone)]
pub struct PlaidClient {
    client: Client,
    base_url: String,
    client_id: String,
    secret: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error_code: String,
    error_message: String,
}

#[derive(Debug, Serialize)]
struct LinkTokenCreateRequest<'a> {
    client_name: &'a str,
    language: &'static str,
    country_codes: &'static [&'static str],
    user: LinkUser<'a>,
    products: &'static [&'static str],
    link_customization_name: &'static str,
    account_filters: AccountFilters,
}

#[derive(Debug, Serialize)]
struct LinkUser<'a> {
    client_user_id: &'a str,
    email_address: &'a str,
}

#[derive(Debug, Serialize)]
struct AccountFilters {
    depository: DepositoryFilter,
}

#[derive(Debug, Serialize)]
struct DepositoryFilter {
    account_subtypes: &'static [&'static str],
}

#[derive(Debug, Deserialize)]
struct LinkTokenCreateResponse {
    link_token: String,
}

#[derive(Debug, Serialize)]
struct PublicTokenExchangeRequest<'a> {
    public_token: &'a str,
}

#[derive(Deserialize)]
struct PublicTokenExchangeResponse {
    access_token: String,
    item_id: String,
}

#[derive(Serialize)]
struct AccessTokenRequest<'a> {
    access_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct AccountsGetResponse {
    accounts: Vec<PlaidAccount>,
    item: PlaidItem,
}

#[derive(Debug, Deserialize)]
struct PlaidAccount {
    account_id: String,
    name: String,
    #[serde(default)]
    official_name: Option<String>,
    #[serde(default)]
    mask: Option<String>,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    subtype: Option<String>,
    balances: PlaidBalances,
}

#[derive(Debug, Deserialize)]
struct PlaidBalances {
    #[serde(default, with = "rust_decimal::serde::float_option")]
    available: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    current: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct PlaidItem {
    item_id: String,
    #[serde(default)]
    institution_id: Option<String>,
    #[serde(default)]
    institution_name: Option<String>,
}

#[derive(Debug, Serialize)]
struct InstitutionGetRequest<'a> {
    institution_id: &'a str,
    country_codes: &'static [&'static str],
}

#[derive(Debug, Deserialize)]
struct InstitutionGetResponse {
    institution: PlaidInstitution,
}

#[derive(Debug, Deserialize)]
struct PlaidInstitution {
    institution_id: String,
}

#[derive(Serialize)]
struct TransactionsSyncRequest<'a> {
    access_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cursor: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TransactionsSyncResponse {
    added: Vec<PlaidTransaction>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: String,
}

#[derive(Debug, Deserialize)]
struct PlaidTransaction {
    transaction_id: String,
    account_id: String,
    name: String,
    #[serde(default)]
    payment_channel: String,
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    #[serde(default)]
    pending: bool,
    #[serde(default)]
    category: Option<Vec<String>>,
    date: String,
}

#[derive(Serialize)]
struct ProcessorTokenCreateRequest<'a> {
    access_token: &'a str,
    account_id: &'a str,
    processor: &'static str,
}

#[derive(Deserialize)]
struct ProcessorTokenCreateResponse {
    processor_token: String,
}

#[derive(Debug, Serialize)]
struct SandboxPublicTokenCreateRequest<'a> {
    institution_id: &'a str,
    initial_products: &'static [&'static str],
}

#[derive(Deserialize)]
struct SandboxPublicTokenCreateResponse {
    public_token: String,
}

impl From<PlaidAccount> for AccountData {
    fn from(account: PlaidAccount) -> Self {
        Self {
            account_id: account.account_id,
            name: account.name,
            official_name: account.official_name,
            mask: account.mask,
            kind: account.kind,
            subtype: account.subtype,
            available_balance: account.balances.available,
            current_balance: account.balances.current,
        }
    }
}

impl From<PlaidItem> for ItemData {
    fn from(item: PlaidItem) -> Self {
        Self {
            item_id: item.item_id,
            institution_id: item.institution_id,
            institution_name: item.institution_name,
        }
    }
}

impl From<PlaidTransaction> for AggregatorTransaction {
    fn from(tx: PlaidTransaction) -> Self {
        Self {
            transaction_id: tx.transaction_id,
            account_id: tx.account_id,
            name: tx.name,
            payment_channel: tx.payment_channel,
            amount: tx.amount,
            pending: tx.pending,
            category: tx
                .category
                .and_then(|categories| categories.into_iter().next())
                .unwrap_or_default(),
            date: tx.date,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

impl PlaidClient {
    pub fn new(client: Client, config: PlaidConfig) -> Self {
        Self {
            client,
            base_url: config.environment.base_url().to_string(),
            client_id: config.client_id,
            secret: config.secret,
        }
    }

    async fn post_json<TReq: Serialize + ?Sized, TResp: DeserializeOwned>(
        &self,
        path: &str,
        body: &TReq,
    ) -> Result<TResp, AggregatorError> {
        tracing::debug!(path, "plaid request");
        let resp = self
            .client
            .post(join_url(&self.base_url, path))
            .header("PLAID-CLIENT-ID", &self.client_id)
            .header("PLAID-SECRET", &self.secret)
            .json(body)
            .send()
            .await
            .map_err(|err| AggregatorError::Transport(err.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return resp
                .json::<TResp>()
                .await
                .map_err(|err| AggregatorError::Malformed(format!("{path}: {err}")));
        }

        Err(match resp.json::<ErrorBody>().await {
            Ok(err) => api_error(err),
            Err(_) => AggregatorError::Api {
                code: status.as_u16().to_string(),
                message: format!("{path} failed"),
            },
        })
    }
}

fn api_error(body: ErrorBody) -> AggregatorError {
    AggregatorError::Api {
        code: body.error_code,
        message: body.error_message,
    }
}

fn primary_account(resp: AccountsGetResponse) -> Result<(AccountData, ItemData), AggregatorError> {
    let account = resp
        .accounts
        .into_iter()
        .next()
        .ok_or_else(|| AggregatorError::Malformed("item has no accounts".to_string()))?;
    Ok((account.into(), resp.item.into()))
}

#[async_trait]
impl AggregatorGateway for PlaidClient {
    async fn create_link_token(&self, user: &LinkTokenUser) -> Result<String, AggregatorError> {
        let body = LinkTokenCreateRequest {
            client_name: &user.name,
            language: "en",
            country_codes: &COUNTRY_CODES,
            user: LinkUser {
                client_user_id: &user.user_id,
                email_address: &user.email,
            },
            products: &PRODUCTS,
            link_customization_name: "default",
            account_filters: AccountFilters {
                depository: DepositoryFilter {
                    account_subtypes: &DEPOSITORY_SUBTYPES,
                },
            },
        };
        let resp: LinkTokenCreateResponse = self.post_json("/link/token/create", &body).await?;
        Ok(resp.link_token)
    }

    async fn exchange_public_token(
        &self,
        public_token: &str,
    ) -> Result<(AccessToken, String), AggregatorError> {
        let resp: PublicTokenExchangeResponse = self
            .post_json(
                "/item/public_token/exchange",
                &PublicTokenExchangeRequest { public_token },
            )
            .await?;
        Ok((AccessToken::new(resp.access_token), resp.item_id))
    }

    async fn fetch_primary_account(
        &self,
        access_token: &AccessToken,
    ) -> Result<(AccountData, ItemData), AggregatorError> {
        let resp: AccountsGetResponse = self
            .post_json(
                "/accounts/get",
                &AccessTokenRequest {
                    access_token: access_token.get(),
                },
            )
            .await?;
        primary_account(resp)
    }

    async fn resolve_institution_id(
        &self,
        institution_id: &str,
    ) -> Result<String, AggregatorError> {
        let resp: InstitutionGetResponse = self
            .post_json(
                "/institutions/get_by_id",
                &InstitutionGetRequest {
                    institution_id,
                    country_codes: &COUNTRY_CODES,
                },
            )
            .await?;
        Ok(resp.institution.institution_id)
    }

    async fn fetch_transactions(
        &self,
        access_token: &AccessToken,
    ) -> Result<Vec<AggregatorTransaction>, AggregatorError> {
        let mut transactions = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let resp: TransactionsSyncResponse = self
                .post_json(
                    "/transactions/sync",
                    &TransactionsSyncRequest {
                        access_token: access_token.get(),
                        cursor: cursor.as_deref(),
                    },
                )
                .await?;
            transactions.extend(resp.added.into_iter().map(AggregatorTransaction::from));
            if !resp.has_more || resp.next_cursor.is_empty() {
                break;
            }
            cursor = Some(resp.next_cursor);
        }
        Ok(transactions)
    }

    async fn create_processor_token(
        &self,
        access_token: &AccessToken,
        account_id: &str,
    ) -> Result<String, AggregatorError> {
        let resp: ProcessorTokenCreateResponse = self
            .post_json(
                "/processor/token/create",
                &ProcessorTokenCreateRequest {
                    access_token: access_token.get(),
                    account_id,
                    processor: PROCESSOR,
                },
            )
            .await?;
        Ok(resp.processor_token)
    }

    async fn create_sandbox_public_token(
        &self,
        institution_id: &str,
    ) -> Result<String, AggregatorError> {
        let resp: SandboxPublicTokenCreateResponse = self
            .post_json(
                "/sandbox/public_token/create",
                &SandboxPublicTokenCreateRequest {
                    institution_id,
                    initial_products: &PRODUCTS,
                },
            )
            .await?;
        Ok(resp.public_token)
    }
}
