use std::collections::BTreeMap;

use async_trait::async_trait;
use engine::{
    AuthLinks, Customer, CustomerProfile, PaymentError, PaymentGateway, TransferReceipt,
};
use reqwest::{
    Client, Response,
    header::{ACCEPT, CONTENT_TYPE, LOCATION},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::join_url;

pub const DWOLLA_SANDBOX_URL: &str = "https://api-sandbox.dwolla.com";

const HAL_JSON: &str = "application/vnd.dwolla.v1.hal+json";
const CURRENCY: &str = "USD";
const ON_DEMAND_AUTHORIZATION_REL: &str = "on-demand-authorization";

fn default_base_url() -> String {
    DWOLLA_SANDBOX_URL.to_string()
}

#[derive(Clone, Deserialize)]
pub struct DwollaConfig {
    pub key: String,
    pub secret: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

/// Payment-rail client. Every operation first obtains a fresh
/// client-credentials token.
#[derive(Clone)]
pub struct DwollaClient {
    client: Client,
    base_url: String,
    key: String,
    secret: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Link {
    href: String,
}

type Links = BTreeMap<String, Link>;

#[derive(Debug, Serialize)]
struct EmptyBody {}

#[derive(Debug, Deserialize)]
struct OnDemandAuthorization {
    #[serde(rename = "_links")]
    links: Links,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CustomerRequest<'a> {
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    business_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FundingSourceRequest<'a> {
    #[serde(rename = "_links")]
    links: Links,
    name: &'a str,
    plaid_token: &'a str,
}

#[derive(Debug, Serialize)]
struct TransferRequest<'a> {
    #[serde(rename = "_links")]
    links: Links,
    amount: Amount<'a>,
}

#[derive(Debug, Serialize)]
struct Amount<'a> {
    currency: &'static str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct RemoveFundingSource {
    removed: bool,
}

fn links<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Links {
    pairs
        .into_iter()
        .map(|(rel, href)| {
            (
                rel.to_string(),
                Link {
                    href: href.to_string(),
                },
            )
        })
        .collect()
}

fn transfer_request<'a>(
    source: &'a str,
    destination: &'a str,
    amount: &'a str,
) -> TransferRequest<'a> {
    TransferRequest {
        links: links([("source", source), ("destination", destination)]),
        amount: Amount {
            currency: CURRENCY,
            value: amount,
        },
    }
}

/// The links a funding source needs from an on-demand authorization: its
/// `self` href under the `on-demand-authorization` rel.
fn funding_source_auth_links(auth: OnDemandAuthorization) -> Result<AuthLinks, PaymentError> {
    let href = auth
        .links
        .get("self")
        .map(|link| link.href.clone())
        .ok_or_else(|| {
            PaymentError::Malformed("on-demand authorization: missing self link".to_string())
        })?;
    Ok(AuthLinks(BTreeMap::from([(
        ON_DEMAND_AUTHORIZATION_REL.to_string(),
        href,
    )])))
}

fn funding_source_request<'a>(
    auth_links: &'a AuthLinks,
    name: &'a str,
    processor_token: &'a str,
) -> FundingSourceRequest<'a> {
    FundingSourceRequest {
        links: links(
            auth_links
                .0
                .iter()
                .map(|(rel, href)| (rel.as_str(), href.as_str())),
        ),
        name,
        plaid_token: processor_token,
    }
}

/// Last path segment of a resource URL, which is the resource id.
fn resource_id(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

impl DwollaClient {
    pub fn new(client: Client, config: DwollaConfig) -> Self {
        Self {
            client,
            base_url: config.base_url,
            key: config.key,
            secret: config.secret,
        }
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    async fn token(&self) -> Result<String, PaymentError> {
        let resp = self
            .client
            .post(self.url("/token"))
            .basic_auth(&self.key, Some(&self.secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(transport)?;
        let resp = check(resp, "token").await?;
        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|err| PaymentError::Malformed(format!("token: {err}")))?;
        Ok(token.access_token)
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
        what: &str,
    ) -> Result<Response, PaymentError> {
        let token = self.token().await?;
        tracing::debug!(%url, "dwolla request");
        let resp = self
            .client
            .post(url)
            .bearer_auth(token)
            .header(ACCEPT, HAL_JSON)
            .header(CONTENT_TYPE, HAL_JSON)
            .json(body)
            .send()
            .await
            .map_err(transport)?;
        check(resp, what).await
    }

    async fn post_json<TReq: Serialize + ?Sized, TResp: DeserializeOwned>(
        &self,
        url: &str,
        body: &TReq,
        what: &str,
    ) -> Result<TResp, PaymentError> {
        self.post(url, body, what)
            .await?
            .json::<TResp>()
            .await
            .map_err(|err| PaymentError::Malformed(format!("{what}: {err}")))
    }

    /// Create a resource and return the URL from its `Location` header.
    async fn create<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
        what: &str,
    ) -> Result<String, PaymentError> {
        let resp = self.post(url, body, what).await?;
        resp.headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string)
            .ok_or_else(|| PaymentError::Malformed(format!("{what}: missing Location header")))
    }
}

fn transport(err: reqwest::Error) -> PaymentError {
    PaymentError::Transport(err.to_string())
}

async fn check(resp: Response, what: &str) -> Result<Response, PaymentError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    Err(match resp.json::<ErrorBody>().await {
        Ok(err) => PaymentError::Api {
            code: err.code,
            message: err.message,
        },
        Err(_) => PaymentError::Api {
            code: status.as_u16().to_string(),
            message: format!("{what} failed"),
        },
    })
}

#[async_trait]
impl PaymentGateway for DwollaClient {
    async fn create_on_demand_authorization(&self) -> Result<AuthLinks, PaymentError> {
        let auth: OnDemandAuthorization = self
            .post_json(
                &self.url("/on-demand-authorizations"),
                &EmptyBody {},
                "on-demand authorization",
            )
            .await?;
        funding_source_auth_links(auth)
    }

    async fn create_customer(&self, profile: &CustomerProfile) -> Result<Customer, PaymentError> {
        let body = CustomerRequest {
            first_name: &profile.first_name,
            last_name: &profile.last_name,
            email: &profile.email,
            business_name: profile.business_name(),
        };
        let url = self.create(&self.url("/customers"), &body, "customer").await?;
        Ok(Customer {
            id: resource_id(&url),
            url,
        })
    }

    async fn create_funding_source(
        &self,
        customer_url: &str,
        processor_token: &str,
        auth_links: &AuthLinks,
        name: &str,
    ) -> Result<String, PaymentError> {
        let body = funding_source_request(auth_links, name, processor_token);
        self.create(
            &join_url(customer_url, "/funding-sources"),
            &body,
            "funding source",
        )
        .await
    }

    async fn create_transfer(
        &self,
        source_funding_source_url: &str,
        destination_funding_source_url: &str,
        amount: &str,
    ) -> Result<TransferReceipt, PaymentError> {
        let body = transfer_request(
            source_funding_source_url,
            destination_funding_source_url,
            amount,
        );
        let transfer_url = self.create(&self.url("/transfers"), &body, "transfer").await?;
        Ok(TransferReceipt {
            transfer_id: resource_id(&transfer_url),
            transfer_url,
        })
    }

    async fn remove_funding_source(&self, funding_source_url: &str) -> Result<(), PaymentError> {
        self.post(
            funding_source_url,
            &RemoveFundingSource { removed: true },
            "funding source removal",
        )
        .await?;
        Ok(())
    }
}
