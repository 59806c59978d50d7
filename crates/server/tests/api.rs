use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::{
    Engine,
    testing::{FAKE_RAIL_URL, FakeAggregator, FakePayments, sample_account, sample_item},
};
use migration::MigratorTrait;
use server::{ServerState, router};

async fn build_app(sandbox: bool) -> (Router, Arc<FakeAggregator>, Arc<FakePayments>) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let aggregator = Arc::new(FakeAggregator::new());
    let payments = Arc::new(FakePayments::new());
    let engine = Engine::builder()
        .database(db)
        .aggregator(aggregator.clone())
        .payments(payments.clone())
        .build()
        .await
        .unwrap();
    let state = ServerState {
        engine: Arc::new(engine),
        sandbox,
    };
    (router(state), aggregator, payments)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    post_raw(app, uri, body.to_string()).await
}

async fn post_raw(app: &Router, uri: &str, body: String) -> (StatusCode, Value) {
    let res = app
        .clone()
        .oneshot(
            Request::post(uri)
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn bank(aggregator: &FakeAggregator, public_token: &str, account_id: &str, cents: i64) {
    aggregator.add_account(
        public_token,
        sample_account(account_id, "Plaid Checking", Decimal::new(cents, 2)),
        sample_item(&format!("item-{account_id}"), None),
    );
}

async fn exchange(app: &Router, public_token: &str, user_id: &str, first_name: &str) -> Value {
    let (status, body) = post(
        app,
        "/token/exchange",
        json!({
            "publicToken": public_token,
            "user": {
                "userId": user_id,
                "firstName": first_name,
                "lastName": "Lee",
                "email": "ann@example.com",
                "dwollaCustomerUrl": format!("{FAKE_RAIL_URL}/customers/{user_id}"),
                "city": "Springfield"
            }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["linkedAccount"].clone()
}

#[tokio::test]
async fn health_is_ok() {
    let (app, _, _) = build_app(false).await;

    let res = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn link_token_round_trip() {
    let (app, _, _) = build_app(false).await;

    let (status, body) = post(
        &app,
        "/linktoken/create",
        json!({ "userId": "u1", "email": "ann@example.com", "name": "Ann Lee" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "linkToken": "link-sandbox-u1" }));
}

#[tokio::test]
async fn malformed_json_is_400() {
    let (app, _, _) = build_app(false).await;

    let (status, body) = post_raw(&app, "/linktoken/create", "{\"userId\":".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .starts_with("invalid request - ")
    );

    let (status, _) = post(&app, "/accounts/list", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn blank_field_is_400() {
    let (app, _, _) = build_app(false).await;

    let (status, body) = post(&app, "/accounts/list", json!({ "userId": " " })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": "invalid request - userId must not be empty" })
    );
}

#[tokio::test]
async fn exchange_then_list_never_exposes_the_access_token() {
    let (app, aggregator, _) = build_app(false).await;
    bank(&aggregator, "public-xyz", "acc-1", 12_350);

    let linked = exchange(&app, "public-xyz", "u1", "Ann").await;
    assert!(linked["trackId"].as_str().unwrap().starts_with("PLAIDANN"));
    assert_eq!(linked["accountId"], "acc-1");
    assert!(linked.get("accessToken").is_none());

    let (status, body) = post(&app, "/accounts/list", json!({ "userId": "u1" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalBanks"], 1);
    assert_eq!(body["totalCurrentBalance"], 123.5);
    assert_eq!(body["accounts"][0]["currentBalance"], "123.50");
    assert_eq!(body["accounts"][0]["type"], "depository");
    assert!(!body.to_string().contains("access-public-xyz"));
}

#[tokio::test]
async fn invalid_public_token_is_500_with_provider_message() {
    let (app, _, _) = build_app(false).await;

    let (status, body) = post(
        &app,
        "/token/exchange",
        json!({
            "publicToken": "public-unknown",
            "user": {
                "userId": "u1",
                "firstName": "Ann",
                "dwollaCustomerUrl": format!("{FAKE_RAIL_URL}/customers/u1")
            }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("INVALID_PUBLIC_TOKEN")
    );
}

#[tokio::test]
async fn exchange_without_customer_url_is_400() {
    let (app, aggregator, payments) = build_app(false).await;
    bank(&aggregator, "public-xyz", "acc-1", 12_350);

    let (status, body) = post(
        &app,
        "/token/exchange",
        json!({ "publicToken": "public-xyz", "user": { "firstName": "Ann", "userId": "u1" } }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": "invalid request - user.dwollaCustomerUrl must not be empty" })
    );
    assert!(aggregator.calls().is_empty());
    assert!(payments.calls().is_empty());
}

#[tokio::test]
async fn customer_create_returns_id_and_url() {
    let (app, _, _) = build_app(false).await;

    let (status, body) = post(
        &app,
        "/customer/create",
        json!({ "firstName": "Ann", "lastName": "Lee", "email": "ann@example.com" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let id = body["customerId"].as_str().unwrap();
    assert!(id.starts_with("customer-lee-"));
    assert_eq!(
        body["customerUrl"],
        format!("{FAKE_RAIL_URL}/customers/{id}")
    );
}

#[tokio::test]
async fn transfer_then_detail_shows_debit() {
    let (app, aggregator, payments) = build_app(false).await;
    bank(&aggregator, "public-a", "acc-a", 10_000);
    bank(&aggregator, "public-b", "acc-b", 10_000);
    let source = exchange(&app, "public-a", "u1", "Ann").await;
    let destination = exchange(&app, "public-b", "u2", "Bob").await;

    let (status, body) = post(
        &app,
        "/transfer",
        json!({
            "sourceTrackId": source["trackId"],
            "receiverShareableId": destination["shareableId"],
            "amount": "50",
            "name": "Rent"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["transaction"]["amount"], "50.00");
    assert_eq!(body["transaction"]["channel"], "online");
    assert_eq!(body["transaction"]["receiverBankId"], destination["trackId"]);
    assert_eq!(payments.transfers().len(), 1);

    let (status, body) = post(
        &app,
        "/account/detail",
        json!({ "trackId": source["trackId"] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["account"]["trackId"], source["trackId"]);
    assert_eq!(body["transactions"][0]["type"], "debit");
    assert_eq!(body["transactions"][0]["amount"], "50.00");
    assert_eq!(body["transactions"][0]["name"], "Rent");
}

#[tokio::test]
async fn transfer_validation_is_400() {
    let (app, aggregator, payments) = build_app(false).await;
    bank(&aggregator, "public-a", "acc-a", 10_000);
    let source = exchange(&app, "public-a", "u1", "Ann").await;

    let (status, _) = post(
        &app,
        "/transfer",
        json!({ "sourceTrackId": source["trackId"], "amount": "10" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        &app,
        "/transfer",
        json!({
            "sourceTrackId": source["trackId"],
            "destinationTrackId": "PLAIDBOB",
            "amount": "-1"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(payments.transfers().is_empty());
}

#[tokio::test]
async fn unknown_track_id_is_500_not_found() {
    let (app, _, _) = build_app(false).await;

    let (status, body) = post(&app, "/account/detail", json!({ "trackId": "PLAIDX" })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "no records found: track id PLAIDX" }));
}

#[tokio::test]
async fn sandbox_route_follows_environment() {
    let (app, _, _) = build_app(true).await;
    let (status, body) = post(&app, "/sandbox/publictoken/create", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "publicToken": "public-sandbox-ins_109508" }));

    let (app, _, _) = build_app(false).await;
    let (status, _) = post(&app, "/sandbox/publictoken/create", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
