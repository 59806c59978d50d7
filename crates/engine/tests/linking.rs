use sea_orm::ConnectionTrait;

use engine::{
    AggregatorError, EngineError, LinkTokenUser, PaymentError, decode_shareable_id,
    testing::FakeAggregator,
};

mod common;

use common::{harness, profile};

#[tokio::test]
async fn link_stores_account_and_lists_it() {
    let h = harness().await;
    h.bank("public-xyz", "acc-1", 10_000);

    let linked = h.link("public-xyz", "u1", "Ann").await;

    assert!(linked.track_id.starts_with("PLAIDANN"));
    assert_eq!(linked.account_id, "acc-1");
    assert_eq!(linked.bank_id, "item-acc-1");
    assert_eq!(linked.user_id, "u1");
    assert_eq!(
        linked.access_token,
        FakeAggregator::access_token_for("public-xyz")
    );
    assert_eq!(decode_shareable_id(&linked.shareable_id).unwrap(), "acc-1");
    assert_eq!(h.payments.funding_sources(), [linked.funding_source_url.clone()]);

    let summary = h.engine.list_accounts("u1").await.unwrap();
    assert_eq!(summary.total_banks, 1);
    assert_eq!(summary.accounts[0].track_id, linked.track_id);
}

#[tokio::test]
async fn link_calls_steps_in_order() {
    let h = harness().await;
    h.bank("public-xyz", "acc-1", 100);

    h.link("public-xyz", "u1", "Ann").await;

    assert_eq!(
        h.aggregator.calls(),
        [
            "exchange_public_token",
            "fetch_primary_account",
            "create_processor_token"
        ]
    );
    assert_eq!(
        h.payments.calls(),
        ["create_on_demand_authorization", "create_funding_source"]
    );
}

#[tokio::test]
async fn link_twice_gives_two_track_ids() {
    let h = harness().await;
    h.bank("public-xyz", "acc-1", 100);

    let first = h.link("public-xyz", "u1", "Ann").await;
    let second = h.link("public-xyz", "u1", "Ann").await;

    assert_ne!(first.track_id, second.track_id);
    assert_eq!(h.engine.list_accounts("u1").await.unwrap().total_banks, 2);
}

#[tokio::test]
async fn invalid_public_token_stores_nothing() {
    let h = harness().await;

    let err = h
        .engine
        .link_account("public-unknown", profile("u1", "Ann"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        EngineError::Aggregator(AggregatorError::Api { ref code, .. }) if code == "INVALID_PUBLIC_TOKEN"
    ));
    assert!(h.payments.calls().is_empty());
    assert_eq!(h.engine.list_accounts("u1").await.unwrap().total_banks, 0);
}

#[tokio::test]
async fn failure_at_any_step_stores_nothing() {
    for step in ["fetch_primary_account", "create_processor_token"] {
        let h = harness().await;
        h.bank("public-xyz", "acc-1", 100);
        h.aggregator.fail_on(step);

        let err = h
            .engine
            .link_account("public-xyz", profile("u1", "Ann"))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Aggregator(_)), "{step}: {err}");
        assert_eq!(h.engine.list_accounts("u1").await.unwrap().total_banks, 0);
    }

    for step in ["create_on_demand_authorization", "create_funding_source"] {
        let h = harness().await;
        h.bank("public-xyz", "acc-1", 100);
        h.payments.fail_on(step);

        let err = h
            .engine
            .link_account("public-xyz", profile("u1", "Ann"))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Payment(_)), "{step}: {err}");
        assert!(h.payments.funding_sources().is_empty());
        assert_eq!(h.engine.list_accounts("u1").await.unwrap().total_banks, 0);
    }
}

#[tokio::test]
async fn store_failure_removes_funding_source() {
    let h = harness().await;
    h.bank("public-xyz", "acc-1", 100);
    h.db
        .execute_unprepared("DROP TABLE linked_accounts")
        .await
        .unwrap();

    let err = h
        .engine
        .link_account("public-xyz", profile("u1", "Ann"))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Database(_)), "{err}");
    assert!(h.payments.funding_sources().is_empty());
    assert_eq!(h.payments.removed_funding_sources().len(), 1);
    assert_eq!(h.payments.calls().last().unwrap(), "remove_funding_source");
}

#[tokio::test]
async fn failed_compensation_keeps_store_error() {
    let h = harness().await;
    h.bank("public-xyz", "acc-1", 100);
    h.payments.fail_on("remove_funding_source");
    h.db
        .execute_unprepared("DROP TABLE linked_accounts")
        .await
        .unwrap();

    let err = h
        .engine
        .link_account("public-xyz", profile("u1", "Ann"))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Database(_)), "{err}");
    assert_eq!(h.payments.funding_sources().len(), 1);
}

#[tokio::test]
async fn blank_profile_fields_are_rejected_before_any_call() {
    let h = harness().await;
    h.bank("public-xyz", "acc-1", 100);

    let mut missing_customer = profile("u1", "Ann");
    missing_customer.customer_url = "  ".to_string();
    let err = h
        .engine
        .link_account("public-xyz", missing_customer)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("user.dwollaCustomerUrl must not be empty".to_string())
    );

    let err = h
        .engine
        .link_account("", profile("u1", "Ann"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("publicToken must not be empty".to_string())
    );
    assert!(h.aggregator.calls().is_empty());
}

#[tokio::test]
async fn link_token_and_customer_are_forwarded() {
    let h = harness().await;

    let token = h
        .engine
        .create_link_token(LinkTokenUser {
            user_id: " u1 ".to_string(),
            email: "ann@example.com".to_string(),
            name: "Ann".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(token, "link-sandbox-u1");

    let customer = h
        .engine
        .create_customer(engine::CustomerProfile {
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: "ann@example.com".to_string(),
        })
        .await
        .unwrap();
    assert!(customer.id.starts_with("customer-lee-"));
    assert!(customer.url.ends_with(&customer.id));
}

#[tokio::test]
async fn customer_rail_errors_surface() {
    let h = harness().await;
    h.payments.fail_on("create_customer");

    let err = h
        .engine
        .create_customer(engine::CustomerProfile {
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: "ann@example.com".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Payment(PaymentError::Api { .. })));
}

#[tokio::test]
async fn sandbox_token_defaults_institution() {
    let h = harness().await;

    let default = h.engine.create_sandbox_public_token(None).await.unwrap();
    assert_eq!(default, "public-sandbox-ins_109508");

    let chosen = h
        .engine
        .create_sandbox_public_token(Some("ins_3"))
        .await
        .unwrap();
    assert_eq!(chosen, "public-sandbox-ins_3");
}
