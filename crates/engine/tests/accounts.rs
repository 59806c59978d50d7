use rust_decimal::Decimal;

use engine::{
    AggregatorTransaction, Direction, EngineError, TransferRequest,
    testing::{sample_account, sample_item},
};

mod common;

use common::harness;

fn coffee(account_id: &str, date: &str) -> AggregatorTransaction {
    AggregatorTransaction {
        transaction_id: format!("agg-{date}"),
        account_id: account_id.to_string(),
        name: "Coffee".to_string(),
        payment_channel: "in store".to_string(),
        amount: Decimal::new(450, 2),
        pending: false,
        category: "Food and Drink".to_string(),
        date: date.to_string(),
    }
}

#[tokio::test]
async fn list_sums_current_balances() {
    let h = harness().await;
    h.bank("public-a", "acc-a", 10_050);
    h.bank("public-b", "acc-b", 2_025);
    h.link("public-a", "u1", "Ann").await;
    h.link("public-b", "u1", "Ann").await;
    h.bank("public-c", "acc-c", 99_999);
    h.link("public-c", "u2", "Bob").await;

    let summary = h.engine.list_accounts("u1").await.unwrap();

    assert_eq!(summary.total_banks, 2);
    assert_eq!(summary.total_current_balance, Decimal::new(12_075, 2));
    let mut ids: Vec<_> = summary.accounts.iter().map(|a| a.id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, ["acc-a", "acc-b"]);
}

#[tokio::test]
async fn unknown_user_has_no_accounts() {
    let h = harness().await;

    let summary = h.engine.list_accounts("nobody").await.unwrap();

    assert!(summary.accounts.is_empty());
    assert_eq!(summary.total_banks, 0);
    assert_eq!(summary.total_current_balance, Decimal::ZERO);
}

#[tokio::test]
async fn one_failing_fetch_fails_the_list() {
    let h = harness().await;
    h.bank("public-a", "acc-a", 100);
    h.link("public-a", "u1", "Ann").await;
    h.aggregator.fail_on("fetch_primary_account");

    let err = h.engine.list_accounts("u1").await.unwrap_err();

    assert!(matches!(err, EngineError::Aggregator(_)));
}

#[tokio::test]
async fn absent_balances_count_as_zero() {
    let h = harness().await;
    let mut account = sample_account("acc-a", "Savings", Decimal::ONE);
    account.available_balance = None;
    account.current_balance = None;
    h.aggregator
        .add_account("public-a", account, sample_item("item-a", None));
    h.link("public-a", "u1", "Ann").await;

    let summary = h.engine.list_accounts("u1").await.unwrap();

    assert_eq!(summary.total_current_balance, Decimal::ZERO);
    assert_eq!(summary.accounts[0].available_balance, None);
    assert_eq!(summary.accounts[0].institution_id, "");
}

#[tokio::test]
async fn institution_is_resolved_when_known() {
    let h = harness().await;
    h.bank("public-a", "acc-a", 100);
    h.aggregator.add_institution("ins_109508", "ins_109508_canonical");
    h.link("public-a", "u1", "Ann").await;

    let summary = h.engine.list_accounts("u1").await.unwrap();

    assert_eq!(summary.accounts[0].institution_id, "ins_109508_canonical");
}

#[tokio::test]
async fn institution_lookup_failure_keeps_derived_id() {
    let h = harness().await;
    let mut item = sample_item("item-a", None);
    item.institution_name = Some("Bank of America".to_string());
    h.aggregator.add_account(
        "public-a",
        sample_account("acc-a", "Checking", Decimal::ONE),
        item,
    );
    h.link("public-a", "u1", "Ann").await;

    let summary = h.engine.list_accounts("u1").await.unwrap();

    assert_eq!(summary.accounts[0].institution_id, "ins_1");
}

#[tokio::test]
async fn detail_merges_transfers_and_aggregator_transactions() {
    let h = harness().await;
    h.bank("public-a", "acc-a", 10_000);
    h.bank("public-b", "acc-b", 10_000);
    let source = h.link("public-a", "u1", "Ann").await;
    let destination = h.link("public-b", "u2", "Bob").await;
    h.aggregator.add_transactions(
        "public-a",
        vec![coffee("acc-a", "2024-01-01"), coffee("acc-a", "pending")],
    );
    h.engine
        .transfer(TransferRequest {
            source_track_id: source.track_id.clone(),
            destination_track_id: Some(destination.track_id.clone()),
            amount: "50".to_string(),
            name: Some("Rent".to_string()),
            ..TransferRequest::default()
        })
        .await
        .unwrap();

    let detail = h.engine.account_detail(&source.track_id).await.unwrap();

    assert_eq!(detail.account.track_id, source.track_id);
    assert_eq!(detail.transactions.len(), 3);

    let transfer = &detail.transactions[0];
    assert_eq!(transfer.name, "Rent");
    assert_eq!(transfer.amount, "50.00");
    assert_eq!(transfer.direction, Direction::Debit);
    assert_eq!(transfer.account_id, "acc-a");
    assert_eq!(transfer.payment_channel, "online");
    assert_eq!(transfer.category, "Transfer");

    let reported = &detail.transactions[1];
    assert_eq!(reported.date, "2024-01-01");
    assert_eq!(reported.direction, Direction::Debit);
    assert_eq!(reported.amount, "4.50");

    assert_eq!(detail.transactions[2].date, "pending");

    let received = h.engine.account_detail(&destination.track_id).await.unwrap();
    assert_eq!(received.transactions.len(), 1);
    assert_eq!(received.transactions[0].direction, Direction::Credit);
    assert_eq!(received.transactions[0].account_id, "acc-b");
}

#[tokio::test]
async fn detail_of_unknown_track_id_is_not_found() {
    let h = harness().await;

    let err = h.engine.account_detail("PLAIDXXX").await.unwrap_err();

    assert_eq!(err, EngineError::NotFound("track id PLAIDXXX".to_string()));
}

#[tokio::test]
async fn detail_fails_when_sync_fails() {
    let h = harness().await;
    h.bank("public-a", "acc-a", 100);
    let linked = h.link("public-a", "u1", "Ann").await;
    h.aggregator.fail_on("fetch_transactions");

    let err = h.engine.account_detail(&linked.track_id).await.unwrap_err();

    assert!(matches!(err, EngineError::Aggregator(_)));
}
