//! Read models rebuilt on every request from live aggregator data and stored
//! records. Nothing here is persisted.

use std::cmp::Ordering;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    LinkedAccount, TransferTransaction,
    gateway::{AccountData, AggregatorTransaction},
};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Debit,
    Credit,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AccountView {
    pub id: String,
    pub available_balance: Option<Decimal>,
    pub current_balance: Decimal,
    pub institution_id: String,
    pub name: String,
    pub official_name: String,
    pub mask: String,
    pub kind: String,
    pub subtype: String,
    pub track_id: String,
    pub shareable_id: String,
}

impl AccountView {
    pub(crate) fn new(data: AccountData, record: &LinkedAccount, institution_id: String) -> Self {
        Self {
            id: data.account_id,
            available_balance: data.available_balance,
            current_balance: data.current_balance.unwrap_or_default(),
            institution_id,
            name: data.name,
            official_name: data.official_name.unwrap_or_default(),
            mask: data.mask.unwrap_or_default(),
            kind: data.kind,
            subtype: data.subtype.unwrap_or_default(),
            track_id: record.track_id.clone(),
            shareable_id: record.shareable_id.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionView {
    pub id: String,
    pub name: String,
    pub payment_channel: String,
    pub direction: Direction,
    pub account_id: String,
    pub amount: String,
    pub pending: bool,
    pub category: String,
    pub date: String,
}

impl TransactionView {
    /// Tag a recorded transfer relative to the viewed account: debit when it
    /// is the sender, credit in every other case.
    pub(crate) fn from_transfer(
        tx: TransferTransaction,
        viewed_track_id: &str,
        account_id: &str,
    ) -> Self {
        let direction = if tx.sender_bank_id == viewed_track_id {
            Direction::Debit
        } else {
            Direction::Credit
        };
        Self {
            id: tx.transaction_id,
            name: tx.name,
            payment_channel: tx.channel,
            direction,
            account_id: account_id.to_string(),
            amount: tx.amount,
            pending: false,
            category: tx.category,
            date: tx.created_at.format(DATE_FORMAT).to_string(),
        }
    }

    pub(crate) fn from_aggregator(tx: AggregatorTransaction) -> Self {
        let direction = if tx.amount.is_sign_positive() && !tx.amount.is_zero() {
            Direction::Debit
        } else {
            Direction::Credit
        };
        Self {
            id: tx.transaction_id,
            name: tx.name,
            payment_channel: tx.payment_channel,
            direction,
            account_id: tx.account_id,
            amount: tx.amount.abs().to_string(),
            pending: tx.pending,
            category: tx.category,
            date: tx.date,
        }
    }

    fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, DATE_FORMAT).ok()
    }
}

/// Sort newest first. Unparsable dates go last; the sort is stable so equal
/// dates (and all unparsable ones) keep their merge order.
pub(crate) fn sort_newest_first(transactions: &mut [TransactionView]) {
    transactions.sort_by(|a, b| match (a.parsed_date(), b.parsed_date()) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

#[derive(Clone, Debug, PartialEq)]
pub struct AccountsSummary {
    pub accounts: Vec<AccountView>,
    pub total_banks: usize,
    pub total_current_balance: Decimal,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AccountDetail {
    pub account: AccountView,
    pub transactions: Vec<TransactionView>,
}
