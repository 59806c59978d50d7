use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Body of every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub mod link {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct LinkTokenCreate {
        pub user_id: String,
        pub email: String,
        /// Display name shown by the aggregator's link widget.
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct LinkTokenCreated {
        pub link_token: String,
    }

    /// Profile of the user completing the link flow.
    ///
    /// Only `userId`, `firstName` and `dwollaCustomerUrl` drive the workflow;
    /// the remaining fields are accepted so clients can forward the whole
    /// profile they already hold.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase", default)]
    pub struct BankUser {
        pub user_id: String,
        pub email: String,
        pub first_name: String,
        pub last_name: String,
        pub dwolla_customer_url: String,
        pub dwolla_customer_id: String,
        pub address1: String,
        pub city: String,
        pub state: String,
        pub postal_code: String,
        pub date_of_birth: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TokenExchange {
        pub public_token: String,
        pub user: BankUser,
    }

    /// A stored linkage as exposed to clients. Never carries the aggregator
    /// access token.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct LinkedAccount {
        pub track_id: String,
        pub account_id: String,
        pub bank_id: String,
        pub funding_source_url: String,
        pub shareable_id: String,
        pub user_id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TokenExchanged {
        pub message: String,
        pub linked_account: LinkedAccount,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SandboxPublicTokenCreate {
        pub institution_id: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SandboxPublicTokenCreated {
        pub public_token: String,
    }
}

pub mod customer {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CustomerNew {
        pub first_name: String,
        pub last_name: String,
        pub email: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CustomerCreated {
        pub customer_id: String,
        pub customer_url: String,
    }
}

pub mod account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AccountList {
        pub user_id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AccountGet {
        pub track_id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AccountView {
        pub id: String,
        /// Empty when the bank does not report an available balance.
        pub available_balance: String,
        pub current_balance: String,
        pub institution_id: String,
        pub name: String,
        pub official_name: String,
        pub mask: String,
        #[serde(rename = "type")]
        pub kind: String,
        pub subtype: String,
        pub track_id: String,
        pub shareable_id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AccountListResponse {
        pub accounts: Vec<AccountView>,
        pub total_banks: usize,
        #[serde(with = "rust_decimal::serde::float")]
        pub total_current_balance: Decimal,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AccountDetailResponse {
        pub account: AccountView,
        pub transactions: Vec<super::transaction::TransactionView>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Direction {
        Debit,
        Credit,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionView {
        pub id: String,
        pub name: String,
        pub payment_channel: String,
        #[serde(rename = "type")]
        pub direction: Direction,
        pub account_id: String,
        pub amount: String,
        pub pending: bool,
        pub category: String,
        /// `YYYY-MM-DD`, or whatever the aggregator reported.
        pub date: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransferNew {
        pub source_track_id: String,
        pub destination_track_id: Option<String>,
        /// Alternative to `destinationTrackId`: the receiver's shareable id.
        pub receiver_shareable_id: Option<String>,
        pub amount: String,
        pub name: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransferTransaction {
        pub transaction_id: String,
        pub name: String,
        pub amount: String,
        pub channel: String,
        pub category: String,
        pub sender_id: String,
        pub receiver_id: String,
        pub sender_bank_id: String,
        pub receiver_bank_id: String,
        pub date: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransferCreated {
        pub message: String,
        pub transfer_url: String,
        pub transaction: TransferTransaction,
    }
}
