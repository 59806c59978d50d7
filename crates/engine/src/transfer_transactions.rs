//! Transfer primitives.
//!
//! A `TransferTransaction` records one completed movement of funds between
//! two linked accounts. It is immutable once written.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};

pub const TRANSFER_CHANNEL: &str = "online";
pub const TRANSFER_CATEGORY: &str = "Transfer";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferTransaction {
    pub transaction_id: String,
    pub name: String,
    /// Decimal string with two fractional digits.
    pub amount: String,
    pub channel: String,
    pub category: String,
    pub sender_id: String,
    pub receiver_id: String,
    /// `track_id` of the sending linked account.
    pub sender_bank_id: String,
    /// `track_id` of the receiving linked account.
    pub receiver_bank_id: String,
    pub transfer_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "transfer_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub transaction_id: String,
    pub name: String,
    pub amount: String,
    pub channel: String,
    pub category: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub sender_bank_id: String,
    pub receiver_bank_id: String,
    pub transfer_url: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&TransferTransaction> for ActiveModel {
    fn from(tx: &TransferTransaction) -> Self {
        Self {
            transaction_id: ActiveValue::Set(tx.transaction_id.clone()),
            name: ActiveValue::Set(tx.name.clone()),
            amount: ActiveValue::Set(tx.amount.clone()),
            channel: ActiveValue::Set(tx.channel.clone()),
            category: ActiveValue::Set(tx.category.clone()),
            sender_id: ActiveValue::Set(tx.sender_id.clone()),
            receiver_id: ActiveValue::Set(tx.receiver_id.clone()),
            sender_bank_id: ActiveValue::Set(tx.sender_bank_id.clone()),
            receiver_bank_id: ActiveValue::Set(tx.receiver_bank_id.clone()),
            transfer_url: ActiveValue::Set(tx.transfer_url.clone()),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl From<Model> for TransferTransaction {
    fn from(model: Model) -> Self {
        Self {
            transaction_id: model.transaction_id,
            name: model.name,
            amount: model.amount,
            channel: model.channel,
            category: model.category,
            sender_id: model.sender_id,
            receiver_id: model.receiver_id,
            sender_bank_id: model.sender_bank_id,
            receiver_bank_id: model.receiver_bank_id,
            transfer_url: model.transfer_url,
            created_at: model.created_at,
        }
    }
}
