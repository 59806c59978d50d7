//! The module contains `LinkedAccount`: one user's connection between a bank
//! account at the aggregator and a funding source on the payment rail.

use std::fmt;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};

use crate::AccessToken;

/// A stored linkage.
///
/// Created once at the end of a successful linking run and read-only
/// afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkedAccount {
    /// Primary identifier exposed to clients. Immutable.
    pub track_id: String,
    pub account_id: String,
    /// Aggregator item id.
    pub bank_id: String,
    pub access_token: AccessToken,
    pub funding_source_url: String,
    /// Reversible encoding of `account_id`, safe to hand out.
    pub shareable_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "linked_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub track_id: String,
    pub account_id: String,
    pub bank_id: String,
    pub access_token: String,
    pub funding_source_url: String,
    pub shareable_id: String,
    pub user_id: String,
    pub created_at: DateTimeUtc,
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("track_id", &self.track_id)
            .field("account_id", &self.account_id)
            .field("bank_id", &self.bank_id)
            .field("access_token", &"***")
            .field("funding_source_url", &self.funding_source_url)
            .field("shareable_id", &self.shareable_id)
            .field("user_id", &self.user_id)
            .field("created_at", &self.created_at)
            .finish()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&LinkedAccount> for ActiveModel {
    fn from(account: &LinkedAccount) -> Self {
        Self {
            track_id: ActiveValue::Set(account.track_id.clone()),
            account_id: ActiveValue::Set(account.account_id.clone()),
            bank_id: ActiveValue::Set(account.bank_id.clone()),
            access_token: ActiveValue::Set(account.access_token.get().to_string()),
            funding_source_url: ActiveValue::Set(account.funding_source_url.clone()),
            shareable_id: ActiveValue::Set(account.shareable_id.clone()),
            user_id: ActiveValue::Set(account.user_id.clone()),
            created_at: ActiveValue::Set(account.created_at),
        }
    }
}

impl From<Model> for LinkedAccount {
    fn from(model: Model) -> Self {
        Self {
            track_id: model.track_id,
            account_id: model.account_id,
            bank_id: model.bank_id,
            access_token: AccessToken::new(model.access_token),
            funding_source_url: model.funding_source_url,
            shareable_id: model.shareable_id,
            user_id: model.user_id,
            created_at: model.created_at,
        }
    }
}
