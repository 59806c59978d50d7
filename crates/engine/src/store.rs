//! Persistence of linkages and transfer records.
//!
//! No call here opens a transaction spanning several statements: each method
//! is a single insert or a single query.

use sea_orm::{DatabaseConnection, DbErr, QueryFilter, QueryOrder, SqlErr, prelude::*};

use crate::{
    EngineError, LinkedAccount, ResultEngine, TransferTransaction, linked_accounts,
    transfer_transactions,
};

/// Transfers touching one linked account, split by side.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TransfersByAccount {
    pub sent: Vec<TransferTransaction>,
    pub received: Vec<TransferTransaction>,
}

#[derive(Clone, Debug)]
pub struct LinkageStore {
    database: DatabaseConnection,
}

impl LinkageStore {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    pub fn database(&self) -> &DatabaseConnection {
        &self.database
    }

    /// Insert a new linkage. Fails with `ExistingKey` on a duplicate `track_id`.
    pub async fn save(&self, account: &LinkedAccount) -> ResultEngine<()> {
        linked_accounts::ActiveModel::from(account)
            .insert(&self.database)
            .await
            .map_err(|err| insert_error(err, &account.track_id))?;
        Ok(())
    }

    pub async fn find_by_track_id(&self, track_id: &str) -> ResultEngine<LinkedAccount> {
        linked_accounts::Entity::find_by_id(track_id.to_string())
            .one(&self.database)
            .await?
            .map(LinkedAccount::from)
            .ok_or_else(|| EngineError::NotFound(format!("track id {track_id}")))
    }

    /// All linkages of a user, oldest first. An unknown user yields an empty list.
    pub async fn find_by_user_id(&self, user_id: &str) -> ResultEngine<Vec<LinkedAccount>> {
        let models = linked_accounts::Entity::find()
            .filter(linked_accounts::Column::UserId.eq(user_id))
            .order_by_asc(linked_accounts::Column::CreatedAt)
            .order_by_asc(linked_accounts::Column::TrackId)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(LinkedAccount::from).collect())
    }

    /// The most recent linkage of an aggregator account.
    pub async fn find_by_account_id(&self, account_id: &str) -> ResultEngine<LinkedAccount> {
        linked_accounts::Entity::find()
            .filter(linked_accounts::Column::AccountId.eq(account_id))
            .order_by_desc(linked_accounts::Column::CreatedAt)
            .one(&self.database)
            .await?
            .map(LinkedAccount::from)
            .ok_or_else(|| EngineError::NotFound(format!("account id {account_id}")))
    }

    pub async fn save_transaction(&self, tx: &TransferTransaction) -> ResultEngine<()> {
        transfer_transactions::ActiveModel::from(tx)
            .insert(&self.database)
            .await
            .map_err(|err| insert_error(err, &tx.transaction_id))?;
        Ok(())
    }

    pub async fn find_transaction(&self, transaction_id: &str) -> ResultEngine<TransferTransaction> {
        transfer_transactions::Entity::find_by_id(transaction_id.to_string())
            .one(&self.database)
            .await?
            .map(TransferTransaction::from)
            .ok_or_else(|| EngineError::NotFound(format!("transaction id {transaction_id}")))
    }

    pub async fn find_transactions_by_track_id(
        &self,
        track_id: &str,
    ) -> ResultEngine<TransfersByAccount> {
        let sent = transfer_transactions::Entity::find()
            .filter(transfer_transactions::Column::SenderBankId.eq(track_id))
            .order_by_desc(transfer_transactions::Column::CreatedAt)
            .all(&self.database)
            .await?;
        let received = transfer_transactions::Entity::find()
            .filter(transfer_transactions::Column::ReceiverBankId.eq(track_id))
            .order_by_desc(transfer_transactions::Column::CreatedAt)
            .all(&self.database)
            .await?;

        Ok(TransfersByAccount {
            sent: sent.into_iter().map(TransferTransaction::from).collect(),
            received: received.into_iter().map(TransferTransaction::from).collect(),
        })
    }
}

fn insert_error(err: DbErr, key: &str) -> EngineError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => EngineError::ExistingKey(key.to_string()),
        _ => EngineError::Database(err),
    }
}
