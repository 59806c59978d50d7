//! Live account views: balances, institution ids and transaction timelines.

use rust_decimal::Decimal;

use crate::{
    AccountDetail, AccountView, AccountsSummary, ItemData, LinkedAccount, ResultEngine,
    TransactionView, institution, views,
};

use super::{Engine, normalize_required_text};

impl Engine {
    /// All linked accounts of `user_id` with live balances.
    ///
    /// Accounts are fetched one at a time; a single failing fetch fails the
    /// whole call.
    pub async fn list_accounts(&self, user_id: &str) -> ResultEngine<AccountsSummary> {
        let user_id = normalize_required_text(user_id, "userId")?;
        let records = self
            .store
            .find_by_user_id(user_id)
            .await
            .inspect_err(|err| tracing::error!(%user_id, "unable to fetch accounts: {err}"))?;

        let mut accounts = Vec::with_capacity(records.len());
        for record in &records {
            accounts.push(self.account_view(record).await?);
        }

        let total_current_balance: Decimal =
            accounts.iter().map(|account| account.current_balance).sum();
        tracing::info!(
            %user_id,
            total_banks = accounts.len(),
            %total_current_balance,
            "accounts listed"
        );

        Ok(AccountsSummary {
            total_banks: accounts.len(),
            total_current_balance,
            accounts,
        })
    }

    /// One linked account with its merged transaction timeline, newest first.
    pub async fn account_detail(&self, track_id: &str) -> ResultEngine<AccountDetail> {
        let track_id = normalize_required_text(track_id, "trackId")?;
        let record = self
            .store
            .find_by_track_id(track_id)
            .await
            .inspect_err(|err| tracing::error!(%track_id, "unable to fetch record: {err}"))?;

        let account = self.account_view(&record).await?;

        let transfers = self
            .store
            .find_transactions_by_track_id(&record.track_id)
            .await
            .inspect_err(|err| tracing::error!(%track_id, "unable to fetch transfers: {err}"))?;

        let reported = self
            .aggregator
            .fetch_transactions(&record.access_token)
            .await
            .inspect_err(|err| tracing::error!(%track_id, "transaction sync: {err}"))?;

        let mut transactions: Vec<TransactionView> = reported
            .into_iter()
            .map(TransactionView::from_aggregator)
            .chain(
                transfers
                    .sent
                    .into_iter()
                    .chain(transfers.received)
                    .map(|tx| {
                        TransactionView::from_transfer(tx, &record.track_id, &record.account_id)
                    }),
            )
            .collect();
        views::sort_newest_first(&mut transactions);
        tracing::info!(%track_id, transactions = transactions.len(), "account detail built");

        Ok(AccountDetail {
            account,
            transactions,
        })
    }

    async fn account_view(&self, record: &LinkedAccount) -> ResultEngine<AccountView> {
        let (data, item) = self
            .aggregator
            .fetch_primary_account(&record.access_token)
            .await
            .inspect_err(|err| {
                tracing::error!(track_id = %record.track_id, "live balance fetch: {err}")
            })?;
        let institution_id = self.institution_id(&item).await;
        Ok(AccountView::new(data, record, institution_id))
    }

    /// Fallback chain first, then canonical resolution. A resolution failure is
    /// logged and the derived id is kept.
    async fn institution_id(&self, item: &ItemData) -> String {
        let derived = institution::fallback_institution_id(item);
        if derived.is_empty() {
            return derived;
        }

        match self.aggregator.resolve_institution_id(&derived).await {
            Ok(resolved) if !resolved.is_empty() => resolved,
            Ok(_) => derived,
            Err(err) => {
                tracing::warn!(
                    item_id = %item.item_id,
                    institution_id = %derived,
                    "institution lookup: {err}"
                );
                derived
            }
        }
    }
}
