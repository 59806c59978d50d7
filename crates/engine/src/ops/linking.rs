//! The linking workflow: from a public token to a stored, transfer-capable
//! linked account.

use chrono::Utc;

use crate::{LinkedAccount, ResultEngine, util};

use super::{Engine, normalize_required_text};

/// The parts of the user profile the workflow needs.
#[derive(Clone, Debug, Default)]
pub struct LinkProfile {
    pub user_id: String,
    pub first_name: String,
    /// Payment-rail customer the funding source is attached to.
    pub customer_url: String,
}

impl Engine {
    /// Link the bank account behind `public_token` to `profile`'s customer.
    ///
    /// Steps run in a fixed order and nothing is written to the store before
    /// the last one. When persisting fails, the funding source created on the
    /// payment rail is removed again (best effort) before the store error is
    /// returned.
    pub async fn link_account(
        &self,
        public_token: &str,
        profile: LinkProfile,
    ) -> ResultEngine<LinkedAccount> {
        let public_token = normalize_required_text(public_token, "publicToken")?;
        let user_id = normalize_required_text(&profile.user_id, "user.userId")?;
        let first_name = normalize_required_text(&profile.first_name, "user.firstName")?;
        let customer_url =
            normalize_required_text(&profile.customer_url, "user.dwollaCustomerUrl")?;

        let (access_token, item_id) = self
            .aggregator
            .exchange_public_token(public_token)
            .await
            .inspect_err(|err| tracing::error!(%user_id, "public token exchange: {err}"))?;
        tracing::info!(%user_id, %item_id, "public token exchanged");

        let (account, _item) = self
            .aggregator
            .fetch_primary_account(&access_token)
            .await
            .inspect_err(|err| tracing::error!(%item_id, "account lookup: {err}"))?;
        let account_id = account.account_id;
        let bank_name = account.name;
        tracing::info!(%item_id, %account_id, %bank_name, "primary account fetched");

        let processor_token = self
            .aggregator
            .create_processor_token(&access_token, &account_id)
            .await
            .inspect_err(|err| tracing::error!(%account_id, "processor token: {err}"))?;
        tracing::info!(%account_id, "processor token created");

        let auth_links = self
            .payments
            .create_on_demand_authorization()
            .await
            .inspect_err(|err| tracing::error!(%account_id, "on-demand authorization: {err}"))?;
        let funding_source_url = self
            .payments
            .create_funding_source(customer_url, &processor_token, &auth_links, &bank_name)
            .await
            .inspect_err(|err| tracing::error!(%account_id, "funding source: {err}"))?;
        tracing::info!(%account_id, %funding_source_url, "funding source created");

        let created_at = Utc::now();
        let linked = LinkedAccount {
            track_id: util::track_id(first_name, created_at),
            shareable_id: util::encode_shareable_id(&account_id),
            account_id,
            bank_id: item_id,
            access_token,
            funding_source_url,
            user_id: user_id.to_string(),
            created_at,
        };

        if let Err(err) = self.store.save(&linked).await {
            tracing::error!(track_id = %linked.track_id, "failed to persist linked account: {err}");
            self.release_funding_source(&linked.funding_source_url).await;
            return Err(err);
        }
        tracing::info!(track_id = %linked.track_id, %user_id, "linked account stored");

        self.store.find_by_track_id(&linked.track_id).await
    }

    async fn release_funding_source(&self, funding_source_url: &str) {
        match self.payments.remove_funding_source(funding_source_url).await {
            Ok(()) => tracing::warn!(%funding_source_url, "orphaned funding source removed"),
            Err(err) => tracing::error!(
                %funding_source_url,
                "orphaned funding source could not be removed: {err}"
            ),
        }
    }
}
