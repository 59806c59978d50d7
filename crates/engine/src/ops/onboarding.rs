//! Single-call operations that prepare a user for linking.

use crate::{Customer, CustomerProfile, LinkTokenUser, ResultEngine};

use super::{Engine, normalize_optional_text, normalize_required_text};

/// Sandbox institution used when the caller does not pick one.
pub const DEFAULT_SANDBOX_INSTITUTION: &str = "ins_109508";

impl Engine {
    /// Create a link token scoped to `user`.
    pub async fn create_link_token(&self, user: LinkTokenUser) -> ResultEngine<String> {
        let user = LinkTokenUser {
            user_id: normalize_required_text(&user.user_id, "userId")?.to_string(),
            email: normalize_required_text(&user.email, "email")?.to_string(),
            name: normalize_required_text(&user.name, "name")?.to_string(),
        };

        let link_token = self
            .aggregator
            .create_link_token(&user)
            .await
            .inspect_err(|err| tracing::error!(user_id = %user.user_id, "link token: {err}"))?;
        tracing::info!(user_id = %user.user_id, "link token created");
        Ok(link_token)
    }

    /// Register a customer on the payment rail.
    pub async fn create_customer(&self, profile: CustomerProfile) -> ResultEngine<Customer> {
        let profile = CustomerProfile {
            first_name: normalize_required_text(&profile.first_name, "firstName")?.to_string(),
            last_name: normalize_required_text(&profile.last_name, "lastName")?.to_string(),
            email: normalize_required_text(&profile.email, "email")?.to_string(),
        };

        let customer = self
            .payments
            .create_customer(&profile)
            .await
            .inspect_err(|err| tracing::error!("customer creation: {err}"))?;
        tracing::info!(customer_id = %customer.id, "customer created");
        Ok(customer)
    }

    /// Mint a sandbox public token, defaulting to [`DEFAULT_SANDBOX_INSTITUTION`].
    pub async fn create_sandbox_public_token(
        &self,
        institution_id: Option<&str>,
    ) -> ResultEngine<String> {
        let institution_id = normalize_optional_text(institution_id)
            .unwrap_or_else(|| DEFAULT_SANDBOX_INSTITUTION.to_string());

        let public_token = self
            .aggregator
            .create_sandbox_public_token(&institution_id)
            .await
            .inspect_err(|err| tracing::error!(%institution_id, "sandbox public token: {err}"))?;
        tracing::info!(%institution_id, "sandbox public token created");
        Ok(public_token)
    }
}
