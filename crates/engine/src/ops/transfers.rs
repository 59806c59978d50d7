//! Money movement between two linked accounts.

use std::str::FromStr;

use chrono::Utc;
use rust_decimal::Decimal;

use crate::{
    EngineError, LinkedAccount, ResultEngine, TRANSFER_CATEGORY, TRANSFER_CHANNEL,
    TransferReceipt, TransferTransaction, util,
};

use super::{Engine, normalize_optional_text, normalize_required_text};

const DEFAULT_TRANSFER_NAME: &str = "Transfer";

#[derive(Clone, Debug, Default)]
pub struct TransferRequest {
    pub source_track_id: String,
    /// Exactly one of `destination_track_id` and `receiver_shareable_id`
    /// must be set.
    pub destination_track_id: Option<String>,
    pub receiver_shareable_id: Option<String>,
    pub amount: String,
    pub name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferOutcome {
    pub receipt: TransferReceipt,
    pub transaction: TransferTransaction,
}

impl Engine {
    /// Move `amount` from the source account's funding source to the
    /// destination's, then record the transfer.
    ///
    /// Nothing is recorded when the payment rail rejects the transfer.
    pub async fn transfer(&self, request: TransferRequest) -> ResultEngine<TransferOutcome> {
        let source_track_id = normalize_required_text(&request.source_track_id, "sourceTrackId")?;
        let amount = parse_amount(&request.amount)?;
        let name = normalize_optional_text(request.name.as_deref())
            .unwrap_or_else(|| DEFAULT_TRANSFER_NAME.to_string());

        let source = self.store.find_by_track_id(source_track_id).await?;
        let destination = self.resolve_destination(&request).await?;
        if source.track_id == destination.track_id {
            return Err(EngineError::Validation(
                "source and destination accounts must differ".to_string(),
            ));
        }

        let receipt = self
            .payments
            .create_transfer(
                &source.funding_source_url,
                &destination.funding_source_url,
                &amount,
            )
            .await
            .inspect_err(|err| {
                tracing::error!(
                    source = %source.track_id,
                    destination = %destination.track_id,
                    "transfer rejected: {err}"
                )
            })?;
        tracing::info!(
            source = %source.track_id,
            destination = %destination.track_id,
            transfer_url = %receipt.transfer_url,
            %amount,
            "transfer created"
        );

        let created_at = Utc::now();
        let record = TransferTransaction {
            transaction_id: util::transaction_id(created_at),
            name,
            amount,
            channel: TRANSFER_CHANNEL.to_string(),
            category: TRANSFER_CATEGORY.to_string(),
            sender_id: source.user_id,
            receiver_id: destination.user_id,
            sender_bank_id: source.track_id,
            receiver_bank_id: destination.track_id,
            transfer_url: receipt.transfer_url.clone(),
            created_at,
        };
        self.store
            .save_transaction(&record)
            .await
            .inspect_err(|err| {
                tracing::error!(
                    transfer_url = %record.transfer_url,
                    "transfer executed but not recorded: {err}"
                )
            })?;

        let transaction = self.store.find_transaction(&record.transaction_id).await?;
        Ok(TransferOutcome {
            receipt,
            transaction,
        })
    }

    async fn resolve_destination(&self, request: &TransferRequest) -> ResultEngine<LinkedAccount> {
        let track_id = normalize_optional_text(request.destination_track_id.as_deref());
        let shareable_id = normalize_optional_text(request.receiver_shareable_id.as_deref());

        match (track_id, shareable_id) {
            (Some(track_id), None) => self.store.find_by_track_id(&track_id).await,
            (None, Some(shareable_id)) => {
                let account_id = util::decode_shareable_id(&shareable_id)?;
                self.store.find_by_account_id(&account_id).await
            }
            (None, None) => Err(EngineError::Validation(
                "either destinationTrackId or receiverShareableId is required".to_string(),
            )),
            (Some(_), Some(_)) => Err(EngineError::Validation(
                "provide only one of destinationTrackId or receiverShareableId".to_string(),
            )),
        }
    }
}

/// Parse a positive amount with at most two fractional digits and render it
/// with exactly two.
fn parse_amount(value: &str) -> ResultEngine<String> {
    let value = normalize_required_text(value, "amount")?;
    let mut amount = Decimal::from_str(value)
        .map_err(|_| EngineError::Validation(format!("invalid amount: {value}")))?;
    if amount <= Decimal::ZERO {
        return Err(EngineError::Validation("amount must be > 0".to_string()));
    }
    if amount.normalize().scale() > 2 {
        return Err(EngineError::Validation(
            "amount must have at most two decimal places".to_string(),
        ));
    }
    amount.rescale(2);
    Ok(amount.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_render_with_two_decimals() {
        assert_eq!(parse_amount("50").unwrap(), "50.00");
        assert_eq!(parse_amount(" 12.5 ").unwrap(), "12.50");
        assert_eq!(parse_amount("0.010").unwrap(), "0.01");
    }

    #[test]
    fn invalid_amounts_are_rejected() {
        for value in ["", "abc", "0", "-3.00", "1.005"] {
            assert!(
                matches!(parse_amount(value), Err(EngineError::Validation(_))),
                "{value:?} should be rejected"
            );
        }
    }
}
