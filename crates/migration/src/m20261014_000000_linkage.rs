//! Schema for bank linkages and the transfers recorded between them.
//!
//! - `linked_accounts`: one row per successful linking run
//! - `transfer_transactions`: one row per completed transfer

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum LinkedAccounts {
    Table,
    TrackId,
    AccountId,
    BankId,
    AccessToken,
    FundingSourceUrl,
    ShareableId,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum TransferTransactions {
    Table,
    TransactionId,
    Name,
    Amount,
    Channel,
    Category,
    SenderId,
    ReceiverId,
    SenderBankId,
    ReceiverBankId,
    TransferUrl,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Linked accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(LinkedAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LinkedAccounts::TrackId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LinkedAccounts::AccountId).string().not_null())
                    .col(ColumnDef::new(LinkedAccounts::BankId).string().not_null())
                    .col(ColumnDef::new(LinkedAccounts::AccessToken).string().not_null())
                    .col(
                        ColumnDef::new(LinkedAccounts::FundingSourceUrl)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LinkedAccounts::ShareableId).string().not_null())
                    .col(ColumnDef::new(LinkedAccounts::UserId).string().not_null())
                    .col(
                        ColumnDef::new(LinkedAccounts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-linked_accounts-user_id")
                    .table(LinkedAccounts::Table)
                    .col(LinkedAccounts::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-linked_accounts-account_id")
                    .table(LinkedAccounts::Table)
                    .col(LinkedAccounts::AccountId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Transfer transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(TransferTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TransferTransactions::TransactionId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TransferTransactions::Name).string().not_null())
                    .col(ColumnDef::new(TransferTransactions::Amount).string().not_null())
                    .col(ColumnDef::new(TransferTransactions::Channel).string().not_null())
                    .col(ColumnDef::new(TransferTransactions::Category).string().not_null())
                    .col(ColumnDef::new(TransferTransactions::SenderId).string().not_null())
                    .col(ColumnDef::new(TransferTransactions::ReceiverId).string().not_null())
                    .col(
                        ColumnDef::new(TransferTransactions::SenderBankId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransferTransactions::ReceiverBankId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransferTransactions::TransferUrl)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransferTransactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transfer_transactions-sender_bank_id")
                    .table(TransferTransactions::Table)
                    .col(TransferTransactions::SenderBankId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transfer_transactions-receiver_bank_id")
                    .table(TransferTransactions::Table)
                    .col(TransferTransactions::ReceiverBankId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TransferTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LinkedAccounts::Table).to_owned())
            .await?;
        Ok(())
    }
}
