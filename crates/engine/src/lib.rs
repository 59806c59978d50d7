pub use access_token::AccessToken;
pub use error::EngineError;
pub use gateway::{
    AccountData, AggregatorError, AggregatorGateway, AggregatorTransaction, AuthLinks, Customer,
    CustomerProfile, ItemData, LinkTokenUser, PaymentError, PaymentGateway, TransferReceipt,
};
pub use linked_accounts::LinkedAccount;
pub use ops::{
    DEFAULT_SANDBOX_INSTITUTION, Engine, EngineBuilder, LinkProfile, TransferOutcome,
    TransferRequest,
};
pub use store::{LinkageStore, TransfersByAccount};
pub use transfer_transactions::{TRANSFER_CATEGORY, TRANSFER_CHANNEL, TransferTransaction};
pub use util::{decode_shareable_id, encode_shareable_id};
pub use views::{AccountDetail, AccountView, AccountsSummary, Direction, TransactionView};

mod access_token;
mod error;
pub mod gateway;
mod institution;
pub mod linked_accounts;
mod ops;
mod store;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod transfer_transactions;
mod util;
mod views;

type ResultEngine<T> = Result<T, EngineError>;
