//! reqwest-backed clients for the banking-data aggregator (Plaid) and the
//! payment rail (Dwolla).
//!
//! Each client implements one of the engine gateway traits and maps every
//! failure into the matching gateway error: transport problems, provider
//! error bodies and undecodable responses are kept apart.

pub use dwolla::{DWOLLA_SANDBOX_URL, DwollaClient, DwollaConfig};
pub use plaid::{PlaidClient, PlaidConfig, PlaidEnvironment};

mod dwolla;
mod plaid;

/// Join `base` and `path` with exactly one slash.
fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
