//! Identifier helpers.
//!
//! Track ids and transaction ids stay human-readable (prefix, name fragment,
//! second-granularity timestamp) and carry a random suffix so two requests in
//! the same second cannot collide.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

const TRACK_ID_PREFIX: &str = "PLAID";
const TRANSACTION_ID_PREFIX: &str = "TRANSCT";
const FRAGMENT_LEN: usize = 3;

/// Encode an aggregator account id into its shareable form.
pub fn encode_shareable_id(account_id: &str) -> String {
    STANDARD.encode(account_id.as_bytes())
}

/// Inverse of [`encode_shareable_id`].
pub fn decode_shareable_id(shareable_id: &str) -> ResultEngine<String> {
    let bytes = STANDARD
        .decode(shareable_id.trim())
        .map_err(|err| EngineError::Validation(format!("invalid shareable id: {err}")))?;
    String::from_utf8(bytes)
        .map_err(|_| EngineError::Validation("invalid shareable id: not utf-8".to_string()))
}

/// Three uppercase ASCII characters derived from a display name.
///
/// Accents are stripped (`Émile` -> `EMI`), non alphanumerics are skipped and
/// short names are padded with `X`.
pub(crate) fn name_fragment(name: &str) -> String {
    let mut fragment: String = name
        .nfkd()
        .filter(char::is_ascii_alphanumeric)
        .take(FRAGMENT_LEN)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    while fragment.len() < FRAGMENT_LEN {
        fragment.push('X');
    }
    fragment
}

pub(crate) fn track_id(first_name: &str, at: DateTime<Utc>) -> String {
    format!(
        "{TRACK_ID_PREFIX}{}{}-{}",
        name_fragment(first_name),
        at.format("%Y%m%d%H%M%S"),
        random_suffix()
    )
}

pub(crate) fn transaction_id(at: DateTime<Utc>) -> String {
    format!(
        "{TRANSACTION_ID_PREFIX}{}-{}",
        at.format("%Y%m%d%H%M%S"),
        random_suffix()
    )
}

fn random_suffix() -> String {
    Uuid::new_v4().simple().to_string().chars().take(8).collect()
}
