//! Institution id derivation.

use crate::gateway::ItemData;

const BANK_OF_AMERICA_INSTITUTION_ID: &str = "ins_1";
const CHASE_INSTITUTION_ID: &str = "ins_56";

/// Known institutions recognised by a substring of the free-text name.
const KNOWN_INSTITUTIONS: &[(&str, &str)] = &[
    ("Bank of America", BANK_OF_AMERICA_INSTITUTION_ID),
    ("Chase", CHASE_INSTITUTION_ID),
];

/// The id reported by the aggregator, else a hardcoded id matched on the
/// institution name, else empty.
pub(crate) fn fallback_institution_id(item: &ItemData) -> String {
    if let Some(id) = item.institution_id.as_deref().map(str::trim)
        && !id.is_empty()
    {
        return id.to_string();
    }

    let name = item.institution_name.as_deref().unwrap_or_default();
    KNOWN_INSTITUTIONS
        .iter()
        .find(|(needle, _)| name.contains(needle))
        .map(|(_, id)| id.to_string())
        .unwrap_or_default()
}
