//! Near-duplicate collapsing for discovery results.
//!
//! Catalog editors copy-paste records for multi-branch venues, so result
//! sets routinely carry entries that differ only in latitude. The filter
//! keeps the first record per distinct longitude and drops the rest. Two
//! genuinely different venues sharing an exact longitude would collapse
//! too; accepted at current data scale.

use std::collections::HashSet;

use geofind_core::{CoordValue, Location};

/// Keep the first record per distinct longitude, in input order.
///
/// Longitudes are compared after parsing, so `"14,5"`, `"14.5"` and `14.5`
/// count as the same value. Records without a parseable longitude share a
/// single slot: the first of them survives.
pub(crate) fn dedup_by_longitude(locations: Vec<Location>) -> Vec<Location> {
    let mut seen: HashSet<Option<u64>> = HashSet::new();
    locations
        .into_iter()
        .filter(|location| {
            let key = location
                .lng
                .as_ref()
                .and_then(CoordValue::to_f64)
                .map(f64::to_bits);
            seen.insert(key)
        })
        .collect()
}
