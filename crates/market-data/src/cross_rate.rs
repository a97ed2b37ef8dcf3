//! Synthetic USD metal prices derived from EUR legs.
//!
//! The provider's free tier rejects XAG/USD, XPT/USD and XPD/USD but serves
//! the EUR-denominated pairs. When a batch contains both the EUR leg and
//! EUR/USD, the USD price is computed as `metal/EUR * EUR/USD`.
//!
//! This only combines rates already in the batch, so a derivation fires only
//! when the EUR leg was part of the original request. It never triggers an
//! extra lookup. Anything missing means the derived symbol is simply left out.

use indexmap::IndexMap;
use log::debug;

use crate::models::NormalizedRate;

/// Pivot pair used to convert EUR prices into USD.
pub const EUR_USD: &str = "EUR/USD";

/// `(source, target)` pairs, each source denominated in EUR.
pub const CROSS_RATE_PAIRS: &[(&str, &str)] = &[
    ("XAG/EUR", "XAG/USD"),
    ("XPT/EUR", "XPT/USD"),
    ("XPD/EUR", "XPD/USD"),
];

/// Compute the derived rates available from `rates`.
///
/// Returns an empty map when EUR/USD is missing or failed. Sources that are
/// missing, failed, or themselves derived are skipped.
pub fn derive(rates: &IndexMap<String, NormalizedRate>) -> IndexMap<String, NormalizedRate> {
    let mut derived = IndexMap::new();

    let Some(eur_usd) = rates.get(EUR_USD).and_then(NormalizedRate::direct_price) else {
        return derived;
    };

    for (source, target) in CROSS_RATE_PAIRS {
        let Some(source_price) = rates.get(*source).and_then(NormalizedRate::direct_price) else {
            continue;
        };

        let price = source_price * eur_usd;
        if !price.is_finite() {
            continue;
        }

        debug!("Derived {} from {} and {}", target, source, EUR_USD);
        derived.insert(
            target.to_string(),
            NormalizedRate::derived(price, format!("{} * {}", source, EUR_USD)),
        );
    }

    derived
}

/// Merge derived rates into the batch.
///
/// A derived rate fills a missing symbol or replaces a provider error for it
/// (e.g. XAG/USD requested directly on the free tier), but never shadows a
/// price the provider served directly. Replacements keep their slot; new
/// symbols are appended after everything the provider returned.
pub fn merge(
    rates: &mut IndexMap<String, NormalizedRate>,
    derived: IndexMap<String, NormalizedRate>,
) {
    for (symbol, rate) in derived {
        match rates.get(&symbol) {
            Some(existing) if !existing.is_failed() => {}
            _ => {
                rates.insert(symbol, rate);
            }
        }
    }
}
