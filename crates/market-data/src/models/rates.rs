use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Decimal places used for derived prices.
pub const DERIVED_PRICE_PRECISION: usize = 5;

/// Price (or failure) for one symbol after normalization.
///
/// Serialized untagged, so API consumers see one of:
/// `{"price": 2345.1, ...}`, `{"price": "22.00000", "calculated": true, "via": "..."}`
/// or `{"error": "..."}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NormalizedRate {
    /// Price served directly by the provider
    Direct {
        price: f64,
        /// Remaining provider fields, passed through untouched
        #[serde(flatten)]
        fields: Map<String, Value>,
    },

    /// Price computed from other rates in the same batch
    Derived {
        price: String,
        calculated: bool,
        via: String,
    },

    /// The provider rejected or could not serve this symbol
    Failed { error: String },
}

impl NormalizedRate {
    /// Direct price with no extra provider fields.
    pub fn direct(price: f64) -> Self {
        Self::Direct {
            price,
            fields: Map::new(),
        }
    }

    /// Derived price, rendered with fixed precision.
    pub fn derived(price: f64, via: impl Into<String>) -> Self {
        Self::Derived {
            price: format!("{:.*}", DERIVED_PRICE_PRECISION, price),
            calculated: true,
            via: via.into(),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self::Failed {
            error: error.into(),
        }
    }

    /// Numeric price when the provider served it directly.
    ///
    /// Derived prices are deliberately excluded so they never feed another
    /// derivation.
    pub fn direct_price(&self) -> Option<f64> {
        match self {
            Self::Direct { price, .. } if price.is_finite() => Some(*price),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// The artifact returned to callers and stored in the cache.
///
/// Built once per cache miss and never mutated afterwards; it is shared as
/// `Arc<PriceBundle>`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PriceBundle {
    /// Human-readable provider name
    pub source: String,

    /// Fetch time (not request time), ISO-8601 UTC with milliseconds
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,

    /// Symbol to price-or-error, in request order with derived rates last
    pub rates: IndexMap<String, NormalizedRate>,

    pub note: String,
}

fn serialize_timestamp<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_derived_formatting() {
        let rate = NormalizedRate::derived(20.0 * 1.1, "XAG/EUR * EUR/USD");
        assert_eq!(
            rate,
            NormalizedRate::Derived {
                price: "22.00000".to_string(),
                calculated: true,
                via: "XAG/EUR * EUR/USD".to_string(),
            }
        );
        assert_eq!(rate.direct_price(), None);
    }

    #[test]
    fn test_direct_serializes_passthrough_fields() {
        let mut fields = Map::new();
        fields.insert("currency_base".to_string(), json!("Gold Spot"));
        let rate = NormalizedRate::Direct {
            price: 2345.1,
            fields,
        };

        assert_eq!(
            serde_json::to_value(&rate).unwrap(),
            json!({"price": 2345.1, "currency_base": "Gold Spot"})
        );
    }

    #[test]
    fn test_each_shape_serializes_flat() {
        assert_eq!(
            serde_json::to_value(NormalizedRate::failed("not available")).unwrap(),
            json!({"error": "not available"})
        );
        assert_eq!(
            serde_json::to_value(NormalizedRate::derived(1.23456789, "XPT/EUR * EUR/USD"))
                .unwrap(),
            json!({"price": "1.23457", "calculated": true, "via": "XPT/EUR * EUR/USD"})
        );
    }

    #[test]
    fn test_direct_price_ignores_non_finite() {
        assert_eq!(NormalizedRate::direct(1.5).direct_price(), Some(1.5));
        assert_eq!(NormalizedRate::direct(f64::NAN).direct_price(), None);
        assert_eq!(NormalizedRate::failed("x").direct_price(), None);
    }

    #[test]
    fn test_bundle_serialization() {
        let mut rates = IndexMap::new();
        rates.insert("EUR/USD".to_string(), NormalizedRate::direct(1.1));
        let bundle = PriceBundle {
            source: "Twelve Data".to_string(),
            timestamp: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
            rates,
            note: "note".to_string(),
        };

        assert_eq!(
            serde_json::to_value(&bundle).unwrap(),
            json!({
                "source": "Twelve Data",
                "timestamp": "2026-01-02T03:04:05.000Z",
                "rates": {"EUR/USD": {"price": 1.1}},
                "note": "note"
            })
        );
    }

    #[test]
    fn test_bundle_rates_keep_insertion_order() {
        let mut rates = IndexMap::new();
        rates.insert("USD/CNY".to_string(), NormalizedRate::direct(7.1));
        rates.insert("XAU/USD".to_string(), NormalizedRate::direct(2345.1));
        rates.insert("EUR/USD".to_string(), NormalizedRate::failed("n/a"));
        let bundle = PriceBundle {
            source: "Twelve Data".to_string(),
            timestamp: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
            rates,
            note: "note".to_string(),
        };

        let json = serde_json::to_string(&bundle).unwrap();
        assert!(json.contains(
            r#""rates":{"USD/CNY":{"price":7.1},"XAU/USD":{"price":2345.1},"EUR/USD":{"error":"n/a"}}"#
        ));
    }
}
