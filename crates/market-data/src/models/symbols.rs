use std::fmt;

/// Separator between tickers in a symbol list.
pub const SYMBOL_SEPARATOR: char = ',';

/// Schema version baked into cache keys. Bump it whenever the shape of
/// [`PriceBundle`](super::PriceBundle) changes so stale entries can't collide.
const CACHE_KEY_PREFIX: &str = "prices:v2:";

/// Symbols requested when the caller does not supply any.
///
/// The EUR-denominated metal legs are listed together with `EUR/USD` so the
/// USD metal prices can be derived from the same batch.
pub const DEFAULT_SYMBOLS: &[&str] = &[
    "XAU/USD", "XAG/EUR", "XPT/EUR", "XPD/EUR", "EUR/USD", "USD/CNY", "USD/CNH", "USD/HKD",
];

/// An ordered list of tickers as requested by the caller.
///
/// The raw string is kept verbatim because it is what the provider receives
/// and what the cache is keyed on. Tickers are not validated or deduplicated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolSet {
    raw: String,
    symbols: Vec<String>,
}

impl SymbolSet {
    /// Builds a symbol set from a comma-separated string.
    pub fn parse(raw: &str) -> Self {
        let symbols = raw
            .split(SYMBOL_SEPARATOR)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            raw: raw.to_string(),
            symbols,
        }
    }

    /// Resolves the effective symbol set: the caller's list, or the built-in
    /// default list when the argument is absent or blank.
    pub fn resolve(raw: Option<&str>) -> Self {
        match raw {
            Some(raw) if !raw.trim().is_empty() => Self::parse(raw),
            _ => Self::default(),
        }
    }

    /// The raw string, exactly as it is sent upstream.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Individual tickers in request order.
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// True when the request names more than one ticker, i.e. the provider
    /// answers with a symbol-keyed mapping instead of a single quote.
    ///
    /// This is a purely syntactic check on the separator.
    pub fn is_batch(&self) -> bool {
        self.raw.contains(SYMBOL_SEPARATOR)
    }

    /// Cache key for this exact request.
    pub fn cache_key(&self) -> String {
        format!("{}{}", CACHE_KEY_PREFIX, self.raw)
    }
}

impl Default for SymbolSet {
    fn default() -> Self {
        Self::parse(&DEFAULT_SYMBOLS.join(","))
    }
}

impl fmt::Display for SymbolSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
