//! Upstream quote provider abstraction and implementation.
//!
//! This module contains:
//! - The `QuoteProvider` trait the price service calls
//! - The Twelve Data client, the only upstream the service talks to
//!
//! Providers return the provider's body untouched. Shape decoding and error
//! classification happen in the normalizer, not here.

mod traits;

pub mod twelve_data;

// Re-exports
pub use traits::QuoteProvider;
