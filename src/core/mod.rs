//! Core valuation logic: rates, conversion, entries and reporting

pub mod allocation;
pub mod cache;
pub mod chain;
pub mod clock;
pub mod config;
pub mod convert;
pub mod currency;
pub mod format;
pub mod log;
pub mod model;
pub mod store;
pub mod trend;
pub mod valuation;

// Re-export main types for cleaner imports
pub use cache::RateCache;
pub use chain::RateSourceChain;
pub use clock::{Clock, SystemClock};
pub use convert::{Conversion, Converter};
pub use currency::{CurrencyPair, CurrencyRateProvider, PinnedRates, RateOrigin};
pub use format::format_currency;
pub use model::{Account, AccountType, NetWorthEntry};
pub use store::EntryStore;
pub use valuation::{EntryValuation, build_entry, revalue_entry, value_entry};
