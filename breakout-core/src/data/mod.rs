//! Data access: providers, the daily cache, and symbol/position files.

pub mod alphavantage;
pub mod cache;
pub mod lookup;
pub mod memory;
pub mod provider;
pub mod throttle;
pub mod universe;

pub use alphavantage::{parse_daily, AlphaVantageProvider, DEFAULT_API_KEY_VAR};
pub use cache::{CachedProvider, CachedSeries, DailyCache};
pub use lookup::{backward_from, MAX_STALLED_ATTEMPTS};
pub use memory::InMemoryProvider;
pub use provider::{bars_in_range, DataError, DataProvider, DataSource, FetchResult};
pub use throttle::Throttle;
pub use universe::{PositionBook, PositionGroup, SymbolList, UniverseError};
