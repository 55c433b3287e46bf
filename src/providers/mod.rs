pub mod caching;
pub mod open_exchange;

pub use caching::{RateResolver, ResolverSettings};
pub use open_exchange::OpenExchangeRatesProvider;
