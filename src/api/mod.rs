mod coingecko;
mod rate_limiter;

pub use coingecko::CoinGeckoClient;
pub use rate_limiter::RateLimiter;
