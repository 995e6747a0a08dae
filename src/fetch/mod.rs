//! Resilient acquisition: per-batch retry loop, wait policy, provider
//! fallback chain, cancellable sleeps, and progress events.

mod cancel;
mod chain;
mod events;
mod fetcher;
mod policy;
#[cfg(test)]
pub(crate) mod testing;

pub use cancel::CancelToken;
pub use chain::{ChainOutput, SourceChain};
pub use events::{EventSink, FeedEvent, LogSink, NullSink};
pub use fetcher::BatchFetcher;
pub use policy::RateLimitPolicy;
