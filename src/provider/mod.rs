//! Provider abstraction: the trait upstream adapters implement and the
//! pacing profile the fetch loop honors per provider.

mod profile;
mod traits;

pub use profile::FetchProfile;
pub use traits::MarketDataProvider;
