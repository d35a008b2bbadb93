pub mod envelope;
pub mod error;
pub mod http;
pub mod traits;

pub use envelope::{decode_page, Envelope};
pub use error::ApiError;
pub use http::HttpMarketplaceClient;
pub use traits::{MarketplaceApi, QueryPairs};

#[cfg(test)]
pub use traits::MockMarketplaceApi;
