pub mod api;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod dispatcher;
pub mod filters;
pub mod models;
pub mod reports;
pub mod status;

pub use api::{ApiError, HttpMarketplaceClient, MarketplaceApi};
pub use catalog::Catalog;
pub use dashboard::{Dashboard, DashboardTab};
pub use dispatcher::{ActionDispatcher, DispatchError, Session};
pub use status::{classify, Classification, Viewer};
