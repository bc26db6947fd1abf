pub mod client;
pub mod error;
pub mod services;

pub use client::ApiClient;
pub use error::ApiError;
pub use services::ServiceCatalog;
