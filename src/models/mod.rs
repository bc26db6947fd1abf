pub mod collections;
pub mod manifest;
pub mod service;

pub use collections::*;
pub use manifest::*;
pub use service::*;
