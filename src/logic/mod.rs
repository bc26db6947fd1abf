pub mod defaults;
pub mod manifests;
pub mod parsing;
