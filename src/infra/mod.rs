pub mod fs;
pub mod memory;
pub mod mongo;
pub mod store;

pub use memory::MemoryStore;
pub use mongo::{MongoSettings, MongoStore};
pub use store::DocumentStore;
