pub mod check;
pub mod extract;
pub mod import;
pub mod mongo_args;
pub mod patch;
pub mod render;
