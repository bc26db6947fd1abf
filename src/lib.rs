pub mod api;
pub mod commands;
pub mod flows;
pub mod infra;
pub mod logic;
pub mod models;
