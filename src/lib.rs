pub mod auction;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod scheduler;
pub mod user;
