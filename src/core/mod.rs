pub mod analytics;
pub mod ballistics;
pub mod command;
pub mod config;
pub mod error;
pub mod export;
pub mod plot;
pub mod store;
pub mod window;
