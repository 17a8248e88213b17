pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod feed;
pub mod poller;
pub mod ui;

pub use config::{AppConfig, ConfigLoader, ConfigPaths};
