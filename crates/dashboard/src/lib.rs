pub mod app;
pub mod boundary;
pub mod config;
pub mod filter;
pub mod get_started;
pub mod render;
pub mod utils;
pub mod views;
