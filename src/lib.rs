pub mod app;
pub mod config;
pub mod detail;
pub mod flight;
pub mod keys;
pub mod models;
pub mod omdb;
pub mod search;
pub mod store;
pub mod ui;
pub mod watched;
