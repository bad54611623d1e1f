pub mod cache;
pub mod config;
pub mod data;
pub mod diag;
pub mod join;
pub mod map;
pub mod report;
pub mod server;
pub mod stats;
pub mod types;
