pub mod catalog_generator;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod query;
pub mod render;
pub mod report;
pub mod rng;
pub mod shaper;
pub mod store;
pub mod types;
