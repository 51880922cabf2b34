pub mod analysis;
pub mod config;
pub mod loaders;
pub mod melt;
pub mod models;
pub mod pipeline;
pub mod report;
