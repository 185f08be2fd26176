/// Pipeline module - routes loaded and unloaded sectors to the managers

pub mod sector_pipeline;

pub use sector_pipeline::*;
