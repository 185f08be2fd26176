/// Registry module - which sectors hold which tree indices

pub mod tree_index_registry;

pub use tree_index_registry::*;
