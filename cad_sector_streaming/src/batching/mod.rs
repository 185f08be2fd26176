/// Batching module - shared instanced draw lanes fed by many sectors

pub mod draw_call_batching_manager;
pub mod instanced_batching_manager;
pub mod lane_buffer;

pub use draw_call_batching_manager::*;
pub use instanced_batching_manager::*;
pub use lane_buffer::*;
