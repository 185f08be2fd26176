/// Material module - per-model materials and the provider seam used by the managers

pub mod material;
pub mod material_manager;

pub use material::*;
pub use material_manager::*;
