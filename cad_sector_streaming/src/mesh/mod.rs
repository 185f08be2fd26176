/// Mesh module - per-sector renderables for individually meshed geometry

pub mod mesh_lifecycle_manager;

pub use mesh_lifecycle_manager::*;
