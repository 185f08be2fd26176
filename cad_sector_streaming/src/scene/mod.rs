/// Scene module - renderable units, sector mesh groups and the scene container

pub mod renderable_unit;
pub mod scene_group;
pub mod sector_mesh_group;

pub use renderable_unit::*;
pub use scene_group::*;
pub use sector_mesh_group::*;
