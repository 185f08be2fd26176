/*!
# CAD Sector Streaming

Sector-scoped geometry-to-renderable core of a streamed CAD viewer.

A very large model is split into spatial sectors that load and unload as the
viewpoint moves. This crate turns the decoded geometry of each sector into
drawable units, batches the instanced primitives of many sectors into a
bounded number of draw calls, and removes a sector's contribution again
without touching resources shared with other sectors or owned by the sector
cache.

## Architecture

- **TreeIndexRegistry**: which sectors contain which model parts (tree indices)
- **MeshLifecycleManager**: per-sector mesh groups for individually meshed geometry
- **InstancedBatchingManager**: lane buffers shared by the instances of many sectors
- **SectorPipeline**: routes sector load/unload events to both managers
- **SectorRepository / SectorCache**: reference-counted owner of decoded sectors
- **Renderer / Buffer / Texture**: GPU factory and resource traits implemented by backends

Everything except GPU resources lives on the render thread (`Rc`/`RefCell`).
Buffers and textures are `Arc`-shared and released when the last owner drops them.
*/

// Internal modules
mod error;
pub mod log;
pub mod config;
pub mod renderer;
pub mod sector;
pub mod material;
pub mod registry;
pub mod repository;
pub mod scene;
pub mod mesh;
pub mod batching;
pub mod pipeline;

// Main sector3d namespace module
pub mod sector3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Configuration
    pub use crate::config::StreamingConfig;

    // Sector data model
    pub use crate::sector::{
        AttributeSemantic, BoundingSphere, CollectionType, GeometryBuffer, GeometryPath,
        ModelIdentifier, ParsedGeometry, SectorId, TreeIndex, VertexAttribute, VertexLayout, AABB,
    };

    // Managers
    pub use crate::batching::{DrawCall, DrawCallBatchingManager, InstancedBatchingManager};
    pub use crate::mesh::MeshLifecycleManager;
    pub use crate::pipeline::SectorPipeline;
    pub use crate::registry::{ListenerKey, TreeIndexRegistry};

    // External collaborators
    pub use crate::material::{Material, MaterialManager, MaterialProvider, ModelMaterials};
    pub use crate::repository::{SectorCache, SectorRepository};
    pub use crate::scene::{RenderFlags, RenderableUnit, SceneGroup, SceneNodeKey, SectorMeshGroup};

    // Logging sub-module (types and logger slot, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, set_logger, reset_logger};
    }

    // GPU resource traits
    pub mod render {
        pub use crate::renderer::*;
    }
}

// Re-export math library at crate root
pub use glam;
