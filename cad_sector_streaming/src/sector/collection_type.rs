/// Collection types of decoded sector geometry and the path each one takes

/// Which component consumes a collection type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryPath {
    /// Individually meshed; handled by `MeshLifecycleManager`
    Mesh,
    /// Shared instanced draw lanes; handled by a `DrawCallBatchingManager`
    Instanced,
    /// Not understood by this version; dropped without a warning
    Ignored,
}

/// Geometric "shape family" of one parsed geometry item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollectionType {
    BoxCollection,
    CircleCollection,
    ConeCollection,
    EccentricConeCollection,
    EllipsoidSegmentCollection,
    GeneralCylinderCollection,
    GeneralRingCollection,
    QuadCollection,
    TorusSegmentCollection,
    TrapeziumCollection,
    NutCollection,
    TriangleMesh,
    TexturedTriangleMesh,
    InstanceMesh,
    /// Raw tag emitted by a newer decoder
    Unrecognized(u32),
}

impl CollectionType {
    /// Every known collection type, in raw tag order
    pub const ALL: [CollectionType; 14] = [
        CollectionType::BoxCollection,
        CollectionType::CircleCollection,
        CollectionType::ConeCollection,
        CollectionType::EccentricConeCollection,
        CollectionType::EllipsoidSegmentCollection,
        CollectionType::GeneralCylinderCollection,
        CollectionType::GeneralRingCollection,
        CollectionType::QuadCollection,
        CollectionType::TorusSegmentCollection,
        CollectionType::TrapeziumCollection,
        CollectionType::NutCollection,
        CollectionType::TriangleMesh,
        CollectionType::TexturedTriangleMesh,
        CollectionType::InstanceMesh,
    ];

    /// Decode a raw collection tag
    pub fn from_raw(tag: u32) -> Self {
        Self::ALL
            .get(tag as usize)
            .copied()
            .unwrap_or(CollectionType::Unrecognized(tag))
    }

    /// Raw collection tag
    pub fn raw(&self) -> u32 {
        match self {
            CollectionType::Unrecognized(tag) => *tag,
            known => Self::ALL.iter().position(|t| t == known).unwrap_or_default() as u32,
        }
    }

    /// Route of this collection type through the streaming core
    pub fn path(&self) -> GeometryPath {
        match self {
            CollectionType::TriangleMesh | CollectionType::TexturedTriangleMesh => GeometryPath::Mesh,
            CollectionType::BoxCollection
            | CollectionType::CircleCollection
            | CollectionType::ConeCollection
            | CollectionType::EccentricConeCollection
            | CollectionType::EllipsoidSegmentCollection
            | CollectionType::GeneralCylinderCollection
            | CollectionType::GeneralRingCollection
            | CollectionType::QuadCollection
            | CollectionType::TorusSegmentCollection
            | CollectionType::TrapeziumCollection
            | CollectionType::NutCollection
            | CollectionType::InstanceMesh => GeometryPath::Instanced,
            CollectionType::Unrecognized(_) => GeometryPath::Ignored,
        }
    }

    /// Whether items of this type carry a texture
    pub fn is_textured(&self) -> bool {
        matches!(self, CollectionType::TexturedTriangleMesh)
    }
}

#[cfg(test)]
#[path = "collection_type_tests.rs"]
mod tests;
