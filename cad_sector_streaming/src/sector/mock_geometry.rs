/// Geometry builders for unit tests
///
/// Mesh vertices are `position: vec3` + `treeIndex: f32` (stride 16).
/// Instances are `treeIndex: f32` + `color: rgba8` + `center: vec3` (stride 20).

use std::sync::Arc;
use glam::Vec3;

use crate::renderer::mock_renderer::{DropCounter, MockBuffer, MockTexture};
use crate::renderer::{BufferFormat, Texture};
use crate::sector::{
    AttributeSemantic, CollectionType, GeometryBuffer, ParsedGeometry, VertexLayout, AABB,
};

pub const MESH_STRIDE: u32 = 16;
pub const INSTANCE_STRIDE: u32 = 20;

pub fn mesh_layout(with_tree_index: bool) -> VertexLayout {
    let layout = VertexLayout::new(MESH_STRIDE)
        .with_attribute(AttributeSemantic::Position, BufferFormat::R32G32B32_SFLOAT, 0);
    if with_tree_index {
        layout.with_attribute(AttributeSemantic::TreeIndex, BufferFormat::R32_SFLOAT, 12)
    } else {
        layout
    }
}

pub fn instance_layout() -> VertexLayout {
    VertexLayout::new(INSTANCE_STRIDE)
        .with_attribute(AttributeSemantic::TreeIndex, BufferFormat::R32_SFLOAT, 0)
        .with_attribute(AttributeSemantic::Color, BufferFormat::R8G8B8A8_UINT, 4)
        .with_attribute(AttributeSemantic::Position, BufferFormat::R32G32B32_SFLOAT, 8)
}

/// Interleaved mesh vertices, one per tree index, placed along the x axis
pub fn mesh_bytes(tree_indices: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(tree_indices.len() * MESH_STRIDE as usize);
    for (i, tree_index) in tree_indices.iter().enumerate() {
        bytes.extend_from_slice(bytemuck::cast_slice(&[i as f32, 0.0, 0.0, *tree_index]));
    }
    bytes
}

/// Interleaved instances, one per tree index
pub fn instance_bytes(tree_indices: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(tree_indices.len() * INSTANCE_STRIDE as usize);
    for (i, tree_index) in tree_indices.iter().enumerate() {
        bytes.extend_from_slice(bytemuck::bytes_of(tree_index));
        bytes.extend_from_slice(&[255, 0, 0, 255]);
        bytes.extend_from_slice(bytemuck::cast_slice(&[i as f32, 1.0, 2.0]));
    }
    bytes
}

pub fn geometry_buffer(bytes: Vec<u8>, layout: VertexLayout, drops: Option<&DropCounter>) -> Arc<GeometryBuffer> {
    let mut buffer = MockBuffer::with_data(&bytes, "sector_geometry");
    if let Some(drops) = drops {
        buffer = buffer.tracked(drops);
    }
    Arc::new(GeometryBuffer::new(Arc::new(buffer), bytes, layout).unwrap())
}

pub fn sector_box() -> AABB {
    AABB::new(Vec3::splat(-1.0), Vec3::splat(1.0))
}

/// Untextured triangle mesh with a tree index per vertex
pub fn triangle_mesh(tree_indices: &[f32]) -> ParsedGeometry {
    ParsedGeometry::mesh(
        CollectionType::TriangleMesh,
        geometry_buffer(mesh_bytes(tree_indices), mesh_layout(true), None),
        sector_box(),
    )
}

/// Textured triangle mesh, optionally carrying `texture`
pub fn textured_mesh(tree_indices: &[f32], texture: Option<Arc<dyn Texture>>) -> ParsedGeometry {
    let item = ParsedGeometry::mesh(
        CollectionType::TexturedTriangleMesh,
        geometry_buffer(mesh_bytes(tree_indices), mesh_layout(true), None),
        sector_box(),
    );
    match texture {
        Some(texture) => item.with_texture(texture),
        None => item,
    }
}

pub fn texture(drops: Option<&DropCounter>) -> Arc<dyn Texture> {
    let mut texture = MockTexture::new(64, 64, "sector_texture".to_string());
    if let Some(drops) = drops {
        texture = texture.tracked(drops);
    }
    Arc::new(texture)
}

/// Instanced primitives of one sub-kind
pub fn instanced(collection_type: CollectionType, instance_id: &str, tree_indices: &[f32]) -> ParsedGeometry {
    ParsedGeometry::instanced(
        collection_type,
        instance_id,
        geometry_buffer(instance_bytes(tree_indices), instance_layout(), None),
    )
}
