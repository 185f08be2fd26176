/// Parsed sector geometry as delivered by the decoding side
///
/// A `GeometryBuffer` pairs the GPU buffer the sector cache uploaded with a CPU
/// copy of the same interleaved element data. The streaming core only reads
/// the CPU copy (tree index scans, instance copies into lanes) and never
/// releases the GPU buffer itself.

use std::sync::Arc;
use glam::Vec3;

use crate::error::Result;
use crate::renderer::{Buffer, BufferFormat, Texture};
use crate::sector::{CollectionType, TreeIndex, AABB};
use crate::stream_bail;

// ===== VERTEX LAYOUT =====

/// Meaning of an interleaved attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeSemantic {
    Position,
    Normal,
    Color,
    TexCoord,
    /// Per-vertex or per-instance tree index (`R32_SFLOAT` or `R32_UINT`)
    TreeIndex,
    /// Any other attribute, passed through untouched
    Other(u8),
}

/// One attribute inside an interleaved element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub semantic: AttributeSemantic,
    pub format: BufferFormat,
    /// Byte offset inside the element
    pub offset: u32,
}

/// Interleaved element layout (one element = one vertex or one instance)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    /// Element size in bytes
    pub stride: u32,
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    pub fn new(stride: u32) -> Self {
        Self { stride, attributes: Vec::new() }
    }

    /// Builder helper appending an attribute
    pub fn with_attribute(mut self, semantic: AttributeSemantic, format: BufferFormat, offset: u32) -> Self {
        self.attributes.push(VertexAttribute { semantic, format, offset });
        self
    }

    /// First attribute with the given semantic
    pub fn attribute(&self, semantic: AttributeSemantic) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.semantic == semantic)
    }
}

// ===== GEOMETRY BUFFER =====

/// Cache-owned geometry: GPU buffer, CPU element data and layout
pub struct GeometryBuffer {
    buffer: Arc<dyn Buffer>,
    data: Arc<[u8]>,
    layout: VertexLayout,
    count: u32,
}

impl GeometryBuffer {
    /// Wrap uploaded geometry after validating its layout
    ///
    /// # Errors
    ///
    /// `Error::InvalidGeometry` if the stride is zero, the data is not a whole
    /// number of elements, an attribute overflows the stride, the tree index
    /// attribute is not a 32-bit scalar, a float tree index is not a
    /// representable non-negative number, or the GPU buffer is smaller than the data.
    pub fn new(buffer: Arc<dyn Buffer>, data: impl Into<Arc<[u8]>>, layout: VertexLayout) -> Result<Self> {
        let data = data.into();
        let stride = layout.stride as usize;

        if stride == 0 {
            stream_bail!("sector3d::GeometryBuffer", kind = InvalidGeometry, "Vertex layout stride is zero");
        }
        if data.len() % stride != 0 {
            stream_bail!("sector3d::GeometryBuffer", kind = InvalidGeometry,
                "Data size {} is not a multiple of stride {}", data.len(), stride);
        }
        for attribute in &layout.attributes {
            if attribute.offset + attribute.format.size_bytes() > layout.stride {
                stream_bail!("sector3d::GeometryBuffer", kind = InvalidGeometry,
                    "{:?} attribute at offset {} overflows stride {}",
                    attribute.semantic, attribute.offset, layout.stride);
            }
        }
        if let Some(tree_index) = layout.attribute(AttributeSemantic::TreeIndex) {
            if !matches!(tree_index.format, BufferFormat::R32_SFLOAT | BufferFormat::R32_UINT) {
                stream_bail!("sector3d::GeometryBuffer", kind = InvalidGeometry,
                    "Tree index attribute has unsupported format {:?}", tree_index.format);
            }
            if tree_index.format == BufferFormat::R32_SFLOAT {
                let offset = tree_index.offset as usize;
                let invalid = data.chunks_exact(stride).position(|element| {
                    let value = bytemuck::pod_read_unaligned::<f32>(&element[offset..offset + 4]);
                    !(value >= 0.0 && value < TreeIndex::MAX as f32)
                });
                if let Some(element) = invalid {
                    stream_bail!("sector3d::GeometryBuffer", kind = InvalidGeometry,
                        "Element {} has an invalid float tree index", element);
                }
            }
        }
        if buffer.size() < data.len() as u64 {
            stream_bail!("sector3d::GeometryBuffer", kind = InvalidGeometry,
                "GPU buffer ({} bytes) is smaller than its data ({} bytes)", buffer.size(), data.len());
        }

        let count = (data.len() / stride) as u32;
        Ok(Self { buffer, data, layout, count })
    }

    pub fn buffer(&self) -> &Arc<dyn Buffer> {
        &self.buffer
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    /// Number of elements (vertices or instances)
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn byte_size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn has_tree_indices(&self) -> bool {
        self.layout.attribute(AttributeSemantic::TreeIndex).is_some()
    }

    /// Tree index of every element, or `None` when the layout has no tree index attribute
    pub fn tree_indices(&self) -> Option<impl Iterator<Item = TreeIndex> + '_> {
        read_tree_indices(&self.data, &self.layout)
    }

    /// Positions of every element, when the layout has a `R32G32B32_SFLOAT` position
    pub fn positions(&self) -> Option<impl Iterator<Item = Vec3> + '_> {
        let attribute = *self.layout.attribute(AttributeSemantic::Position)?;
        if attribute.format != BufferFormat::R32G32B32_SFLOAT {
            return None;
        }
        let offset = attribute.offset as usize;
        Some(self.data.chunks_exact(self.layout.stride as usize).map(move |element| {
            let xyz = bytemuck::pod_read_unaligned::<[f32; 3]>(&element[offset..offset + 12]);
            Vec3::from_array(xyz)
        }))
    }
}

/// Tree index of every element of interleaved `data` laid out as `layout`
///
/// Float-encoded indices are truncated to integers; `GeometryBuffer::new`
/// guarantees they are in range. `None` when the layout has no tree index
/// attribute.
pub fn read_tree_indices<'a>(data: &'a [u8], layout: &VertexLayout) -> Option<impl Iterator<Item = TreeIndex> + 'a> {
    let attribute = *layout.attribute(AttributeSemantic::TreeIndex)?;
    let offset = attribute.offset as usize;
    Some(data.chunks_exact(layout.stride as usize).map(move |element| {
        let bytes = &element[offset..offset + 4];
        match attribute.format {
            BufferFormat::R32_UINT => bytemuck::pod_read_unaligned::<u32>(bytes),
            _ => bytemuck::pod_read_unaligned::<f32>(bytes) as TreeIndex,
        }
    }))
}

// ===== PARSED GEOMETRY =====

/// One decoded unit of geometry for one sector
///
/// Immutable once produced. The geometry buffer and texture belong to the
/// sector cache; clones of the `Arc`s held here never extend ownership past
/// the cache's own reference count.
#[derive(Clone)]
pub struct ParsedGeometry {
    pub collection_type: CollectionType,
    pub geometry_buffer: Arc<GeometryBuffer>,
    /// Bounding box of the whole sector (shared by every item of the sector)
    pub whole_sector_bounding_box: Option<AABB>,
    pub texture: Option<Arc<dyn Texture>>,
    /// Primitive sub-kind for instanced collection types
    pub instance_id: Option<String>,
}

impl ParsedGeometry {
    /// Individually meshed item
    pub fn mesh(collection_type: CollectionType, geometry_buffer: Arc<GeometryBuffer>, whole_sector_bounding_box: AABB) -> Self {
        Self {
            collection_type,
            geometry_buffer,
            whole_sector_bounding_box: Some(whole_sector_bounding_box),
            texture: None,
            instance_id: None,
        }
    }

    /// Instanced item for the sub-kind `instance_id`
    pub fn instanced(collection_type: CollectionType, instance_id: &str, geometry_buffer: Arc<GeometryBuffer>) -> Self {
        Self {
            collection_type,
            geometry_buffer,
            whole_sector_bounding_box: None,
            texture: None,
            instance_id: Some(instance_id.to_string()),
        }
    }

    pub fn with_texture(mut self, texture: Arc<dyn Texture>) -> Self {
        self.texture = Some(texture);
        self
    }

    /// Bounds to use for a renderable built from this item
    ///
    /// The whole sector box when present, otherwise the box around the
    /// item's own positions.
    pub fn bounds(&self) -> Option<AABB> {
        self.whole_sector_bounding_box
            .or_else(|| self.geometry_buffer.positions().and_then(|points| AABB::from_points(points)))
    }
}

#[cfg(test)]
#[path = "geometry_tests.rs"]
mod tests;
