/// Bounding volumes for renderable units

use glam::Vec3;

// ===== AABB =====

/// Axis-Aligned Bounding Box in model space
///
/// Mesh units take the bounding box of their whole sector rather than a
/// per-item box, so every unit of a sector shares the same bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner (x, y, z)
    pub min: Vec3,
    /// Maximum corner (x, y, z)
    pub max: Vec3,
}

impl AABB {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box enclosing all `points`, or `None` when there are none
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<AABB> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(AABB { min, max })
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extent(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }
}

// ===== BOUNDING SPHERE =====

/// Sphere enclosing a bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    pub fn from_aabb(aabb: &AABB) -> Self {
        Self {
            center: aabb.center(),
            radius: aabb.half_extent().length(),
        }
    }
}

#[cfg(test)]
#[path = "bounds_tests.rs"]
mod tests;
