/// Unit tests for RenderableUnit

use std::cell::Cell;
use std::rc::Rc;
use glam::{Mat4, Vec3};

use crate::material::Material;
use crate::scene::{RenderFlags, RenderableUnit};
use crate::sector::mock_geometry::*;
use crate::sector::CollectionType;

fn unit() -> RenderableUnit {
    let item = triangle_mesh(&[1.0, 2.0]);
    RenderableUnit::new(
        CollectionType::TriangleMesh,
        item.geometry_buffer,
        Rc::new(Material::new("m")),
        sector_box(),
    )
}

#[test]
fn test_new_unit_defaults() {
    let unit = unit();
    assert_eq!(unit.flags(), RenderFlags::VISIBLE | RenderFlags::FRUSTUM_CULLED);
    assert!(unit.tree_index_counts().is_empty());
    assert!(!unit.has_before_render());
    assert_eq!(unit.bounding_sphere().center, Vec3::ZERO);
    assert_eq!(unit.collection_type(), CollectionType::TriangleMesh);
}

#[test]
fn test_flag_setters() {
    let mut unit = unit();
    unit.set_frustum_culled(false);
    assert!(!unit.is_frustum_culled());
    assert!(unit.is_visible());

    unit.set_visible(false);
    assert!(!unit.is_visible());
    assert!(unit.flags().is_empty());
}

#[test]
fn test_before_render_hook_receives_world() {
    let mut unit = unit();
    let seen = Rc::new(Cell::new(Mat4::IDENTITY));
    let sink = seen.clone();
    unit.set_before_render(Box::new(move |world| sink.set(*world)));

    let world = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
    unit.before_render(&world);

    assert!(unit.has_before_render());
    assert_eq!(seen.get(), world);
}

#[test]
fn test_before_render_without_hook_is_noop() {
    unit().before_render(&Mat4::IDENTITY);
}
