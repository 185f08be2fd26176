/// Unit tests for SectorMeshGroup

use std::rc::Rc;

use crate::material::Material;
use crate::renderer::mock_renderer::DropCounter;
use crate::scene::{RenderableUnit, SceneGroup, SectorMeshGroup};
use crate::sector::mock_geometry::*;
use crate::sector::CollectionType;

fn unit(material: Rc<Material>) -> RenderableUnit {
    RenderableUnit::new(
        CollectionType::TriangleMesh,
        triangle_mesh(&[1.0]).geometry_buffer,
        material,
        sector_box(),
    )
}

#[test]
fn test_new_group_is_empty() {
    let group = SectorMeshGroup::new(4);
    assert_eq!(group.sector_id(), 4);
    assert!(group.is_empty());
    assert!(!group.is_attached());
    assert!(group.textures().is_empty());
}

#[test]
fn test_add_unit_collects_textures_once() {
    let group = SectorMeshGroup::new(1);
    let material = Rc::new(Material::new("t").with_texture(texture(None)));

    group.add_unit(unit(material.clone()));
    group.add_unit(unit(material));
    group.add_unit(unit(Rc::new(Material::new("plain"))));

    assert_eq!(group.unit_count(), 3);
    assert_eq!(group.textures().len(), 1);
}

#[test]
fn test_clear_keeps_shared_resources_alive() {
    let drops = DropCounter::new();
    let shared_texture = texture(Some(&drops));
    let group = SectorMeshGroup::new(1);
    group.add_unit(unit(Rc::new(Material::new("t").with_texture(shared_texture.clone()))));

    group.clear();

    assert!(group.is_empty());
    assert!(group.textures().is_empty());
    assert_eq!(drops.count(), 0);
    drop(shared_texture);
    assert_eq!(drops.count(), 1);
}

#[test]
fn test_detach_from_parent() {
    let scene = SceneGroup::new_shared("scene");
    let group = SectorMeshGroup::new(1);
    SceneGroup::attach(&scene, &group);

    assert!(group.is_attached());
    assert!(group.detach());
    assert!(!group.is_attached());
    assert_eq!(scene.borrow().child_count(), 0);
    assert!(!group.detach());
}

#[test]
fn test_parent_dropped() {
    let scene = SceneGroup::new_shared("scene");
    let group = SectorMeshGroup::new(1);
    SceneGroup::attach(&scene, &group);
    drop(scene);

    assert!(group.parent().is_none());
    assert!(!group.detach());
}

#[test]
fn test_ptr_eq() {
    let group = SectorMeshGroup::new(1);
    let clone = group.clone();
    assert!(group.ptr_eq(&clone));
    assert!(!group.ptr_eq(&SectorMeshGroup::new(1)));
}
