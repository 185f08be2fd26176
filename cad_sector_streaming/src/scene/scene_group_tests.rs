/// Unit tests for SceneGroup

use std::rc::Rc;
use glam::{Mat4, Vec3};

use crate::material::Material;
use crate::scene::{RenderableUnit, SceneGroup, SectorMeshGroup};
use crate::sector::mock_geometry::*;
use crate::sector::CollectionType;

fn hooked_group(sector_id: u32, material: &Rc<Material>) -> SectorMeshGroup {
    let group = SectorMeshGroup::new(sector_id);
    let mut unit = RenderableUnit::new(
        CollectionType::TriangleMesh,
        triangle_mesh(&[1.0]).geometry_buffer,
        material.clone(),
        sector_box(),
    );
    let hook_material = material.clone();
    unit.set_before_render(Box::new(move |world| hook_material.update_world_inverse(world)));
    group.add_unit(unit);
    group
}

#[test]
fn test_attach_and_remove_child() {
    let scene = SceneGroup::new_shared("scene");
    let group = SectorMeshGroup::new(1);

    let key = SceneGroup::attach(&scene, &group);
    assert_eq!(scene.borrow().child_count(), 1);
    assert!(scene.borrow().contains(&group));

    let removed = scene.borrow_mut().remove_child(key).unwrap();
    assert!(removed.ptr_eq(&group));
    assert!(!group.is_attached());
    assert!(scene.borrow_mut().remove_child(key).is_none());
}

#[test]
fn test_attach_moves_between_parents() {
    let first = SceneGroup::new_shared("first");
    let second = SceneGroup::new_shared("second");
    let group = SectorMeshGroup::new(1);

    SceneGroup::attach(&first, &group);
    SceneGroup::attach(&second, &group);

    assert_eq!(first.borrow().child_count(), 0);
    assert_eq!(second.borrow().child_count(), 1);
    assert!(Rc::ptr_eq(&group.parent().unwrap(), &second));
}

#[test]
fn test_clear_detaches_children() {
    let scene = SceneGroup::new_shared("scene");
    let groups: Vec<_> = (0..3).map(SectorMeshGroup::new).collect();
    for group in &groups {
        SceneGroup::attach(&scene, group);
    }

    scene.borrow_mut().clear();

    assert_eq!(scene.borrow().child_count(), 0);
    assert!(groups.iter().all(|g| !g.is_attached()));
}

#[test]
fn test_before_render_updates_world_inverse() {
    let scene = SceneGroup::new_shared("scene");
    let material = Rc::new(Material::new("m").with_inverse_model_matrix());
    let group = hooked_group(1, &material);
    SceneGroup::attach(&scene, &group);

    // Non-uniform scale applied above the sector
    let world = Mat4::from_scale(Vec3::new(2.0, 1.0, 4.0));
    scene.borrow_mut().set_world_matrix(world);

    assert_eq!(scene.borrow().before_render(), 1);
    assert!(material.inverse_model_matrix().unwrap().abs_diff_eq(world.inverse(), 1e-6));
}

#[test]
fn test_before_render_skips_hidden_units() {
    let scene = SceneGroup::new_shared("scene");
    let material = Rc::new(Material::new("m").with_inverse_model_matrix());
    let group = hooked_group(1, &material);
    SceneGroup::attach(&scene, &group);
    scene.borrow_mut().set_world_matrix(Mat4::from_translation(Vec3::X));

    // Hide through a fresh unit list: clear and re-add a hidden unit
    group.clear();
    let mut hidden = RenderableUnit::new(
        CollectionType::TriangleMesh,
        triangle_mesh(&[1.0]).geometry_buffer,
        material.clone(),
        sector_box(),
    );
    hidden.set_visible(false);
    group.add_unit(hidden);

    assert_eq!(scene.borrow().before_render(), 0);
    assert_eq!(material.inverse_model_matrix(), Some(Mat4::IDENTITY));
}
