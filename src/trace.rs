use bevy::{
    picking::mesh_picking::ray_cast::{MeshRayCast, MeshRayCastSettings, RayCastVisibility},
    prelude::*,
};
use shrike_placement::TraceHit;

use crate::EditorEntity;

/// Ray-cast the cursor ray against scene geometry, skipping editor-owned
/// entities and anything in `ignore` (the preview proxy and the object being
/// placed must not occlude the surface they sit on).
pub fn trace_world_for_position(
    ray: Ray3d,
    ray_cast: &mut MeshRayCast,
    ignore: &[Entity],
    editor_entities: &Query<(), With<EditorEntity>>,
    parents: &Query<&ChildOf>,
) -> Option<TraceHit> {
    let settings = MeshRayCastSettings::default().with_visibility(RayCastVisibility::Any);
    let hits = ray_cast.cast_ray(ray, &settings);

    for (hit_entity, hit_data) in hits {
        if is_ignored(*hit_entity, ignore, parents) || editor_entities.contains(*hit_entity) {
            continue;
        }
        return Some(TraceHit {
            location: hit_data.point,
            normal: hit_data.normal.normalize_or_zero(),
        });
    }
    None
}

/// An entity is ignored if it or any ancestor is in the ignore list
/// (GLTF proxies hit on their child meshes).
fn is_ignored(entity: Entity, ignore: &[Entity], parents: &Query<&ChildOf>) -> bool {
    if ignore.is_empty() {
        return false;
    }
    let mut current = entity;
    loop {
        if ignore.contains(&current) {
            return true;
        }
        match parents.get(current) {
            Ok(&ChildOf(parent)) => current = parent,
            Err(_) => return false,
        }
    }
}
