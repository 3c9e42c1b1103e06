use hecs::World;

use crate::components::*;

/// Garbage collection: despawn entities whose lifetime has run out.
/// Returns how many were removed.
pub fn gc(world: &mut World, now_ms: u64) -> usize {
    let to_remove: Vec<_> = world
        .query::<&Lifetime>()
        .iter()
        .filter(|(_entity, lifetime)| lifetime.is_expired(now_ms))
        .map(|(entity, _)| entity)
        .collect();

    for entity in &to_remove {
        let _ = world.despawn(*entity);
    }
    to_remove.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gc_removes_only_expired() {
        let mut world = World::new();
        let keep = world.spawn((Lifetime { despawn_at_ms: 200 },));
        world.spawn((Lifetime { despawn_at_ms: 100 },));
        let permanent = world.spawn((7u32,));

        assert_eq!(gc(&mut world, 150), 1);
        assert!(world.contains(keep));
        assert!(world.contains(permanent), "Entities without a lifetime stay");

        assert_eq!(gc(&mut world, 200), 1, "Deadline is inclusive");
        assert!(!world.contains(keep));
    }
}
