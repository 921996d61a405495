use std::marker::PhantomData;

use crate::{components::Component, Entity, World};

/// Unsynchronized component lookup that can be copied into worker threads.
///
/// The lookup holds the world's exclusive borrow for `'w`, so nothing outside of the
/// lookups can touch the world meanwhile. Between lookups nothing is checked: callers pair
/// the lookup with a proof of exclusive ownership of the entities they touch.
#[derive(Clone, Copy)]
pub struct ParallelLookup<'w> {
  world: &'w World,
  marker: PhantomData<&'w mut World>,
}

impl<'w> ParallelLookup<'w> {
  pub fn new(world: &'w mut World) -> Self {
    Self {
      world,
      marker: PhantomData,
    }
  }

  /// Liveness never changes while the lookup exists.
  #[inline]
  pub fn exists(&self, entity: Entity) -> bool {
    self.world.exists(entity)
  }

  /// # Safety
  /// no other thread may write this component of this entity while the reference lives
  #[inline]
  pub unsafe fn get<C: Component>(&self, entity: Entity) -> Option<&'w C> {
    self.world.storage().get_comp(entity)
  }

  /// # Safety
  /// no other reference to this component of this entity may be alive, on any thread,
  /// while the returned reference lives
  #[inline]
  pub unsafe fn get_mut<C: Component>(&self, entity: Entity) -> Option<&'w mut C> {
    self.world.storage().get_comp_unchecked_mut(entity)
  }
}

#[cfg(test)]
mod test {
  use std::thread;

  use arbor_ecs_macros::Component;

  use crate::{self as arbor_ecs, World};

  use super::ParallelLookup;

  #[derive(Component)]
  struct Counter(u64);

  #[test]
  fn disjoint_writes() {
    let mut world = World::new();
    let ids = (0..8).map(|_| world.create_entity(Counter(0))).collect::<Vec<_>>();

    let lookup = ParallelLookup::new(&mut world);
    thread::scope(|scope| {
      for chunk in ids.chunks(2) {
        scope.spawn(move || {
          for id in chunk {
            for _ in 0..100 {
              // every entity is owned by exactly one thread
              unsafe { lookup.get_mut::<Counter>(*id) }.unwrap().0 += 1;
            }
          }
        });
      }
    });

    for id in ids {
      assert_eq!(world.get_comp::<Counter>(id).unwrap().0, 100);
    }
  }

  #[test]
  fn exists() {
    let mut world = World::new();
    let id = world.create_entity(Counter(0));
    let dead = world.create_entity(Counter(0));
    world.remove_entity(dead);

    let lookup = ParallelLookup::new(&mut world);
    assert!(lookup.exists(id));
    assert!(!lookup.exists(dead));
    assert!(unsafe { lookup.get::<Counter>(dead) }.is_none());
  }
}
