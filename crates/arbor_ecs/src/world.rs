use std::any::{Any, TypeId};

#[allow(unused_imports)]
use log::{debug, trace};
use rustc_hash::FxHashMap;

use crate::{
  components::{Component, UnsafeDowncast},
  entity::IntoEntity,
  storage::Storage,
  Entity,
};

/// Entities, their components and world-global resources.
#[derive(Default)]
pub struct World {
  storage: Storage,
  resources: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl World {
  pub fn new() -> Self {
    debug!("Creating World");
    World::default()
  }

  pub fn create_entity(&mut self, entity: impl IntoEntity) -> Entity {
    self.storage.create_entity(entity.into_entity())
  }

  /// Returns false if the entity was already gone.
  pub fn remove_entity(&mut self, entity: Entity) -> bool {
    self.storage.remove_entity(entity)
  }

  #[inline]
  pub fn exists(&self, entity: Entity) -> bool {
    self.storage.exists(entity)
  }

  #[inline]
  pub fn entity_count(&self) -> usize {
    self.storage.len()
  }

  /// Inserts or replaces `comp`. Returns false if the entity does not exist.
  pub fn add_comp<C: Component>(&mut self, entity: Entity, comp: C) -> bool {
    self.storage.add_comp(entity, Box::new(comp))
  }

  pub fn remove_comp<C: Component>(&mut self, entity: Entity) -> Option<C> {
    let comp = self.storage.remove_comp(entity, C::sid())?;
    Some(*unsafe { comp.downcast_unchecked::<C>() })
  }

  #[inline]
  pub fn has_comp<C: Component>(&self, entity: Entity) -> bool {
    self.storage.has_comp(entity, C::sid())
  }

  #[inline]
  pub fn get_comp<C: Component>(&self, entity: Entity) -> Option<&C> {
    self.storage.get_comp(entity)
  }

  #[inline]
  pub fn get_comp_mut<C: Component>(&mut self, entity: Entity) -> Option<&mut C> {
    self.storage.get_comp_mut(entity)
  }

  pub fn set_resource<R: Send + Sync + 'static>(&mut self, res: R) {
    #[cfg(feature = "debug")]
    trace!("Setting Resource {}", std::any::type_name::<R>());

    self.resources.insert(TypeId::of::<R>(), Box::new(res));
  }

  /// Inserts `res` unless a resource of the same type is already present.
  pub fn add_resource<R: Send + Sync + 'static>(&mut self, res: R) {
    debug!("Adding Resource {}", std::any::type_name::<R>());

    self
      .resources
      .entry(TypeId::of::<R>())
      .or_insert_with(|| Box::new(res));
  }

  pub fn get_resource<R: 'static>(&self) -> Option<&R> {
    self.resources.get(&TypeId::of::<R>())?.downcast_ref()
  }

  pub fn get_resource_mut<R: 'static>(&mut self) -> Option<&mut R> {
    self.resources.get_mut(&TypeId::of::<R>())?.downcast_mut()
  }

  pub(crate) fn storage(&self) -> &Storage {
    &self.storage
  }
}

#[cfg(test)]
mod test {
  use super::World;

  #[test]
  fn resource() {
    let mut world = World::new();

    world.add_resource(0i32);

    let res = world.get_resource::<i32>().unwrap();
    assert_eq!(*res, 0);
  }

  #[test]
  fn add_resource_keeps_existing() {
    let mut world = World::new();

    world.add_resource(1i32);
    world.add_resource(2i32);
    assert_eq!(world.get_resource::<i32>(), Some(&1));

    world.set_resource(3i32);
    assert_eq!(world.get_resource::<i32>(), Some(&3));
  }

  #[test]
  fn resource_mut() {
    let mut world = World::new();

    world.add_resource(0i32);

    let res = world.get_resource_mut::<i32>().unwrap();
    *res = 1;
    assert_eq!(world.get_resource::<i32>(), Some(&1));
  }

  #[test]
  #[should_panic]
  fn panic_resource() {
    let world = World::new();

    let _ = world.get_resource::<i32>().unwrap();
  }
}
