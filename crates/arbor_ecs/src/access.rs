use crate::{components::Component, Entity, World};

/// Shared access to entity components.
pub trait ComponentRead {
  /// Whether `entity` refers to a live entity of this storage.
  fn exists(&self, entity: Entity) -> bool;
  fn get<C: Component>(&self, entity: Entity) -> Option<&C>;

  #[inline]
  fn has<C: Component>(&self, entity: Entity) -> bool {
    self.get::<C>(entity).is_some()
  }
}

/// Mutable access to components that already exist. Never changes the entity layout.
pub trait ComponentWrite: ComponentRead {
  fn get_mut<C: Component>(&mut self, entity: Entity) -> Option<&mut C>;
}

impl ComponentRead for World {
  #[inline]
  fn exists(&self, entity: Entity) -> bool {
    World::exists(self, entity)
  }

  #[inline]
  fn get<C: Component>(&self, entity: Entity) -> Option<&C> {
    self.get_comp(entity)
  }
}

impl ComponentWrite for World {
  #[inline]
  fn get_mut<C: Component>(&mut self, entity: Entity) -> Option<&mut C> {
    self.get_comp_mut(entity)
  }
}

impl<T: ComponentRead> ComponentRead for &mut T {
  #[inline]
  fn exists(&self, entity: Entity) -> bool {
    (**self).exists(entity)
  }

  #[inline]
  fn get<C: Component>(&self, entity: Entity) -> Option<&C> {
    (**self).get(entity)
  }
}

impl<T: ComponentWrite> ComponentWrite for &mut T {
  #[inline]
  fn get_mut<C: Component>(&mut self, entity: Entity) -> Option<&mut C> {
    (**self).get_mut(entity)
  }
}
