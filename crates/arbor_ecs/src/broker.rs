use std::any::type_name;

#[cfg(feature = "debug")]
use log::trace;

use crate::{
  access::{ComponentRead, ComponentWrite},
  components::Component,
  meta::{AccessMeta, AccessType},
  Entity, World,
};

/// Declares up front which components a batch of operations may touch.
#[derive(Default)]
pub struct ComponentBrokerBuilder {
  meta: AccessMeta,
}

/// Mediated world access for a batch of operations.
///
/// Every component has to be declared on the builder, reading an undeclared component
/// or writing a read-only one panics. Brokers built from the same declarations can be
/// checked against each other with [`ComponentBroker::conflicts_with`].
pub struct ComponentBroker<'w> {
  world: &'w mut World,
  meta: AccessMeta,
}

impl ComponentBrokerBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn read<C: Component>(mut self) -> Self {
    self.meta.add_comp::<C>(AccessType::Read);
    self
  }

  pub fn write<C: Component>(mut self) -> Self {
    self.meta.add_comp::<C>(AccessType::Write);
    self
  }

  pub fn meta(&self) -> &AccessMeta {
    &self.meta
  }

  pub fn build(self, world: &mut World) -> ComponentBroker<'_> {
    ComponentBroker {
      world,
      meta: self.meta,
    }
  }
}

impl<'w> ComponentBroker<'w> {
  pub fn builder() -> ComponentBrokerBuilder {
    ComponentBrokerBuilder::new()
  }

  pub fn meta(&self) -> &AccessMeta {
    &self.meta
  }

  pub fn conflicts_with(&self, other: &AccessMeta) -> bool {
    self.meta.overlaps(other)
  }

  pub fn into_inner(self) -> &'w mut World {
    self.world
  }

  #[inline]
  fn check<C: Component>(&self, write: bool) {
    #[cfg(feature = "debug")]
    trace!("Broker access {} write={}", type_name::<C>(), write);

    match self.meta.access(C::sid()) {
      Some(AccessType::Write) => {}
      Some(AccessType::Read) if !write => {}
      Some(AccessType::Read) => panic!(
        "Broker Access Error: Component {} was declared read only",
        type_name::<C>()
      ),
      None => panic!(
        "Broker Access Error: Component {} was not declared",
        type_name::<C>()
      ),
    }
  }
}

impl ComponentRead for ComponentBroker<'_> {
  #[inline]
  fn exists(&self, entity: Entity) -> bool {
    self.world.exists(entity)
  }

  #[inline]
  fn get<C: Component>(&self, entity: Entity) -> Option<&C> {
    self.check::<C>(false);
    self.world.get_comp(entity)
  }
}

impl ComponentWrite for ComponentBroker<'_> {
  #[inline]
  fn get_mut<C: Component>(&mut self, entity: Entity) -> Option<&mut C> {
    self.check::<C>(true);
    self.world.get_comp_mut(entity)
  }
}

#[cfg(test)]
mod test {
  use arbor_ecs_macros::Component;

  use crate::{
    self as arbor_ecs,
    access::{ComponentRead, ComponentWrite},
    World,
  };

  use super::ComponentBroker;

  #[derive(Component, Debug, PartialEq)]
  struct Health(u32);

  #[derive(Component, Debug, PartialEq)]
  struct Armor(u32);

  #[test]
  fn declared_access() {
    let mut world = World::new();
    let id = world.create_entity((Health(10), Armor(2)));

    let mut broker = ComponentBroker::builder()
      .write::<Health>()
      .read::<Armor>()
      .build(&mut world);

    let armor = broker.get::<Armor>(id).unwrap().0;
    broker.get_mut::<Health>(id).unwrap().0 -= armor;

    assert_eq!(world.get_comp::<Health>(id), Some(&Health(8)));
  }

  #[test]
  #[should_panic]
  fn undeclared_read() {
    let mut world = World::new();
    let id = world.create_entity(Health(1));

    let broker = ComponentBroker::builder().read::<Armor>().build(&mut world);
    let _ = broker.get::<Health>(id);
  }

  #[test]
  #[should_panic]
  fn write_read_only() {
    let mut world = World::new();
    let id = world.create_entity(Health(1));

    let mut broker = ComponentBroker::builder().read::<Health>().build(&mut world);
    let _ = broker.get_mut::<Health>(id);
  }

  #[test]
  #[should_panic]
  fn conflicting_declaration() {
    let _ = ComponentBroker::builder().read::<Health>().write::<Health>();
  }

  #[test]
  fn conflicts() {
    let mut world = World::new();

    let readers = ComponentBroker::builder().read::<Health>();
    let broker = ComponentBroker::builder()
      .write::<Health>()
      .build(&mut world);

    assert!(broker.conflicts_with(readers.meta()));
    assert!(!broker.conflicts_with(ComponentBroker::builder().read::<Armor>().meta()));
  }
}
