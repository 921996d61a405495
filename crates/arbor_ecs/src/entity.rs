use std::fmt;

use arbor_ecs_macros::all_tuples;

use crate::components::Component;

/// Generational handle to an entity slot.
///
/// A slot is reused after its entity is removed, with a bumped generation, so a stale
/// `Entity` never aliases the new occupant.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct Entity {
  index: u32,
  generation: u32,
}

impl Entity {
  /// An entity that never exists in any world.
  pub const PLACEHOLDER: Entity = Entity {
    index: u32::MAX,
    generation: u32::MAX,
  };

  #[inline]
  pub(crate) const fn new(index: u32, generation: u32) -> Self {
    Self { index, generation }
  }

  #[inline]
  pub fn index(&self) -> u32 {
    self.index
  }

  #[inline]
  pub fn generation(&self) -> u32 {
    self.generation
  }
}

impl fmt::Debug for Entity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}v{}", self.index, self.generation)
  }
}

impl fmt::Display for Entity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Debug::fmt(self, f)
  }
}

pub trait IntoEntity {
  fn into_entity(self) -> Vec<Box<dyn Component>>;
}

impl IntoEntity for () {
  #[inline]
  fn into_entity(self) -> Vec<Box<dyn Component>> {
    Vec::new()
  }
}

impl<F0: Component> IntoEntity for F0 {
  #[inline]
  fn into_entity(self) -> Vec<Box<dyn Component>> {
    vec![Box::new(self)]
  }
}

macro_rules! impl_into_entity {
  ($($params:ident),*) => {
    #[allow(non_snake_case)]
    impl<$($params : Component),*> IntoEntity for ($($params ,)*) {
      #[inline]
      fn into_entity(self) -> Vec<Box<dyn Component>> {
        let ($($params ,)*) = self;
        vec![$(Box::new($params)),*]
      }
    }
  };
}

all_tuples!(impl_into_entity, 1, 16, F);
