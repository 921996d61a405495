use std::any::type_name;

use rustc_hash::FxHashMap;

use crate::{components::Component, ComponentId};

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum AccessType {
  Write,
  Read,
}

/// Declared component access of one user of the world, e.g. a [`crate::broker::ComponentBroker`].
#[derive(Default, Clone)]
pub struct AccessMeta {
  comps: FxHashMap<ComponentId, AccessType>,
  names: FxHashMap<ComponentId, &'static str>,
}

impl AccessMeta {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add_comp<C: Component>(&mut self, access: AccessType) {
    match self.comps.get(&C::sid()) {
      Some(AccessType::Read) if access == AccessType::Write => {
        panic!(
          "Access Error: Cannot access component {} mutable if it is already used immutable",
          type_name::<C>()
        );
      }
      Some(_) => {
        panic!(
          "Access Error: Cannot declare access to component {} multiple times",
          type_name::<C>()
        );
      }
      None => {
        self.comps.insert(C::sid(), access);
        self.names.insert(C::sid(), type_name::<C>());
      }
    }
  }

  #[inline]
  pub fn access(&self, comp: ComponentId) -> Option<AccessType> {
    self.comps.get(&comp).copied()
  }

  pub fn name(&self, comp: ComponentId) -> Option<&'static str> {
    self.names.get(&comp).copied()
  }

  /// Two users overlap if one of them writes a component the other one touches.
  pub fn overlaps(&self, other: &AccessMeta) -> bool {
    self.comps.iter().any(|(comp, access)| {
      other
        .comps
        .get(comp)
        .is_some_and(|other| *access == AccessType::Write || *other == AccessType::Write)
    })
  }
}

#[cfg(test)]
mod test {
  use arbor_ecs_macros::Component;

  use crate::{self as arbor_ecs, components::Component};

  use super::{AccessMeta, AccessType};

  #[derive(Component)]
  struct A;

  #[derive(Component)]
  struct B;

  #[test]
  fn meta_comps() {
    let mut meta = AccessMeta::new();
    meta.add_comp::<A>(AccessType::Read);
    meta.add_comp::<B>(AccessType::Write);

    assert_eq!(meta.access(A::sid()), Some(AccessType::Read));
    assert_eq!(meta.access(B::sid()), Some(AccessType::Write));
    assert!(meta.name(A::sid()).is_some_and(|name| name.ends_with("A")));
  }

  #[test]
  #[should_panic]
  fn meta_panic_rr() {
    let mut meta = AccessMeta::new();

    meta.add_comp::<A>(AccessType::Read);
    meta.add_comp::<A>(AccessType::Read);
  }

  #[test]
  #[should_panic]
  fn meta_panic_rw() {
    let mut meta = AccessMeta::new();

    meta.add_comp::<A>(AccessType::Read);
    meta.add_comp::<A>(AccessType::Write);
  }

  #[test]
  #[should_panic]
  fn meta_panic_ww() {
    let mut meta = AccessMeta::new();

    meta.add_comp::<A>(AccessType::Write);
    meta.add_comp::<A>(AccessType::Write);
  }

  #[test]
  fn overlap() {
    let mut meta = AccessMeta::new();
    meta.add_comp::<A>(AccessType::Write);
    meta.add_comp::<B>(AccessType::Read);

    let mut meta_2 = AccessMeta::new();
    meta_2.add_comp::<B>(AccessType::Read);

    assert!(!meta.overlaps(&meta_2));

    meta_2.add_comp::<A>(AccessType::Read);

    assert!(meta.overlaps(&meta_2));
    assert!(meta_2.overlaps(&meta));
  }
}
