use arbor_ecs::{
  broker::{ComponentBroker, ComponentBrokerBuilder},
  ComponentWrite, Entity, World,
};

use crate::{
  components::{EntityInHierarchy, EntityInHierarchyCleanup, RootReference},
  slot::TransformSlot,
};

/// World access that transform writes and propagation can run through.
pub trait HierarchyAccess: ComponentWrite {
  /// Called before a write touches the hierarchy rooted at `root`. Panics if this
  /// access is not allowed to modify that hierarchy.
  #[inline]
  fn validate_root(&self, _root: Entity) {}
}

impl HierarchyAccess for World {}

impl HierarchyAccess for ComponentBroker<'_> {}

impl<T: HierarchyAccess> HierarchyAccess for &mut T {
  #[inline]
  fn validate_root(&self, root: Entity) {
    (**self).validate_root(root)
  }
}

/// Declarations a [`ComponentBroker`] needs to resolve handles and write transforms.
pub trait HierarchyBrokerExt {
  /// Read access to the structural hierarchy components.
  fn hierarchy(self) -> Self;
  /// Write access to both transforms of slot `S`.
  fn slot<S: TransformSlot>(self) -> Self;
}

impl HierarchyBrokerExt for ComponentBrokerBuilder {
  fn hierarchy(self) -> Self {
    self
      .read::<RootReference>()
      .read::<EntityInHierarchy>()
      .read::<EntityInHierarchyCleanup>()
  }

  fn slot<S: TransformSlot>(self) -> Self {
    self.write::<S::Local>().write::<S::World>()
  }
}
