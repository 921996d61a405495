use std::any::type_name;

use arbor_ecs::{
  components::Component, lookup::ParallelLookup, ComponentRead, ComponentWrite, Entity, World,
};
#[cfg(feature = "debug")]
use log::trace;
use rustc_hash::FxHashSet;

use crate::{
  access::HierarchyAccess,
  components::{EntityInHierarchy, EntityInHierarchyCleanup, RootReference},
  error::HierarchyError,
};

/// Proof of exclusive write access to one hierarchy.
///
/// Not `Clone`: every key grants access to its hierarchy to exactly one
/// [`KeyedLookup`].
#[derive(Debug, PartialEq, Eq)]
pub struct TransformsKey {
  root: Entity,
}

impl TransformsKey {
  /// # Safety
  /// no other key for `root` may be in use while this key or a lookup created from it
  /// is alive
  pub unsafe fn from_exclusive_root(root: Entity) -> Self {
    Self { root }
  }

  pub fn root(&self) -> Entity {
    self.root
  }

  /// Panics if `root` is not the hierarchy this key was created for.
  #[inline]
  pub fn validate(&self, root: Entity) {
    assert!(
      self.root == root,
      "TransformsKey for root {} used on hierarchy of root {}",
      self.root,
      root
    );
  }
}

/// World access shared by worker threads that each write a different hierarchy.
pub struct TransformsLookup<'w> {
  lookup: ParallelLookup<'w>,
}

impl<'w> TransformsLookup<'w> {
  pub fn new(world: &'w mut World) -> Self {
    Self {
      lookup: ParallelLookup::new(world),
    }
  }

  pub fn with_key(&self, key: TransformsKey) -> KeyedLookup<'w> {
    KeyedLookup {
      lookup: self.lookup,
      key,
    }
  }

  /// One lookup per root, to be moved into worker threads.
  pub fn split(self, roots: &[Entity]) -> Result<Vec<KeyedLookup<'w>>, HierarchyError> {
    let mut seen = FxHashSet::default();
    let mut lookups = Vec::with_capacity(roots.len());

    for &root in roots {
      if !self.lookup.exists(root) {
        return Err(HierarchyError::DeadEntity(root));
      }
      if !seen.insert(root) {
        return Err(HierarchyError::DuplicateRoot(root));
      }

      // roots are unique and the consumed lookup cannot hand out more keys
      let key = unsafe { TransformsKey::from_exclusive_root(root) };
      lookups.push(self.with_key(key));
    }

    #[cfg(feature = "debug")]
    trace!("Split transforms lookup into {} keyed lookups", lookups.len());

    Ok(lookups)
  }
}

/// Access limited to the hierarchy of its key.
///
/// Hierarchy structure can be read for any entity, transform components only for
/// members of the key's hierarchy. Structure is never writable.
pub struct KeyedLookup<'w> {
  lookup: ParallelLookup<'w>,
  key: TransformsKey,
}

impl KeyedLookup<'_> {
  pub fn key(&self) -> &TransformsKey {
    &self.key
  }

  fn is_structural<C: Component>() -> bool {
    let id = C::sid();
    id == RootReference::sid()
      || id == EntityInHierarchy::sid()
      || id == EntityInHierarchyCleanup::sid()
  }

  fn owns(&self, entity: Entity) -> bool {
    if entity == self.key.root {
      return true;
    }
    // structure is never written while lookups exist
    unsafe { self.lookup.get::<RootReference>(entity) }
      .is_some_and(|reference| reference.root() == self.key.root)
  }

  #[inline]
  fn check<C: Component>(&self, entity: Entity) {
    assert!(
      self.owns(entity),
      "Keyed Access Error: {} of entity {} is outside of the hierarchy of root {}",
      type_name::<C>(),
      entity,
      self.key.root
    );
  }
}

impl ComponentRead for KeyedLookup<'_> {
  #[inline]
  fn exists(&self, entity: Entity) -> bool {
    self.lookup.exists(entity)
  }

  fn get<C: Component>(&self, entity: Entity) -> Option<&C> {
    if !Self::is_structural::<C>() {
      self.check::<C>(entity);
    }
    // owned components are only written through this lookup, which is borrowed here
    unsafe { self.lookup.get(entity) }
  }
}

impl ComponentWrite for KeyedLookup<'_> {
  fn get_mut<C: Component>(&mut self, entity: Entity) -> Option<&mut C> {
    assert!(
      !Self::is_structural::<C>(),
      "Keyed Access Error: {} cannot be written through a keyed lookup",
      type_name::<C>()
    );
    self.check::<C>(entity);
    // the key makes this lookup the only one touching the hierarchy's transforms
    unsafe { self.lookup.get_mut(entity) }
  }
}

impl HierarchyAccess for KeyedLookup<'_> {
  #[inline]
  fn validate_root(&self, root: Entity) {
    self.key.validate(root);
  }
}
