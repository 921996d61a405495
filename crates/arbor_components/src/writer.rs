use std::marker::PhantomData;

use arbor_ecs::Entity;
use arbor_hierarchy::{
  write_and_propagate, write_one, HierarchyAccess, HierarchyHandle, HierarchyRef, QvvsComponent,
  TransformSlot, WriteBuffer, WriteOp,
};
use arbor_math::{Quat, TransformQvvs, Vec3};
use log::warn;
#[cfg(feature = "debug")]
use log::trace;

use crate::slots::{Immediate, Ticked};

macro_rules! write_methods {
  ($($(#[$meta:meta])* $name:ident, $handle_name:ident, $value:ty, $op:ident;)*) => {
    $(
      $(#[$meta])*
      #[inline]
      pub fn $name(&mut self, entity: Entity, value: $value) {
        self.write(entity, WriteOp::$op(value));
      }

      $(#[$meta])*
      #[inline]
      pub fn $handle_name(&mut self, handle: &HierarchyHandle, value: $value) {
        self.write_handle(handle, WriteOp::$op(value));
      }
    )*
  };
}

/// Transform writes through one slot `S` and one kind of world access `A`.
///
/// Every write updates the target's local and world transform and propagates the new
/// world transform to all descendants before returning. Entities outside of any
/// hierarchy are written directly, their local and world transform coincide.
pub struct TransformWriter<'a, A: HierarchyAccess, S: TransformSlot> {
  access: &'a mut A,
  slot: PhantomData<S>,
}

impl<'a, A: HierarchyAccess, S: TransformSlot> TransformWriter<'a, A, S> {
  pub fn new(access: &'a mut A) -> Self {
    Self {
      access,
      slot: PhantomData,
    }
  }

  pub fn access(&mut self) -> &mut A {
    &mut *self.access
  }

  pub fn resolve(&self, entity: Entity) -> Option<HierarchyHandle> {
    HierarchyHandle::resolve(entity, &*self.access)
  }

  pub fn world_transform(&self, entity: Entity) -> Option<TransformQvvs> {
    self
      .access
      .get::<S::World>(entity)
      .map(|comp| *comp.transform())
  }

  /// Copy-parent members report identity, roots and free entities their world transform.
  pub fn local_transform(&self, entity: Entity) -> Option<TransformQvvs> {
    match self.resolve(entity) {
      Some(handle) if handle.is_copy_parent() => Some(TransformQvvs::IDENTITY),
      Some(handle) if !handle.is_root() => self
        .access
        .get::<S::Local>(entity)
        .map(|comp| *comp.transform()),
      _ => self.world_transform(entity),
    }
  }

  pub fn write(&mut self, entity: Entity, op: WriteOp) {
    match self.resolve(entity) {
      Some(handle) => write_one::<S, A>(&handle, op, self.access),
      None => self.write_free(entity, op),
    }
  }

  pub fn write_handle(&mut self, handle: &HierarchyHandle, op: WriteOp) {
    write_one::<S, A>(handle, op, self.access);
  }

  /// Applies all writes in order, then propagates once.
  pub fn write_batch(&mut self, hierarchy: HierarchyRef, writes: &WriteBuffer) {
    write_and_propagate::<S, A>(hierarchy, writes, self.access);
  }

  fn write_free(&mut self, entity: Entity, op: WriteOp) {
    self.access.validate_root(entity);

    match self.access.get_mut::<S::World>(entity) {
      Some(comp) => {
        #[cfg(feature = "debug")]
        trace!("Applying {:?} to free entity {}", op, entity);

        op.apply_free(comp.transform_mut());
      }
      None => warn!(
        "Entity {} has no {} world transform, dropping {:?}",
        entity,
        S::NAME,
        op
      ),
    }
  }

  write_methods! {
    set_local_position, set_local_position_handle, Vec3, LocalPositionSet;
    set_local_rotation, set_local_rotation_handle, Quat, LocalRotationSet;
    set_local_scale, set_local_scale_handle, f32, LocalScaleSet;
    set_local_transform, set_local_transform_handle, TransformQvvs, LocalTransformSet;
    /// Local becomes `delta * local`.
    transform_local, transform_local_handle, TransformQvvs, LocalTransformDelta;
    /// Undoes [`Self::transform_local`] with the same delta.
    transform_local_inverse, transform_local_inverse_handle, TransformQvvs,
      LocalInverseTransformDelta;
    /// Multiplies the local stretch component wise.
    stretch, stretch_handle, Vec3, StretchDelta;
    set_world_position, set_world_position_handle, Vec3, WorldPositionSet;
    translate_world, translate_world_handle, Vec3, WorldPositionDelta;
    set_world_rotation, set_world_rotation_handle, Quat, WorldRotationSet;
    /// Rotates the orientation in world space, the position stays.
    rotate_world, rotate_world_handle, Quat, WorldRotationDelta;
    set_world_scale, set_world_scale_handle, f32, WorldScaleSet;
    set_world_transform, set_world_transform_handle, TransformQvvs, WorldTransformSet;
    /// World becomes `delta * world`.
    transform_world, transform_world_handle, TransformQvvs, WorldTransformDelta;
    /// Undoes [`Self::transform_world`] with the same delta.
    transform_world_inverse, transform_world_inverse_handle, TransformQvvs,
      WorldInverseTransformDelta;
  }
}

pub trait TransformsExt: HierarchyAccess + Sized {
  fn transforms(&mut self) -> TransformWriter<'_, Self, Immediate> {
    TransformWriter::new(self)
  }

  fn ticked_transforms(&mut self) -> TransformWriter<'_, Self, Ticked> {
    TransformWriter::new(self)
  }
}

impl<A: HierarchyAccess> TransformsExt for A {}
