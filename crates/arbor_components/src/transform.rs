use arbor_ecs::Component;
use arbor_hierarchy::QvvsComponent;
use arbor_math::{Mat4, Quat, TransformQvvs, Vec3};

macro_rules! transform_component {
  ($(#[$meta:meta])* $name:ident, $field:ident) => {
    $(#[$meta])*
    #[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
    pub struct $name {
      pub $field: TransformQvvs,
    }

    impl $name {
      pub fn new($field: TransformQvvs) -> Self {
        Self { $field }
      }

      pub fn position(&self) -> Vec3 {
        self.$field.position
      }

      pub fn rotation(&self) -> Quat {
        self.$field.rotation
      }

      pub fn scale(&self) -> f32 {
        self.$field.scale
      }

      pub fn stretch(&self) -> Vec3 {
        self.$field.stretch
      }

      pub fn matrix(&self) -> Mat4 {
        self.$field.to_matrix()
      }
    }

    impl From<TransformQvvs> for $name {
      fn from($field: TransformQvvs) -> Self {
        Self { $field }
      }
    }

    impl QvvsComponent for $name {
      #[inline]
      fn from_transform(transform: TransformQvvs) -> Self {
        Self { $field: transform }
      }

      #[inline]
      fn transform(&self) -> &TransformQvvs {
        &self.$field
      }

      #[inline]
      fn transform_mut(&mut self) -> &mut TransformQvvs {
        &mut self.$field
      }
    }
  };
}

transform_component!(
  /// Absolute transform, written by every transform write and by propagation.
  WorldTransform,
  world_transform
);
transform_component!(
  /// Absolute transform of the ticked slot, e.g. for fixed-rate simulation.
  TickedWorldTransform,
  world_transform
);
transform_component!(
  /// Transform relative to the parent. Only non-root members of a hierarchy have one.
  LocalTransform,
  local_transform
);
transform_component!(TickedLocalTransform, local_transform);
