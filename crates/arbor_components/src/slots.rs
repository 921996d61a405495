use arbor_hierarchy::TransformSlot;

use crate::transform::{LocalTransform, TickedLocalTransform, TickedWorldTransform, WorldTransform};

/// Writes through [`LocalTransform`] and [`WorldTransform`].
pub struct Immediate;

/// Writes through [`TickedLocalTransform`] and [`TickedWorldTransform`].
pub struct Ticked;

/// Both slots, for structural edits that keep every transform in sync.
pub type AllSlots = (Immediate, Ticked);

impl TransformSlot for Immediate {
  type Local = LocalTransform;
  type World = WorldTransform;

  const NAME: &'static str = "immediate";
}

impl TransformSlot for Ticked {
  type Local = TickedLocalTransform;
  type World = TickedWorldTransform;

  const NAME: &'static str = "ticked";
}
