use arbor_math::{inversemulqvvsclean, mulclean, normalize_rotation, Quat, TransformQvvs, Vec3};
use smallvec::SmallVec;

/// A single modification of one entity's transform.
///
/// Local ops act on the transform relative to the parent, world ops on the absolute
/// transform. Either way both transforms of the target are consistent afterwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WriteOp {
  LocalPositionSet(Vec3),
  LocalRotationSet(Quat),
  LocalScaleSet(f32),
  LocalTransformSet(TransformQvvs),
  /// Local becomes `delta * local`.
  LocalTransformDelta(TransformQvvs),
  /// Removes `delta` from the front of local, undoing [`WriteOp::LocalTransformDelta`].
  LocalInverseTransformDelta(TransformQvvs),
  /// Multiplies the local stretch component wise.
  StretchDelta(Vec3),
  WorldPositionSet(Vec3),
  WorldPositionDelta(Vec3),
  WorldRotationSet(Quat),
  /// World rotation becomes `delta * rotation`.
  WorldRotationDelta(Quat),
  WorldScaleSet(f32),
  WorldTransformSet(TransformQvvs),
  /// World becomes `delta * world`.
  WorldTransformDelta(TransformQvvs),
  /// Removes `delta` from the front of world, undoing [`WriteOp::WorldTransformDelta`].
  WorldInverseTransformDelta(TransformQvvs),
}

impl WriteOp {
  pub fn is_world(&self) -> bool {
    matches!(
      self,
      WriteOp::WorldPositionSet(_)
        | WriteOp::WorldPositionDelta(_)
        | WriteOp::WorldRotationSet(_)
        | WriteOp::WorldRotationDelta(_)
        | WriteOp::WorldScaleSet(_)
        | WriteOp::WorldTransformSet(_)
        | WriteOp::WorldTransformDelta(_)
        | WriteOp::WorldInverseTransformDelta(_)
    )
  }

  /// Applies the op to an entity below `parent_world`, updating both of its transforms.
  pub fn apply(
    &self,
    parent_world: &TransformQvvs,
    local: &mut TransformQvvs,
    world: &mut TransformQvvs,
  ) {
    match *self {
      WriteOp::LocalPositionSet(position) => local.position = position,
      WriteOp::LocalRotationSet(rotation) => local.rotation = rotation,
      WriteOp::LocalScaleSet(scale) => local.scale = scale,
      WriteOp::LocalTransformSet(transform) => *local = transform,
      WriteOp::LocalTransformDelta(delta) => *local = mulclean(&delta, local),
      WriteOp::LocalInverseTransformDelta(delta) => *local = inversemulqvvsclean(&delta, local),
      WriteOp::StretchDelta(stretch) => local.stretch *= stretch,
      WriteOp::WorldPositionSet(position) => world.position = position,
      WriteOp::WorldPositionDelta(delta) => world.position += delta,
      WriteOp::WorldRotationSet(rotation) => world.rotation = rotation,
      WriteOp::WorldRotationDelta(delta) => {
        world.rotation = normalize_rotation(delta * world.rotation)
      }
      WriteOp::WorldScaleSet(scale) => world.scale = scale,
      WriteOp::WorldTransformSet(transform) => *world = transform,
      WriteOp::WorldTransformDelta(delta) => *world = mulclean(&delta, world),
      WriteOp::WorldInverseTransformDelta(delta) => *world = inversemulqvvsclean(&delta, world),
    }

    if self.is_world() {
      *local = inversemulqvvsclean(parent_world, world);
    } else {
      *world = mulclean(parent_world, local);
    }
  }

  /// Applies the op to an entity without a parent, whose local transform is its world transform.
  pub fn apply_free(&self, world: &mut TransformQvvs) {
    let mut local = *world;
    self.apply(&TransformQvvs::IDENTITY, &mut local, world);
  }
}

/// A write addressed to a node index of one hierarchy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformWrite {
  pub index: u32,
  pub op: WriteOp,
}

impl TransformWrite {
  pub fn new(index: u32, op: WriteOp) -> Self {
    Self { index, op }
  }
}

/// Ordered writes into one hierarchy, applied before a single propagation pass.
///
/// Holds one write inline, which is what the per-call operations produce.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteBuffer {
  writes: SmallVec<[TransformWrite; 1]>,
}

impl WriteBuffer {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn single(index: u32, op: WriteOp) -> Self {
    let mut buffer = Self::new();
    buffer.push(index, op);
    buffer
  }

  pub fn push(&mut self, index: u32, op: WriteOp) -> &mut Self {
    self.writes.push(TransformWrite::new(index, op));
    self
  }

  pub fn iter(&self) -> impl Iterator<Item = &TransformWrite> {
    self.writes.iter()
  }

  pub fn len(&self) -> usize {
    self.writes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.writes.is_empty()
  }

  pub fn clear(&mut self) {
    self.writes.clear();
  }
}

impl FromIterator<TransformWrite> for WriteBuffer {
  fn from_iter<T: IntoIterator<Item = TransformWrite>>(iter: T) -> Self {
    Self {
      writes: iter.into_iter().collect(),
    }
  }
}

impl Extend<TransformWrite> for WriteBuffer {
  fn extend<T: IntoIterator<Item = TransformWrite>>(&mut self, iter: T) {
    self.writes.extend(iter);
  }
}
