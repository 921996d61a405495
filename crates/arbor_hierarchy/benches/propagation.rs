use std::hint::black_box;

use arbor_ecs::{Component, Entity, World};
use arbor_hierarchy::{
  AttachOptions, HierarchyHandle, HierarchyRef, HierarchyWorldExt, QvvsComponent, TransformSlot,
  WriteBuffer, WriteOp,
};
use arbor_math::{TransformQvvs, Vec3};
use criterion::{criterion_group, criterion_main, Criterion};

#[derive(Component)]
struct Local(TransformQvvs);

#[derive(Component)]
struct Global(TransformQvvs);

impl QvvsComponent for Local {
  fn from_transform(transform: TransformQvvs) -> Self {
    Self(transform)
  }

  fn transform(&self) -> &TransformQvvs {
    &self.0
  }

  fn transform_mut(&mut self) -> &mut TransformQvvs {
    &mut self.0
  }
}

impl QvvsComponent for Global {
  fn from_transform(transform: TransformQvvs) -> Self {
    Self(transform)
  }

  fn transform(&self) -> &TransformQvvs {
    &self.0
  }

  fn transform_mut(&mut self) -> &mut TransformQvvs {
    &mut self.0
  }
}

struct Slot;

impl TransformSlot for Slot {
  type Local = Local;
  type World = Global;

  const NAME: &'static str = "bench";
}

/// A root with `width` children, each with `width` children of their own.
fn build(world: &mut World, width: usize) -> (Entity, Vec<Entity>) {
  let root = world.create_entity(Global(TransformQvvs::IDENTITY));
  let mut leaves = Vec::new();

  for _ in 0..width {
    let child = world
      .create_child::<Slot>(
        root,
        Global(TransformQvvs::from_position(Vec3::X)),
        AttachOptions::keep_local(),
      )
      .unwrap();
    for _ in 0..width {
      leaves.push(
        world
          .create_child::<Slot>(
            child,
            Global(TransformQvvs::from_position(Vec3::Y)),
            AttachOptions::keep_local(),
          )
          .unwrap(),
      );
    }
  }

  (root, leaves)
}

fn root_write_benchmark(c: &mut Criterion) {
  for width in [4, 32] {
    let mut world = World::new();
    let (root, _) = build(&mut world, width);
    let handle = HierarchyHandle::resolve(root, &world).unwrap();

    c.bench_function(&format!("root write {}", width * width + width + 1), |b| {
      b.iter(|| {
        arbor_hierarchy::write_one::<Slot, _>(
          &handle,
          black_box(WriteOp::WorldPositionDelta(Vec3::X)),
          &mut world,
        );
      })
    });
  }
}

fn leaf_write_benchmark(c: &mut Criterion) {
  let mut world = World::new();
  let (_, leaves) = build(&mut world, 32);
  let handles = leaves
    .iter()
    .map(|leaf| HierarchyHandle::resolve(*leaf, &world).unwrap())
    .collect::<Vec<_>>();

  c.bench_function("leaf writes 1024", |b| {
    b.iter(|| {
      for handle in &handles {
        arbor_hierarchy::write_one::<Slot, _>(
          handle,
          black_box(WriteOp::LocalPositionSet(Vec3::Z)),
          &mut world,
        );
      }
    })
  });
}

fn batch_benchmark(c: &mut Criterion) {
  let mut world = World::new();
  let (root, leaves) = build(&mut world, 32);
  let hierarchy = HierarchyRef::of_root(root, &world).unwrap();

  let mut buffer = WriteBuffer::new();
  for leaf in &leaves {
    let handle = HierarchyHandle::resolve(*leaf, &world).unwrap();
    buffer.push(handle.index(), WriteOp::LocalPositionSet(Vec3::Z));
  }
  buffer.push(0, WriteOp::WorldPositionDelta(Vec3::X));

  c.bench_function("batch 1025", |b| {
    b.iter(|| {
      arbor_hierarchy::write_and_propagate::<Slot, _>(hierarchy, black_box(&buffer), &mut world);
    })
  });
}

criterion_group!(
  benches,
  root_write_benchmark,
  leaf_write_benchmark,
  batch_benchmark
);
criterion_main!(benches);
