use arbor_ecs::Entity;
use arbor_math::{mulclean, TransformQvvs};
use log::warn;
#[cfg(feature = "debug")]
use log::trace;
use smallvec::SmallVec;

use crate::{
  access::HierarchyAccess,
  components::{HierarchyNode, NodeKind},
  handle::{HierarchyHandle, HierarchyRef},
  slot::{QvvsComponent, TransformSlot},
  write::{WriteBuffer, WriteOp},
};

/// Applies one write to `handle`'s entity and propagates the change to its subtree.
///
/// Panics if the handle went stale, i.e. its node now holds another entity.
pub fn write_one<S: TransformSlot, A: HierarchyAccess>(
  handle: &HierarchyHandle,
  op: WriteOp,
  access: &mut A,
) {
  let occupant = handle
    .hierarchy()
    .nodes(access)
    .and_then(|nodes| nodes.get(handle.index() as usize).map(|node| node.entity()));
  if let Some(occupant) = occupant {
    assert!(
      occupant == handle.entity(),
      "Stale handle for {}: node {} of hierarchy {} holds {}",
      handle.entity(),
      handle.index(),
      handle.root(),
      occupant
    );
  }

  write_and_propagate::<S, A>(
    handle.hierarchy(),
    &WriteBuffer::single(handle.index(), op),
    access,
  );
}

/// Applies `writes` in order, then brings every affected world transform up to date.
///
/// Each write sees the effects of the writes before it, also when an earlier write
/// moved one of its ancestors. Propagation runs once per topmost written node, so
/// subtrees of several written nodes are only visited once.
///
/// Writes to copy-parent nodes and dead entities are skipped. Panics on an index
/// outside of the hierarchy and on live members missing their transform components.
pub fn write_and_propagate<S: TransformSlot, A: HierarchyAccess>(
  hierarchy: HierarchyRef,
  writes: &WriteBuffer,
  access: &mut A,
) {
  if writes.is_empty() {
    return;
  }

  access.validate_root(hierarchy.root());
  let nodes = hierarchy.nodes(access).unwrap_or_else(|| {
    panic!(
      "Hierarchy of root {} has no {:?} node buffer",
      hierarchy.root(),
      hierarchy.buffer()
    )
  });

  let mut dirty = vec![false; nodes.len()];

  for write in writes.iter() {
    let index = write.index as usize;
    let node = nodes.get(index).unwrap_or_else(|| {
      panic!(
        "Write to node {} of hierarchy {} with only {} nodes",
        index,
        hierarchy.root(),
        nodes.len()
      )
    });

    if node.kind() == NodeKind::CopyParent {
      #[cfg(feature = "debug")]
      trace!("Skipping write to copy-parent node {}", node.entity());
      continue;
    }
    if !access.exists(node.entity()) {
      warn!("Skipping write to dead entity {}", node.entity());
      continue;
    }

    let parent_world = match node.parent() {
      Some(parent) => match current_world::<S, A>(&nodes, parent as usize, &dirty, access) {
        Some(world) => world,
        None => {
          warn!(
            "Skipping write to {}, an ancestor no longer exists",
            node.entity()
          );
          continue;
        }
      },
      None => TransformQvvs::IDENTITY,
    };

    let mut local = read_local::<S, A>(node, access);
    let mut world = read_world::<S, A>(node.entity(), access);

    #[cfg(feature = "debug")]
    trace!("Applying {:?} to {}", write.op, node.entity());

    write.op.apply(&parent_world, &mut local, &mut world);
    store::<S, A>(node, local, world, access);
    dirty[index] = true;
  }

  // dirty nodes below another dirty node are covered by its subtree
  let mut index = 0;
  while index < nodes.len() {
    if dirty[index] {
      propagate_subtree::<S, A>(&nodes, index, access);
      index = nodes[index].subtree_end(index as u32) as usize;
    } else {
      index += 1;
    }
  }
}

/// Recomputes every world transform of the hierarchy from the root's world transform.
pub fn propagate_all<S: TransformSlot, A: HierarchyAccess>(
  hierarchy: HierarchyRef,
  access: &mut A,
) {
  let Some(nodes) = hierarchy.nodes(access) else {
    warn!(
      "Cannot propagate hierarchy of {}, it has no node buffer",
      hierarchy.root()
    );
    return;
  };

  if !nodes.is_empty() && access.exists(hierarchy.root()) {
    propagate_subtree::<S, A>(&nodes, 0, access);
  }
}

/// World transforms of every node below `start` from the stored world of `start`.
fn propagate_subtree<S: TransformSlot, A: HierarchyAccess>(
  nodes: &[HierarchyNode],
  start: usize,
  access: &mut A,
) {
  let end = nodes[start].subtree_end(start as u32) as usize;
  let mut worlds = Vec::with_capacity(end - start);
  worlds.push(read_world::<S, A>(nodes[start].entity(), access));

  #[cfg(feature = "debug")]
  trace!(
    "Propagating {} nodes below {}",
    end - start - 1,
    nodes[start].entity()
  );

  let mut skip_until = start;
  for (index, node) in nodes.iter().enumerate().take(end).skip(start + 1) {
    if index < skip_until {
      worlds.push(TransformQvvs::IDENTITY);
      continue;
    }
    if !access.exists(node.entity()) {
      warn!("Skipping subtree of dead entity {}", node.entity());
      skip_until = node.subtree_end(index as u32) as usize;
      worlds.push(TransformQvvs::IDENTITY);
      continue;
    }

    // parents come before their children and the subtree is contiguous
    let parent = node.parent().map_or(start, |parent| parent as usize);
    let parent_world = worlds[parent - start];
    let world = match node.kind() {
      NodeKind::CopyParent => parent_world,
      NodeKind::Normal => mulclean(&parent_world, &read_local::<S, A>(node, access)),
    };

    write_world::<S, A>(node.entity(), world, access);
    worlds.push(world);
  }
}

/// Up to date world transform of `index`, even if an ancestor was written but not yet
/// propagated. `None` if a node between the written ancestor and `index` is dead.
fn current_world<S: TransformSlot, A: HierarchyAccess>(
  nodes: &[HierarchyNode],
  index: usize,
  dirty: &[bool],
  access: &A,
) -> Option<TransformQvvs> {
  let mut chain: SmallVec<[usize; 16]> = SmallVec::new();
  let mut topmost_dirty = None;

  let mut current = Some(index);
  while let Some(i) = current {
    if dirty[i] {
      topmost_dirty = Some(chain.len());
    }
    chain.push(i);
    current = nodes[i].parent().map(|parent| parent as usize);
  }

  let Some(top) = topmost_dirty else {
    if !access.exists(nodes[index].entity()) {
      return None;
    }
    return Some(read_world::<S, A>(nodes[index].entity(), access));
  };

  // chain runs from `index` up to the root, walk it back down from the dirty node
  let mut world = read_world::<S, A>(nodes[chain[top]].entity(), access);
  for &i in chain[..top].iter().rev() {
    let node = &nodes[i];
    if !access.exists(node.entity()) {
      return None;
    }
    if node.kind() == NodeKind::Normal {
      world = mulclean(&world, &read_local::<S, A>(node, access));
    }
  }

  Some(world)
}

fn read_world<S: TransformSlot, A: HierarchyAccess>(
  entity: Entity,
  access: &A,
) -> TransformQvvs {
  match access.get::<S::World>(entity) {
    Some(comp) => *comp.transform(),
    None => panic!(
      "Entity {} has no world transform in slot {}",
      entity,
      S::NAME
    ),
  }
}

/// Roots use their world transform as local transform.
fn read_local<S: TransformSlot, A: HierarchyAccess>(
  node: &HierarchyNode,
  access: &A,
) -> TransformQvvs {
  if node.parent().is_none() {
    return read_world::<S, A>(node.entity(), access);
  }

  match access.get::<S::Local>(node.entity()) {
    Some(comp) => *comp.transform(),
    None => panic!(
      "Entity {} has no local transform in slot {}",
      node.entity(),
      S::NAME
    ),
  }
}

fn write_world<S: TransformSlot, A: HierarchyAccess>(
  entity: Entity,
  world: TransformQvvs,
  access: &mut A,
) {
  match access.get_mut::<S::World>(entity) {
    Some(comp) => *comp.transform_mut() = world,
    None => panic!(
      "Entity {} has no world transform in slot {}",
      entity,
      S::NAME
    ),
  }
}

fn store<S: TransformSlot, A: HierarchyAccess>(
  node: &HierarchyNode,
  local: TransformQvvs,
  world: TransformQvvs,
  access: &mut A,
) {
  if node.parent().is_some() {
    match access.get_mut::<S::Local>(node.entity()) {
      Some(comp) => *comp.transform_mut() = local,
      None => panic!(
        "Entity {} has no local transform in slot {}",
        node.entity(),
        S::NAME
      ),
    }
  }

  write_world::<S, A>(node.entity(), world, access);
}
