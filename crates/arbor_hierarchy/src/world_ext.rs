use std::sync::Arc;

use arbor_ecs::{entity::IntoEntity, Entity, World};
use log::debug;
#[cfg(feature = "debug")]
use log::trace;

use crate::{
  components::{
    EntityInHierarchy, EntityInHierarchyCleanup, HierarchyNode, NodeKind, RootReference,
  },
  config::{AttachMode, HierarchyConfig},
  error::HierarchyError,
  handle::{BufferKind, HierarchyHandle, HierarchyRef},
  slot::SlotSet,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttachOptions {
  /// Falls back to [`HierarchyConfig::attach_mode`].
  pub mode: Option<AttachMode>,
  pub kind: NodeKind,
}

impl AttachOptions {
  pub fn keep_world() -> Self {
    Self::default().with_mode(AttachMode::KeepWorld)
  }

  pub fn keep_local() -> Self {
    Self::default().with_mode(AttachMode::KeepLocal)
  }

  pub fn copy_parent() -> Self {
    Self::default().with_kind(NodeKind::CopyParent)
  }

  pub fn with_mode(mut self, mode: AttachMode) -> Self {
    self.mode = Some(mode);
    self
  }

  pub fn with_kind(mut self, kind: NodeKind) -> Self {
    self.kind = kind;
    self
  }
}

/// Structural edits of hierarchies.
///
/// Every edit rebuilds the affected node buffer and root references and recomputes
/// world transforms for the slots in `S`. Handles resolved before an edit are stale
/// afterwards.
pub trait HierarchyWorldExt {
  fn add_child<S: SlotSet>(
    &mut self,
    parent: Entity,
    child: Entity,
    options: AttachOptions,
  ) -> Result<HierarchyHandle, HierarchyError>;
  fn create_child<S: SlotSet>(
    &mut self,
    parent: Entity,
    child: impl IntoEntity,
    options: AttachOptions,
  ) -> Result<Entity, HierarchyError>;
  /// Moves `entity` with its subtree below `new_parent`.
  fn set_parent<S: SlotSet>(
    &mut self,
    entity: Entity,
    new_parent: Entity,
    options: AttachOptions,
  ) -> Result<HierarchyHandle, HierarchyError>;
  /// Makes `entity` the root of its subtree, or a free entity if it has no children.
  fn detach<S: SlotSet>(&mut self, entity: Entity) -> Result<(), HierarchyError>;
  /// Removes all descendants of `entity` from the world. Returns how many were removed.
  fn remove_children(&mut self, entity: Entity) -> Result<usize, HierarchyError>;
  fn remove_entity_with_children(&mut self, entity: Entity) -> Result<usize, HierarchyError>;
  /// Moves the node buffer of `root` into its cleanup buffer.
  fn begin_teardown(&mut self, root: Entity) -> Result<(), HierarchyError>;
  /// Releases every member of a hierarchy in teardown. Returns how many were released.
  fn finish_teardown<S: SlotSet>(&mut self, root: Entity) -> Result<usize, HierarchyError>;
  fn parent_of(&self, entity: Entity) -> Option<Entity>;
  fn children_of(&self, entity: Entity) -> Vec<Entity>;
}

impl HierarchyWorldExt for World {
  fn add_child<S: SlotSet>(
    &mut self,
    parent: Entity,
    child: Entity,
    options: AttachOptions,
  ) -> Result<HierarchyHandle, HierarchyError> {
    check_alive(self, parent)?;
    check_alive(self, child)?;
    if parent == child {
      return Err(HierarchyError::SelfParent(child));
    }

    match locate(self, child)? {
      Some(handle) if !handle.is_root() => {
        return Err(HierarchyError::AlreadyInHierarchy(child));
      }
      Some(_) => {}
      None => {
        // left behind by a root that was removed without its children
        self.remove_comp::<RootReference>(child);
      }
    }

    let parent_handle = locate(self, parent)?;
    if parent_handle.is_some_and(|handle| handle.root() == child) {
      return Err(HierarchyError::Cycle { parent, child });
    }

    let config = self
      .get_resource::<HierarchyConfig>()
      .cloned()
      .unwrap_or_default();
    let mode = options.mode.unwrap_or(config.attach_mode);

    let mut subtree = match self.remove_comp::<EntityInHierarchy>(child) {
      Some(buffer) => Arc::unwrap_or_clone(buffer.nodes),
      None => vec![HierarchyNode::root(child)],
    };
    subtree[0].kind = options.kind;

    let (root, parent_index) = match parent_handle {
      Some(handle) => (handle.root(), handle.index()),
      None => {
        self.remove_comp::<RootReference>(parent);
        let mut nodes = Vec::with_capacity(config.buffer_capacity.max(2));
        nodes.push(HierarchyNode::root(parent));
        self.add_comp(parent, EntityInHierarchy::from_nodes(nodes));
        (parent, 0)
      }
    };

    debug!(
      "Attaching {} ({} nodes) to {} in hierarchy of {}",
      child,
      subtree.len(),
      parent,
      root
    );

    S::attach(self, child, parent, options.kind, mode);

    let insert_at = {
      let buffer = self
        .get_comp_mut::<EntityInHierarchy>(root)
        .ok_or(HierarchyError::NotARoot(root))?;
      insert_subtree(buffer.nodes_mut(), parent_index, subtree)
    };
    update_references(self, root, insert_at);
    S::propagate(self, HierarchyRef::new(root, BufferKind::Primary));

    HierarchyHandle::resolve(child, self).ok_or(HierarchyError::NotInHierarchy(child))
  }

  fn create_child<S: SlotSet>(
    &mut self,
    parent: Entity,
    child: impl IntoEntity,
    options: AttachOptions,
  ) -> Result<Entity, HierarchyError> {
    check_alive(self, parent)?;

    let id = self.create_entity(child);
    if let Err(err) = self.add_child::<S>(parent, id, options) {
      self.remove_entity(id);
      return Err(err);
    }

    Ok(id)
  }

  fn set_parent<S: SlotSet>(
    &mut self,
    entity: Entity,
    new_parent: Entity,
    options: AttachOptions,
  ) -> Result<HierarchyHandle, HierarchyError> {
    check_alive(self, entity)?;
    check_alive(self, new_parent)?;
    if entity == new_parent {
      return Err(HierarchyError::SelfParent(entity));
    }

    if let Some(handle) = locate(self, entity)? {
      if let Some(parent_handle) = locate(self, new_parent)? {
        let subtree = subtree_of(self, &handle);
        if parent_handle.root() == handle.root() && subtree.contains(&parent_handle.index()) {
          return Err(HierarchyError::Cycle {
            parent: new_parent,
            child: entity,
          });
        }
      }

      if !handle.is_root() {
        self.detach::<S>(entity)?;
      }
    }

    self.add_child::<S>(new_parent, entity, options)
  }

  fn detach<S: SlotSet>(&mut self, entity: Entity) -> Result<(), HierarchyError> {
    check_alive(self, entity)?;
    let handle = locate(self, entity)?.ok_or(HierarchyError::NotInHierarchy(entity))?;
    if handle.is_root() {
      return Ok(());
    }

    let removed = split_off(self, &handle)?;

    #[cfg(feature = "debug")]
    trace!("Detached {} with {} nodes", entity, removed.len());

    self.remove_comp::<RootReference>(entity);
    S::release(self, entity);

    if removed.len() > 1 {
      self.add_comp(entity, EntityInHierarchy::from_nodes(removed));
      update_references(self, entity, 1);
    }

    Ok(())
  }

  fn remove_children(&mut self, entity: Entity) -> Result<usize, HierarchyError> {
    check_alive(self, entity)?;
    let Some(handle) = locate(self, entity)? else {
      return Ok(0);
    };

    let root = handle.root();
    let index = handle.index() as usize;
    let (removed, remaining) = {
      let buffer = self
        .get_comp_mut::<EntityInHierarchy>(root)
        .ok_or(HierarchyError::NotARoot(root))?;
      let nodes = buffer.nodes_mut();

      let mut removed = Vec::new();
      while nodes[index].descendants > 0 {
        removed.extend(remove_subtree(nodes, index as u32 + 1));
      }
      (removed, nodes.len())
    };

    update_references(self, root, index + 1);
    if remaining == 1 {
      self.remove_comp::<EntityInHierarchy>(root);
    }

    Ok(remove_all(self, &removed))
  }

  fn remove_entity_with_children(&mut self, entity: Entity) -> Result<usize, HierarchyError> {
    check_alive(self, entity)?;

    let Some(handle) = HierarchyHandle::resolve(entity, self) else {
      self.remove_entity(entity);
      return Ok(1);
    };

    if handle.is_root() {
      let nodes = match handle.hierarchy().buffer() {
        BufferKind::Primary => self
          .remove_comp::<EntityInHierarchy>(entity)
          .map(|buffer| buffer.nodes),
        BufferKind::Cleanup => self
          .remove_comp::<EntityInHierarchyCleanup>(entity)
          .map(|buffer| buffer.nodes),
      };
      let nodes = nodes.ok_or(HierarchyError::NotARoot(entity))?;
      return Ok(remove_all(self, &nodes));
    }

    if handle.hierarchy().buffer() == BufferKind::Cleanup {
      return Err(HierarchyError::TearingDown(handle.root()));
    }

    let removed = split_off(self, &handle)?;
    Ok(remove_all(self, &removed))
  }

  fn begin_teardown(&mut self, root: Entity) -> Result<(), HierarchyError> {
    check_alive(self, root)?;
    let buffer = self
      .remove_comp::<EntityInHierarchy>(root)
      .ok_or(HierarchyError::NotARoot(root))?;

    debug!("Tearing down hierarchy of {} with {} nodes", root, buffer.len());

    self.add_comp(root, EntityInHierarchyCleanup { nodes: buffer.nodes });
    Ok(())
  }

  fn finish_teardown<S: SlotSet>(&mut self, root: Entity) -> Result<usize, HierarchyError> {
    let buffer = self
      .remove_comp::<EntityInHierarchyCleanup>(root)
      .ok_or(HierarchyError::NotARoot(root))?;

    let mut released = 0;
    for node in buffer.nodes().iter().skip(1) {
      if self.remove_comp::<RootReference>(node.entity()).is_some() {
        S::release(self, node.entity());
        released += 1;
      }
    }

    debug!("Released {} members of hierarchy {}", released, root);
    Ok(released)
  }

  fn parent_of(&self, entity: Entity) -> Option<Entity> {
    HierarchyHandle::resolve(entity, self)?
      .parent(self)
      .map(|parent| parent.entity())
  }

  fn children_of(&self, entity: Entity) -> Vec<Entity> {
    let Some(handle) = HierarchyHandle::resolve(entity, self) else {
      return Vec::new();
    };
    let Some(nodes) = handle.hierarchy().nodes(self) else {
      return Vec::new();
    };

    let mut children = Vec::new();
    let end = nodes[handle.index() as usize].subtree_end(handle.index());
    let mut index = handle.index() + 1;
    while index < end {
      let node = &nodes[index as usize];
      children.push(node.entity());
      index = node.subtree_end(index);
    }
    children
  }
}

fn check_alive(world: &World, entity: Entity) -> Result<(), HierarchyError> {
  if world.exists(entity) {
    Ok(())
  } else {
    Err(HierarchyError::DeadEntity(entity))
  }
}

/// Like [`HierarchyHandle::resolve`], but hierarchies in teardown cannot be edited.
fn locate(world: &World, entity: Entity) -> Result<Option<HierarchyHandle>, HierarchyError> {
  match HierarchyHandle::resolve(entity, world) {
    Some(handle) if handle.hierarchy().buffer() == BufferKind::Cleanup => {
      Err(HierarchyError::TearingDown(handle.root()))
    }
    handle => Ok(handle),
  }
}

fn subtree_of(world: &World, handle: &HierarchyHandle) -> std::ops::Range<u32> {
  let end = handle
    .hierarchy()
    .nodes(world)
    .and_then(|nodes| nodes.get(handle.index() as usize).copied())
    .map_or(handle.index() + 1, |node| node.subtree_end(handle.index()));
  handle.index()..end
}

/// Removes the subtree of a non-root node from its hierarchy and returns it re-rooted.
fn split_off(
  world: &mut World,
  handle: &HierarchyHandle,
) -> Result<Vec<HierarchyNode>, HierarchyError> {
  let root = handle.root();
  let (removed, remaining) = {
    let buffer = world
      .get_comp_mut::<EntityInHierarchy>(root)
      .ok_or(HierarchyError::NotARoot(root))?;
    let removed = remove_subtree(buffer.nodes_mut(), handle.index());
    (removed, buffer.len())
  };

  update_references(world, root, handle.index() as usize);
  if remaining == 1 {
    world.remove_comp::<EntityInHierarchy>(root);
  }

  Ok(removed)
}

/// Inserts `subtree` as last child of `parent`. Returns the index of the subtree's root.
fn insert_subtree(
  nodes: &mut Vec<HierarchyNode>,
  parent: u32,
  subtree: Vec<HierarchyNode>,
) -> usize {
  let len = subtree.len() as u32;
  let insert_at = nodes[parent as usize].subtree_end(parent);

  for node in nodes[insert_at as usize..].iter_mut() {
    if let Some(index) = node.parent.as_mut() {
      if *index >= insert_at {
        *index += len;
      }
    }
  }

  let mut current = Some(parent);
  while let Some(index) = current {
    let node = &mut nodes[index as usize];
    node.descendants += len;
    current = node.parent;
  }

  let subtree = subtree.into_iter().map(|mut node| {
    node.parent = Some(node.parent.map_or(parent, |index| index + insert_at));
    node
  });
  nodes.splice(insert_at as usize..insert_at as usize, subtree);

  insert_at as usize
}

/// Removes the subtree at `index` (never the root) and returns it as a standalone hierarchy.
fn remove_subtree(nodes: &mut Vec<HierarchyNode>, index: u32) -> Vec<HierarchyNode> {
  let start = index as usize;
  let len = nodes[start].descendants + 1;
  let end = start + len as usize;

  let mut current = nodes[start].parent;
  while let Some(ancestor) = current {
    let node = &mut nodes[ancestor as usize];
    node.descendants -= len;
    current = node.parent;
  }

  let mut removed = nodes.drain(start..end).collect::<Vec<_>>();
  for node in nodes[start..].iter_mut() {
    if let Some(parent) = node.parent.as_mut() {
      if *parent >= end as u32 {
        *parent -= len;
      }
    }
  }

  removed[0].parent = None;
  removed[0].kind = NodeKind::Normal;
  for node in removed[1..].iter_mut() {
    node.parent = node.parent.map(|parent| parent - index);
  }

  removed
}

/// Rewrites the root references of every node from `from` on.
fn update_references(world: &mut World, root: Entity, from: usize) {
  let Some(nodes) = world
    .get_comp::<EntityInHierarchy>(root)
    .map(|buffer| buffer.snapshot())
  else {
    return;
  };

  for (index, node) in nodes.iter().enumerate().skip(from.max(1)) {
    world.add_comp(
      node.entity(),
      RootReference {
        root,
        index: index as u32,
      },
    );
  }
}

fn remove_all(world: &mut World, nodes: &[HierarchyNode]) -> usize {
  nodes
    .iter()
    .filter(|node| world.remove_entity(node.entity()))
    .count()
}
