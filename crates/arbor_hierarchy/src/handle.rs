use std::sync::Arc;

use arbor_ecs::{ComponentRead, Entity};

use crate::components::{
  EntityInHierarchy, EntityInHierarchyCleanup, HierarchyNode, NodeKind, RootReference,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BufferKind {
  Primary,
  Cleanup,
}

/// Identifies one hierarchy by its root and the buffer its nodes live in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HierarchyRef {
  root: Entity,
  buffer: BufferKind,
}

impl HierarchyRef {
  pub fn new(root: Entity, buffer: BufferKind) -> Self {
    Self { root, buffer }
  }

  /// The hierarchy rooted at `root`, whichever buffer it currently uses.
  pub fn of_root<A: ComponentRead>(root: Entity, access: &A) -> Option<Self> {
    if access.has::<EntityInHierarchy>(root) {
      Some(Self::new(root, BufferKind::Primary))
    } else if access.has::<EntityInHierarchyCleanup>(root) {
      Some(Self::new(root, BufferKind::Cleanup))
    } else {
      None
    }
  }

  pub fn root(&self) -> Entity {
    self.root
  }

  pub fn buffer(&self) -> BufferKind {
    self.buffer
  }

  /// Snapshot of the node buffer. `None` if the root is gone or lost its buffer.
  pub fn nodes<A: ComponentRead>(&self, access: &A) -> Option<Arc<Vec<HierarchyNode>>> {
    match self.buffer {
      BufferKind::Primary => access
        .get::<EntityInHierarchy>(self.root)
        .map(|buffer| buffer.snapshot()),
      BufferKind::Cleanup => access
        .get::<EntityInHierarchyCleanup>(self.root)
        .map(|buffer| buffer.snapshot()),
    }
  }

  fn node<A: ComponentRead>(&self, index: u32, access: &A) -> Option<HierarchyNode> {
    let nodes = match self.buffer {
      BufferKind::Primary => access.get::<EntityInHierarchy>(self.root)?.nodes(),
      BufferKind::Cleanup => access.get::<EntityInHierarchyCleanup>(self.root)?.nodes(),
    };
    nodes.get(index as usize).copied()
  }
}

/// A resolved position of an entity inside a hierarchy.
///
/// Handles are cheap to copy but only valid until the next structural edit of their
/// hierarchy; resolve again afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HierarchyHandle {
  hierarchy: HierarchyRef,
  index: u32,
  kind: NodeKind,
  entity: Entity,
}

impl HierarchyHandle {
  /// Locates `entity` in its hierarchy.
  ///
  /// Returns `None` for dead entities, entities outside of any hierarchy and members
  /// whose root is gone or whose stored index no longer matches the root's buffer.
  pub fn resolve<A: ComponentRead>(entity: Entity, access: &A) -> Option<Self> {
    if !access.exists(entity) {
      return None;
    }

    let (root, index) = match access.get::<RootReference>(entity) {
      Some(reference) => (reference.root(), reference.index()),
      None => (entity, 0),
    };

    if !access.exists(root) {
      return None;
    }

    let hierarchy = HierarchyRef::of_root(root, access)?;
    let node = hierarchy.node(index, access)?;
    if node.entity() != entity {
      return None;
    }

    Some(Self {
      hierarchy,
      index,
      kind: node.kind(),
      entity,
    })
  }

  pub fn hierarchy(&self) -> HierarchyRef {
    self.hierarchy
  }

  pub fn root(&self) -> Entity {
    self.hierarchy.root
  }

  pub fn index(&self) -> u32 {
    self.index
  }

  pub fn kind(&self) -> NodeKind {
    self.kind
  }

  pub fn entity(&self) -> Entity {
    self.entity
  }

  #[inline]
  pub fn is_root(&self) -> bool {
    self.index == 0
  }

  #[inline]
  pub fn is_copy_parent(&self) -> bool {
    self.kind == NodeKind::CopyParent
  }

  /// Handle of the parent node, `None` for the root.
  pub fn parent<A: ComponentRead>(&self, access: &A) -> Option<HierarchyHandle> {
    let parent = self.hierarchy.node(self.index, access)?.parent()?;
    let node = self.hierarchy.node(parent, access)?;

    Some(Self {
      hierarchy: self.hierarchy,
      index: parent,
      kind: node.kind(),
      entity: node.entity(),
    })
  }
}
