use std::sync::Arc;

use arbor_ecs::{Component, Entity};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NodeKind {
  /// World transform is `parent world * local`.
  #[default]
  Normal,
  /// World transform is the parent's world transform. Has no local transform.
  CopyParent,
}

/// One entry of a flattened hierarchy.
///
/// Nodes are stored depth first in pre-order, so the subtree of the node at `i` is the
/// contiguous range `i..=i + descendants`. The root is always at index 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HierarchyNode {
  pub(crate) entity: Entity,
  pub(crate) parent: Option<u32>,
  pub(crate) descendants: u32,
  pub(crate) kind: NodeKind,
}

impl HierarchyNode {
  pub(crate) fn root(entity: Entity) -> Self {
    Self {
      entity,
      parent: None,
      descendants: 0,
      kind: NodeKind::Normal,
    }
  }

  pub fn entity(&self) -> Entity {
    self.entity
  }

  pub fn parent(&self) -> Option<u32> {
    self.parent
  }

  pub fn descendants(&self) -> u32 {
    self.descendants
  }

  pub fn kind(&self) -> NodeKind {
    self.kind
  }

  /// Index one past the last node of this node's subtree.
  #[inline]
  pub fn subtree_end(&self, index: u32) -> u32 {
    index + self.descendants + 1
  }
}

/// Owned by every member of a hierarchy except its root.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RootReference {
  pub(crate) root: Entity,
  pub(crate) index: u32,
}

impl RootReference {
  pub fn root(&self) -> Entity {
    self.root
  }

  pub fn index(&self) -> u32 {
    self.index
  }
}

/// Node buffer of a live hierarchy, owned by its root.
///
/// Structural edits are copy on write, so a cloned snapshot stays valid while
/// transforms are written through the same world access.
#[derive(Component, Clone, Debug)]
pub struct EntityInHierarchy {
  pub(crate) nodes: Arc<Vec<HierarchyNode>>,
}

/// Node buffer of a hierarchy that is being torn down.
///
/// Resolution and propagation treat it like [`EntityInHierarchy`].
#[derive(Component, Clone, Debug)]
pub struct EntityInHierarchyCleanup {
  pub(crate) nodes: Arc<Vec<HierarchyNode>>,
}

macro_rules! impl_node_buffer {
  ($buffer:ty) => {
    impl $buffer {
      pub(crate) fn from_nodes(nodes: Vec<HierarchyNode>) -> Self {
        Self {
          nodes: Arc::new(nodes),
        }
      }

      pub fn nodes(&self) -> &[HierarchyNode] {
        &self.nodes
      }

      pub fn len(&self) -> usize {
        self.nodes.len()
      }

      pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
      }

      pub fn snapshot(&self) -> Arc<Vec<HierarchyNode>> {
        self.nodes.clone()
      }

      pub(crate) fn nodes_mut(&mut self) -> &mut Vec<HierarchyNode> {
        Arc::make_mut(&mut self.nodes)
      }
    }
  };
}

impl_node_buffer!(EntityInHierarchy);
impl_node_buffer!(EntityInHierarchyCleanup);
