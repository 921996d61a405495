/// How an attached child's transform is derived.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AttachMode {
  /// The child keeps its world transform, the local transform is derived from it.
  #[default]
  KeepWorld,
  /// The child's current world transform becomes its local transform.
  KeepLocal,
}

/// Hierarchy defaults, stored as a world resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HierarchyConfig {
  pub attach_mode: AttachMode,
  /// Initial node capacity of newly created hierarchies.
  pub buffer_capacity: usize,
}

impl Default for HierarchyConfig {
  fn default() -> Self {
    Self {
      attach_mode: AttachMode::KeepWorld,
      buffer_capacity: 8,
    }
  }
}

impl HierarchyConfig {
  pub fn set_attach_mode(mut self, attach_mode: AttachMode) -> Self {
    self.attach_mode = attach_mode;
    self
  }

  pub fn set_buffer_capacity(mut self, buffer_capacity: usize) -> Self {
    self.buffer_capacity = buffer_capacity;
    self
  }
}
