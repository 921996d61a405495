use arbor_ecs::World;
use arbor_hierarchy::{AttachMode, HierarchyConfig};
use log::LevelFilter;

pub struct ArborConfig {
  pub hierarchy: HierarchyConfig,
  /// Used when `RUST_LOG` is not set.
  pub log_level: LevelFilter,
}

impl Default for ArborConfig {
  fn default() -> Self {
    Self {
      hierarchy: HierarchyConfig::default(),
      log_level: LevelFilter::Info,
    }
  }
}

impl ArborConfig {
  pub fn set_hierarchy_config(mut self, hierarchy: HierarchyConfig) -> Self {
    self.hierarchy = hierarchy;
    self
  }

  pub fn set_attach_mode(mut self, attach_mode: AttachMode) -> Self {
    self.hierarchy = self.hierarchy.set_attach_mode(attach_mode);
    self
  }

  pub fn set_log_level(mut self, log_level: LevelFilter) -> Self {
    self.log_level = log_level;
    self
  }

  /// Stores the hierarchy settings as a resource of `world`.
  pub fn apply(&self, world: &mut World) {
    world.set_resource(self.hierarchy.clone());
  }

  pub fn build_world(&self) -> World {
    let mut world = World::new();
    self.apply(&mut world);
    world
  }
}
