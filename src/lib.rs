pub mod config;

pub use arbor_components as components;
pub use arbor_ecs as ecs;
pub use arbor_hierarchy as hierarchy;
pub use arbor_math as math;
pub use glam;
pub use log;

pub use config::ArborConfig;

/// Installs the global logger, `RUST_LOG` takes precedence over `level`.
///
/// Returns false if a logger was already installed.
pub fn init_logger(level: log::LevelFilter) -> bool {
  env_logger::Builder::new()
    .filter_level(level)
    .parse_default_env()
    .try_init()
    .is_ok()
}

pub mod prelude {
  pub use arbor_components::{
    transforms_broker, AllSlots, Immediate, LocalTransform, Ticked, TickedLocalTransform,
    TickedWorldTransform, TransformWriter, TransformsExt, WorldTransform,
  };
  pub use arbor_ecs::{Component, Entity, World};
  pub use arbor_hierarchy::{
    AttachMode, AttachOptions, HierarchyError, HierarchyHandle, HierarchyWorldExt, NodeKind,
    TransformsLookup, WriteBuffer, WriteOp,
  };
  pub use arbor_math::{Quat, TransformQvvs, Vec3};

  pub use crate::ArborConfig;
}
