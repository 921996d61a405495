pub mod access;
pub mod components;
pub mod config;
pub mod error;
pub mod handle;
pub mod key;
pub mod propagation;
pub mod slot;
pub mod world_ext;
pub mod write;

pub use access::{HierarchyAccess, HierarchyBrokerExt};
pub use components::{
  EntityInHierarchy, EntityInHierarchyCleanup, HierarchyNode, NodeKind, RootReference,
};
pub use config::{AttachMode, HierarchyConfig};
pub use error::HierarchyError;
pub use handle::{BufferKind, HierarchyHandle, HierarchyRef};
pub use key::{KeyedLookup, TransformsKey, TransformsLookup};
pub use propagation::{propagate_all, write_and_propagate, write_one};
pub use slot::{QvvsComponent, SlotSet, TransformSlot};
pub use world_ext::{AttachOptions, HierarchyWorldExt};
pub use write::{TransformWrite, WriteBuffer, WriteOp};
