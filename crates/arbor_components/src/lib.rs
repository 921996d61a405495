use arbor_ecs::broker::{ComponentBroker, ComponentBrokerBuilder};
use arbor_hierarchy::HierarchyBrokerExt;

pub mod slots;
pub mod transform;
pub mod writer;

pub use slots::{AllSlots, Immediate, Ticked};
pub use transform::{LocalTransform, TickedLocalTransform, TickedWorldTransform, WorldTransform};
pub use writer::{TransformWriter, TransformsExt};

/// Broker declarations for transform writes through both slots.
pub fn transforms_broker() -> ComponentBrokerBuilder {
  ComponentBroker::builder()
    .hierarchy()
    .slot::<Immediate>()
    .slot::<Ticked>()
}
