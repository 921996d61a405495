use std::any::TypeId;

pub mod access;
pub mod broker;
pub mod components;
pub mod entity;
pub mod lookup;
pub mod meta;
pub(crate) mod storage;
pub mod world;

pub use access::{ComponentRead, ComponentWrite};
pub use arbor_ecs_macros::{all_tuples, Component};
pub use entity::Entity;
pub use world::World;

pub type ComponentId = TypeId;
type ArchetypeId = usize;

#[cfg(test)]
mod test;
