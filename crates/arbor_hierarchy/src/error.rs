use arbor_ecs::Entity;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HierarchyError {
  #[error("Entity {0} does not exist")]
  DeadEntity(Entity),
  #[error("Entity {0} cannot be its own parent")]
  SelfParent(Entity),
  #[error("Attaching {child} to {parent} would create a cycle")]
  Cycle { parent: Entity, child: Entity },
  #[error("Entity {0} already has a parent")]
  AlreadyInHierarchy(Entity),
  #[error("Entity {0} is not part of a hierarchy")]
  NotInHierarchy(Entity),
  #[error("Entity {0} is not the root of a hierarchy")]
  NotARoot(Entity),
  #[error("Hierarchy of {0} is being torn down")]
  TearingDown(Entity),
  #[error("Root {0} was passed more than once")]
  DuplicateRoot(Entity),
}
