use arbor_ecs::{all_tuples, components::Component, Entity, World};
use arbor_math::{inversemulqvvsclean, TransformQvvs};

#[cfg(feature = "debug")]
use log::trace;

use crate::{
  components::NodeKind, config::AttachMode, handle::HierarchyRef, propagation::propagate_all,
};

/// A component wrapping a single [`TransformQvvs`].
pub trait QvvsComponent: Component + Sized {
  fn from_transform(transform: TransformQvvs) -> Self;
  fn transform(&self) -> &TransformQvvs;
  fn transform_mut(&mut self) -> &mut TransformQvvs;
}

/// Selects the pair of components a write goes through.
///
/// Every slot has its own local and world transform components, a write through one
/// slot never touches the components of another.
pub trait TransformSlot: 'static {
  /// Parent relative transform of non-root members.
  type Local: QvvsComponent;
  /// Absolute transform of every entity taking part in the slot.
  type World: QvvsComponent;

  const NAME: &'static str;
}

/// One or more slots whose components are kept in sync by structural edits.
pub trait SlotSet {
  /// Gives `entity` the components of a child of `parent`.
  fn attach(world: &mut World, entity: Entity, parent: Entity, kind: NodeKind, mode: AttachMode);
  /// Turns `entity` into a root or a free entity, keeping its world transform.
  fn release(world: &mut World, entity: Entity);
  /// Recomputes every world transform below `hierarchy`'s root.
  fn propagate(world: &mut World, hierarchy: HierarchyRef);
}

impl<S: TransformSlot> SlotSet for S {
  fn attach(world: &mut World, entity: Entity, parent: Entity, kind: NodeKind, mode: AttachMode) {
    let parent_world = match world.get_comp::<S::World>(parent) {
      Some(comp) => *comp.transform(),
      None => {
        world.add_comp(parent, S::World::from_transform(TransformQvvs::IDENTITY));
        TransformQvvs::IDENTITY
      }
    };
    let current = world
      .get_comp::<S::World>(entity)
      .map(|comp| *comp.transform())
      .unwrap_or_default();

    #[cfg(feature = "debug")]
    trace!(
      "Attaching {} to {} in slot {} as {:?}",
      entity,
      parent,
      S::NAME,
      kind
    );

    match kind {
      NodeKind::CopyParent => {
        world.remove_comp::<S::Local>(entity);
        world.add_comp(entity, S::World::from_transform(parent_world));
      }
      NodeKind::Normal => {
        let local = match mode {
          AttachMode::KeepWorld => inversemulqvvsclean(&parent_world, &current),
          AttachMode::KeepLocal => current,
        };

        world.add_comp(entity, S::Local::from_transform(local));
        if !world.has_comp::<S::World>(entity) {
          world.add_comp(entity, S::World::from_transform(current));
        }
      }
    }
  }

  fn release(world: &mut World, entity: Entity) {
    world.remove_comp::<S::Local>(entity);
  }

  fn propagate(world: &mut World, hierarchy: HierarchyRef) {
    propagate_all::<S, _>(hierarchy, world);
  }
}

macro_rules! impl_slot_set {
  ($($params:ident),*) => {
    impl<$($params: SlotSet),*> SlotSet for ($($params,)*) {
      fn attach(
        world: &mut World,
        entity: Entity,
        parent: Entity,
        kind: NodeKind,
        mode: AttachMode,
      ) {
        $($params::attach(world, entity, parent, kind, mode);)*
      }

      fn release(world: &mut World, entity: Entity) {
        $($params::release(world, entity);)*
      }

      fn propagate(world: &mut World, hierarchy: HierarchyRef) {
        $($params::propagate(world, hierarchy);)*
      }
    }
  };
}

all_tuples!(impl_slot_set, 1, 4, S);
