use std::cell::UnsafeCell;

#[cfg(feature = "debug")]
use log::trace;
use rustc_hash::FxHashMap;

use crate::{
  components::{Component, UnsafeDowncast},
  entity::Entity,
  ArchetypeId, ComponentId,
};

type Type = Vec<ComponentId>;
type ArchetypeMap = FxHashMap<ArchetypeId, ArchetypeRecord>;

/// One stored component. Shared access to the storage may hand out mutable access to a cell,
/// callers of the unchecked accessors guarantee exclusivity per cell.
pub(crate) struct ComponentCell(UnsafeCell<Box<dyn Component>>);

// components are Send + Sync, the cell only adds the unchecked mutable path
unsafe impl Sync for ComponentCell {}

impl ComponentCell {
  fn new(comp: Box<dyn Component>) -> Self {
    Self(UnsafeCell::new(comp))
  }

  #[inline]
  fn get(&self) -> &dyn Component {
    unsafe { &**self.0.get() }
  }

  #[inline]
  fn get_mut(&mut self) -> &mut Box<dyn Component> {
    self.0.get_mut()
  }

  /// # Safety
  /// no other reference to this cell may be alive
  #[inline]
  #[allow(clippy::mut_from_ref)]
  unsafe fn get_unchecked_mut(&self) -> &mut dyn Component {
    &mut **self.0.get()
  }

  fn into_inner(self) -> Box<dyn Component> {
    self.0.into_inner()
  }
}

type Row = Vec<ComponentCell>;

#[derive(Clone, Copy, Default)]
struct ArchetypeEdge {
  add: Option<ArchetypeId>,
  remove: Option<ArchetypeId>,
}

#[derive(Clone, Copy)]
struct Location {
  archetype: ArchetypeId,
  row: usize,
}

struct EntityMeta {
  generation: u32,
  location: Option<Location>,
}

struct ArchetypeRecord {
  column: usize,
}

struct Archetype {
  type_: Type,
  entities: Vec<Entity>,
  rows: Vec<Row>,
  edges: FxHashMap<ComponentId, ArchetypeEdge>,
}

impl Archetype {
  /// Removes `row` and returns the entity that was moved into its place.
  fn swap_remove(&mut self, row: usize) -> (Row, Option<Entity>) {
    self.entities.swap_remove(row);
    let removed = self.rows.swap_remove(row);
    (removed, self.entities.get(row).copied())
  }
}

/// Archetype storage: entities with the same set of components share one archetype,
/// adding or removing a component moves the entity along a cached archetype edge.
#[derive(Default)]
pub struct Storage {
  entities: Vec<EntityMeta>,
  entities_free: Vec<u32>,
  archetypes: Vec<Archetype>,
  archetype_index: FxHashMap<Type, ArchetypeId>,
  component_index: FxHashMap<ComponentId, ArchetypeMap>,
  alive: usize,
}

impl Storage {
  pub fn create_entity(&mut self, mut comps: Vec<Box<dyn Component>>) -> Entity {
    let entity = if let Some(index) = self.entities_free.pop() {
      let meta = &self.entities[index as usize];
      Entity::new(index, meta.generation)
    } else {
      let index = self.entities.len() as u32;
      self.entities.push(EntityMeta {
        generation: 0,
        location: None,
      });
      Entity::new(index, 0)
    };

    #[cfg(feature = "debug")]
    trace!("Creating Entity {}", entity);

    // last write wins for duplicate component types
    comps.reverse();
    comps.sort_by_key(|c| c.id());
    comps.dedup_by_key(|c| c.id());

    let type_ = comps.iter().map(|c| c.id()).collect::<Type>();
    let archetype_id = self.archetype_for(type_);
    let archetype = &mut self.archetypes[archetype_id];

    archetype.entities.push(entity);
    archetype
      .rows
      .push(comps.into_iter().map(ComponentCell::new).collect());

    self.entities[entity.index() as usize].location = Some(Location {
      archetype: archetype_id,
      row: archetype.rows.len() - 1,
    });
    self.alive += 1;

    entity
  }

  pub fn remove_entity(&mut self, entity: Entity) -> bool {
    let Some(location) = self.location(entity) else {
      return false;
    };

    #[cfg(feature = "debug")]
    trace!("Removing Entity {}", entity);

    let (_, swapped) = self.archetypes[location.archetype].swap_remove(location.row);
    if let Some(swapped) = swapped {
      self.set_row(swapped, location.row);
    }

    let meta = &mut self.entities[entity.index() as usize];
    meta.location = None;
    meta.generation = meta.generation.wrapping_add(1);
    self.entities_free.push(entity.index());
    self.alive -= 1;

    true
  }

  #[inline]
  pub fn exists(&self, entity: Entity) -> bool {
    self.location(entity).is_some()
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.alive
  }

  pub fn has_comp(&self, entity: Entity, comp: ComponentId) -> bool {
    self
      .location(entity)
      .is_some_and(|location| self.column(location.archetype, comp).is_some())
  }

  pub fn get_comp<C: Component>(&self, entity: Entity) -> Option<&C> {
    let cell = self.cell(entity, C::sid())?;
    Some(unsafe { cell.get().downcast_ref_unchecked() })
  }

  pub fn get_comp_mut<C: Component>(&mut self, entity: Entity) -> Option<&mut C> {
    let location = self.location(entity)?;
    let column = self.column(location.archetype, C::sid())?;
    let cell = &mut self.archetypes[location.archetype].rows[location.row][column];
    Some(unsafe { cell.get_mut().downcast_mut_unchecked() })
  }

  /// # Safety
  /// the caller guarantees that no other reference to this component of this entity is
  /// alive and that the storage is not structurally modified while the reference lives
  #[allow(clippy::mut_from_ref)]
  pub unsafe fn get_comp_unchecked_mut<C: Component>(&self, entity: Entity) -> Option<&mut C> {
    let cell = self.cell(entity, C::sid())?;
    Some(cell.get_unchecked_mut().downcast_mut_unchecked())
  }

  /// Inserts `comp`, replacing a component of the same type if the entity already has one.
  pub fn add_comp(&mut self, entity: Entity, comp: Box<dyn Component>) -> bool {
    let Some(location) = self.location(entity) else {
      return false;
    };
    let id = comp.id();

    #[cfg(feature = "debug")]
    trace!("Adding Component {} to Entity {}", comp.name(), entity);

    if let Some(column) = self.column(location.archetype, id) {
      *self.archetypes[location.archetype].rows[location.row][column].get_mut() = comp;
      return true;
    }

    let to = match self.archetypes[location.archetype]
      .edges
      .get(&id)
      .and_then(|edge| edge.add)
    {
      Some(to) => to,
      None => {
        let mut type_ = self.archetypes[location.archetype].type_.clone();
        type_.push(id);
        type_.sort_unstable();

        let to = self.archetype_for(type_);
        self.archetypes[location.archetype]
          .edges
          .entry(id)
          .or_default()
          .add = Some(to);
        self.archetypes[to].edges.entry(id).or_default().remove = Some(location.archetype);
        to
      }
    };

    let (mut row, swapped) = self.archetypes[location.archetype].swap_remove(location.row);
    if let Some(swapped) = swapped {
      self.set_row(swapped, location.row);
    }

    let column = self.archetypes[to]
      .type_
      .binary_search(&id)
      .unwrap_or_else(|_| unreachable!("archetype edge without component"));
    row.insert(column, ComponentCell::new(comp));
    self.push_row(entity, to, row);

    true
  }

  pub fn remove_comp(&mut self, entity: Entity, comp: ComponentId) -> Option<Box<dyn Component>> {
    let location = self.location(entity)?;
    let column = self.column(location.archetype, comp)?;

    #[cfg(feature = "debug")]
    trace!("Removing Component {:?} from Entity {}", comp, entity);

    let to = match self.archetypes[location.archetype]
      .edges
      .get(&comp)
      .and_then(|edge| edge.remove)
    {
      Some(to) => to,
      None => {
        let mut type_ = self.archetypes[location.archetype].type_.clone();
        type_.remove(column);

        let to = self.archetype_for(type_);
        self.archetypes[location.archetype]
          .edges
          .entry(comp)
          .or_default()
          .remove = Some(to);
        self.archetypes[to].edges.entry(comp).or_default().add = Some(location.archetype);
        to
      }
    };

    let (mut row, swapped) = self.archetypes[location.archetype].swap_remove(location.row);
    if let Some(swapped) = swapped {
      self.set_row(swapped, location.row);
    }

    let removed = row.remove(column);
    self.push_row(entity, to, row);

    Some(removed.into_inner())
  }

  fn archetype_for(&mut self, type_: Type) -> ArchetypeId {
    if let Some(id) = self.archetype_index.get(&type_) {
      return *id;
    }

    #[cfg(feature = "debug")]
    trace!("Creating Archetype {:?}", type_);

    let id = self.archetypes.len() as ArchetypeId;
    for (column, comp) in type_.iter().enumerate() {
      self
        .component_index
        .entry(*comp)
        .or_default()
        .insert(id, ArchetypeRecord { column });
    }

    self.archetypes.push(Archetype {
      type_: type_.clone(),
      entities: Vec::new(),
      rows: Vec::new(),
      edges: FxHashMap::default(),
    });
    self.archetype_index.insert(type_, id);

    id
  }

  fn push_row(&mut self, entity: Entity, archetype: ArchetypeId, row: Row) {
    let to = &mut self.archetypes[archetype];
    to.entities.push(entity);
    to.rows.push(row);
    let row = to.rows.len() - 1;

    self.entities[entity.index() as usize].location = Some(Location { archetype, row });
  }

  fn set_row(&mut self, entity: Entity, row: usize) {
    if let Some(location) = self.entities[entity.index() as usize].location.as_mut() {
      location.row = row;
    }
  }

  #[inline]
  fn location(&self, entity: Entity) -> Option<Location> {
    let meta = self.entities.get(entity.index() as usize)?;
    if meta.generation != entity.generation() {
      return None;
    }
    meta.location
  }

  #[inline]
  fn column(&self, archetype: ArchetypeId, comp: ComponentId) -> Option<usize> {
    self
      .component_index
      .get(&comp)?
      .get(&archetype)
      .map(|record| record.column)
  }

  #[inline]
  fn cell(&self, entity: Entity, comp: ComponentId) -> Option<&ComponentCell> {
    let location = self.location(entity)?;
    let column = self.column(location.archetype, comp)?;
    Some(&self.archetypes[location.archetype].rows[location.row][column])
  }
}

#[cfg(test)]
mod test {
  use super::Storage;
  use crate::{self as arbor_ecs, components::Component, entity::Entity};
  use arbor_ecs_macros::Component;

  #[derive(Component, Debug, PartialEq)]
  struct A(u32);

  #[derive(Component, Debug, PartialEq)]
  struct B(u32);

  #[test]
  fn create_entity() {
    let mut storage = Storage::default();

    let id = storage.create_entity(Vec::new());
    assert!(storage.exists(id));
    assert_eq!(storage.len(), 1);
  }

  #[test]
  fn duplicate_components_keep_last() {
    let mut storage = Storage::default();

    let id = storage.create_entity(vec![Box::new(A(1)), Box::new(B(2)), Box::new(A(3))]);
    assert_eq!(storage.get_comp::<A>(id), Some(&A(3)));
    assert_eq!(storage.get_comp::<B>(id), Some(&B(2)));
  }

  #[test]
  fn remove_entity() {
    let mut storage = Storage::default();

    let id = storage.create_entity(Vec::new());
    assert!(storage.remove_entity(id));
    assert!(!storage.exists(id));
    assert!(!storage.remove_entity(id));
    assert_eq!(storage.len(), 0);
  }

  #[test]
  fn reused_slot_is_new_generation() {
    let mut storage = Storage::default();

    let old = storage.create_entity(vec![Box::new(A(1))]);
    storage.remove_entity(old);
    let new = storage.create_entity(vec![Box::new(A(2))]);

    assert_eq!(old.index(), new.index());
    assert_ne!(old, new);
    assert!(!storage.exists(old));
    assert_eq!(storage.get_comp::<A>(old), None);
    assert_eq!(storage.get_comp::<A>(new), Some(&A(2)));
  }

  #[test]
  fn add_comp() {
    let mut storage = Storage::default();

    let id = storage.create_entity(Vec::new());
    assert!(storage.add_comp(id, Box::new(A(4))));
    assert!(storage.has_comp(id, A::sid()));
    assert_eq!(storage.get_comp::<A>(id), Some(&A(4)));
  }

  #[test]
  fn add_comp_replaces() {
    let mut storage = Storage::default();

    let id = storage.create_entity(vec![Box::new(A(1))]);
    storage.add_comp(id, Box::new(A(2)));
    assert_eq!(storage.get_comp::<A>(id), Some(&A(2)));
  }

  #[test]
  fn add_comp_dead_entity() {
    let mut storage = Storage::default();

    let id = storage.create_entity(Vec::new());
    storage.remove_entity(id);
    assert!(!storage.add_comp(id, Box::new(A(1))));
  }

  #[test]
  fn remove_comp() {
    let mut storage = Storage::default();

    let id = storage.create_entity(vec![Box::new(A(7)), Box::new(B(8))]);
    let removed = storage.remove_comp(id, A::sid()).unwrap();
    assert_eq!(removed.id(), A::sid());
    assert!(!storage.has_comp(id, A::sid()));
    assert_eq!(storage.get_comp::<B>(id), Some(&B(8)));
    assert!(storage.remove_comp(id, A::sid()).is_none());
  }

  #[test]
  fn swapped_rows_stay_addressable() {
    let mut storage = Storage::default();

    let ids = (0..4)
      .map(|i| storage.create_entity(vec![Box::new(A(i))]))
      .collect::<Vec<Entity>>();

    storage.add_comp(ids[0], Box::new(B(0)));
    storage.remove_entity(ids[1]);

    assert_eq!(storage.get_comp::<A>(ids[0]), Some(&A(0)));
    assert_eq!(storage.get_comp::<A>(ids[2]), Some(&A(2)));
    assert_eq!(storage.get_comp::<A>(ids[3]), Some(&A(3)));
  }

  #[test]
  fn get_comp_mut() {
    let mut storage = Storage::default();

    let id = storage.create_entity(vec![Box::new(A(1))]);
    storage.get_comp_mut::<A>(id).unwrap().0 = 5;
    assert_eq!(storage.get_comp::<A>(id), Some(&A(5)));
    assert!(storage.get_comp_mut::<B>(id).is_none());
  }
}
