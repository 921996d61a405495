use arbor_ecs_macros::Component;

use crate::{
  self as arbor_ecs,
  access::{ComponentRead, ComponentWrite},
  world::World,
  Entity,
};

#[derive(Component, Debug, PartialEq)]
struct Position(f32, f32);

#[derive(Component, Debug, PartialEq)]
struct Velocity(f32, f32);

#[derive(Component, Debug, PartialEq)]
struct Name(&'static str);

fn setup() -> (World, Vec<Entity>) {
  let mut world = World::new();
  let mut ids = Vec::new();

  for i in 0..100 {
    ids.push(world.create_entity((Position(i as f32, 0.0), Velocity(1.0, 2.0))));
    ids.push(world.create_entity(Position(0.0, i as f32)));
    ids.push(world.create_entity(Name("static")));
  }

  (world, ids)
}

#[test]
fn create_and_count() {
  let (world, ids) = setup();

  assert_eq!(world.entity_count(), 300);
  assert_eq!(
    ids.iter().filter(|id| world.has_comp::<Position>(**id)).count(),
    200
  );
  assert_eq!(
    ids.iter().filter(|id| world.has_comp::<Velocity>(**id)).count(),
    100
  );
}

#[test]
fn integrate_through_write_access() {
  fn step<A: ComponentWrite>(access: &mut A, ids: &[Entity]) {
    for id in ids {
      let Some(velocity) = access.get::<Velocity>(*id).map(|v| (v.0, v.1)) else {
        continue;
      };
      let position = access.get_mut::<Position>(*id).unwrap();
      position.0 += velocity.0;
      position.1 += velocity.1;
    }
  }

  let (mut world, ids) = setup();
  step(&mut world, &ids);

  assert_eq!(world.get_comp::<Position>(ids[0]), Some(&Position(1.0, 2.0)));
  assert_eq!(world.get_comp::<Position>(ids[1]), Some(&Position(0.0, 0.0)));
}

#[test]
fn component_churn() {
  let (mut world, ids) = setup();

  for id in ids.iter().step_by(3) {
    let velocity = world.remove_comp::<Velocity>(*id).unwrap();
    assert_eq!(velocity, Velocity(1.0, 2.0));
    world.add_comp(*id, Name("moved"));
  }

  for (i, id) in ids.iter().step_by(3).enumerate() {
    assert_eq!(world.get_comp::<Position>(*id), Some(&Position(i as f32, 0.0)));
    assert_eq!(world.get_comp::<Name>(*id), Some(&Name("moved")));
    assert!(!world.has_comp::<Velocity>(*id));
  }
}

#[test]
fn stale_entities() {
  let (mut world, ids) = setup();

  for id in ids.iter().skip(1).step_by(3) {
    assert!(world.remove_entity(*id));
  }

  let fresh = world.create_entity(Position(9.0, 9.0));

  for id in ids.iter().skip(1).step_by(3) {
    assert!(!world.exists(*id));
    assert!(!ComponentRead::exists(&world, *id));
    assert_eq!(world.get_comp::<Position>(*id), None);
    assert!(!world.add_comp(*id, Name("ghost")));
  }

  assert!(world.exists(fresh));
  assert_eq!(world.entity_count(), 201);
}
