use std::f32::consts::FRAC_PI_2;

use arbor::{init_logger, prelude::*};
use log::info;

fn spawn(world: &mut World, position: Vec3) -> Entity {
  let transform = TransformQvvs::from_position(position);
  world.create_entity((
    WorldTransform::new(transform),
    TickedWorldTransform::new(transform),
  ))
}

fn main() -> anyhow::Result<()> {
  let config = ArborConfig::default();
  init_logger(config.log_level);

  let mut world = config.build_world();

  // arm with a hand and a marker following the hand
  let body = spawn(&mut world, Vec3::ZERO);
  let arm = spawn(&mut world, Vec3::new(1.0, 0.0, 0.0));
  let hand = spawn(&mut world, Vec3::new(2.0, 0.0, 0.0));
  let marker = spawn(&mut world, Vec3::ZERO);

  world.add_child::<AllSlots>(body, arm, AttachOptions::keep_world())?;
  world.add_child::<AllSlots>(arm, hand, AttachOptions::keep_world())?;
  world.add_child::<AllSlots>(hand, marker, AttachOptions::copy_parent())?;

  let mut transforms = world.transforms();
  transforms.rotate_world(arm, Quat::from_rotation_z(FRAC_PI_2));
  transforms.translate_world(body, Vec3::new(0.0, 0.0, 5.0));
  transforms.set_local_scale(hand, 2.0);

  for (name, entity) in [("body", body), ("arm", arm), ("hand", hand), ("marker", marker)] {
    let position = world
      .get_comp::<WorldTransform>(entity)
      .map(|comp| comp.position())
      .ok_or_else(|| anyhow::anyhow!("{} has no world transform", name))?;
    info!("{} at {}", name, position);
    println!("{:<8}{:>8.3}{:>8.3}{:>8.3}", name, position.x, position.y, position.z);
  }

  let removed = world.remove_entity_with_children(body)?;
  info!("Removed {} entities", removed);

  Ok(())
}
