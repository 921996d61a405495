pub mod qvvs;

pub use glam::{Mat4, Quat, Vec3};
pub use qvvs::{
  inversemulqvvs, inversemulqvvsclean, mul, mulclean, normalize_rotation, safe_rcp, TransformQvvs,
  SCALE_EPSILON,
};
