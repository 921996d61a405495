use std::ops::Mul;

use glam::{Mat4, Quat, Vec3};

/// Scales and stretches with a smaller magnitude are treated as zero when inverted.
pub const SCALE_EPSILON: f32 = 1e-6;

/// Rotation, position, uniform scale and a separate non-uniform stretch.
///
/// A point `p` is transformed as `position + rotation * (p * stretch * scale)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformQvvs {
  pub position: Vec3,
  pub rotation: Quat,
  pub scale: f32,
  pub stretch: Vec3,
}

impl TransformQvvs {
  pub const IDENTITY: TransformQvvs = TransformQvvs {
    position: Vec3::ZERO,
    rotation: Quat::IDENTITY,
    scale: 1.0,
    stretch: Vec3::ONE,
  };

  pub fn new(position: Vec3, rotation: Quat, scale: f32, stretch: Vec3) -> Self {
    Self {
      position,
      rotation,
      scale,
      stretch,
    }
  }

  pub fn from_position(position: Vec3) -> Self {
    Self {
      position,
      ..Self::IDENTITY
    }
  }

  pub fn from_rotation(rotation: Quat) -> Self {
    Self {
      rotation,
      ..Self::IDENTITY
    }
  }

  pub fn from_scale(scale: f32) -> Self {
    Self {
      scale,
      ..Self::IDENTITY
    }
  }

  pub fn with_position(mut self, position: Vec3) -> Self {
    self.position = position;
    self
  }

  pub fn with_rotation(mut self, rotation: Quat) -> Self {
    self.rotation = rotation;
    self
  }

  pub fn with_scale(mut self, scale: f32) -> Self {
    self.scale = scale;
    self
  }

  pub fn with_stretch(mut self, stretch: Vec3) -> Self {
    self.stretch = stretch;
    self
  }

  #[inline]
  pub fn transform_point(&self, point: Vec3) -> Vec3 {
    self.position + self.rotation * (point * self.stretch * self.scale)
  }

  pub fn to_matrix(&self) -> Mat4 {
    Mat4::from_scale_rotation_translation(self.stretch * self.scale, self.rotation, self.position)
  }

  /// Unit rotation, non-negative scale and finite components.
  ///
  /// A negative uniform scale is moved into the stretch, which keeps every transformed
  /// point unchanged. Non-finite components fall back to their identity value.
  pub fn canonicalized(self) -> Self {
    let mut scale = if self.scale.is_finite() { self.scale } else { 1.0 };
    let mut stretch = if self.stretch.is_finite() {
      self.stretch
    } else {
      Vec3::ONE
    };

    if scale < 0.0 {
      scale = -scale;
      stretch = -stretch;
    }

    Self {
      position: if self.position.is_finite() {
        self.position
      } else {
        Vec3::ZERO
      },
      rotation: normalize_rotation(self.rotation),
      scale,
      stretch,
    }
  }

  pub fn approx_eq(&self, other: &TransformQvvs, epsilon: f32) -> bool {
    self.position.abs_diff_eq(other.position, epsilon)
      && (self.rotation.abs_diff_eq(other.rotation, epsilon)
        || self.rotation.abs_diff_eq(-other.rotation, epsilon))
      && (self.scale - other.scale).abs() <= epsilon
      && self.stretch.abs_diff_eq(other.stretch, epsilon)
  }
}

impl Default for TransformQvvs {
  fn default() -> Self {
    Self::IDENTITY
  }
}

impl Mul for TransformQvvs {
  type Output = TransformQvvs;

  fn mul(self, rhs: Self) -> Self::Output {
    mul(&self, &rhs)
  }
}

/// `1 / x`, or zero for degenerate or non-finite `x`.
#[inline]
pub fn safe_rcp(x: f32) -> f32 {
  if x.is_finite() && x.abs() >= SCALE_EPSILON {
    x.recip()
  } else {
    0.0
  }
}

#[inline]
fn safe_rcp3(v: Vec3) -> Vec3 {
  Vec3::new(safe_rcp(v.x), safe_rcp(v.y), safe_rcp(v.z))
}

/// Unit length version of `rotation`, identity for zero-length or non-finite input.
#[inline]
pub fn normalize_rotation(rotation: Quat) -> Quat {
  let length = rotation.length();
  if length.is_finite() && length > SCALE_EPSILON {
    rotation * length.recip()
  } else {
    Quat::IDENTITY
  }
}

/// Applying the result equals applying `b` first, then `a`.
pub fn mul(a: &TransformQvvs, b: &TransformQvvs) -> TransformQvvs {
  TransformQvvs {
    position: a.position + a.rotation * (b.position * a.stretch * a.scale),
    rotation: a.rotation * b.rotation,
    scale: a.scale * b.scale,
    stretch: a.stretch * b.stretch,
  }
}

/// [`mul`] with a renormalized rotation and a canonical scale/stretch split.
pub fn mulclean(a: &TransformQvvs, b: &TransformQvvs) -> TransformQvvs {
  mul(a, b).canonicalized()
}

/// `a⁻¹ ∘ b`: removes `a` from the front of `b`, so that `mul(a, inversemulqvvs(a, b)) == b`.
pub fn inversemulqvvs(a: &TransformQvvs, b: &TransformQvvs) -> TransformQvvs {
  let inverse_rotation = normalize_rotation(a.rotation).conjugate();
  let rcp_scale = safe_rcp(a.scale);
  let rcp_stretch = safe_rcp3(a.stretch);

  TransformQvvs {
    position: (inverse_rotation * (b.position - a.position)) * rcp_stretch * rcp_scale,
    rotation: inverse_rotation * b.rotation,
    scale: b.scale * rcp_scale,
    stretch: b.stretch * rcp_stretch,
  }
}

/// [`inversemulqvvs`] with the same cleaning as [`mulclean`].
pub fn inversemulqvvsclean(applied: &TransformQvvs, current: &TransformQvvs) -> TransformQvvs {
  inversemulqvvs(applied, current).canonicalized()
}

#[cfg(test)]
mod test {
  use std::f32::consts::FRAC_PI_2;

  use glam::{Quat, Vec3};

  use super::*;

  const EPS: f32 = 1e-4;

  fn sample_a() -> TransformQvvs {
    TransformQvvs::new(
      Vec3::new(1.0, -2.0, 0.5),
      Quat::from_rotation_y(0.7),
      2.0,
      Vec3::ONE,
    )
  }

  fn sample_b() -> TransformQvvs {
    TransformQvvs::new(
      Vec3::new(-3.0, 0.25, 4.0),
      Quat::from_euler(glam::EulerRot::XYZ, 0.3, -1.1, 0.2),
      0.5,
      Vec3::new(1.0, 2.0, 3.0),
    )
  }

  #[test]
  fn identity() {
    let b = sample_b();

    assert!(mul(&TransformQvvs::IDENTITY, &b).approx_eq(&b, EPS));
    assert!(mul(&b, &TransformQvvs::IDENTITY).approx_eq(&b, EPS));
    assert_eq!(TransformQvvs::default(), TransformQvvs::IDENTITY);
  }

  #[test]
  fn mul_applies_right_first() {
    let parent = TransformQvvs::from_position(Vec3::new(5.0, 0.0, 0.0))
      .with_rotation(Quat::from_rotation_z(FRAC_PI_2))
      .with_scale(2.0);
    let child = TransformQvvs::from_position(Vec3::X);

    let world = mulclean(&parent, &child);
    assert!(world.position.abs_diff_eq(Vec3::new(5.0, 2.0, 0.0), EPS));
    assert!((world.scale - 2.0).abs() < EPS);

    let point = Vec3::new(0.5, 1.0, -1.0);
    assert!(world
      .transform_point(point)
      .abs_diff_eq(parent.transform_point(child.transform_point(point)), EPS));
  }

  #[test]
  fn stretch_is_multiplicative() {
    let a = TransformQvvs::IDENTITY.with_stretch(Vec3::new(2.0, 1.0, 1.0));
    let b = TransformQvvs::from_position(Vec3::X).with_stretch(Vec3::new(1.0, 3.0, 1.0));

    let c = mul(&a, &b);
    assert!(c.stretch.abs_diff_eq(Vec3::new(2.0, 3.0, 1.0), EPS));
    assert!(c.position.abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), EPS));
  }

  #[test]
  fn associative_without_stretch() {
    let a = sample_a();
    let b = sample_a().with_position(Vec3::new(0.0, 3.0, -1.0));
    let c = sample_b();

    let left = mulclean(&mulclean(&a, &b), &c);
    let right = mulclean(&a, &mulclean(&b, &c));
    assert!(left.approx_eq(&right, EPS));
  }

  #[test]
  fn inverse_round_trip() {
    let a = sample_a().with_stretch(Vec3::new(0.5, 2.0, 4.0));
    let b = sample_b();

    let applied = mulclean(&a, &b);
    let restored = inversemulqvvsclean(&a, &applied);
    assert!(restored.approx_eq(&b, EPS));

    let local = inversemulqvvsclean(&a, &b);
    assert!(mulclean(&a, &local).approx_eq(&b, EPS));
  }

  #[test]
  fn negative_scale_moves_into_stretch() {
    let flipped = TransformQvvs::from_scale(-2.0);
    let child = TransformQvvs::from_position(Vec3::new(1.0, 2.0, 3.0));

    let world = mulclean(&flipped, &child);
    assert!((world.scale - 2.0).abs() < EPS);
    assert!(world.stretch.abs_diff_eq(Vec3::splat(-1.0), EPS));
    assert!(world.position.abs_diff_eq(Vec3::new(-2.0, -4.0, -6.0), EPS));

    let restored = inversemulqvvsclean(&flipped, &world);
    assert!(restored.approx_eq(&child, EPS));
  }

  #[test]
  fn degenerate_scale_stays_finite() {
    let collapsed = TransformQvvs::from_position(Vec3::ONE).with_scale(0.0);
    let world = TransformQvvs::from_position(Vec3::new(4.0, 5.0, 6.0));

    let local = inversemulqvvsclean(&collapsed, &world);
    assert!(local.position.is_finite());
    assert!(local.rotation.is_finite());
    assert!(local.stretch.is_finite());
    assert!(local.scale.is_finite());

    let flat = TransformQvvs::IDENTITY.with_stretch(Vec3::new(1.0, 0.0, 1.0));
    let local = inversemulqvvsclean(&flat, &world);
    assert!(local.position.is_finite());
    assert_eq!(local.position.y, 0.0);
  }

  #[test]
  fn degenerate_rotation_becomes_identity() {
    let broken = TransformQvvs::from_rotation(Quat::from_xyzw(0.0, 0.0, 0.0, 0.0));
    assert_eq!(broken.canonicalized().rotation, Quat::IDENTITY);

    let nan = TransformQvvs::from_position(Vec3::NAN).with_scale(f32::NAN);
    let clean = nan.canonicalized();
    assert_eq!(clean.position, Vec3::ZERO);
    assert_eq!(clean.scale, 1.0);
  }

  #[test]
  fn mulclean_renormalizes() {
    let drifting = TransformQvvs::from_rotation(Quat::from_xyzw(0.0, 0.0, 0.8, 0.8));
    let result = mulclean(&drifting, &TransformQvvs::IDENTITY);
    assert!((result.rotation.length() - 1.0).abs() < EPS);
  }

  #[test]
  fn matrix_matches_points() {
    let a = sample_a();
    let point = Vec3::new(1.0, 2.0, 3.0);

    assert!(a
      .to_matrix()
      .transform_point3(point)
      .abs_diff_eq(a.transform_point(point), EPS));
  }
}
