use std::any::Any;

use crate::ComponentId;

/// Data attached to an entity. Use `#[derive(Component)]` to implement it.
pub trait Component: Any + Send + Sync {
  fn id(&self) -> ComponentId;
  fn sid() -> ComponentId
  where
    Self: Sized;
  fn name(&self) -> &'static str;
}

///from https://github.com/reem/rust-unsafe-any
/// # Safety
/// only use this if you are absolutely certain that the trait object is the struct you want
/// if it is another type it will result in undefined behavior
/// use [`std::any::Any`] instead if you are not certain
pub unsafe trait UnsafeDowncast {
  /// # Safety
  /// see trait
  unsafe fn downcast_ref_unchecked<T: Any>(&self) -> &T {
    &*data(self)
  }

  /// # Safety
  /// see trait
  unsafe fn downcast_mut_unchecked<T: Any>(&mut self) -> &mut T {
    &mut *data_mut(self)
  }

  /// # Safety
  /// see trait
  unsafe fn downcast_unchecked<T: Any>(self: Box<Self>) -> Box<T> {
    Box::from_raw(data_mut::<Self, T>(Box::into_raw(self)))
  }
}

unsafe fn data<T: ?Sized, R>(val: *const T) -> *const R {
  val as *const R
}

unsafe fn data_mut<T: ?Sized, R>(val: *mut T) -> *mut R {
  val as *mut R
}

unsafe impl UnsafeDowncast for dyn Component {}
