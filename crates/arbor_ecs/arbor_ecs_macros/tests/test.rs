#[cfg(test)]
mod test {
  use arbor_ecs_macros::all_tuples;

  #[test]
  fn all_tuples() {
    trait Names {
      fn names(self) -> Vec<&'static str>;
    }

    trait Named {
      fn name() -> &'static str;
    }

    impl Named for f32 {
      fn name() -> &'static str {
        "f32"
      }
    }

    impl Named for u32 {
      fn name() -> &'static str {
        "u32"
      }
    }

    impl Named for bool {
      fn name() -> &'static str {
        "bool"
      }
    }

    macro_rules! impl_names {
      ($($p:ident),*) => {
        impl<$($p : Named),*> Names for ($($p ,)*) {
          fn names(self) -> Vec<&'static str> {
            vec![$($p::name()),*]
          }
        }
      };
    }

    all_tuples!(impl_names, 1, 3, F);

    assert_eq!((1.0f32,).names(), vec!["f32"]);
    assert_eq!((1.0f32, 2u32).names(), vec!["f32", "u32"]);
    assert_eq!((1.0f32, 2u32, true).names(), vec!["f32", "u32", "bool"]);
  }
}
