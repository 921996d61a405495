extern crate proc_macro;

use std::{env, path::PathBuf};

use proc_macro::TokenStream;
use toml_edit::{DocumentMut, Item};

/// Cargo manifest of the crate currently being expanded.
pub struct Manifest {
  doc: DocumentMut,
}

impl Default for Manifest {
  fn default() -> Self {
    let path = env::var_os("CARGO_MANIFEST_DIR")
      .map(PathBuf::from)
      .map(|dir| dir.join("Cargo.toml"))
      .expect("CARGO_MANIFEST_DIR not defined.");

    if !path.exists() {
      panic!("No Cargo.toml found. Expected: {}", path.display());
    }

    let manifest = std::fs::read_to_string(&path)
      .unwrap_or_else(|_| panic!("Unable to read Cargo.toml: {}", path.display()));

    Self {
      doc: manifest
        .parse::<DocumentMut>()
        .unwrap_or_else(|_| panic!("Failed to parse Cargo.toml: {}", path.display())),
    }
  }
}

const ARBOR: &str = "arbor";

impl Manifest {
  /// Path to `name`, either as a direct dependency or re-exported by the `arbor` umbrella crate.
  pub fn get_path(&self, name: &str) -> syn::Path {
    self.try_get_path(name).unwrap_or_else(|| parse_str(name))
  }

  pub fn try_get_path(&self, name: &str) -> Option<syn::Path> {
    fn renamed(dep: &Item) -> Option<&str> {
      if dep.as_str().is_some() {
        None
      } else {
        dep.get("package").and_then(|package| package.as_str())
      }
    }

    let find = |deps: &Item| {
      if let Some(dep) = deps.get(name) {
        return Some(parse_str(renamed(dep).unwrap_or(name)));
      }

      let umbrella = renamed(deps.get(ARBOR)?).unwrap_or(ARBOR);
      let mut path = parse_str::<syn::Path>(umbrella);
      if let Some(module) = name.strip_prefix("arbor_") {
        path.segments.push(parse_str(module));
      }
      Some(path)
    };

    let dependencies = self.doc.get("dependencies");
    let dev_dependencies = self.doc.get("dev-dependencies");

    dependencies
      .and_then(find)
      .or_else(|| dev_dependencies.and_then(find))
  }
}

fn try_parse_str<T: syn::parse::Parse>(path: &str) -> Option<T> {
  syn::parse(path.parse::<TokenStream>().ok()?).ok()
}

fn parse_str<T: syn::parse::Parse>(path: &str) -> T {
  try_parse_str(path).unwrap_or_else(|| panic!("Invalid path: {path}"))
}
