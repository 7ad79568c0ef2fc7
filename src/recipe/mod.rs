// src/recipe/mod.rs

//! Recipe descriptors and their construction
//!
//! A recipe describes one project: its identity, its option matrix, the
//! packages it requires, and the build modes that pull in extra
//! dependencies. Recipes are TOML documents, written by hand or rendered
//! from a placeholder template.
//!
//! # Example Recipe
//!
//! ```toml
//! [package]
//! name = "widget"
//! version = "0.1"
//! description = "A sample widget project"
//!
//! [options]
//! shared = [true, false]
//! fPIC = [true, false]
//! build_tests = [true, false]
//!
//! [default_options]
//! shared = false
//! fPIC = true
//! build_tests = false
//!
//! [build]
//! requires = ["fmt/7.1.2", "cli11/1.9.1"]
//!
//! [[build.modes]]
//! option = "build_tests"
//! requires = ["catch2/2.13.0"]
//! definitions = { ENABLE_TESTING = "true" }
//! ```
//!
//! The same document with `__project_name__`-style placeholders is a
//! template; [`descriptor_from_template`] renders and validates it in
//! one step.

mod format;
pub mod parser;
mod template;

pub use format::{BuildMode, BuildSection, PackageRef, PackageSection, RecipeDescriptor};
pub use parser::{descriptor_from_template, parse_descriptor, parse_descriptor_file};
pub use template::{ContextValue, Rendered, SubstitutionContext, render};
