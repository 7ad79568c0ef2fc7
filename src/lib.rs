// src/lib.rs

//! Prep: recipe templating and build plan resolution
//!
//! Prep turns a parameterized recipe template into a concrete, buildable
//! plan: substitute project identity into the template, prune build
//! options that do not apply on the target platform, compose the final
//! requirement list, and classify build outputs into packaging buckets.
//!
//! # Architecture
//!
//! - Descriptor-first: all recipe state lives in one immutable
//!   `RecipeDescriptor`, parsed from TOML or rendered from a template
//! - Resolution is pure: `Resolver::resolve` reads a descriptor and a
//!   platform context and returns a fresh `ResolvedBuildPlan`, never
//!   mutating either
//! - Pruned is not false: an option removed for a platform is absent
//!   from the plan, not disabled
//! - External collaborators own execution: the build orchestrator
//!   consumes `build_definitions` and `active_options`, the package
//!   manager consumes `final_requirements`, the file-copy step consumes
//!   `packaging_rules`

mod error;
pub mod packaging;
pub mod platform;
pub mod recipe;
pub mod resolver;

pub use error::{Error, Result};
pub use packaging::{Bucket, Classification, PackagingRule, classify, default_packaging_rules};
pub use platform::{Arch, Compiler, Os, PlatformContext};
pub use recipe::{
    BuildMode, BuildSection, ContextValue, PackageRef, PackageSection, RecipeDescriptor, Rendered,
    SubstitutionContext, descriptor_from_template, parse_descriptor, parse_descriptor_file, render,
};
pub use resolver::{
    PlatformPredicate, PruneRule, ResolvedBuildPlan, Resolver, default_prune_rules,
};
