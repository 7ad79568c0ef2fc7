// src/resolver/mod.rs

//! Recipe resolution: descriptor plus platform in, build plan out
//!
//! Resolution is deterministic and side-effect free. Each call validates
//! the descriptor, prunes options against the platform, composes the
//! final requirement list, derives build definitions, and emits the
//! packaging rule table. The returned plan is fresh per call; nothing is
//! cached and neither input is mutated, so concurrent callers need no
//! coordination.

mod pruning;

pub use pruning::{PlatformPredicate, PruneRule, default_prune_rules};

use crate::error::{Error, Result};
use crate::packaging::{PackagingRule, default_packaging_rules};
use crate::platform::PlatformContext;
use crate::recipe::{PackageRef, RecipeDescriptor};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// A fully resolved, internally consistent build plan
///
/// Handed across the external boundaries whole: `active_options` and
/// `build_definitions` to the build orchestrator, `final_requirements`
/// to the package manager, `packaging_rules` to the file-copy step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedBuildPlan {
    /// Option values after platform pruning
    ///
    /// An absent key means the option is not a concept on the target
    /// platform, which is distinct from present-and-false.
    pub active_options: BTreeMap<String, bool>,

    /// Base requirements followed by each active conditional group,
    /// deduplicated by package name, first occurrence wins
    pub final_requirements: Vec<PackageRef>,

    /// Packaging rule table for classifying build outputs
    pub packaging_rules: Vec<PackagingRule>,

    /// Build-system variables derived from active build modes
    pub build_definitions: BTreeMap<String, String>,
}

impl ResolvedBuildPlan {
    /// Check whether a build mode flag resolved true
    ///
    /// Pruned options count as inactive.
    pub fn is_active(&self, option: &str) -> bool {
        self.active_options.get(option).copied().unwrap_or(false)
    }
}

/// Resolves recipe descriptors against target platforms
///
/// Holds the pruning and packaging rule tables. The default tables are
/// the fixed ones; both can be replaced for callers that maintain their
/// own conventions.
pub struct Resolver {
    prune_rules: Vec<PruneRule>,
    packaging_rules: Vec<PackagingRule>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self {
            prune_rules: default_prune_rules(),
            packaging_rules: default_packaging_rules(),
        }
    }
}

impl Resolver {
    /// Create a resolver with the fixed rule tables
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the pruning rule table
    pub fn with_prune_rules(mut self, rules: Vec<PruneRule>) -> Self {
        self.prune_rules = rules;
        self
    }

    /// Replace the packaging rule table
    pub fn with_packaging_rules(mut self, rules: Vec<PackagingRule>) -> Self {
        self.packaging_rules = rules;
        self
    }

    /// Resolve a descriptor with the recipe's own option defaults
    pub fn resolve(
        &self,
        descriptor: &RecipeDescriptor,
        platform: &PlatformContext,
    ) -> Result<ResolvedBuildPlan> {
        self.resolve_with_overrides(descriptor, platform, &BTreeMap::new())
    }

    /// Resolve with caller-supplied option overrides
    ///
    /// Overrides take precedence over recipe defaults and are applied
    /// before pruning is evaluated, so an overridden option can still be
    /// pruned away.
    pub fn resolve_with_overrides(
        &self,
        descriptor: &RecipeDescriptor,
        platform: &PlatformContext,
        overrides: &BTreeMap<String, bool>,
    ) -> Result<ResolvedBuildPlan> {
        descriptor.validate()?;

        let active_options = self.prune_options(descriptor, platform, overrides);
        let final_requirements = compose_requirements(descriptor, &active_options)?;
        let build_definitions = derive_definitions(descriptor, &active_options);

        debug!(
            recipe = %descriptor.package.name,
            platform = %platform,
            options = active_options.len(),
            requirements = final_requirements.len(),
            "resolved build plan"
        );

        Ok(ResolvedBuildPlan {
            active_options,
            final_requirements,
            packaging_rules: self.packaging_rules.clone(),
            build_definitions,
        })
    }

    /// Resolve option values, dropping options pruned for the platform
    fn prune_options(
        &self,
        descriptor: &RecipeDescriptor,
        platform: &PlatformContext,
        overrides: &BTreeMap<String, bool>,
    ) -> BTreeMap<String, bool> {
        for key in overrides.keys() {
            if !descriptor.options.contains_key(key) {
                warn!(option = %key, "override names an undeclared option, ignored");
            }
        }

        let mut active = BTreeMap::new();
        for option in descriptor.options.keys() {
            let pruned = self
                .prune_rules
                .iter()
                .any(|rule| rule.option == *option && rule.when.matches(platform));
            if pruned {
                debug!(option = %option, platform = %platform, "option pruned for platform");
                continue;
            }

            // an option with neither default nor override resolves false
            let value = overrides
                .get(option)
                .or_else(|| descriptor.default_options.get(option))
                .copied()
                .unwrap_or(false);
            active.insert(option.clone(), value);
        }
        active
    }
}

/// Compose base and active conditional requirements into one list
///
/// Base requirements come first, then each active mode's group in
/// declaration order. Duplicates by package name keep the first
/// occurrence; a version disagreement between occurrences is an error.
fn compose_requirements(
    descriptor: &RecipeDescriptor,
    active_options: &BTreeMap<String, bool>,
) -> Result<Vec<PackageRef>> {
    let conditional = descriptor
        .build
        .modes
        .iter()
        .filter(|mode| active_options.get(&mode.option).copied().unwrap_or(false))
        .flat_map(|mode| mode.requires.iter());

    let mut composed: Vec<PackageRef> = Vec::new();
    let mut seen: BTreeMap<&str, &str> = BTreeMap::new();

    for pkg in descriptor.build.requires.iter().chain(conditional) {
        match seen.get(pkg.name.as_str()) {
            None => {
                seen.insert(pkg.name.as_str(), pkg.version.as_str());
                composed.push(pkg.clone());
            }
            Some(version) if *version == pkg.version => {
                // duplicate request for the same version, first wins
            }
            Some(version) => {
                return Err(Error::ConflictingPackageVersion {
                    package: pkg.name.clone(),
                    first: (*version).to_string(),
                    second: pkg.version.clone(),
                });
            }
        }
    }

    Ok(composed)
}

/// Collect build definitions from the active build modes
fn derive_definitions(
    descriptor: &RecipeDescriptor,
    active_options: &BTreeMap<String, bool>,
) -> BTreeMap<String, String> {
    let mut definitions = BTreeMap::new();
    for mode in &descriptor.build.modes {
        if active_options.get(&mode.option).copied().unwrap_or(false) {
            for (key, value) in &mode.definitions {
                definitions.insert(key.clone(), value.clone());
            }
        }
    }
    definitions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packaging::Bucket;
    use crate::platform::{Arch, Compiler, Os};
    use crate::recipe::parse_descriptor;

    const SAMPLE_DESCRIPTOR: &str = r#"
[package]
name = "widget"
version = "0.1"

[options]
shared = [true, false]
fPIC = [true, false]
build_tests = [true, false]

[default_options]
shared = false
fPIC = true
build_tests = false

[build]
requires = ["fmt/7.1.2", "cli11/1.9.1"]

[[build.modes]]
option = "build_tests"
requires = ["cppcheck_installer/2.0@bincrafters/stable", "catch2/2.13.0"]
definitions = { ENABLE_TESTING = "true" }
"#;

    fn sample() -> RecipeDescriptor {
        parse_descriptor(SAMPLE_DESCRIPTOR).unwrap()
    }

    fn linux_gcc() -> PlatformContext {
        PlatformContext::new(Os::Linux, Compiler::Gcc, Arch::X86_64)
    }

    fn windows_msvc() -> PlatformContext {
        PlatformContext::new(Os::Windows, Compiler::Msvc, Arch::X86_64)
    }

    // ===================
    // Option pruning
    // ===================

    #[test]
    fn test_fpic_present_on_linux() {
        let plan = Resolver::new().resolve(&sample(), &linux_gcc()).unwrap();
        assert_eq!(plan.active_options.get("fPIC"), Some(&true));
        assert_eq!(plan.active_options.get("shared"), Some(&false));
        assert_eq!(plan.active_options.get("build_tests"), Some(&false));
    }

    #[test]
    fn test_fpic_pruned_on_windows_msvc() {
        let plan = Resolver::new().resolve(&sample(), &windows_msvc()).unwrap();
        // absent, not false
        assert!(!plan.active_options.contains_key("fPIC"));
        assert!(plan.active_options.contains_key("shared"));
    }

    #[test]
    fn test_fpic_survives_mingw() {
        // gcc on Windows is not the IDE compiler; the rule must not fire
        let platform = PlatformContext::new(Os::Windows, Compiler::Gcc, Arch::X86_64);
        let plan = Resolver::new().resolve(&sample(), &platform).unwrap();
        assert_eq!(plan.active_options.get("fPIC"), Some(&true));
    }

    #[test]
    fn test_override_takes_precedence() {
        let overrides = BTreeMap::from([("shared".to_string(), true)]);
        let plan = Resolver::new()
            .resolve_with_overrides(&sample(), &linux_gcc(), &overrides)
            .unwrap();
        assert_eq!(plan.active_options.get("shared"), Some(&true));
    }

    #[test]
    fn test_override_still_pruned() {
        let overrides = BTreeMap::from([("fPIC".to_string(), true)]);
        let plan = Resolver::new()
            .resolve_with_overrides(&sample(), &windows_msvc(), &overrides)
            .unwrap();
        assert!(!plan.active_options.contains_key("fPIC"));
    }

    #[test]
    fn test_option_without_default_resolves_false() {
        let mut descriptor = sample();
        descriptor
            .options
            .insert("with_docs".to_string(), vec![true, false]);
        let plan = Resolver::new().resolve(&descriptor, &linux_gcc()).unwrap();
        assert_eq!(plan.active_options.get("with_docs"), Some(&false));
    }

    // ===================
    // Requirement composition
    // ===================

    #[test]
    fn test_base_requirements_only_when_modes_inactive() {
        let plan = Resolver::new().resolve(&sample(), &linux_gcc()).unwrap();
        assert_eq!(
            plan.final_requirements,
            vec![
                PackageRef::new("fmt", "7.1.2"),
                PackageRef::new("cli11", "1.9.1"),
            ]
        );
        assert!(plan.build_definitions.is_empty());
    }

    #[test]
    fn test_active_mode_appends_group_in_order() {
        let overrides = BTreeMap::from([("build_tests".to_string(), true)]);
        let plan = Resolver::new()
            .resolve_with_overrides(&sample(), &linux_gcc(), &overrides)
            .unwrap();
        assert_eq!(
            plan.final_requirements,
            vec![
                PackageRef::new("fmt", "7.1.2"),
                PackageRef::new("cli11", "1.9.1"),
                PackageRef::new("cppcheck_installer", "2.0@bincrafters/stable"),
                PackageRef::new("catch2", "2.13.0"),
            ]
        );
    }

    #[test]
    fn test_duplicate_same_version_first_wins() {
        let mut descriptor = sample();
        descriptor.build.modes.push(crate::recipe::BuildMode {
            option: "shared".to_string(),
            requires: vec![PackageRef::new("catch2", "2.13.0")],
            ..Default::default()
        });
        let overrides = BTreeMap::from([
            ("build_tests".to_string(), true),
            ("shared".to_string(), true),
        ]);
        let plan = Resolver::new()
            .resolve_with_overrides(&descriptor, &linux_gcc(), &overrides)
            .unwrap();

        let catch2_count = plan
            .final_requirements
            .iter()
            .filter(|pkg| pkg.name == "catch2")
            .count();
        assert_eq!(catch2_count, 1);
    }

    #[test]
    fn test_conflicting_versions_rejected() {
        let mut descriptor = sample();
        descriptor.build.modes.push(crate::recipe::BuildMode {
            option: "shared".to_string(),
            requires: vec![PackageRef::new("catch2", "3.0.0")],
            ..Default::default()
        });
        let overrides = BTreeMap::from([
            ("build_tests".to_string(), true),
            ("shared".to_string(), true),
        ]);
        let err = Resolver::new()
            .resolve_with_overrides(&descriptor, &linux_gcc(), &overrides)
            .unwrap_err();
        assert_eq!(
            err,
            Error::ConflictingPackageVersion {
                package: "catch2".to_string(),
                first: "2.13.0".to_string(),
                second: "3.0.0".to_string(),
            }
        );
    }

    #[test]
    fn test_pruned_flag_counts_as_inactive() {
        // tie the conditional group to the option the platform prunes
        let mut descriptor = sample();
        descriptor.build.modes[0].option = "fPIC".to_string();
        // fPIC defaults true, so on linux the group activates...
        let plan = Resolver::new().resolve(&descriptor, &linux_gcc()).unwrap();
        assert_eq!(plan.final_requirements.len(), 4);

        // ...but on windows/msvc the flag is pruned, hence inactive
        let plan = Resolver::new().resolve(&descriptor, &windows_msvc()).unwrap();
        assert_eq!(plan.final_requirements.len(), 2);
        assert!(plan.build_definitions.is_empty());
    }

    // ===================
    // Build definitions
    // ===================

    #[test]
    fn test_definitions_injected_for_active_mode() {
        let overrides = BTreeMap::from([("build_tests".to_string(), true)]);
        let plan = Resolver::new()
            .resolve_with_overrides(&sample(), &linux_gcc(), &overrides)
            .unwrap();
        assert_eq!(
            plan.build_definitions.get("ENABLE_TESTING"),
            Some(&"true".to_string())
        );
        assert!(plan.is_active("build_tests"));
    }

    // ===================
    // Validation ordering
    // ===================

    #[test]
    fn test_validation_precedes_resolution() {
        let mut descriptor = sample();
        descriptor.package.name.clear();

        for platform in [
            linux_gcc(),
            windows_msvc(),
            PlatformContext::new(Os::Macos, Compiler::AppleClang, Arch::Armv8),
        ] {
            let err = Resolver::new().resolve(&descriptor, &platform).unwrap_err();
            assert_eq!(err, Error::MissingField("name"));
        }
    }

    // ===================
    // Determinism
    // ===================

    #[test]
    fn test_resolution_is_idempotent() {
        let resolver = Resolver::new();
        let descriptor = sample();
        let first = resolver.resolve(&descriptor, &windows_msvc()).unwrap();
        let second = resolver.resolve(&descriptor, &windows_msvc()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unrelated_option_does_not_reorder_requirements() {
        let descriptor = sample();
        let baseline = Resolver::new().resolve(&descriptor, &linux_gcc()).unwrap();

        let mut extended = descriptor.clone();
        extended
            .options
            .insert("with_docs".to_string(), vec![true, false]);
        let plan = Resolver::new().resolve(&extended, &linux_gcc()).unwrap();

        assert_eq!(plan.final_requirements, baseline.final_requirements);
    }

    // ===================
    // Packaging hand-off
    // ===================

    #[test]
    fn test_plan_carries_packaging_rules() {
        let plan = Resolver::new().resolve(&sample(), &linux_gcc()).unwrap();
        assert_eq!(plan.packaging_rules.len(), 6);
        assert_eq!(plan.packaging_rules[0].pattern, "bin/*");
        assert_eq!(plan.packaging_rules[0].bucket, Bucket::Bin);
    }

    #[test]
    fn test_custom_rule_tables() {
        let resolver = Resolver::new()
            .with_prune_rules(vec![PruneRule::new(
                "shared",
                PlatformPredicate {
                    os: Some(Os::Freebsd),
                    compiler: None,
                    arch: None,
                },
            )])
            .with_packaging_rules(vec![PackagingRule::new("*.ko", Bucket::Lib, false, 0)]);

        let platform = PlatformContext::new(Os::Freebsd, Compiler::Clang, Arch::X86_64);
        let plan = resolver.resolve(&sample(), &platform).unwrap();

        assert!(!plan.active_options.contains_key("shared"));
        // the default fPIC rule was replaced, so fPIC survives
        assert_eq!(plan.active_options.get("fPIC"), Some(&true));
        assert_eq!(plan.packaging_rules.len(), 1);
    }
}
