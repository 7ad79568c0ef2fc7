// src/recipe/format.rs

//! Recipe descriptor format definitions
//!
//! Descriptors are TOML documents that describe one project: its
//! identity, its option matrix, the packages it requires, and the build
//! modes that pull in extra dependencies. A descriptor is constructed
//! once (parsed from TOML, loaded from a file, or rendered from a
//! placeholder template) and never mutated afterwards; the resolver
//! only reads it.

use crate::error::{Error, Result};
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// A complete recipe descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDescriptor {
    /// Project identity
    pub package: PackageSection,

    /// Option matrix: option name to its enumerated domain
    ///
    /// Every option in this system carries the boolean domain
    /// `[true, false]`.
    #[serde(default)]
    pub options: BTreeMap<String, Vec<bool>>,

    /// Chosen default for each option
    ///
    /// Every key must name an entry in `options`.
    #[serde(default)]
    pub default_options: BTreeMap<String, bool>,

    /// Build requirements and modes
    #[serde(default)]
    pub build: BuildSection,
}

impl RecipeDescriptor {
    /// Validate descriptor invariants
    ///
    /// Checked in order: non-empty identity fields, defaults naming
    /// declared options, no package declared both unconditionally and
    /// under a build mode, build modes naming declared options.
    pub fn validate(&self) -> Result<()> {
        if self.package.name.is_empty() {
            return Err(Error::MissingField("name"));
        }
        if self.package.version.is_empty() {
            return Err(Error::MissingField("version"));
        }

        for option in self.default_options.keys() {
            if !self.options.contains_key(option) {
                return Err(Error::UnknownDefaultOption(option.clone()));
            }
        }

        let base: BTreeSet<&str> = self
            .build
            .requires
            .iter()
            .map(|pkg| pkg.name.as_str())
            .collect();
        for mode in &self.build.modes {
            for pkg in &mode.requires {
                if base.contains(pkg.name.as_str()) {
                    return Err(Error::DuplicatePackageDeclaration(pkg.name.clone()));
                }
            }
        }

        for mode in &self.build.modes {
            if !self.options.contains_key(&mode.option) {
                return Err(Error::DanglingModeFlag(mode.option.clone()));
            }
        }

        Ok(())
    }

    /// Base requirements, in declaration order
    pub fn requirements(&self) -> &[PackageRef] {
        &self.build.requires
    }

    /// Names of the options that trigger a build mode
    pub fn build_mode_flags(&self) -> impl Iterator<Item = &str> {
        self.build.modes.iter().map(|mode| mode.option.as_str())
    }

    /// Check whether a source path belongs to the exported source set
    ///
    /// A path is exported when it matches at least one plain pattern and
    /// no `!`-negated pattern. Negations win regardless of where they
    /// appear in the list.
    pub fn is_exported(&self, path: &str) -> bool {
        let mut included = false;
        for pattern in &self.build.exports_sources {
            if let Some(negated) = pattern.strip_prefix('!') {
                if matches_glob(negated, path) {
                    return false;
                }
            } else if !included && matches_glob(pattern, path) {
                included = true;
            }
        }
        included
    }
}

fn matches_glob(pattern: &str, path: &str) -> bool {
    Pattern::new(pattern).is_ok_and(|p| p.matches(path))
}

/// Project identity section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageSection {
    /// Project name, used as a placeholder substitution key
    pub name: String,

    /// Project version, used as a placeholder substitution key
    pub version: String,

    /// Author, `Name <email>` by convention
    #[serde(default)]
    pub author: Option<String>,

    /// Homepage URL
    #[serde(default)]
    pub url: Option<String>,

    /// Short description
    #[serde(default)]
    pub description: Option<String>,

    /// Display tags; order preserved for display only
    #[serde(default)]
    pub topics: Vec<String>,
}

/// Build requirements and modes section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildSection {
    /// Required packages, in declaration order
    ///
    /// Order is preserved because some package managers resolve
    /// conflicts by first-listed precedence.
    #[serde(default)]
    pub requires: Vec<PackageRef>,

    /// Conditional build modes, in declaration order
    #[serde(default)]
    pub modes: Vec<BuildMode>,

    /// Source selection patterns; a leading `!` excludes
    #[serde(default = "default_exports_sources")]
    pub exports_sources: Vec<String>,

    /// Build-system generators to emit configuration for
    #[serde(default = "default_generators")]
    pub generators: Vec<String>,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            requires: Vec::new(),
            modes: Vec::new(),
            exports_sources: default_exports_sources(),
            generators: default_generators(),
        }
    }
}

fn default_exports_sources() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_generators() -> Vec<String> {
    vec!["cmake".to_string()]
}

/// Extra dependencies and build definitions tied to one option
///
/// When the named option resolves true, the mode's requirements join the
/// final requirement list and its definitions are handed to the build
/// configuration step.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BuildMode {
    /// The option that activates this mode
    pub option: String,

    /// Packages pulled in when the option resolves true, in declaration
    /// order
    #[serde(default)]
    pub requires: Vec<PackageRef>,

    /// Build-system variables injected when the option resolves true
    #[serde(default)]
    pub definitions: BTreeMap<String, String>,
}

/// Reference to a required package, written `name/version`
///
/// The version keeps any `@user/channel` suffix verbatim, as in
/// `cppcheck_installer/2.0@bincrafters/stable`; versions are compared
/// only for equality, never ordered or interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackageRef {
    /// Package name
    pub name: String,
    /// Requested version
    pub version: String,
}

impl PackageRef {
    /// Create a package reference from explicit parts
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Parse a reference from `name/version` form
    pub fn parse(s: &str) -> Result<Self> {
        let (name, version) = s
            .split_once('/')
            .ok_or_else(|| Error::InvalidPackageRef(s.to_string()))?;

        if name.is_empty() || version.is_empty() {
            return Err(Error::InvalidPackageRef(s.to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            version: version.to_string(),
        })
    }
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

impl FromStr for PackageRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PackageRef {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<PackageRef> for String {
    fn from(pkg: PackageRef) -> String {
        pkg.to_string()
    }
}
