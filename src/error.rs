// src/error.rs

//! Crate error taxonomy
//!
//! Every failure here is a synchronous validation error produced at parse
//! or resolution time. Nothing is retryable: each variant points at
//! malformed input that the caller must fix at the source. Unused
//! substitution context keys are the one warning-level condition and are
//! reported alongside results, not through this enum.

use thiserror::Error;

/// Errors produced while parsing, validating, or resolving a recipe
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A required identity field is empty
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    /// A default value names an option the recipe never declares
    #[error("Default value given for unknown option '{0}'")]
    UnknownDefaultOption(String),

    /// A package is declared both unconditionally and under a build mode
    #[error("Package '{0}' declared in both base and conditional requirements")]
    DuplicatePackageDeclaration(String),

    /// A build mode does not correspond to any declared option
    #[error("Build mode '{0}' does not match any declared option")]
    DanglingModeFlag(String),

    /// A placeholder survived template substitution
    #[error("Unresolved placeholder '{0}' after substitution")]
    UnresolvedPlaceholder(String),

    /// The same package is requested at two different versions
    #[error("Conflicting versions for package '{package}': '{first}' vs '{second}'")]
    ConflictingPackageVersion {
        package: String,
        first: String,
        second: String,
    },

    /// An artifact matches two equal-priority rules with different buckets
    #[error("Artifact '{artifact}' matches both '{first}' and '{second}' at equal priority")]
    AmbiguousArtifact {
        artifact: String,
        first: String,
        second: String,
    },

    /// A package reference is not of the form `name/version`
    #[error("Invalid package reference '{0}': expected 'name/version'")]
    InvalidPackageRef(String),

    /// Recipe content could not be parsed
    #[error("Failed to parse recipe: {0}")]
    ParseError(String),

    /// Recipe file could not be read
    #[error("I/O error: {0}")]
    IoError(String),
}

/// Result type for recipe operations
pub type Result<T> = std::result::Result<T, Error>;
