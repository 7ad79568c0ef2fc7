// src/packaging.rs

//! Artifact classification into packaging buckets
//!
//! Build outputs are routed to their install destination by an ordered
//! table of glob rules. Classification resolves each artifact at its
//! best matching priority; two different-bucket rules tying there is an
//! ambiguity the caller must fix, never something table order resolves.
//! This module only classifies; copying the files is the external
//! packaging step's job.

use crate::error::{Error, Result};
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Packaging destination for a build artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    /// Executables and runtime-loaded shared objects on Windows
    Bin,
    /// Static and link-time libraries
    Lib,
}

impl Bucket {
    /// Get the string representation of the bucket
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bin => "bin",
            Self::Lib => "lib",
        }
    }

    /// Parse a bucket from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bin" => Some(Self::Bin),
            "lib" => Some(Self::Lib),
            _ => None,
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One packaging rule: artifacts matching `pattern` land in `bucket`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagingRule {
    /// Glob over artifact paths
    pub pattern: String,

    /// Destination bucket
    pub bucket: Bucket,

    /// Drop the source directory structure when copying
    pub flatten: bool,

    /// Evaluation priority, lower wins
    ///
    /// Rules at equal priority must agree on the bucket for any artifact
    /// they both match.
    pub priority: u32,
}

impl PackagingRule {
    /// Create a packaging rule
    pub fn new(pattern: impl Into<String>, bucket: Bucket, flatten: bool, priority: u32) -> Self {
        Self {
            pattern: pattern.into(),
            bucket,
            flatten,
            priority,
        }
    }

    /// Check whether an artifact path matches this rule
    pub fn matches(&self, artifact: &str) -> bool {
        Pattern::new(&self.pattern).is_ok_and(|p| p.matches(artifact))
    }
}

/// The fixed packaging table
///
/// Windows import libraries go to lib while the runtime DLL goes to bin;
/// every rule flattens, so destinations hold plain files. Priorities are
/// the table indices, all distinct.
pub fn default_packaging_rules() -> Vec<PackagingRule> {
    [
        ("bin/*", Bucket::Bin),
        ("*.lib", Bucket::Lib),
        ("*.dll", Bucket::Bin),
        ("*.so", Bucket::Lib),
        ("*.dylib", Bucket::Lib),
        ("*.a", Bucket::Lib),
    ]
    .into_iter()
    .enumerate()
    .map(|(index, (pattern, bucket))| PackagingRule::new(pattern, bucket, true, index as u32))
    .collect()
}

/// Classification outcome for a list of artifacts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Each classified artifact with its destination, in input order
    pub placed: Vec<(String, Bucket)>,

    /// Artifacts no rule claimed, in input order
    pub unmatched: Vec<String>,
}

/// Classify artifacts against a rule table
///
/// Each artifact resolves to the bucket of its lowest-priority matching
/// rule. Fails with `AmbiguousArtifact` when two rules with different
/// buckets match the same artifact at that winning priority, checked on
/// every call, since custom tables may assign shared priorities even
/// though the fixed table does not.
pub fn classify(rules: &[PackagingRule], artifacts: &[String]) -> Result<Classification> {
    let compiled: Vec<Option<Pattern>> = rules
        .iter()
        .map(|rule| Pattern::new(&rule.pattern).ok())
        .collect();

    let mut result = Classification::default();

    for artifact in artifacts {
        let matched: Vec<&PackagingRule> = rules
            .iter()
            .zip(&compiled)
            .filter(|(_, pattern)| {
                pattern
                    .as_ref()
                    .is_some_and(|p| p.matches(artifact))
            })
            .map(|(rule, _)| rule)
            .collect();

        let Some(winning_priority) = matched.iter().map(|rule| rule.priority).min() else {
            result.unmatched.push(artifact.clone());
            continue;
        };

        let winners: Vec<&&PackagingRule> = matched
            .iter()
            .filter(|rule| rule.priority == winning_priority)
            .collect();

        if let Some(conflict) = winners.iter().find(|rule| rule.bucket != winners[0].bucket) {
            return Err(Error::AmbiguousArtifact {
                artifact: artifact.clone(),
                first: winners[0].bucket.to_string(),
                second: conflict.bucket.to_string(),
            });
        }

        result.placed.push((artifact.clone(), winners[0].bucket));
    }

    Ok(result)
}
