// src/platform.rs

//! Target platform description
//!
//! A `PlatformContext` names the operating system, compiler, and
//! architecture a recipe is resolved against. The resolver treats these
//! values purely as lookup keys into its pruning rule table; nothing here
//! inspects the running host.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operating system of the build target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Linux,
    Windows,
    Macos,
    Freebsd,
}

impl Os {
    /// Get the string representation of the operating system
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Windows => "windows",
            Self::Macos => "macos",
            Self::Freebsd => "freebsd",
        }
    }

    /// Parse an operating system from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "linux" => Some(Self::Linux),
            "windows" => Some(Self::Windows),
            "macos" => Some(Self::Macos),
            "freebsd" => Some(Self::Freebsd),
            _ => None,
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Compiler identity of the build target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Compiler {
    Gcc,
    Clang,
    AppleClang,
    Msvc,
}

impl Compiler {
    /// Get the string representation of the compiler
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gcc => "gcc",
            Self::Clang => "clang",
            Self::AppleClang => "apple-clang",
            Self::Msvc => "msvc",
        }
    }

    /// Parse a compiler identity from a string
    ///
    /// Accepts the vendor spelling "Visual Studio" as an alias for msvc,
    /// since recipes imported from other tools identify it that way.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "gcc" => Some(Self::Gcc),
            "clang" => Some(Self::Clang),
            "apple-clang" => Some(Self::AppleClang),
            "msvc" | "Visual Studio" => Some(Self::Msvc),
            _ => None,
        }
    }
}

impl fmt::Display for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Processor architecture of the build target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    X86,
    #[serde(rename = "x86_64")]
    X86_64,
    Armv8,
}

impl Arch {
    /// Get the string representation of the architecture
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X86 => "x86",
            Self::X86_64 => "x86_64",
            Self::Armv8 => "armv8",
        }
    }

    /// Parse an architecture from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "x86" => Some(Self::X86),
            "x86_64" => Some(Self::X86_64),
            "armv8" => Some(Self::Armv8),
            _ => None,
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Target platform a recipe is resolved against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformContext {
    /// Operating system
    pub os: Os,

    /// Compiler identity
    pub compiler: Compiler,

    /// Compiler version, opaque to the resolver
    #[serde(default)]
    pub compiler_version: Option<String>,

    /// Processor architecture
    pub arch: Arch,
}

impl PlatformContext {
    /// Create a platform context without a compiler version
    pub fn new(os: Os, compiler: Compiler, arch: Arch) -> Self {
        Self {
            os,
            compiler,
            compiler_version: None,
            arch,
        }
    }

    /// Set the compiler version
    pub fn with_compiler_version(mut self, version: impl Into<String>) -> Self {
        self.compiler_version = Some(version.into());
        self
    }
}

impl fmt::Display for PlatformContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.compiler_version {
            Some(version) => write!(
                f,
                "{}/{} {}/{}",
                self.os, self.arch, self.compiler, version
            ),
            None => write!(f, "{}/{} {}", self.os, self.arch, self.compiler),
        }
    }
}
