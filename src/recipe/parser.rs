// src/recipe/parser.rs

//! Recipe descriptor parsing and template-driven construction

use crate::error::{Error, Result};
use crate::recipe::format::RecipeDescriptor;
use crate::recipe::template::{Rendered, SubstitutionContext, render};
use std::path::Path;

/// Parse a recipe descriptor from a TOML string
///
/// Parsing alone does not validate; call
/// [`RecipeDescriptor::validate`] before resolving. The file and
/// template constructors below validate eagerly.
pub fn parse_descriptor(content: &str) -> Result<RecipeDescriptor> {
    toml::from_str(content).map_err(|e| Error::ParseError(format!("Invalid recipe: {}", e)))
}

/// Parse and validate a recipe descriptor from a file
pub fn parse_descriptor_file(path: &Path) -> Result<RecipeDescriptor> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::IoError(format!("Failed to read recipe file: {}", e)))?;

    let descriptor = parse_descriptor(&content)?;
    descriptor.validate()?;
    Ok(descriptor)
}

/// Construct a descriptor by rendering a template and parsing the result
///
/// Substitution runs before parsing and validation, so an unresolved
/// placeholder surfaces as `UnresolvedPlaceholder` rather than as a
/// spurious field error. Returns the descriptor together with any
/// unused-context-key warnings from rendering.
pub fn descriptor_from_template(
    template: &str,
    ctx: &SubstitutionContext,
) -> Result<(RecipeDescriptor, Vec<String>)> {
    let Rendered { text, warnings } = render(template, ctx)?;

    let descriptor = parse_descriptor(&text)?;
    descriptor.validate()?;
    Ok((descriptor, warnings))
}
