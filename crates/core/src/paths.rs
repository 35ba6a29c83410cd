//! Path resolver: compute the absolute installed path of a file-like
//! entity by walking the `Dir`/`ParentID` chain upward through directory
//! entities.
//!
//! Every failure here is recoverable: the caller reports it and skips the
//! one node instead of aborting the run.

use crate::ast::Registry;
use crate::error::ScpError;
use crate::vars;
use std::collections::BTreeMap;

/// The directory sentinel that terminates a walk without being resolved
/// as an entity; it is prepended as a literal path segment.
pub const PREDEFINED_PROGDIR: &str = "PREDEFINED_PROGDIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub path: String,
    /// True when the entity's own name came from the locale-qualified
    /// `Name(<locale>)` attribute rather than plain `Name`.
    pub localized: bool,
}

/// Resolve the installed path of `entity_name` for `locale`, substituting
/// `${VAR}` placeholders from `flat_vars` at the end.
pub fn resolve_path(
    registry: &Registry,
    flat_vars: &BTreeMap<String, String>,
    entity_name: &str,
    locale: &str,
) -> Result<ResolvedPath, ScpError> {
    let entity = registry.get(entity_name).ok_or_else(|| {
        ScpError::dir("", 0, format!("no entity data for '{}'", entity_name))
    })?;

    let (own_name, localized) =
        entity.attr_localized("Name", locale).ok_or_else(|| {
            ScpError::dir(
                &entity.prov.file,
                entity.prov.line,
                format!(
                    "entity '{}' has neither 'Name' nor 'Name({})'",
                    entity_name, locale
                ),
            )
        })?;

    let mut path = own_name.to_owned();
    let mut current = entity
        .attr("Dir")
        .ok_or_else(|| {
            ScpError::dir(
                &entity.prov.file,
                entity.prov.line,
                format!("entity '{}' has no 'Dir' attribute", entity_name),
            )
        })?
        .to_owned();

    // The walk follows raw ParentID attributes, which nothing upstream
    // guarantees to be acyclic: directory entities never enter the
    // linkage forest, so the set-once-parent invariant does not apply
    // here.
    let mut visited: std::collections::HashSet<String> = std::collections::HashSet::new();

    loop {
        if !visited.insert(current.clone()) {
            return Err(ScpError::dir(
                &entity.prov.file,
                entity.prov.line,
                format!(
                    "directory chain from '{}' is cyclic at '{}'",
                    entity_name, current
                ),
            ));
        }
        if current == PREDEFINED_PROGDIR {
            path = format!("{}/{}", PREDEFINED_PROGDIR, path);
            break;
        }
        let dir = registry.get(&current).ok_or_else(|| {
            ScpError::dir(
                &entity.prov.file,
                entity.prov.line,
                format!(
                    "directory '{}' referenced from '{}' has no entity data",
                    current, entity_name
                ),
            )
        })?;
        let segment = dir
            .attr("DosName")
            .or_else(|| dir.attr("DosName(en-US)"))
            .or_else(|| dir.attr("HostName"))
            .ok_or_else(|| {
                ScpError::dir(
                    &dir.prov.file,
                    dir.prov.line,
                    format!(
                        "directory '{}' has none of DosName, DosName(en-US), HostName",
                        current
                    ),
                )
            })?;
        path = format!("{}/{}", segment, path);
        match dir.attr("ParentID") {
            Some(parent) => current = parent.to_owned(),
            None => break,
        }
    }

    Ok(ResolvedPath {
        path: vars::substitute(&path, flat_vars),
        localized,
    })
}
