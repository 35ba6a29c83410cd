//! Registry assembly: lex and parse a fixed set of source files into one
//! global entity registry.
//!
//! Error tolerance follows the per-file policy: a file on the skip-list is
//! silently ignored; a read failure (the upstream preprocessor failed) or a
//! recoverable lex/parse error skips that one file and is reported as a
//! diagnostic; a fatal error aborts the whole run.

use crate::ast::Registry;
use crate::error::ScpError;
use crate::lexer;
use crate::parser;
use crate::source::SourceProvider;
use std::path::{Path, PathBuf};

/// A caller-supplied set of source files to ignore. Matches either the
/// full path or the bare file name.
#[derive(Debug, Default)]
pub struct SkipList {
    names: Vec<String>,
}

impl SkipList {
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        SkipList {
            names: names.into_iter().collect(),
        }
    }

    pub fn matches(&self, path: &Path) -> bool {
        let full = path.to_string_lossy();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.names.iter().any(|s| s == &name || s == full.as_ref())
    }
}

/// Load all given source files into one registry.
///
/// Returns the registry and the recoverable diagnostics collected along
/// the way, or the first fatal error.
pub fn load_registry(
    files: &[PathBuf],
    skip: &SkipList,
    provider: &dyn SourceProvider,
) -> Result<(Registry, Vec<ScpError>), ScpError> {
    let mut registry = Registry::new();
    let mut diags = Vec::new();

    for path in files {
        if skip.matches(path) {
            continue;
        }
        let name = path.to_string_lossy();
        let text = match provider.read_source(path) {
            Ok(t) => t,
            Err(e) => {
                diags.push(ScpError::parse(
                    &name,
                    0,
                    format!("cannot read preprocessed source: {}", e),
                ));
                continue;
            }
        };
        let tokens = lexer::lex(&text, &name)?;
        match parser::parse(&tokens, &name) {
            Ok(file_entities) => parser::merge(&mut registry, file_entities)?,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => diags.push(e),
        }
    }

    Ok((registry, diags))
}

/// Collect the `.scp` files under a directory, recursively, sorted for
/// deterministic load order.
pub fn collect_scp_files(dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut out = Vec::new();
    walk(dir, &mut out)?;
    out.sort();
    Ok(out)
}

fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), std::io::Error> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            walk(&path, out)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("scp") {
            out.push(path);
        }
    }
    Ok(())
}
