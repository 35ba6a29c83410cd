//! scptool-core: installer-script (scp) entity parser and linker.
//!
//! Reads preprocessed scp definition files (`NodeType Name attr=value; ...
//! End` blocks), turns them into typed entities, links the entities into
//! navigable trees by per-type relation rules, resolves installed paths
//! through directory chains with locale fallback, and renders the result
//! as a flat dump, an indented tree, or a canonical JSON export.
//!
//! # Pipeline
//!
//! - [`lexer::lex`] -- source text to token stream
//! - [`parser::parse`] / [`parser::merge`] -- tokens to an entity registry
//! - [`load::load_registry`] -- multi-file assembly with skip-list and
//!   per-file error tolerance
//! - [`link::link`] -- registry to linkage forest
//! - [`paths::resolve_path`] -- installed-path resolution
//! - [`render::render_flat`] / [`render::render_tree`] -- text output
//! - [`export::to_json`] -- the stable read-only JSON surface
//!
//! Everything is single-threaded batch work: one run loads a fixed file
//! set, builds the registry and forest once, renders, and is done.

/// Version stamped into the JSON export envelope.
pub const SCP_EXPORT_VERSION: &str = "1.0";

pub mod ast;
pub mod error;
pub mod export;
pub mod lexer;
pub mod link;
pub mod load;
pub mod parser;
pub mod paths;
pub mod render;
pub mod source;
pub mod vars;

// ── Convenience re-exports: key types ────────────────────────────────

pub use ast::{Entity, NodeType, Provenance, Registry};
pub use error::{ErrorKind, ScpError, Severity};
pub use link::{Backing, Forest, LinkedNode, NodeId};
pub use load::SkipList;
pub use paths::{ResolvedPath, PREDEFINED_PROGDIR};
pub use source::{FileSystemProvider, InMemoryProvider, SourceProvider};
pub use vars::VariableStore;

// ── Convenience re-exports: pipeline entry points ────────────────────

pub use export::to_json;
pub use lexer::lex;
pub use link::link;
pub use load::{collect_scp_files, load_registry};
pub use parser::{merge, parse};
pub use paths::resolve_path;
pub use render::{render_flat, render_tree};
pub use vars::substitute;
