//! Renderers: flat attribute dump and indented XML-like tree.
//!
//! Both operate read-only over the finished registry and forest. Tree
//! rendering collects recoverable diagnostics (unknown roots, unresolvable
//! paths) into a caller-supplied vec and keeps going.

use crate::ast::{NodeType, Registry};
use crate::error::ScpError;
use crate::link::{Backing, Forest, NodeId};
use crate::paths;
use crate::vars;
use std::collections::BTreeMap;

/// One block per entity, in lexical id order. Node type, source location,
/// and the ordered value list are printed from their own fields; the
/// attribute map follows in lexical key order.
pub fn render_flat(registry: &Registry) -> String {
    let mut out = String::new();
    for entity in registry.values() {
        out.push_str(&format!(
            "{} ({}, {}:{})\n",
            entity.id,
            entity.node_type.keyword(),
            entity.prov.file,
            entity.prov.line
        ));
        if !entity.values.is_empty() {
            out.push_str(&format!("  values: {}\n", entity.values.join(" ")));
        }
        for (key, value) in &entity.attributes {
            out.push_str(&format!("  {} = {}\n", key, value));
        }
        out.push('\n');
    }
    out
}

/// Render one independent tree per root name. A root with no node, or
/// whose node has no entity data, is reported as a recoverable module
/// error and omitted.
pub fn render_tree(
    registry: &Registry,
    forest: &Forest,
    flat_vars: &BTreeMap<String, String>,
    roots: &[String],
    locale: &str,
    diags: &mut Vec<ScpError>,
) -> String {
    let mut out = String::new();
    for root in roots {
        let id = match forest.get(root) {
            Some(id) if forest.node(id).backing == Backing::Backed => id,
            _ => {
                diags.push(ScpError::module(format!(
                    "unknown tree root '{}'",
                    root
                )));
                continue;
            }
        };
        render_node(registry, forest, flat_vars, id, locale, 0, diags, &mut out);
    }
    out
}

#[allow(clippy::too_many_arguments)]
fn render_node(
    registry: &Registry,
    forest: &Forest,
    flat_vars: &BTreeMap<String, String>,
    id: NodeId,
    locale: &str,
    depth: usize,
    diags: &mut Vec<ScpError>,
    out: &mut String,
) {
    let node = forest.node(id);
    if node.backing == Backing::Unbacked {
        return;
    }
    let entity = match registry.get(&node.name) {
        Some(e) => e,
        None => return,
    };

    let mut attrs: Vec<(&str, String)> = vec![("id", entity.id.clone())];

    match entity.node_type {
        NodeType::Module | NodeType::Profile => {
            if let Some(styles) = entity.attr("Styles") {
                attrs.push(("styles", styles.to_owned()));
            }
        }
        NodeType::File => {
            if let Some(rights) = entity.attr("UnixRights") {
                attrs.push(("unix-rights", rights.to_owned()));
            }
            if let Some(styles) = entity.attr("Styles") {
                attrs.push(("styles", styles.to_owned()));
            }
            if !push_resolved_path(registry, flat_vars, entity, locale, &mut attrs, diags) {
                return;
            }
        }
        NodeType::Unixlink => {
            if let Some(target) = entity.attr("Target") {
                attrs.push(("target", vars::substitute(target, flat_vars)));
            }
            if !push_resolved_path(registry, flat_vars, entity, locale, &mut attrs, diags) {
                return;
            }
        }
        NodeType::ProfileItem => {
            if let Some(section) = entity.attr("Section") {
                attrs.push(("section", section.to_owned()));
            }
            if let Some(key) = entity.attr("Key") {
                attrs.push(("key", key.to_owned()));
            }
            if let Some(value) = entity.attr("Value") {
                attrs.push(("value", vars::substitute(value, flat_vars)));
            }
        }
        NodeType::RegistryItem => {
            let parent = entity.attr("ParentID").unwrap_or_default();
            let subkey = entity.attr("Subkey").unwrap_or_default();
            attrs.push(("path", format!("{}\\{}", parent, subkey)));
            if let Some((value, _)) = entity.attr_localized("Value", locale) {
                attrs.push(("value", value.to_owned()));
            }
        }
        _ => {}
    }

    // Children first: an element whose children all get skipped
    // self-closes like a leaf.
    let mut child_ids: Vec<NodeId> = node.children.clone();
    child_ids.sort_by(|&a, &b| forest.node(a).name.cmp(&forest.node(b).name));
    let mut body = String::new();
    for child in child_ids {
        render_node(
            registry, forest, flat_vars, child, locale, depth + 1, diags, &mut body,
        );
    }

    let indent = "  ".repeat(depth);
    let tag = entity.node_type.tag();
    let attr_text: String = attrs
        .iter()
        .map(|(k, v)| format!(" {}=\"{}\"", k, v))
        .collect();
    if body.is_empty() {
        out.push_str(&format!("{}<{}{}/>\n", indent, tag, attr_text));
    } else {
        out.push_str(&format!("{}<{}{}>\n", indent, tag, attr_text));
        out.push_str(&body);
        out.push_str(&format!("{}</{}>\n", indent, tag));
    }
}

/// Resolve the installed path for a file-like entity. Returns false when
/// resolution failed; the error is logged and the node must be skipped.
fn push_resolved_path(
    registry: &Registry,
    flat_vars: &BTreeMap<String, String>,
    entity: &crate::ast::Entity,
    locale: &str,
    attrs: &mut Vec<(&str, String)>,
    diags: &mut Vec<ScpError>,
) -> bool {
    match paths::resolve_path(registry, flat_vars, &entity.id, locale) {
        Ok(resolved) => {
            attrs.push(("path", resolved.path));
            if resolved.localized {
                attrs.push(("locale", locale.to_owned()));
            }
            true
        }
        Err(e) => {
            diags.push(e);
            false
        }
    }
}
