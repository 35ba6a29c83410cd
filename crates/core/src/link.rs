//! Entity linker: relation rules per node type -> linkage forest.
//!
//! The forest is an arena: a flat `Vec<LinkedNode>` plus a name -> id map,
//! so parent/child edges are indices rather than owned subtrees. A name
//! that is referenced but never declared gets an `Unbacked` node, which
//! renderers skip instead of crashing. Every node's parent is set at most
//! once, so the structure cannot contain cycles.

use crate::ast::{Entity, NodeType, Registry};
use crate::error::ScpError;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Whether a linked node has entity data behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backing {
    Backed,
    /// Referenced by some relation but never declared
    Unbacked,
}

#[derive(Debug)]
pub struct LinkedNode {
    pub name: String,
    pub backing: Backing,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Default)]
pub struct Forest {
    nodes: Vec<LinkedNode>,
    by_name: HashMap<String, NodeId>,
}

impl Forest {
    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    pub fn node(&self, id: NodeId) -> &LinkedNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn intern(&mut self, name: &str, backing: Backing) -> NodeId {
        if let Some(&id) = self.by_name.get(name) {
            if backing == Backing::Backed {
                self.nodes[id.0].backing = Backing::Backed;
            }
            return id;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(LinkedNode {
            name: name.to_owned(),
            backing,
            parent: None,
            children: Vec::new(),
        });
        self.by_name.insert(name.to_owned(), id);
        id
    }

    /// Attach `child` under `parent`. The parent link is set-once: any
    /// second assignment, including re-attaching the same parent, fails.
    fn attach(&mut self, child: &str, parent: &str, entity: &Entity) -> Result<(), ScpError> {
        let parent_id = self.intern(parent, Backing::Unbacked);
        let child_id = self.intern(child, Backing::Unbacked);
        if let Some(existing) = self.nodes[child_id.0].parent {
            return Err(ScpError::link(
                &entity.prov.file,
                entity.prov.line,
                format!(
                    "node '{}' already has parent '{}', cannot attach under '{}'",
                    child,
                    self.nodes[existing.0].name,
                    parent
                ),
            ));
        }
        self.nodes[child_id.0].parent = Some(parent_id);
        self.nodes[parent_id.0].children.push(child_id);
        Ok(())
    }
}

/// A required relation attribute, or a fatal link error naming it.
fn required<'e>(entity: &'e Entity, key: &str) -> Result<&'e str, ScpError> {
    entity.attr(key).ok_or_else(|| {
        ScpError::link(
            &entity.prov.file,
            entity.prov.line,
            format!(
                "{} '{}' is missing required attribute '{}'",
                entity.node_type.keyword(),
                entity.id,
                key
            ),
        )
    })
}

/// Build the linkage forest over all entities of the registry.
pub fn link(registry: &Registry) -> Result<Forest, ScpError> {
    let mut forest = Forest::default();

    for entity in registry.values() {
        match entity.node_type {
            NodeType::Module => {
                forest.intern(&entity.id, Backing::Backed);
                if let Some(parent) = entity.attr("ParentID") {
                    forest.attach(&entity.id, parent, entity)?;
                }
                for file in &entity.file_refs {
                    forest.attach(file, &entity.id, entity)?;
                }
                for unixlink in &entity.unixlink_refs {
                    forest.attach(unixlink, &entity.id, entity)?;
                }
            }
            NodeType::RegistryItem => {
                forest.intern(&entity.id, Backing::Backed);
                let parent = required(entity, "ModuleID")?.to_owned();
                forest.attach(&entity.id, &parent, entity)?;
            }
            NodeType::Shortcut => {
                forest.intern(&entity.id, Backing::Backed);
                let parent = required(entity, "FileID")?.to_owned();
                forest.attach(&entity.id, &parent, entity)?;
            }
            NodeType::Profile => {
                forest.intern(&entity.id, Backing::Backed);
                let parent = required(entity, "ModuleID")?.to_owned();
                forest.attach(&entity.id, &parent, entity)?;
            }
            NodeType::ProfileItem => {
                forest.intern(&entity.id, Backing::Backed);
                let parent = required(entity, "ProfileID")?.to_owned();
                forest.attach(&entity.id, &parent, entity)?;
            }
            // File and Unixlink nodes are attached by their owning
            // Module's list; everything else stays edge-free.
            _ => {}
        }
    }

    // Second pass: a node attached before its entity was reached (or a
    // file listed by a module declared earlier in sort order) is backed
    // after all, whatever order the attachments ran in.
    for entity in registry.values() {
        if let Some(id) = forest.get(&entity.id) {
            forest.nodes[id.0].backing = Backing::Backed;
        }
    }

    Ok(forest)
}
