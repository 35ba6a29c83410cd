//! Shared entity types for the scp pipeline.
//!
//! These types are produced by the parser and consumed by the linker,
//! path resolver, and renderers. They live here so that later stages can
//! import them without depending on the parser.

use std::collections::BTreeMap;

// ──────────────────────────────────────────────
// Provenance
// ──────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Provenance {
    pub file: String,
    pub line: u32,
}

// ──────────────────────────────────────────────
// Node types
// ──────────────────────────────────────────────

/// The fixed category of an entity. Only `File`, `Module`, `RegistryItem`,
/// `Shortcut`, `Unixlink`, `Profile`, and `ProfileItem` participate in
/// linking and tree rendering; the rest are parsed but inert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    DataCarrier,
    Directory,
    File,
    Folder,
    FolderItem,
    Installation,
    Module,
    Profile,
    ProfileItem,
    RegistryItem,
    ScpAction,
    Shortcut,
    StarRegistry,
    Unixlink,
    WindowsCustomAction,
}

impl NodeType {
    /// The keyword opening an entity block in scp source.
    pub fn keyword(&self) -> &'static str {
        match self {
            NodeType::DataCarrier => "DataCarrier",
            NodeType::Directory => "Directory",
            NodeType::File => "File",
            NodeType::Folder => "Folder",
            NodeType::FolderItem => "FolderItem",
            NodeType::Installation => "Installation",
            NodeType::Module => "Module",
            NodeType::Profile => "Profile",
            NodeType::ProfileItem => "ProfileItem",
            NodeType::RegistryItem => "RegistryItem",
            NodeType::ScpAction => "ScpAction",
            NodeType::Shortcut => "Shortcut",
            NodeType::StarRegistry => "StarRegistry",
            NodeType::Unixlink => "Unixlink",
            NodeType::WindowsCustomAction => "WindowsCustomAction",
        }
    }

    /// Kebab-case element tag used by the tree renderer.
    pub fn tag(&self) -> &'static str {
        match self {
            NodeType::DataCarrier => "data-carrier",
            NodeType::Directory => "directory",
            NodeType::File => "file",
            NodeType::Folder => "folder",
            NodeType::FolderItem => "folder-item",
            NodeType::Installation => "installation",
            NodeType::Module => "module",
            NodeType::Profile => "profile",
            NodeType::ProfileItem => "profile-item",
            NodeType::RegistryItem => "registry-item",
            NodeType::ScpAction => "scp-action",
            NodeType::Shortcut => "shortcut",
            NodeType::StarRegistry => "star-registry",
            NodeType::Unixlink => "unixlink",
            NodeType::WindowsCustomAction => "windows-custom-action",
        }
    }

    pub fn from_keyword(word: &str) -> Option<NodeType> {
        Some(match word {
            "DataCarrier" => NodeType::DataCarrier,
            "Directory" => NodeType::Directory,
            "File" => NodeType::File,
            "Folder" => NodeType::Folder,
            "FolderItem" => NodeType::FolderItem,
            "Installation" => NodeType::Installation,
            "Module" => NodeType::Module,
            "Profile" => NodeType::Profile,
            "ProfileItem" => NodeType::ProfileItem,
            "RegistryItem" => NodeType::RegistryItem,
            "ScpAction" => NodeType::ScpAction,
            "Shortcut" => NodeType::Shortcut,
            "StarRegistry" => NodeType::StarRegistry,
            "Unixlink" => NodeType::Unixlink,
            "WindowsCustomAction" => NodeType::WindowsCustomAction,
            _ => return None,
        })
    }
}

// ──────────────────────────────────────────────
// Entities
// ──────────────────────────────────────────────

/// One declared `NodeType Name ... End` block.
///
/// Node type, source location, and the ordered bare-value list are real
/// fields rather than synthetic attribute keys, so renderers never have to
/// filter bookkeeping entries out of `attributes`.
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: String,
    pub node_type: NodeType,
    /// Bare (non key=value) tokens in body order.
    pub values: Vec<String>,
    /// Attribute keys are stored with inter-token whitespace dropped, so a
    /// localized `Name (en-US) = ...;` declaration is looked up as
    /// `Name(en-US)`.
    pub attributes: BTreeMap<String, String>,
    /// `Files = (a,b,c);` parsed into its members at construction time.
    pub file_refs: Vec<String>,
    /// `Unixlinks = (a,b,c);` parsed into its members at construction time.
    pub unixlink_refs: Vec<String>,
    pub prov: Provenance,
}

impl Entity {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Locale fallback: the exact key first, then `Key(<locale>)`.
    /// The bool is true when the localized variant was used.
    pub fn attr_localized(&self, key: &str, locale: &str) -> Option<(&str, bool)> {
        if let Some(v) = self.attr(key) {
            return Some((v, false));
        }
        self.attr(&format!("{}({})", key, locale)).map(|v| (v, true))
    }
}

/// All entities of one parse run, keyed by id. BTreeMap keeps the flat
/// dump and the linker deterministic without extra sorting.
pub type Registry = BTreeMap<String, Entity>;
