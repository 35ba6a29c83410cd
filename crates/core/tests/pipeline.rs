//! End-to-end pipeline tests over the in-memory provider: load several
//! scp files, link, resolve paths, and render, checking the observable
//! properties of each stage together.

use scptool_core::{
    link, load_registry, render_flat, render_tree, resolve_path, InMemoryProvider, Registry,
    SkipList, VariableStore,
};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

const MODULES_SCP: &str = "\
Module gid_Module_Root
    Name = \"Office Suite\";
    Styles = (ROOT);
End

Module gid_Module_Core
    ParentID = gid_Module_Root;
    Files = (gid_File_Bin, gid_File_Readme);
End
";

const FILES_SCP: &str = "\
File gid_File_Bin
    Name = \"soffice.bin\";
    Dir = gid_Dir_Program;
    UnixRights = 755;
End

File gid_File_Readme
    Name (en-US) = \"readme.txt\";
    Dir = gid_Dir_Program;
End

Directory gid_Dir_Program
    DosName = \"program\";
    ParentID = gid_Dir_Brand;
End

Directory gid_Dir_Brand
    DosName = \"${BRANDDIR}\";
End
";

const SETTINGS: &str = "\
Globals
{
    Settings
    {
        PRODUCTNAME Office Suite
        BRANDDIR office
    }
}
";

fn provider() -> InMemoryProvider {
    let mut files = HashMap::new();
    files.insert(PathBuf::from("modules.scp"), MODULES_SCP.to_string());
    files.insert(PathBuf::from("files.scp"), FILES_SCP.to_string());
    InMemoryProvider::new(files)
}

fn load() -> Registry {
    let files = vec![PathBuf::from("files.scp"), PathBuf::from("modules.scp")];
    let (reg, diags) = load_registry(&files, &SkipList::default(), &provider()).unwrap();
    assert!(diags.is_empty());
    reg
}

#[test]
fn full_pipeline_flat_dump() {
    let reg = load();
    assert_eq!(reg.len(), 6);
    let out = render_flat(&reg);
    let blocks: Vec<&str> = out.split("\n\n").filter(|b| !b.is_empty()).collect();
    assert_eq!(blocks.len(), 6);
    // lexical order, each block prefixed by its entity id
    assert!(blocks[0].starts_with("gid_Dir_Brand"));
    assert!(blocks[5].starts_with("gid_Module_Root"));
    assert!(out.contains("Name = soffice.bin"));
    assert!(out.contains("(File, files.scp:"));
}

#[test]
fn full_pipeline_path_resolution_with_variables() {
    let reg = load();
    let store = VariableStore::load(SETTINGS, "settings.lst").unwrap();
    let flat = store.flatten();

    let bin = resolve_path(&reg, &flat, "gid_File_Bin", "en-US").unwrap();
    assert_eq!(bin.path, "office/program/soffice.bin");
    assert!(!bin.localized);

    let readme = resolve_path(&reg, &flat, "gid_File_Readme", "en-US").unwrap();
    assert_eq!(readme.path, "office/program/readme.txt");
    assert!(readme.localized);
}

#[test]
fn full_pipeline_tree_render() {
    let reg = load();
    let forest = link(&reg).unwrap();
    let store = VariableStore::load(SETTINGS, "settings.lst").unwrap();
    let mut diags = Vec::new();
    let out = render_tree(
        &reg,
        &forest,
        &store.flatten(),
        &["gid_Module_Root".to_string()],
        "en-US",
        &mut diags,
    );
    assert!(diags.is_empty());
    assert!(out.starts_with("<module id=\"gid_Module_Root\" styles=\"(ROOT)\">"));
    assert!(out.contains("<module id=\"gid_Module_Core\">"));
    assert!(out.contains(
        "<file id=\"gid_File_Bin\" unix-rights=\"755\" path=\"office/program/soffice.bin\"/>"
    ));
    assert!(out.contains(
        "<file id=\"gid_File_Readme\" path=\"office/program/readme.txt\" locale=\"en-US\"/>"
    ));
    assert!(out.trim_end().ends_with("</module>"));
}

#[test]
fn skip_list_excludes_whole_file() {
    let files = vec![PathBuf::from("files.scp"), PathBuf::from("modules.scp")];
    let skip = SkipList::new(["modules.scp".to_string()]);
    let (reg, diags) = load_registry(&files, &skip, &provider()).unwrap();
    assert!(diags.is_empty());
    assert_eq!(reg.len(), 4);
    assert!(!reg.contains_key("gid_Module_Root"));
}

#[test]
fn duplicate_across_files_is_fatal() {
    let mut files = HashMap::new();
    files.insert(PathBuf::from("a.scp"), "File gid_F End".to_string());
    files.insert(PathBuf::from("b.scp"), "Module gid_F End".to_string());
    let provider = InMemoryProvider::new(files);
    let list = vec![PathBuf::from("a.scp"), PathBuf::from("b.scp")];
    let err = load_registry(&list, &SkipList::default(), &provider).unwrap_err();
    assert!(err.is_fatal());
    assert!(err.message.contains("duplicate entity 'gid_F'"));
}

#[test]
fn tree_over_undeclared_root_names_is_empty() {
    let reg = load();
    let forest = link(&reg).unwrap();
    let mut diags = Vec::new();
    let out = render_tree(
        &reg,
        &forest,
        &BTreeMap::new(),
        &["gid_Module_Missing".to_string()],
        "en-US",
        &mut diags,
    );
    assert!(out.is_empty());
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].kind, scptool_core::ErrorKind::Module);
}
