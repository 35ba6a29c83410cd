//! CLI integration tests for the scptool binary.
//!
//! Uses `assert_cmd` to spawn the binary against fixture trees written
//! into a tempdir, verifying exit codes, stdout content, and stderr
//! content.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn scptool() -> Command {
    Command::cargo_bin("scptool").unwrap()
}

/// A small but complete fixture: two modules, a file with a directory
/// chain, and a registry item.
fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("modules.scp"),
        "Module gid_Module_Root\n\
         \tStyles = (ROOT);\n\
         End\n\
         Module gid_Module_Core\n\
         \tParentID = gid_Module_Root;\n\
         \tFiles = (gid_File_Bin);\n\
         End\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("files.scp"),
        "File gid_File_Bin\n\
         \tName = \"soffice.bin\";\n\
         \tDir = gid_Dir_Program;\n\
         End\n\
         Directory gid_Dir_Program\n\
         \tDosName = \"program\";\n\
         End\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("registry.scp"),
        "RegistryItem gid_Reg_Odt\n\
         \tModuleID = gid_Module_Core;\n\
         \tParentID = HKCR;\n\
         \tSubkey = \".odt\";\n\
         \tValue = \"opendocument\";\n\
         End\n",
    )
    .unwrap();
    dir
}

// ──────────────────────────────────────────────
// 1. Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    scptool()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("scp entity parser and linker"));
}

#[test]
fn version_exits_0() {
    scptool()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("scptool"));
}

// ──────────────────────────────────────────────
// 2. Dump subcommand
// ──────────────────────────────────────────────

#[test]
fn dump_lists_entities_in_lexical_order() {
    let dir = fixture();
    let out = scptool()
        .arg("dump")
        .arg(dir.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(out).unwrap();
    let bin = text.find("gid_File_Bin (File").unwrap();
    let root = text.find("gid_Module_Root (Module").unwrap();
    assert!(bin < root);
    assert!(text.contains("Styles = (ROOT)"));
}

#[test]
fn dump_skip_list_excludes_file() {
    let dir = fixture();
    scptool()
        .args(["dump", "--skip", "registry.scp"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("gid_Reg_Odt").not());
}

#[test]
fn dump_duplicate_entity_exits_1() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.scp"), "File gid_F End\n").unwrap();
    fs::write(dir.path().join("b.scp"), "Module gid_F End\n").unwrap();
    scptool()
        .arg("dump")
        .arg(dir.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("duplicate entity 'gid_F'"));
}

#[test]
fn dump_bad_file_is_skipped_with_diagnostic() {
    let dir = fixture();
    fs::write(dir.path().join("broken.scp"), "Garbage gid_X End\n").unwrap();
    scptool()
        .arg("dump")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("gid_Module_Root"))
        .stderr(predicate::str::contains("unknown node type"));
}

#[test]
fn dump_unterminated_string_exits_1() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.scp"), "File gid_F Name = \"oops\n").unwrap();
    scptool()
        .arg("dump")
        .arg(dir.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unterminated string literal"));
}

// ──────────────────────────────────────────────
// 3. Tree subcommand
// ──────────────────────────────────────────────

#[test]
fn tree_renders_nested_modules_with_paths() {
    let dir = fixture();
    scptool()
        .args(["tree", "--root", "gid_Module_Root"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "<module id=\"gid_Module_Root\" styles=\"(ROOT)\">",
        ))
        .stdout(predicate::str::contains(
            "path=\"program/soffice.bin\"",
        ))
        .stdout(predicate::str::contains("path=\"HKCR\\.odt\""));
}

#[test]
fn tree_unknown_root_is_reported_but_exit_0() {
    let dir = fixture();
    scptool()
        .args(["tree", "--root", "gid_Module_Nope"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("unknown tree root"));
}

#[test]
fn tree_with_settings_substitutes_variables() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("m.scp"),
        "Module gid_M Files = (gid_F); End\n\
         File gid_F Name = \"x\"; Dir = gid_D; End\n\
         Directory gid_D DosName = \"${BRAND}\"; End\n",
    )
    .unwrap();
    let settings = dir.path().join("settings.lst");
    fs::write(&settings, "Vars\n{\n    BRAND office\n}\n").unwrap();
    scptool()
        .args(["tree", "--root", "gid_M", "--settings"])
        .arg(&settings)
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("path=\"office/x\""));
}

#[test]
fn tree_with_malformed_settings_reports_and_continues() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("m.scp"),
        "Module gid_M Files = (gid_F); End\n\
         File gid_F Name = \"x\"; Dir = gid_D; End\n\
         Directory gid_D DosName = \"prog\"; End\n",
    )
    .unwrap();
    let settings = dir.path().join("settings.lst");
    // scope-open line with two tokens is a recoverable parse error
    fs::write(&settings, "Top Level {\n}\n").unwrap();
    scptool()
        .args(["tree", "--root", "gid_M", "--settings"])
        .arg(&settings)
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("path=\"prog/x\""))
        .stderr(predicate::str::contains("more than one token"));
}

#[test]
fn tree_cyclic_directory_chain_skips_file_with_diagnostic() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("m.scp"),
        "Module gid_M Files = (gid_F); End\n\
         File gid_F Name = \"x\"; Dir = gid_D1; End\n\
         Directory gid_D1 DosName = \"a\"; ParentID = gid_D2; End\n\
         Directory gid_D2 DosName = \"b\"; ParentID = gid_D1; End\n",
    )
    .unwrap();
    scptool()
        .args(["tree", "--root", "gid_M"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("<module id=\"gid_M\"/>"))
        .stderr(predicate::str::contains("cyclic"));
}

#[test]
fn tree_second_parent_exits_1() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("m.scp"),
        "Module gid_A Files = (gid_F); End\n\
         Module gid_B Files = (gid_F); End\n",
    )
    .unwrap();
    scptool()
        .args(["tree", "--root", "gid_A"])
        .arg(dir.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("already has parent"));
}

// ──────────────────────────────────────────────
// 4. Export subcommand
// ──────────────────────────────────────────────

#[test]
fn export_emits_canonical_json() {
    let dir = fixture();
    let out = scptool()
        .arg("export")
        .arg(dir.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["kind"], "ScpRegistry");
    let entities = v["entities"].as_array().unwrap();
    assert_eq!(entities.len(), 5);
    assert_eq!(entities[0]["id"], "gid_Dir_Program");
    assert_eq!(entities[0]["attributes"]["DosName"], "program");
}

// ──────────────────────────────────────────────
// 5. Output modes
// ──────────────────────────────────────────────

#[test]
fn json_output_mode_emits_structured_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.scp"), "File gid_F End\n").unwrap();
    fs::write(dir.path().join("b.scp"), "File gid_F End\n").unwrap();
    let stderr = scptool()
        .args(["--output", "json", "dump"])
        .arg(dir.path())
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&stderr).unwrap();
    assert_eq!(v["kind"], "parse");
    assert_eq!(v["severity"], "fatal");
}

#[test]
fn quiet_suppresses_text_diagnostics() {
    let dir = fixture();
    fs::write(dir.path().join("broken.scp"), "Garbage gid_X End\n").unwrap();
    scptool()
        .args(["--quiet", "dump"])
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}
