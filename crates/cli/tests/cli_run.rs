// End-to-end tests driving the built `armorsmith` binary against a copy of
// the engine fixtures.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn armorsmith() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_armorsmith"));
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../recon/tests/fixtures")
}

/// Fresh copy of the fixture tree so runs can write their artifacts.
fn workspace() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    copy_dir(&fixtures_dir(), dir.path());
    dir
}

fn copy_dir(from: &Path, to: &Path) {
    std::fs::create_dir_all(to).unwrap();
    for entry in std::fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let target = to.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            std::fs::copy(entry.path(), target).unwrap();
        }
    }
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn config_arg(dir: &Path) -> String {
    dir.join("armorsmith.toml").to_str().unwrap().to_string()
}

// ===========================================================================
// armorsmith run
// ===========================================================================

#[test]
fn run_writes_patch_and_guesses() {
    let dir = workspace();
    let output = armorsmith().args(["run", &config_arg(dir.path())]).output().unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let patch: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("out/ArmorsmithPatch.esp")).unwrap(),
    )
    .unwrap();
    let items = patch["items"].as_array().unwrap();
    assert_eq!(items.len(), 5);
    assert!(items.iter().all(|i| i["editorId"] != "Armor_Mystery"));
    assert_eq!(patch["models"].as_array().unwrap().len(), 2);
    assert_eq!(patch["recipes"].as_array().unwrap().len(), 2);

    let guesses = std::fs::read_to_string(dir.path().join("out/guesses.csv")).unwrap();
    assert_eq!(
        guesses,
        "fileName,armorEditorID,slotKeyword\r\nFallout4.esm,Armor_Mystery,_ArmorSlotGloves_Slot34\r\n"
    );

    let err = stderr(&output);
    assert!(err.contains("8 items considered, 5 patched"), "stderr: {err}");
    assert!(err.contains("overrides: 1 of 2 source(s) failed to load"), "stderr: {err}");
}

#[test]
fn dry_run_json_writes_nothing() {
    let dir = workspace();
    let output = armorsmith()
        .args(["run", &config_arg(dir.path()), "--dry-run", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let report: serde_json::Value = serde_json::from_str(stdout.trim())
        .unwrap_or_else(|e| panic!("stdout must be one JSON value: {e}\n{stdout}"));
    assert_eq!(report["meta"]["patchFileName"], "ArmorsmithPatch.esp");
    assert_eq!(report["summary"]["itemsPatched"], 5);
    assert_eq!(report["guesses"][0]["armorEditorID"], "Armor_Mystery");

    assert!(!dir.path().join("out").exists());
}

#[test]
fn output_flag_writes_report() {
    let dir = workspace();
    let report_path = dir.path().join("reports/run.json");
    let output = armorsmith()
        .args(["run", &config_arg(dir.path()), "--output", report_path.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(output.stdout.is_empty());

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["summary"]["modelsUpdated"], 2);
    assert_eq!(report["summary"]["recipesPatched"], 2);
}

#[test]
fn second_run_over_patched_snapshot_is_empty() {
    let dir = workspace();
    let first = armorsmith().args(["run", &config_arg(dir.path())]).output().unwrap();
    assert!(first.status.success(), "stderr: {}", stderr(&first));

    // Merge the patch back over the snapshot and run again.
    let records: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("records.json")).unwrap())
            .unwrap();
    let patch: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("out/ArmorsmithPatch.esp")).unwrap(),
    )
    .unwrap();
    let mut merged = records.clone();
    for kind in ["items", "models", "recipes"] {
        let slot = merged[kind].as_array_mut().unwrap();
        for patched in patch[kind].as_array().unwrap() {
            let existing = slot
                .iter_mut()
                .find(|r| r["editorId"] == patched["editorId"])
                .unwrap();
            *existing = patched.clone();
        }
    }
    std::fs::write(dir.path().join("records.json"), merged.to_string()).unwrap();

    let second = armorsmith()
        .args(["run", &config_arg(dir.path()), "--json"])
        .output()
        .unwrap();
    assert!(second.status.success(), "stderr: {}", stderr(&second));
    let report: serde_json::Value =
        serde_json::from_str(String::from_utf8_lossy(&second.stdout).trim()).unwrap();
    assert_eq!(report["summary"]["itemsPatched"], 0);
    assert_eq!(report["summary"]["itemsUnchanged"], 5);

    let patch: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("out/ArmorsmithPatch.esp")).unwrap(),
    )
    .unwrap();
    assert!(patch["items"].as_array().unwrap().is_empty());
}

#[test]
fn unwritable_guess_report_is_not_fatal() {
    let dir = workspace();
    let config = dir.path().join("armorsmith.toml");
    let text = std::fs::read_to_string(&config)
        .unwrap()
        .replace("guesses = \"out/guesses.csv\"", "guesses = \"records.json/guesses.csv\"");
    std::fs::write(&config, text).unwrap();

    let output = armorsmith().args(["run", config.to_str().unwrap()]).output().unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(dir.path().join("out/ArmorsmithPatch.esp").exists());

    let err = stderr(&output);
    assert!(err.contains("cannot create guess report directory"), "stderr: {err}");
    assert!(err.contains("failed to write guess report"), "stderr: {err}");
}

#[test]
fn missing_snapshot_is_runtime_error() {
    let dir = workspace();
    std::fs::remove_file(dir.path().join("records.json")).unwrap();
    let output = armorsmith().args(["run", &config_arg(dir.path())]).output().unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("hint:"));
}

#[test]
fn missing_config_is_runtime_error() {
    let output = armorsmith().args(["run", "does/not/exist.toml"]).output().unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("cannot read config"));
}

// ===========================================================================
// armorsmith validate
// ===========================================================================

#[test]
fn validate_reports_counts_and_failed_sources() {
    let dir = workspace();
    let output = armorsmith().args(["validate", &config_arg(dir.path())]).output().unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let err = stderr(&output);
    assert!(err.contains("valid: 'ArmorsmithPatch.esp' with 10 slot descriptor(s)"), "stderr: {err}");
    assert!(err.contains("override source 'Broken.esp' ignored"), "stderr: {err}");
}

#[test]
fn validate_rejects_unknown_key() {
    let dir = workspace();
    let config = dir.path().join("armorsmith.toml");
    let mut text = std::fs::read_to_string(&config).unwrap();
    text.insert_str(0, "weave_only = true\n");
    std::fs::write(&config, text).unwrap();

    let output = armorsmith().args(["validate", config.to_str().unwrap()]).output().unwrap();
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn validate_rejects_broken_taxonomy() {
    let dir = workspace();
    std::fs::write(
        dir.path().join("slotData.csv"),
        "keyword,identifySlots,mandatorySlots,allowedSlots,isArmored,isOutfit\n\
         _ArmorSlotGloves_Slot34,34,34,34,Y,\n\
         _ArmorSlotGloves_Slot34,34,34,34,Y,\n",
    )
    .unwrap();

    let output = armorsmith().args(["validate", &config_arg(dir.path())]).output().unwrap();
    assert_eq!(output.status.code(), Some(3));
}

// ===========================================================================
// armorsmith slots
// ===========================================================================

#[test]
fn slots_converts_both_ways() {
    let output = armorsmith().args(["slots", "30,31"]).output().unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "0x00000003");

    let output = armorsmith().args(["slots", "0x00010001"]).output().unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "30,46");
}

#[test]
fn slots_rejects_out_of_range() {
    let output = armorsmith().args(["slots", "30,99"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("outside 30-61"));
}
