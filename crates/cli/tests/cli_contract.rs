use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

fn write_script(dir: &Path, steps: Value) -> PathBuf {
    let path = dir.join("script.json");
    std::fs::write(&path, json!({ "steps": steps }).to_string()).expect("script should be written");
    path
}

fn replay(script: &Path, extra: &[&str]) -> Value {
    let output = cargo_bin_cmd!("pdf-annotator")
        .arg("replay")
        .arg(script)
        .args(extra)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&output).expect("stdout should contain valid json")
}

fn rectangle_steps() -> Value {
    json!([
        { "action": "init_canvas", "page": 1 },
        { "action": "activate", "kind": "rectangle" },
        { "action": "pointer", "page": 1, "phase": "down", "x": 100.0, "y": 100.0 },
        { "action": "pointer", "page": 1, "phase": "move", "x": 160.0, "y": 140.0 },
        { "action": "pointer", "page": 1, "phase": "up", "x": 200.0, "y": 150.0 }
    ])
}

#[test]
fn replay_rectangle_writes_one_ink_entry() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let script = write_script(temp.path(), rectangle_steps());

    let value = replay(&script, &[]);

    let added = value["added"].as_array().expect("added should be an array");
    assert_eq!(added.len(), 1);
    let id = added[0].as_str().expect("id should be a string");

    let storage = value["storage"].as_object().expect("storage should be an object");
    assert_eq!(storage.len(), 1);
    assert_eq!(storage[id]["annotationType"], 15);
    assert_eq!(storage[id]["pageIndex"], 0);
    assert_eq!(value["mode"], "painting");
    assert!(value.get("records").is_none());
}

#[test]
fn replay_on_quarter_turned_page_maps_to_user_space() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let mut steps = rectangle_steps();
    steps[0] = json!({ "action": "init_canvas", "page": 1, "rotation": 90 });
    let script = write_script(temp.path(), steps);

    let value = replay(&script, &[]);

    let entry = value["storage"]
        .as_object()
        .and_then(|storage| storage.values().next())
        .expect("one entry");
    assert_eq!(entry["rotation"], 90);
    // Displayed x runs along PDF y on a quarter-turned page.
    assert_eq!(entry["rect"], json!([99.0, 99.0, 151.0, 201.0]));
}

#[test]
fn replay_delete_removes_last_added() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let mut steps = rectangle_steps();
    let list = steps.as_array_mut().expect("steps should be an array");
    list.push(json!({ "action": "flush" }));
    list.push(json!({ "action": "delete" }));
    let script = write_script(temp.path(), steps);

    let value = replay(&script, &["--records"]);

    assert_eq!(value["storage"].as_object().map(|s| s.len()), Some(0));
    assert_eq!(value["records"].as_array().map(Vec::len), Some(0));
}

#[test]
fn replay_text_selection_adds_highlight() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let script = write_script(
        temp.path(),
        json!([
            { "action": "init_canvas", "page": 1, "scale": 2.0 },
            { "action": "activate", "kind": "highlight" },
            { "action": "selection", "ranges": [{
                "pageNumber": 1,
                "rects": [
                    { "x": 20.0, "y": 40.0, "width": 60.0, "height": 20.0 },
                    { "x": 80.0, "y": 40.0, "width": 40.0, "height": 20.0 }
                ]
            }]}
        ]),
    );

    let value = replay(&script, &["--records"]);

    assert_eq!(value["mode"], "selection");
    let storage = value["storage"].as_object().expect("storage should be an object");
    assert_eq!(storage.len(), 1);
    let entry = storage.values().next().expect("one entry");
    assert_eq!(entry["annotationType"], 9);
    assert_eq!(value["records"][0]["kind"], "highlight");
}

#[test]
fn replay_stamp_from_image_file() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    image::RgbaImage::new(40, 20)
        .save(temp.path().join("stamp.png"))
        .expect("png should be written");
    let script = write_script(
        temp.path(),
        json!([
            { "action": "init_canvas", "page": 2 },
            { "action": "activate", "kind": "stamp", "once": true, "transfer_file": "stamp.png" },
            { "action": "pointer", "page": 2, "phase": "down", "x": 200.0, "y": 200.0 }
        ]),
    );

    let value = replay(&script, &[]);

    assert_eq!(value["mode"], "default");
    let storage = value["storage"].as_object().expect("storage should be an object");
    let entry = storage.values().next().expect("one entry");
    assert_eq!(entry["annotationType"], 13);
    assert_eq!(entry["pageIndex"], 1);
}

#[test]
fn replay_reports_failing_step() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let script = write_script(temp.path(), json!([{ "action": "delete" }]));

    cargo_bin_cmd!("pdf-annotator")
        .arg("replay")
        .arg(&script)
        .assert()
        .failure()
        .stderr(predicate::str::contains("step 1 failed"))
        .stderr(predicate::str::contains("nothing to delete"));
}

#[test]
fn replay_missing_script_fails() {
    cargo_bin_cmd!("pdf-annotator")
        .arg("replay")
        .arg("/definitely/missing/script.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("file does not exist"));
}

#[test]
fn kinds_lists_modes() {
    let output = cargo_bin_cmd!("pdf-annotator")
        .arg("kinds")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value: Value = serde_json::from_slice(&output).expect("stdout should contain valid json");
    let kinds = value.as_array().expect("kinds should be an array");
    assert_eq!(kinds.len(), 11);

    let highlight = kinds
        .iter()
        .find(|k| k["kind"] == "highlight")
        .expect("highlight listed");
    assert_eq!(highlight["mode"], "selection");
    assert_eq!(highlight["text_markup"], true);

    let signature = kinds
        .iter()
        .find(|k| k["kind"] == "signature")
        .expect("signature listed");
    assert_eq!(signature["mode"], "painting");
    assert_eq!(signature["transfer_payload"], true);
}

#[test]
fn version_prints_package_version() {
    cargo_bin_cmd!("pdf-annotator")
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
