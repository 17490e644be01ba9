//! Integration tests for the AgentCommand JSON protocol.
//!
//! Tests the full command pipeline: JSON string -> parse -> execute -> response.

use scene_composer_lib::command::{execute_json, execute_json_batch};
use std::sync::Arc;
use std::time::Duration;

use scene_composer_lib::fixtures::{generated_table, scene_sheet_and_plank, PendingGenerator, StubGenerator};
use scene_composer_lib::harness::TestHarness;

#[test]
fn test_command_add_object() {
    let mut h = TestHarness::new();

    let json = r#"{"command": "add_object", "shape": {"type": "torus"}, "material": "glass"}"#;

    let resp = execute_json(&mut h, json).unwrap();
    assert!(resp.success);
    let id = resp.data.as_ref().unwrap()["id"].as_str().unwrap().to_string();
    assert_eq!(h.object_count(), 1);
    assert_eq!(h.object(&id).unwrap().name, "Torus 1");
}

#[test]
fn test_command_insert_object_rejects_duplicate_id() {
    let mut h = TestHarness::with_scene(scene_sheet_and_plank());

    let json = r##"{"command": "insert_object", "object": {
        "id": "sheet", "name": "Again", "shape": {"type": "box"},
        "transform": {"position": [0, 0, 0], "rotation": [0, 0, 0], "scale": [1, 1, 1]},
        "color_hex": "#ffffff"
    }}"##;

    let resp = execute_json(&mut h, json).unwrap();
    assert!(!resp.success);
    assert_eq!(h.history_len(), 1);
}

#[test]
fn test_command_inspect() {
    let mut h = TestHarness::with_scene(scene_sheet_and_plank());

    let resp = execute_json(&mut h, r#"{"command": "inspect"}"#).unwrap();
    assert!(resp.success);
    let data = resp.data.unwrap();
    assert_eq!(data["object_count"], 2);

    let objects = data["objects"].as_array().unwrap();
    assert_eq!(objects[0]["id"], "sheet");
    assert_eq!(objects[1]["id"], "plank");
    assert_eq!(objects[0]["icon"], "[B]");
    assert_eq!(objects[0]["display_name"], "Sheet (sheet)");
}

#[test]
fn test_command_inspect_marks_hidden_objects() {
    let mut h = TestHarness::with_scene(scene_sheet_and_plank());

    let json = r#"[
        {"command": "set_visibility", "id": "plank", "visible": false},
        {"command": "inspect"}
    ]"#;
    let responses = execute_json_batch(&mut h, json).unwrap();
    let objects = responses[1].data.as_ref().unwrap()["objects"].as_array().unwrap().clone();
    assert_eq!(objects[1]["visible"], false);
    assert!(objects[1]["display_name"].as_str().unwrap().ends_with("[hidden]"));
}

#[test]
fn test_command_update_object_flattened_patch() {
    let mut h = TestHarness::with_scene(scene_sheet_and_plank());

    let json = r##"{"command": "update_object", "id": "plank", "name": "Top", "color_hex": "#FF0000"}"##;
    let resp = execute_json(&mut h, json).unwrap();
    assert!(resp.success);
    assert_eq!(resp.data.unwrap()["updated"], true);

    let plank = h.object("plank").unwrap();
    assert_eq!(plank.name, "Top");
    assert_eq!(plank.color_hex, "#ff0000");
    assert_eq!(h.history_len(), 2);
}

#[test]
fn test_command_update_invalid_color_no_commit() {
    let mut h = TestHarness::with_scene(scene_sheet_and_plank());

    let json = r#"{"command": "update_object", "id": "plank", "color_hex": "red"}"#;
    let resp = execute_json(&mut h, json).unwrap();
    assert_eq!(resp.data.unwrap()["updated"], false);
    assert_eq!(h.history_len(), 1);
}

#[test]
fn test_command_drag_gesture_via_batch() {
    let mut h = TestHarness::with_scene(scene_sheet_and_plank());

    let json = r#"[
        {"command": "drag_start", "id": "plank"},
        {"command": "drag_move", "position": [2.0, 2.0, 2.0]},
        {"command": "drag_move", "position": [0.0, 0.15, 0.05]},
        {"command": "history"},
        {"command": "drag_end"},
        {"command": "history"}
    ]"#;

    let responses = execute_json_batch(&mut h, json).unwrap();
    assert_eq!(responses.len(), 6);
    for resp in &responses {
        assert!(resp.success, "Failed: {:?}", resp.error);
    }

    let last_move = responses[2].data.as_ref().unwrap();
    assert_eq!(last_move["snapped"], true);
    assert_eq!(last_move["position"][2], 0.1);

    // Mid-gesture nothing is committed
    assert_eq!(responses[3].data.as_ref().unwrap()["length"], 1);
    assert_eq!(responses[4].data.as_ref().unwrap()["committed"], true);
    assert_eq!(responses[5].data.as_ref().unwrap()["length"], 2);
    assert_eq!(h.position_of("plank"), Some([0.0, 0.15, 0.1]));
}

#[test]
fn test_command_drag_move_without_drag_errors() {
    let mut h = TestHarness::new();
    let resp = execute_json(&mut h, r#"{"command": "drag_move", "position": [1, 2, 3]}"#).unwrap();
    assert!(!resp.success);
}

#[test]
fn test_command_set_snap_disables_snapping() {
    let mut h = TestHarness::with_scene(scene_sheet_and_plank());

    let json = r#"[
        {"command": "set_snap", "enabled": false},
        {"command": "drag_start", "id": "plank"},
        {"command": "drag_move", "position": [0.0, 0.15, 0.05]},
        {"command": "drag_end"}
    ]"#;
    let responses = execute_json_batch(&mut h, json).unwrap();
    assert_eq!(responses[2].data.as_ref().unwrap()["snapped"], false);
    assert_eq!(h.position_of("plank"), Some([0.0, 0.15, 0.05]));
}

#[test]
fn test_command_dimensions_in_inches() {
    let mut h = TestHarness::with_scene(scene_sheet_and_plank());

    let json = r#"[
        {"command": "set_units", "units": "inches"},
        {"command": "set_visibility", "id": "plank", "visible": false},
        {"command": "dimensions"}
    ]"#;
    let responses = execute_json_batch(&mut h, json).unwrap();
    let labels = responses[2].data.as_ref().unwrap()["labels"].as_array().unwrap().clone();

    // Only the sheet is visible: 2 m is 78.74 in
    assert_eq!(labels.len(), 3);
    assert!(labels.iter().all(|l| l["id"] == "sheet"));
    assert_eq!(labels[0]["axis"], "x");
    assert_eq!(labels[0]["text"], "78.74 in");
}

#[test]
fn test_command_invalid_json_error() {
    let mut h = TestHarness::new();
    let result = execute_json(&mut h, "not valid json");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("Invalid command JSON"));
}

#[test]
fn test_command_undo_redo_via_json() {
    let mut h = TestHarness::with_scene(scene_sheet_and_plank());
    execute_json(&mut h, r#"{"command": "delete_object", "id": "sheet"}"#).unwrap();
    assert_eq!(h.object_count(), 1);

    let resp = execute_json(&mut h, r#"{"command": "undo"}"#).unwrap();
    assert_eq!(resp.data.unwrap()["undone"], true);
    assert_eq!(h.object_count(), 2);

    let resp = execute_json(&mut h, r#"{"command": "redo"}"#).unwrap();
    assert_eq!(resp.data.unwrap()["redone"], true);
    assert_eq!(h.object_count(), 1);
}

#[test]
fn test_command_export_load_roundtrip() {
    let mut h = TestHarness::with_scene(scene_sheet_and_plank());
    let resp = execute_json(&mut h, r#"{"command": "export_scene"}"#).unwrap();
    let scene_json = resp.data.unwrap()["scene_json"].as_str().unwrap().to_string();

    let mut h2 = TestHarness::new();
    let cmd = format!(r#"{{"command": "load_scene", "scene": {scene_json}}}"#);
    let resp = execute_json(&mut h2, &cmd).unwrap();
    assert!(resp.success);
    assert_eq!(h2.scene(), h.scene());
}

#[test]
fn test_command_load_scene_with_repeated_id_errors() {
    let mut h = TestHarness::with_scene(scene_sheet_and_plank());

    let json = r##"{"command": "load_scene", "scene": {"objects": [
        {"id": "x", "name": "One", "shape": {"type": "box"},
         "transform": {"position": [0, 0, 0], "rotation": [0, 0, 0], "scale": [1, 1, 1]},
         "color_hex": "#ffffff"},
        {"id": "x", "name": "Two", "shape": {"type": "box"},
         "transform": {"position": [3, 0, 0], "rotation": [0, 0, 0], "scale": [1, 1, 1]},
         "color_hex": "#ffffff"}
    ]}}"##;
    let resp = execute_json(&mut h, json).unwrap();
    assert!(!resp.success);
    assert!(resp.error.unwrap().contains("duplicate"));

    assert_eq!(h.history_len(), 1);
    assert_eq!(h.object_count(), 2);
    assert!(h.object("x").is_none());
}

#[test]
fn test_command_generate_commits_batch() {
    let mut h = TestHarness::with_generator(Arc::new(StubGenerator::ok(generated_table())));

    let resp = execute_json(&mut h, r#"{"command": "generate", "prompt": "a table"}"#).unwrap();
    assert!(resp.success, "Failed: {:?}", resp.error);
    assert_eq!(resp.data.unwrap()["added"].as_array().unwrap().len(), 5);
    assert_eq!(h.history_len(), 2);
}

#[test]
fn test_command_generate_reports_unfinished_request() {
    let mut h = TestHarness::with_generator(Arc::new(PendingGenerator));
    h.generation_wait = Duration::from_millis(50);

    let resp = execute_json(&mut h, r#"{"command": "generate", "prompt": "a table"}"#).unwrap();
    assert!(!resp.success);
    assert!(resp.error.unwrap().contains("still pending"));
    assert!(h.state.generation.is_loading());
    assert_eq!(h.history_len(), 1);
}

#[test]
fn test_command_rotate_mode_drag_does_not_snap() {
    let mut h = TestHarness::with_scene(scene_sheet_and_plank());

    let json = r#"[
        {"command": "set_gizmo_mode", "mode": "rotate"},
        {"command": "drag_start", "id": "plank"},
        {"command": "set_gizmo_mode", "mode": "translate"},
        {"command": "drag_move", "position": [0.0, 0.15, 0.05], "rotation": [0.0, 0.3, 0.0]},
        {"command": "drag_end"}
    ]"#;
    let responses = execute_json_batch(&mut h, json).unwrap();
    assert!(responses[0].success);
    // Mode is fixed for the duration of a gesture
    assert!(!responses[2].success);

    let moved = responses[3].data.as_ref().unwrap();
    assert_eq!(moved["snapped"], false);
    assert_eq!(moved["position"][2], 0.05);

    let plank = h.object("plank").unwrap();
    assert_eq!(plank.transform.position, [0.0, 0.15, 0.05]);
    assert_eq!(plank.transform.rotation, [0.0, 0.3, 0.0]);
}
