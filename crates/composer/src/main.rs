//! Headless driver: one JSON command (or array of commands) per stdin line,
//! one JSON response per stdout line.

use std::io::{BufRead, Write};

use scene_composer_lib::command::{execute_json, execute_json_batch};
use scene_composer_lib::harness::TestHarness;
use scene_composer_lib::state::{AppSettings, SceneState};

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scene_composer=info,scene_composer_lib=info".into()),
        )
        .init();

    let mut harness = TestHarness::with_settings(AppSettings::load());

    // Parse --scene <path> argument; it becomes the session's initial snapshot
    if let Some(scene) = parse_scene_arg() {
        harness.state.scene = SceneState::new(scene);
    }

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::error!("Failed to read stdin: {e}");
                break;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let output = if trimmed.starts_with('[') {
            execute_json_batch(&mut harness, trimmed).and_then(|responses| {
                serde_json::to_string(&responses).map_err(|e| e.to_string())
            })
        } else {
            execute_json(&mut harness, trimmed).and_then(|response| {
                serde_json::to_string(&response).map_err(|e| e.to_string())
            })
        };

        let text = output.unwrap_or_else(|e| {
            serde_json::json!({ "success": false, "error": e }).to_string()
        });
        if writeln!(stdout, "{text}").and_then(|_| stdout.flush()).is_err() {
            break;
        }
    }

    harness.state.settings.save();
}

fn parse_scene_arg() -> Option<shared::SceneDescription> {
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        if args[i] == "--scene" && i + 1 < args.len() {
            let path = &args[i + 1];
            match std::fs::read_to_string(path) {
                Ok(json) => match serde_json::from_str::<shared::SceneDescription>(&json) {
                    Ok(scene) if !scene.has_unique_ids() => {
                        tracing::error!("Scene {path} rejected: duplicate object ids");
                    }
                    Ok(scene) => {
                        tracing::info!("Loaded scene from {path} ({} objects)", scene.len());
                        return Some(scene);
                    }
                    Err(e) => {
                        tracing::error!("Failed to parse scene JSON from {path}: {e}");
                    }
                },
                Err(e) => {
                    tracing::error!("Failed to read scene file {path}: {e}");
                }
            }
            break;
        }
        i += 1;
    }
    None
}
