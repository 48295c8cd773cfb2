//! End-to-end integration tests.
//!
//! These tests write synthetic scene snapshots, run the full pipeline,
//! and validate the output document.

use std::fs;
use std::path::Path;

use serde_json::{json, Value};
use uv_repacker::config::AtlasConfig;
use uv_repacker::{Pipeline, PipelineConfig};

fn quad(x: f32, y: f32, s: f32) -> Value {
    json!([[x, y], [x + s, y], [x + s, y + s], [x, y + s]])
}

/// Two-material scene: wood has two UV clusters (one of them formed by two
/// overlapping quads), metal has one.
fn write_snapshot(path: &Path) {
    let snapshot = json!({
        "materials": [
            { "name": "wood", "texture_size": [512.0, 512.0] },
            { "name": "metal", "texture_size": [256.0, 256.0], "scale": 2.0 },
        ],
        "objects": [
            {
                "name": "crate",
                "surfaces": [
                    {
                        "material": "wood",
                        "polygons": [
                            quad(0.0, 0.0, 0.2),
                            quad(0.1, 0.1, 0.2),
                            quad(0.6, 0.6, 0.2),
                        ],
                    },
                    {
                        "material": "metal",
                        "polygons": [quad(0.2, 0.2, 0.4)],
                    },
                ],
            },
        ],
    });
    fs::write(path, serde_json::to_string_pretty(&snapshot).unwrap()).unwrap();
}

fn run(config: &PipelineConfig) -> uv_repacker::pipeline::RepackSummary {
    Pipeline::run(config).expect("pipeline should succeed")
}

#[test]
fn full_pipeline_produces_valid_output() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("scene.json");
    let output = tmp.path().join("repacked.json");
    write_snapshot(&input);

    let config = PipelineConfig {
        input: input.clone(),
        output: output.clone(),
        epsilon: 0.0,
        ..Default::default()
    };
    let summary = run(&config);

    // Two overlapping wood quads merge; the far quad and metal stay alone.
    assert_eq!(summary.islands, 3);
    assert_eq!(summary.merges, 1);
    assert_eq!(summary.transforms, 3);
    // 3 wood quads + 1 metal quad, 4 loops each
    assert_eq!(summary.loops_rewritten, 16);
    assert!(summary.score > 0.0);

    let doc: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(doc["atlas_width"], 2048);
    assert_eq!(doc["atlas_height"], 2048);
    assert_eq!(doc["islands"].as_array().unwrap().len(), 3);
    assert_eq!(doc["objects"][0]["name"], "crate");
    assert_eq!(doc["objects"][0]["surfaces"].as_array().unwrap().len(), 2);
}

#[test]
fn remapped_uvs_stay_inside_their_atlas_rect() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("scene.json");
    let output = tmp.path().join("repacked.json");
    write_snapshot(&input);

    let config = PipelineConfig {
        input,
        output: output.clone(),
        epsilon: 0.0,
        padding: 0.0,
        ..Default::default()
    };
    run(&config);

    let doc: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();

    // With zero padding every remapped loop must land inside the union of
    // the atlas rects, which itself sits inside [0,1].
    for surface in doc["objects"][0]["surfaces"].as_array().unwrap() {
        for poly in surface["polygons"].as_array().unwrap() {
            for uv in poly.as_array().unwrap() {
                let u = uv[0].as_f64().unwrap();
                let v = uv[1].as_f64().unwrap();
                assert!((-1e-4..=1.0001).contains(&u), "u out of atlas: {u}");
                assert!((-1e-4..=1.0001).contains(&v), "v out of atlas: {v}");
            }
        }
    }
}

#[test]
fn atlas_rects_do_not_overlap() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("scene.json");
    let output = tmp.path().join("repacked.json");
    write_snapshot(&input);

    let config = PipelineConfig {
        input,
        output: output.clone(),
        epsilon: 0.0,
        atlas: AtlasConfig {
            width: 4096,
            height: 2048,
        },
        ..Default::default()
    };
    run(&config);

    let doc: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let rects: Vec<[f64; 4]> = doc["islands"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| {
            let r = i["atlas"].as_array().unwrap();
            [
                r[0].as_f64().unwrap(),
                r[1].as_f64().unwrap(),
                r[2].as_f64().unwrap(),
                r[3].as_f64().unwrap(),
            ]
        })
        .collect();

    let eps = 1e-5;
    for i in 0..rects.len() {
        for j in i + 1..rects.len() {
            let (a, b) = (rects[i], rects[j]);
            let overlap = a[0] + eps < b[0] + b[2]
                && b[0] + eps < a[0] + a[2]
                && a[1] + eps < b[1] + b[3]
                && b[1] + eps < a[1] + a[3];
            assert!(!overlap, "islands {i} and {j} overlap in the atlas");
        }
    }
}

#[test]
fn dry_run_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("scene.json");
    let output = tmp.path().join("repacked.json");
    write_snapshot(&input);

    let config = PipelineConfig {
        input,
        output: output.clone(),
        epsilon: 0.0,
        dry_run: true,
        ..Default::default()
    };
    let summary = run(&config);

    assert_eq!(summary.islands, 3);
    assert_eq!(summary.loops_rewritten, 0);
    assert!(!output.exists());
}

#[test]
fn single_island_mode_collapses_each_surface() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("scene.json");
    let output = tmp.path().join("repacked.json");
    write_snapshot(&input);

    let config = PipelineConfig {
        input,
        output,
        epsilon: 0.0,
        single_island: true,
        ..Default::default()
    };
    let summary = run(&config);

    // One island per surface regardless of UV layout
    assert_eq!(summary.islands, 2);
    assert_eq!(summary.merges, 0);
    assert_eq!(summary.loops_rewritten, 16);
}

#[test]
fn material_without_texture_size_fails_cleanly() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("scene.json");
    let snapshot = json!({
        "materials": [{ "name": "wood" }],
        "objects": [{
            "name": "crate",
            "surfaces": [{ "material": "wood", "polygons": [quad(0.0, 0.0, 0.5)] }],
        }],
    });
    fs::write(&input, serde_json::to_string(&snapshot).unwrap()).unwrap();

    let config = PipelineConfig {
        input: input.clone(),
        output: tmp.path().join("repacked.json"),
        ..Default::default()
    };
    let err = Pipeline::run(&config).unwrap_err();
    assert!(err.to_string().contains("texture_size"));

    // A CLI-level default rescues the same scene.
    let config = PipelineConfig {
        input,
        output: tmp.path().join("repacked.json"),
        default_texture_size: Some(1024.0),
        ..Default::default()
    };
    let summary = run(&config);
    assert_eq!(summary.islands, 1);
}

#[test]
fn missing_input_file_is_an_io_error() {
    let tmp = tempfile::tempdir().unwrap();
    let config = PipelineConfig {
        input: tmp.path().join("nope.json"),
        output: tmp.path().join("out.json"),
        ..Default::default()
    };
    assert!(Pipeline::run(&config).is_err());
}
