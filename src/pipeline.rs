use std::fs;
use std::time::{Duration, Instant};

use glam::Vec2;
use serde::Serialize;
use tracing::info;

use crate::clustering::{self, IslandsBuilder};
use crate::config::{MaterialSettings, PipelineConfig};
use crate::error::Result;
use crate::packing::{self, PackingBox, Rect, UvBoxTransform};
use crate::settings::{Scope, Scoped};
use crate::types::{MaterialId, Scene, SceneSnapshot};

/// Summary of a completed repack run.
#[derive(Debug)]
pub struct RepackSummary {
    pub islands: usize,
    pub merges: u32,
    pub score: f32,
    pub transforms: usize,
    pub loops_rewritten: usize,
    pub duration: Duration,
}

/// One island's final placement in the output document.
#[derive(Debug, Serialize)]
struct PlacementRecord {
    material: String,
    /// Padded source rect in material texel space: [x, y, w, h].
    source: [f32; 4],
    /// Normalized atlas rect: [x, y, w, h].
    atlas: [f32; 4],
}

#[derive(Debug, Serialize)]
struct SurfaceRecord {
    material: String,
    /// Remapped UV loops, polygon by polygon.
    polygons: Vec<Vec<[f32; 2]>>,
}

#[derive(Debug, Serialize)]
struct ObjectRecord {
    name: String,
    surfaces: Vec<SurfaceRecord>,
}

/// On-disk output: atlas dimensions, island placements and the remapped
/// UV channel of every surface.
#[derive(Debug, Serialize)]
struct OutputDocument {
    atlas_width: u32,
    atlas_height: u32,
    islands: Vec<PlacementRecord>,
    objects: Vec<ObjectRecord>,
}

/// Pipeline orchestrator -- drives the four repacking stages.
pub struct Pipeline;

impl Pipeline {
    /// Run the full repacking pipeline.
    pub fn run(config: &PipelineConfig) -> Result<RepackSummary> {
        let start = Instant::now();

        info!(input = %config.input.display(), "Starting pipeline");
        let snapshot: SceneSnapshot = serde_json::from_str(&fs::read_to_string(&config.input)?)?;
        let mut scene = Scene::from_snapshot(&snapshot)?;
        let settings = resolve_material_settings(&snapshot, config)?;

        info!(
            materials = scene.material_count(),
            objects = scene.object_names.len(),
            surfaces = scene.surfaces.len(),
            "Stage 1/4: Clustering"
        );
        let builders = clustering::find_islands(&scene, &settings)?;
        let islands: usize = builders.iter().map(IslandsBuilder::len).sum();
        let merges: u32 = builders.iter().map(|b| b.merges).sum();
        info!(islands, merges, "Clustering complete");

        info!("Stage 2/4: Packing");
        let mut boxes = packing::islands_to_boxes(builders, &scene, &settings, &config.atlas);
        let score = packing::pack_boxes(&mut boxes)?;

        if config.dry_run {
            info!("--dry-run: reporting placements and writing nothing");
            print_dry_run_summary(&scene, &boxes, score);
            return Ok(RepackSummary {
                islands,
                merges,
                score,
                transforms: boxes.len(),
                loops_rewritten: 0,
                duration: start.elapsed(),
            });
        }

        info!("Stage 3/4: Remapping UVs");
        let placements = placement_records(&scene, &boxes);
        let transforms: Vec<UvBoxTransform> = boxes
            .into_iter()
            .map(UvBoxTransform::from_packing_box)
            .collect();
        let mut loops_rewritten = 0;
        for t in &transforms {
            loops_rewritten += t.apply(&mut scene);
        }
        info!(
            transforms = transforms.len(),
            loops = loops_rewritten,
            "Remap complete"
        );

        info!(output = %config.output.display(), "Stage 4/4: Writing output");
        let document = output_document(&snapshot, &scene, config, placements);
        fs::write(&config.output, serde_json::to_string_pretty(&document)?)?;

        let duration = start.elapsed();
        info!(islands, score, elapsed = ?duration, "Pipeline complete");

        Ok(RepackSummary {
            islands,
            merges,
            score,
            transforms: transforms.len(),
            loops_rewritten,
            duration,
        })
    }
}

/// Resolve per-material settings before any geometry work starts.
///
/// CLI values seed the global scope; optional per-material fields from the
/// snapshot sit at material scope and override them. A material with no
/// texture size at any scope is a configuration error.
pub fn resolve_material_settings(
    snapshot: &SceneSnapshot,
    config: &PipelineConfig,
) -> Result<Vec<MaterialSettings>> {
    let mut texture_size: Scoped<Vec2> = Scoped::new("texture_size");
    let mut scale = Scoped::with_global("scale", config.scale);
    let mut padding = Scoped::with_global("padding", config.padding);
    let mut epsilon = Scoped::with_global("epsilon", config.epsilon);
    let mut single_island = Scoped::with_global("single_island", config.single_island);

    if let Some(size) = config.default_texture_size {
        texture_size.set(Scope::Global, Vec2::splat(size));
    }

    for (m, mat) in snapshot.materials.iter().enumerate() {
        let scope = Scope::Material(MaterialId(m));
        if let Some([w, h]) = mat.texture_size {
            texture_size.set(scope, Vec2::new(w, h));
        }
        if let Some(v) = mat.scale {
            scale.set(scope, v);
        }
        if let Some(v) = mat.padding {
            padding.set(scope, v);
        }
        if let Some(v) = mat.epsilon {
            epsilon.set(scope, v);
        }
        if let Some(v) = mat.single_island {
            single_island.set(scope, v);
        }
    }

    (0..snapshot.materials.len())
        .map(|m| {
            let applicable = [Scope::Global, Scope::Material(MaterialId(m))];
            Ok(MaterialSettings {
                texture_size: *texture_size.require(&applicable)?,
                scale: *scale.require(&applicable)?,
                padding: *padding.require(&applicable)?,
                epsilon: *epsilon.require(&applicable)?,
                single_island: *single_island.require(&applicable)?,
            })
        })
        .collect()
}

fn placement_records(scene: &Scene, boxes: &[PackingBox]) -> Vec<PlacementRecord> {
    boxes
        .iter()
        .map(|b| PlacementRecord {
            material: scene.material_name(b.attachment.material).to_owned(),
            source: rect_array(&b.orig),
            atlas: rect_array(&b.placed),
        })
        .collect()
}

fn rect_array(r: &Rect) -> [f32; 4] {
    [r.x, r.y, r.w, r.h]
}

fn output_document(
    snapshot: &SceneSnapshot,
    scene: &Scene,
    config: &PipelineConfig,
    islands: Vec<PlacementRecord>,
) -> OutputDocument {
    // Surfaces were ingested in snapshot order, so a running cursor pairs
    // them back up with their objects.
    let mut cursor = 0;
    let objects = snapshot
        .objects
        .iter()
        .map(|obj| {
            let surfaces = scene.surfaces[cursor..cursor + obj.surfaces.len()]
                .iter()
                .map(|surface| SurfaceRecord {
                    material: scene.material_name(surface.material).to_owned(),
                    polygons: (0..surface.polygon_count())
                        .map(|poly| {
                            surface
                                .loop_range(poly)
                                .map(|li| surface.target[li].to_array())
                                .collect()
                        })
                        .collect(),
                })
                .collect();
            cursor += obj.surfaces.len();
            ObjectRecord {
                name: obj.name.clone(),
                surfaces,
            }
        })
        .collect();

    OutputDocument {
        atlas_width: config.atlas.width,
        atlas_height: config.atlas.height,
        islands,
        objects,
    }
}

fn print_dry_run_summary(scene: &Scene, boxes: &[PackingBox], score: f32) {
    println!("Packed {} islands (score {:.2}):", boxes.len(), score);
    for b in boxes {
        println!(
            "  {:<24} [{:.1}, {:.1}, {:.1}, {:.1}] -> [{:.4}, {:.4}, {:.4}, {:.4}]",
            scene.material_name(b.attachment.material),
            b.orig.x,
            b.orig.y,
            b.orig.w,
            b.orig.h,
            b.placed.x,
            b.placed.y,
            b.placed.w,
            b.placed.h,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RepackError;
    use crate::types::scene::{MaterialSnapshot, ObjectSnapshot, SurfaceSnapshot};

    fn material(name: &str, texture_size: Option<[f32; 2]>) -> MaterialSnapshot {
        MaterialSnapshot {
            name: name.into(),
            texture_size,
            scale: None,
            padding: None,
            epsilon: None,
            single_island: None,
        }
    }

    fn snapshot() -> SceneSnapshot {
        SceneSnapshot {
            materials: vec![
                material("wood", Some([512.0, 256.0])),
                material("metal", None),
            ],
            objects: vec![ObjectSnapshot {
                name: "crate".into(),
                surfaces: vec![SurfaceSnapshot {
                    material: "wood".into(),
                    polygons: vec![vec![[0.0, 0.0], [0.5, 0.0], [0.5, 0.5], [0.0, 0.5]]],
                }],
            }],
        }
    }

    #[test]
    fn material_fields_override_cli_globals() {
        let mut snap = snapshot();
        snap.materials[0].scale = Some(4.0);
        snap.materials[0].single_island = Some(true);
        let config = PipelineConfig {
            default_texture_size: Some(1024.0),
            ..Default::default()
        };

        let settings = resolve_material_settings(&snap, &config).unwrap();

        assert_eq!(settings[0].texture_size, Vec2::new(512.0, 256.0));
        assert_eq!(settings[0].scale, 4.0);
        assert!(settings[0].single_island);
        // Second material falls back to globals everywhere
        assert_eq!(settings[1].texture_size, Vec2::splat(1024.0));
        assert_eq!(settings[1].scale, 1.0);
        assert_eq!(settings[1].padding, 2.0);
        assert_eq!(settings[1].epsilon, 2.0);
        assert!(!settings[1].single_island);
    }

    #[test]
    fn missing_texture_size_is_a_config_error() {
        let snap = snapshot();
        let config = PipelineConfig::default();

        let err = resolve_material_settings(&snap, &config).unwrap_err();
        assert!(matches!(err, RepackError::Config(_)));
        assert!(err.to_string().contains("texture_size"));
    }

    #[test]
    fn output_document_follows_snapshot_layout() {
        let snap = snapshot();
        let scene = Scene::from_snapshot(&snap).unwrap();
        let config = PipelineConfig::default();

        let doc = output_document(&snap, &scene, &config, Vec::new());
        assert_eq!(doc.atlas_width, 2048);
        assert_eq!(doc.objects.len(), 1);
        assert_eq!(doc.objects[0].surfaces.len(), 1);
        assert_eq!(doc.objects[0].surfaces[0].material, "wood");
        assert_eq!(doc.objects[0].surfaces[0].polygons[0].len(), 4);
    }
}
