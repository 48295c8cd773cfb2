use std::ops::Range;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{RepackError, Result};

/// Stable handle for a material, assigned once at ingestion.
///
/// The clustering and packing core never holds references into the host
/// scene, only these arena indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialId(pub usize);

/// Stable handle for a source object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub usize);

/// Stable handle for one surface (a single-material patch of an object).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(pub usize);

/// A polygon's loop slice within its surface's flat UV buffer.
#[derive(Debug, Clone, Copy)]
pub struct PolyRange {
    pub start: usize,
    pub len: usize,
}

/// One single-material surface: flat UV loop buffers plus polygon ranges.
///
/// `loops` holds the original UV coordinates; `target` is the second UV
/// channel the transforms write into (seeded as a copy of `loops`).
#[derive(Debug, Clone)]
pub struct Surface {
    pub object: ObjectId,
    pub material: MaterialId,
    pub loops: Vec<Vec2>,
    pub target: Vec<Vec2>,
    pub polygons: Vec<PolyRange>,
}

impl Surface {
    pub fn loop_range(&self, poly: usize) -> Range<usize> {
        let p = &self.polygons[poly];
        p.start..p.start + p.len
    }

    /// Original UV loop of one polygon.
    pub fn polygon_uvs(&self, poly: usize) -> &[Vec2] {
        &self.loops[self.loop_range(poly)]
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }
}

/// Arena-backed scene snapshot the pipeline operates on.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub material_names: Vec<String>,
    pub object_names: Vec<String>,
    pub surfaces: Vec<Surface>,
}

impl Scene {
    pub fn material_name(&self, id: MaterialId) -> &str {
        &self.material_names[id.0]
    }

    pub fn object_name(&self, id: ObjectId) -> &str {
        &self.object_names[id.0]
    }

    pub fn material_count(&self) -> usize {
        self.material_names.len()
    }

    pub fn surface(&self, id: SurfaceId) -> &Surface {
        &self.surfaces[id.0]
    }

    pub fn surface_mut(&mut self, id: SurfaceId) -> &mut Surface {
        &mut self.surfaces[id.0]
    }

    /// Build arenas from a deserialized snapshot.
    ///
    /// Fails if a surface names a material absent from the material list.
    pub fn from_snapshot(snapshot: &SceneSnapshot) -> Result<Self> {
        let material_names: Vec<String> =
            snapshot.materials.iter().map(|m| m.name.clone()).collect();

        let mut scene = Scene {
            material_names,
            ..Default::default()
        };

        for obj in &snapshot.objects {
            let object_id = ObjectId(scene.object_names.len());
            scene.object_names.push(obj.name.clone());

            for surf in &obj.surfaces {
                let material = scene
                    .material_names
                    .iter()
                    .position(|n| *n == surf.material)
                    .map(MaterialId)
                    .ok_or_else(|| {
                        RepackError::Input(format!(
                            "surface of object '{}' references unknown material '{}'",
                            obj.name, surf.material
                        ))
                    })?;

                let mut loops = Vec::new();
                let mut polygons = Vec::with_capacity(surf.polygons.len());
                for poly in &surf.polygons {
                    let start = loops.len();
                    loops.extend(poly.iter().map(|&[u, v]| Vec2::new(u, v)));
                    polygons.push(PolyRange {
                        start,
                        len: poly.len(),
                    });
                }

                scene.surfaces.push(Surface {
                    object: object_id,
                    material,
                    target: loops.clone(),
                    loops,
                    polygons,
                });
            }
        }

        Ok(scene)
    }
}

/// Per-material entry in the scene snapshot file.
///
/// Optional fields become material-scope settings; absent fields fall back
/// to the global scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialSnapshot {
    pub name: String,
    #[serde(default)]
    pub texture_size: Option<[f32; 2]>,
    #[serde(default)]
    pub scale: Option<f32>,
    #[serde(default)]
    pub padding: Option<f32>,
    #[serde(default)]
    pub epsilon: Option<f32>,
    #[serde(default)]
    pub single_island: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceSnapshot {
    pub material: String,
    /// Polygons as ordered UV loops.
    pub polygons: Vec<Vec<[f32; 2]>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    pub name: String,
    pub surfaces: Vec<SurfaceSnapshot>,
}

/// On-disk scene snapshot: the input feed contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub materials: Vec<MaterialSnapshot>,
    pub objects: Vec<ObjectSnapshot>,
}
