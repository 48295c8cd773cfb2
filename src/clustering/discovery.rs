use glam::Vec2;
use rayon::prelude::*;
use tracing::debug;

use crate::clustering::attachment::MaterialAttachment;
use crate::clustering::builder::IslandsBuilder;
use crate::config::MaterialSettings;
use crate::error::Result;
use crate::types::{polygon_area, MaterialId, Scene, SurfaceId};

/// Find UV islands for every material in the scene.
///
/// Materials are independent, so they run in parallel; within a material,
/// polygon order is deterministic (descending footprint area, ties by
/// enumeration order), which keeps cluster shapes reproducible.
///
/// Returns one builder per material, indexed by `MaterialId`; materials
/// without geometry yield an empty builder.
pub fn find_islands(scene: &Scene, settings: &[MaterialSettings]) -> Result<Vec<IslandsBuilder>> {
    (0..scene.material_count())
        .into_par_iter()
        .map(|m| find_material_islands(scene, MaterialId(m), &settings[m]))
        .collect()
}

fn find_material_islands(
    scene: &Scene,
    material: MaterialId,
    settings: &MaterialSettings,
) -> Result<IslandsBuilder> {
    let mut builder = IslandsBuilder::new(material);

    for (idx, surface) in scene.surfaces.iter().enumerate() {
        if surface.material != material {
            continue;
        }
        let surface_id = SurfaceId(idx);

        if settings.single_island {
            add_whole_surface(scene, &mut builder, surface_id, settings)?;
        } else {
            add_per_polygon(scene, &mut builder, surface_id, settings)?;
        }
    }

    debug!(
        material = scene.material_name(material),
        islands = builder.len(),
        merges = builder.merges,
        extends = builder.total_extends(),
        "material islands found"
    );
    Ok(builder)
}

/// Single-island fast mode: all polygons of the surface become one point
/// set and one combined attachment, skipping per-polygon clustering.
fn add_whole_surface(
    scene: &Scene,
    builder: &mut IslandsBuilder,
    surface_id: SurfaceId,
    settings: &MaterialSettings,
) -> Result<()> {
    let surface = scene.surface(surface_id);
    let mut points = Vec::with_capacity(surface.loops.len());
    let mut polys = Vec::with_capacity(surface.polygon_count());
    let mut area = 0.0f32;

    for poly in 0..surface.polygon_count() {
        let scaled = scale_to_texels(surface.polygon_uvs(poly), settings.texture_size);
        area += polygon_area(&scaled);
        points.extend_from_slice(&scaled);
        polys.push(poly);
    }

    let attachment =
        MaterialAttachment::for_surface(surface.material, surface.object, surface_id, polys, area);
    builder.add_points(&points, attachment, settings.epsilon)
}

/// Normal mode: one island seed per polygon, fed largest-footprint first so
/// big boxes form early and small ones rarely re-expand them.
fn add_per_polygon(
    scene: &Scene,
    builder: &mut IslandsBuilder,
    surface_id: SurfaceId,
    settings: &MaterialSettings,
) -> Result<()> {
    let surface = scene.surface(surface_id);

    let mut polygons: Vec<(usize, f32, Vec<Vec2>)> = (0..surface.polygon_count())
        .map(|poly| {
            let scaled = scale_to_texels(surface.polygon_uvs(poly), settings.texture_size);
            let area = polygon_area(&scaled);
            (poly, area, scaled)
        })
        .collect();

    // Stable sort: equal areas keep enumeration order.
    polygons.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    for (poly, area, points) in polygons {
        let attachment = MaterialAttachment::for_polygon(
            surface.material,
            surface.object,
            surface_id,
            poly,
            area,
        );
        builder.add_points(&points, attachment, settings.epsilon)?;
    }
    Ok(())
}

fn scale_to_texels(uvs: &[Vec2], texture_size: Vec2) -> Vec<Vec2> {
    uvs.iter().map(|&uv| uv * texture_size).collect()
}
