use glam::Vec2;
use tracing::{info, warn};

use crate::clustering::{IslandsBuilder, MaterialAttachment};
use crate::config::{AtlasConfig, MaterialSettings};
use crate::types::Scene;

/// An axis-aligned rectangle as origin plus size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

/// One island's packing record, alive only through the packing phase.
#[derive(Debug, Clone)]
pub struct PackingBox {
    /// Padded island rect in material texel space, carried through
    /// unchanged for transform derivation.
    pub orig: Rect,
    /// Scaled, aspect-corrected rect the packer arranges.
    pub pack: Rect,
    /// Best placed rect seen so far; normalized to [0,1] after packing.
    pub placed: Rect,
    pub attachment: MaterialAttachment,
    /// The owning material's texture footprint, for normalizing `orig`.
    pub texture_size: Vec2,
}

/// Convert every material's finished islands into packing boxes.
///
/// Consumes the builders: islands transfer their attachments into the
/// boxes. The packing footprint is dampened by
/// `ln(sqrt(true_area / bbox_area) + 1)` so sparse or diagonal islands do
/// not claim atlas space their bounding box never uses; degenerate areas
/// fall back to a factor of 1 with a warning.
pub fn islands_to_boxes(
    builders: Vec<IslandsBuilder>,
    scene: &Scene,
    settings: &[MaterialSettings],
    atlas: &AtlasConfig,
) -> Vec<PackingBox> {
    let aspect = atlas.aspect();
    let mut boxes = Vec::new();

    for builder in builders {
        let material = builder.material;
        let mat_settings = &settings[material.0];

        let area_poly: f32 = builder.islands().iter().map(|i| i.true_area()).sum();
        let area_bbox: f32 = builder.islands().iter().map(|i| i.bbox_area()).sum();
        if !builder.is_empty() && area_poly > 0.0 && area_bbox > 0.0 {
            let avg = ((area_poly / area_bbox).sqrt() + 1.0).ln();
            info!(
                material = scene.material_name(material),
                islands = builder.len(),
                average_area_factor = avg,
                "converting islands to packing boxes"
            );
        }

        for island in builder.into_islands() {
            let area_poly = island.true_area();
            let area_bbox = island.bbox_area();

            let mut scale = mat_settings.scale;
            if area_poly <= 0.0 || area_bbox <= 0.0 {
                warn!(
                    material = scene.material_name(material),
                    area_poly,
                    area_bbox,
                    "degenerate island area, skipping area factor"
                );
            } else {
                scale *= ((area_poly / area_bbox).sqrt() + 1.0).ln();
            }

            let pad = mat_settings.padding;
            let orig = Rect::new(
                island.bounds.mn.x - pad,
                island.bounds.mn.y - pad,
                island.bounds.width() + 2.0 * pad,
                island.bounds.height() + 2.0 * pad,
            );

            let pack = Rect::new(
                orig.x * scale / aspect,
                orig.y * scale,
                orig.w * scale / aspect,
                orig.h * scale,
            );

            boxes.push(PackingBox {
                orig,
                placed: pack,
                pack,
                attachment: island.attachment,
                texture_size: mat_settings.texture_size,
            });
        }
    }

    boxes
}
