use glam::Vec2;

use crate::clustering::MaterialAttachment;
use crate::packing::boxes::PackingBox;
use crate::types::Scene;

/// Affine remap from an island's rect in original UV space to its packed
/// rect in atlas space, plus the polygons it must rewrite.
///
/// Immutable once derived. Source rect `a*` and destination rect `b*` are
/// both in normalized [0,1] coordinates.
#[derive(Debug, Clone)]
pub struct UvBoxTransform {
    pub ax: f32,
    pub ay: f32,
    pub aw: f32,
    pub ah: f32,
    pub bx: f32,
    pub by: f32,
    pub bw: f32,
    pub bh: f32,
    pub attachment: MaterialAttachment,
}

impl UvBoxTransform {
    /// Derive the transform from a finished packing box: the original
    /// texel-space rect is normalized by the material texture size, the
    /// destination is the normalized packed rect. Consumes the box.
    pub fn from_packing_box(pb: PackingBox) -> Self {
        let ts = pb.texture_size;
        Self {
            ax: pb.orig.x / ts.x,
            ay: pb.orig.y / ts.y,
            aw: pb.orig.w / ts.x,
            ah: pb.orig.h / ts.y,
            bx: pb.placed.x,
            by: pb.placed.y,
            bw: pb.placed.w,
            bh: pb.placed.h,
            attachment: pb.attachment,
        }
    }

    /// Remap one UV coordinate.
    ///
    /// A zero-width or zero-height source rect maps that axis to the
    /// destination midpoint instead of dividing by zero.
    pub fn apply_point(&self, uv: Vec2) -> Vec2 {
        let fu = if self.aw != 0.0 {
            (uv.x - self.ax) / self.aw
        } else {
            0.5
        };
        let fv = if self.ah != 0.0 {
            (uv.y - self.ay) / self.ah
        } else {
            0.5
        };
        Vec2::new(fu * self.bw + self.bx, fv * self.bh + self.by)
    }

    /// Rewrite the target UV channel of every loop of every attached
    /// polygon. Returns the number of loops rewritten (diagnostic).
    pub fn apply(&self, scene: &mut Scene) -> usize {
        let mut counter = 0;
        for (surface_id, per_surface) in &self.attachment.per_surface {
            let surface = scene.surface_mut(*surface_id);
            for &poly in &per_surface.polys {
                for li in surface.loop_range(poly) {
                    surface.target[li] = self.apply_point(surface.loops[li]);
                    counter += 1;
                }
            }
        }
        counter
    }

    /// Source rect area in normalized UV space.
    pub fn source_area(&self) -> f32 {
        self.aw * self.ah
    }
}
