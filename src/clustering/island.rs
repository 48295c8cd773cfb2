use glam::Vec2;

use crate::clustering::attachment::MaterialAttachment;
use crate::error::{RepackError, Result};
use crate::types::Aabb;

/// One rectangular texture-space cluster: a bounding box in material texel
/// coordinates plus the polygons it covers.
///
/// Islands are valid by construction: building one requires a non-empty
/// point set, and merging consumes the donor, so a half-merged island can
/// never be observed.
#[derive(Debug, Clone)]
pub struct Island {
    pub bounds: Aabb,
    pub attachment: MaterialAttachment,
    /// How many points have grown the bounds. Diagnostic only.
    pub extends: u32,
}

impl Island {
    /// Island covering all `points`, carrying `attachment`.
    pub fn from_points(points: &[Vec2], attachment: MaterialAttachment) -> Result<Self> {
        if points.is_empty() {
            return Err(RepackError::InvalidGeometry(format!(
                "island for material {:?} built from an empty point set",
                attachment.material
            )));
        }
        Ok(Self {
            bounds: Aabb::from_points(points),
            attachment,
            extends: points.len() as u32,
        })
    }

    /// Grow this island to cover `donor`, taking over its polygons.
    ///
    /// Requires material compatibility. The donor is consumed; ownership of
    /// its attachment transfers here.
    pub fn absorb(&mut self, donor: Island) -> Result<()> {
        if !self.attachment.is_compatible(&donor.attachment) {
            return Err(RepackError::Incompatible(format!(
                "islands reference different materials: {:?} vs {:?}",
                self.attachment.material, donor.attachment.material
            )));
        }
        for corner in donor.bounds.corners() {
            self.bounds.extend_by_point(corner);
        }
        self.extends += 4;
        self.attachment.merge(donor.attachment)
    }

    /// Bounding-box area in texel space (not the true polygon area).
    pub fn bbox_area(&self) -> f32 {
        self.bounds.area()
    }

    /// Sum of true polygon areas carried by the attachment.
    pub fn true_area(&self) -> f32 {
        self.attachment.area
    }
}
