use std::collections::BTreeMap;

use crate::error::{RepackError, Result};
use crate::types::{MaterialId, ObjectId, SurfaceId};

/// Polygons of one island that live on a single surface.
///
/// Merging takes the donor by value, so polygon ownership transfers and a
/// consumed attachment can never be reused.
#[derive(Debug, Clone)]
pub struct SurfaceAttachment {
    pub object: ObjectId,
    pub surface: SurfaceId,
    /// Indices into the surface's polygon list.
    pub polys: Vec<usize>,
}

impl SurfaceAttachment {
    pub fn new(object: ObjectId, surface: SurfaceId, polys: Vec<usize>) -> Self {
        Self {
            object,
            surface,
            polys,
        }
    }

    /// Same surface on the same owning object.
    pub fn is_compatible(&self, other: &SurfaceAttachment) -> bool {
        self.surface == other.surface && self.object == other.object
    }

    pub fn merge(&mut self, other: SurfaceAttachment) -> Result<()> {
        if !self.is_compatible(&other) {
            return Err(RepackError::Incompatible(format!(
                "surface attachments differ: {:?}/{:?} vs {:?}/{:?}",
                self.object, self.surface, other.object, other.surface
            )));
        }
        self.polys.extend(other.polys);
        Ok(())
    }
}

/// Metadata traveling with an island: which polygons, on which surfaces,
/// and the island's true (non-bbox) surface area.
#[derive(Debug, Clone)]
pub struct MaterialAttachment {
    pub material: MaterialId,
    pub per_surface: BTreeMap<SurfaceId, SurfaceAttachment>,
    /// Sum of true polygon areas, not bbox area.
    pub area: f32,
}

impl MaterialAttachment {
    /// Attachment covering a single polygon.
    pub fn for_polygon(
        material: MaterialId,
        object: ObjectId,
        surface: SurfaceId,
        poly: usize,
        area: f32,
    ) -> Self {
        Self::for_surface(material, object, surface, vec![poly], area)
    }

    /// Attachment covering a set of polygons of one surface.
    pub fn for_surface(
        material: MaterialId,
        object: ObjectId,
        surface: SurfaceId,
        polys: Vec<usize>,
        area: f32,
    ) -> Self {
        let mut per_surface = BTreeMap::new();
        per_surface.insert(surface, SurfaceAttachment::new(object, surface, polys));
        Self {
            material,
            per_surface,
            area,
        }
    }

    pub fn is_compatible(&self, other: &MaterialAttachment) -> bool {
        self.material == other.material
    }

    /// Union the donor into self: per-surface entries merge on collision or
    /// are adopted wholesale; areas sum. The donor is consumed.
    pub fn merge(&mut self, other: MaterialAttachment) -> Result<()> {
        if !self.is_compatible(&other) {
            return Err(RepackError::Incompatible(format!(
                "attachments reference different materials: {:?} vs {:?}",
                self.material, other.material
            )));
        }
        for (surface, donor) in other.per_surface {
            match self.per_surface.get_mut(&surface) {
                Some(existing) => existing.merge(donor)?,
                None => {
                    self.per_surface.insert(surface, donor);
                }
            }
        }
        self.area += other.area;
        Ok(())
    }

    pub fn polygon_count(&self) -> usize {
        self.per_surface.values().map(|s| s.polys.len()).sum()
    }
}
