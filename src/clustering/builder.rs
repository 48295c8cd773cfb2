use glam::Vec2;
use tracing::warn;

use crate::clustering::attachment::MaterialAttachment;
use crate::clustering::island::Island;
use crate::error::{RepackError, Result};
use crate::types::MaterialId;

/// Maintains the non-overlapping island set for one material.
///
/// Invariant: after every `add_island` call, no two islands in the
/// collection intersect within the epsilon that call used.
#[derive(Debug)]
pub struct IslandsBuilder {
    pub material: MaterialId,
    islands: Vec<Island>,
    /// Total merges performed. Diagnostic only.
    pub merges: u32,
}

impl IslandsBuilder {
    pub fn new(material: MaterialId) -> Self {
        Self {
            material,
            islands: Vec::new(),
            merges: 0,
        }
    }

    /// Absorb a new island, cascading merges until nothing overlaps.
    ///
    /// Scans in insertion order for the first island intersecting the
    /// pending one; if found, ejects it, lets the ejected island absorb the
    /// pending one, and rescans with the merged result. Terminates because
    /// every merge shrinks the collection by one.
    pub fn add_island(&mut self, island: Island, epsilon: f32) -> Result<()> {
        if island.attachment.material != self.material {
            return Err(RepackError::Incompatible(format!(
                "island of material {:?} fed to builder for {:?}",
                island.attachment.material, self.material
            )));
        }

        let mut pending = island;
        loop {
            let hit = self
                .islands
                .iter()
                .position(|existing| existing.bounds.intersects(&pending.bounds, epsilon));

            match hit {
                None => {
                    self.islands.push(pending);
                    return Ok(());
                }
                Some(idx) => {
                    let mut ejected = self.islands.remove(idx);
                    ejected.absorb(pending)?;
                    pending = ejected;
                    self.merges += 1;
                }
            }
        }
    }

    /// Build an island covering `points` and add it. Empty input is a
    /// warn-and-skip no-op.
    pub fn add_points(
        &mut self,
        points: &[Vec2],
        attachment: MaterialAttachment,
        epsilon: f32,
    ) -> Result<()> {
        if points.is_empty() {
            warn!(material = ?self.material, "empty point sequence, skipping");
            return Ok(());
        }
        let island = Island::from_points(points, attachment)?;
        self.add_island(island, epsilon)
    }

    pub fn islands(&self) -> &[Island] {
        &self.islands
    }

    pub fn into_islands(self) -> Vec<Island> {
        self.islands
    }

    pub fn len(&self) -> usize {
        self.islands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.islands.is_empty()
    }

    pub fn total_extends(&self) -> u32 {
        self.islands.iter().map(|i| i.extends).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ObjectId, SurfaceId};
    use approx::assert_relative_eq;

    const MAT: MaterialId = MaterialId(0);
    const OBJ: ObjectId = ObjectId(0);
    const SURF: SurfaceId = SurfaceId(0);

    fn quad(x0: f32, y0: f32, x1: f32, y1: f32) -> Vec<Vec2> {
        vec![
            Vec2::new(x0, y0),
            Vec2::new(x1, y0),
            Vec2::new(x1, y1),
            Vec2::new(x0, y1),
        ]
    }

    fn attach(poly: usize, area: f32) -> MaterialAttachment {
        MaterialAttachment::for_polygon(MAT, OBJ, SURF, poly, area)
    }

    fn assert_no_overlap(builder: &IslandsBuilder, epsilon: f32) {
        let islands = builder.islands();
        for i in 0..islands.len() {
            for j in i + 1..islands.len() {
                assert!(
                    !islands[i].bounds.intersects(&islands[j].bounds, epsilon),
                    "islands {i} and {j} overlap"
                );
            }
        }
    }

    #[test]
    fn single_polygon_is_idempotent() {
        let mut builder = IslandsBuilder::new(MAT);
        builder
            .add_points(&quad(0.0, 0.0, 1.0, 1.0), attach(0, 1.0), 0.0)
            .unwrap();

        assert_eq!(builder.len(), 1);
        assert_eq!(builder.merges, 0);
        let island = &builder.islands()[0];
        assert_eq!(island.bounds.mn, Vec2::ZERO);
        assert_eq!(island.bounds.mx, Vec2::ONE);
        assert_relative_eq!(island.true_area(), 1.0);
    }

    #[test]
    fn overlapping_quads_merge_into_one() {
        let mut builder = IslandsBuilder::new(MAT);
        builder
            .add_points(&quad(0.0, 0.0, 1.0, 1.0), attach(0, 1.0), 0.0)
            .unwrap();
        builder
            .add_points(&quad(0.9, 0.9, 2.0, 2.0), attach(1, 1.21), 0.0)
            .unwrap();

        assert_eq!(builder.len(), 1);
        assert_eq!(builder.merges, 1);
        let island = &builder.islands()[0];
        assert_eq!(island.bounds.mn, Vec2::ZERO);
        assert_eq!(island.bounds.mx, Vec2::new(2.0, 2.0));
        assert_relative_eq!(island.true_area(), 2.21);
        assert_eq!(island.attachment.polygon_count(), 2);
    }

    #[test]
    fn distant_quads_stay_separate() {
        let mut builder = IslandsBuilder::new(MAT);
        builder
            .add_points(&quad(0.0, 0.0, 1.0, 1.0), attach(0, 1.0), 0.0)
            .unwrap();
        builder
            .add_points(&quad(5.0, 5.0, 6.0, 6.0), attach(1, 1.0), 0.0)
            .unwrap();

        assert_eq!(builder.len(), 2);
        assert_eq!(builder.merges, 0);
        assert_no_overlap(&builder, 0.0);
    }

    #[test]
    fn epsilon_bridges_nearby_quads() {
        let mut builder = IslandsBuilder::new(MAT);
        builder
            .add_points(&quad(0.0, 0.0, 1.0, 1.0), attach(0, 1.0), 2.0)
            .unwrap();
        builder
            .add_points(&quad(2.5, 0.0, 3.5, 1.0), attach(1, 1.0), 2.0)
            .unwrap();

        assert_eq!(builder.len(), 1);
        assert_eq!(builder.merges, 1);
    }

    #[test]
    fn bridge_triggers_cascading_merge() {
        // Two separate islands, then a third spanning both: all collapse.
        let mut builder = IslandsBuilder::new(MAT);
        builder
            .add_points(&quad(0.0, 0.0, 1.0, 1.0), attach(0, 1.0), 0.0)
            .unwrap();
        builder
            .add_points(&quad(2.0, 0.0, 3.0, 1.0), attach(1, 1.0), 0.0)
            .unwrap();
        assert_eq!(builder.len(), 2);

        builder
            .add_points(&quad(0.5, 0.0, 2.5, 1.0), attach(2, 2.0), 0.0)
            .unwrap();

        assert_eq!(builder.len(), 1);
        assert_eq!(builder.merges, 2);
        let island = &builder.islands()[0];
        assert_eq!(island.bounds.mn, Vec2::ZERO);
        assert_eq!(island.bounds.mx, Vec2::new(3.0, 1.0));
        assert_relative_eq!(island.true_area(), 4.0);
        assert_no_overlap(&builder, 0.0);
    }

    #[test]
    fn area_is_conserved_across_merges() {
        let mut builder = IslandsBuilder::new(MAT);
        let mut fed = 0.0f32;
        for i in 0..20 {
            let x = (i % 5) as f32 * 0.8;
            let y = (i / 5) as f32 * 0.8;
            let area = 0.5 + i as f32 * 0.01;
            fed += area;
            builder
                .add_points(&quad(x, y, x + 1.0, y + 1.0), attach(i, area), 0.0)
                .unwrap();
        }

        let total: f32 = builder.islands().iter().map(|i| i.true_area()).sum();
        assert_relative_eq!(total, fed, epsilon = 1e-4);
        assert_no_overlap(&builder, 0.0);
    }

    #[test]
    fn empty_points_is_a_no_op() {
        let mut builder = IslandsBuilder::new(MAT);
        builder.add_points(&[], attach(0, 0.0), 0.0).unwrap();
        assert!(builder.is_empty());
    }

    #[test]
    fn wrong_material_is_rejected() {
        let mut builder = IslandsBuilder::new(MAT);
        let att = MaterialAttachment::for_polygon(MaterialId(7), OBJ, SURF, 0, 1.0);
        let err = builder
            .add_points(&quad(0.0, 0.0, 1.0, 1.0), att, 0.0)
            .unwrap_err();
        assert!(matches!(err, RepackError::Incompatible(_)));
    }

    #[test]
    fn merged_bbox_contains_contributors() {
        let mut builder = IslandsBuilder::new(MAT);
        let a = crate::types::Aabb::from_points(&quad(0.0, 0.0, 1.0, 1.0));
        let b = crate::types::Aabb::from_points(&quad(0.5, 0.5, 1.5, 2.0));
        builder
            .add_points(&quad(0.0, 0.0, 1.0, 1.0), attach(0, 1.0), 0.0)
            .unwrap();
        builder
            .add_points(&quad(0.5, 0.5, 1.5, 2.0), attach(1, 1.5), 0.0)
            .unwrap();

        assert_eq!(builder.len(), 1);
        let merged = builder.islands()[0].bounds;
        assert!(merged.contains_box(&a, 0.0));
        assert!(merged.contains_box(&b, 0.0));
    }
}
