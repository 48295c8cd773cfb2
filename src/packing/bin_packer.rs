use tracing::{debug, info, warn};

use crate::error::{RepackError, Result};
use crate::packing::boxes::{PackingBox, Rect};

/// Consecutive non-improving attempts tolerated before the retry loop
/// settles for the best layout seen.
pub const BAD_MAX: u32 = 3;

/// Slack for float comparisons inside the packer.
const EPS: f32 = 1e-5;

/// A free rectangle in the guillotine packer.
#[derive(Debug, Clone, Copy)]
struct FreeRect {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

/// Pack all boxes' packing rects into a shared square-ish region and write
/// the best layout, normalized to [0,1] atlas space, into each box's
/// `placed` rect.
///
/// The underlying packer is order-sensitive and not optimal, so this
/// repeats with varying placement orders, keeps the best-scoring layout
/// (score = max used extent, lower is better) as a snapshot, and stops
/// after `BAD_MAX` consecutive attempts without improvement. The result is
/// never worse than the first attempt.
pub fn pack_boxes(boxes: &mut [PackingBox]) -> Result<f32> {
    if boxes.is_empty() {
        return Err(RepackError::Packing("no islands to pack".into()));
    }

    let sizes: Vec<(f32, f32)> = boxes.iter().map(|b| (b.pack.w, b.pack.h)).collect();

    let (mut best_pos, used_w, used_h) = pack_attempt(&sizes, &attempt_order(&sizes, 0))
        .ok_or_else(|| RepackError::Packing("initial packing attempt failed".into()))?;
    let mut best_score = used_w.max(used_h);
    debug!(score = best_score, "initial packing attempt");

    let mut bad_line = 0u32;
    let mut attempt = 1u32;
    while bad_line < BAD_MAX {
        match pack_attempt(&sizes, &attempt_order(&sizes, attempt)) {
            Some((pos, w, h)) => {
                let score = w.max(h);
                if score < best_score {
                    debug!(attempt, score, "improved packing");
                    best_score = score;
                    best_pos = pos;
                    bad_line = 0;
                } else {
                    bad_line += 1;
                }
            }
            None => bad_line += 1,
        }
        attempt += 1;
    }

    if best_score <= 0.0 {
        return Err(RepackError::Packing(
            "packed layout has zero extent; all islands degenerate".into(),
        ));
    }

    for (b, (x, y)) in boxes.iter_mut().zip(best_pos) {
        b.placed = Rect::new(
            x / best_score,
            y / best_score,
            b.pack.w / best_score,
            b.pack.h / best_score,
        );
    }

    info!(
        boxes = boxes.len(),
        attempts = attempt,
        score = best_score,
        "packed islands"
    );
    Ok(best_score)
}

/// Deterministic order variation per attempt: five descending sort keys,
/// then the same keys with a big/small interleave. Reproducible runs, but
/// each retry still explores a distinct layout.
fn attempt_order(sizes: &[(f32, f32)], attempt: u32) -> Vec<usize> {
    let key = |i: usize| -> f32 {
        let (w, h) = sizes[i];
        match attempt % 5 {
            0 => w.max(h),
            1 => w * h,
            2 => h,
            3 => w,
            _ => w + h,
        }
    };

    let mut order: Vec<usize> = (0..sizes.len()).collect();
    order.sort_by(|&a, &b| {
        key(b)
            .partial_cmp(&key(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    if attempt % 10 >= 5 {
        let mut mixed = Vec::with_capacity(order.len());
        let mut front = 0;
        let mut back = order.len();
        while front < back {
            mixed.push(order[front]);
            front += 1;
            if front < back {
                back -= 1;
                mixed.push(order[back]);
            }
        }
        order = mixed;
    }
    order
}

/// One packing attempt: guillotine BSSF into a bin grown by doubling the
/// smaller dimension until everything fits. Returns positions (indexed
/// like `sizes`) and the used extent.
fn pack_attempt(sizes: &[(f32, f32)], order: &[usize]) -> Option<(Vec<(f32, f32)>, f32, f32)> {
    let total_area: f32 = sizes.iter().map(|(w, h)| w * h).sum();
    let max_w = sizes.iter().map(|s| s.0).fold(0.0f32, f32::max);
    let max_h = sizes.iter().map(|s| s.1).fold(0.0f32, f32::max);

    let side = total_area.sqrt().max(EPS);
    let mut bin_w = side.max(max_w);
    let mut bin_h = side.max(max_h);

    for _ in 0..32 {
        if let Some(positions) = try_pack(sizes, order, bin_w, bin_h) {
            let mut used_w = 0.0f32;
            let mut used_h = 0.0f32;
            for (i, &(x, y)) in positions.iter().enumerate() {
                used_w = used_w.max(x + sizes[i].0);
                used_h = used_h.max(y + sizes[i].1);
            }
            return Some((positions, used_w, used_h));
        }
        if bin_w <= bin_h {
            bin_w *= 2.0;
        } else {
            bin_h *= 2.0;
        }
    }

    warn!(bin_w, bin_h, "packing attempt failed to fit after growth");
    None
}

fn try_pack(
    sizes: &[(f32, f32)],
    order: &[usize],
    bin_w: f32,
    bin_h: f32,
) -> Option<Vec<(f32, f32)>> {
    let mut free_rects = vec![FreeRect {
        x: 0.0,
        y: 0.0,
        w: bin_w,
        h: bin_h,
    }];
    let mut positions = vec![(0.0f32, 0.0f32); sizes.len()];

    for &idx in order {
        let (w, h) = sizes[idx];
        let best = find_bssf(&free_rects, w, h)?;
        let rect = free_rects.swap_remove(best);
        positions[idx] = (rect.x, rect.y);
        guillotine_split(&mut free_rects, rect, w, h);
    }

    Some(positions)
}

/// Best Short Side Fit: the free rect whose tighter leftover side is
/// smallest.
fn find_bssf(free_rects: &[FreeRect], w: f32, h: f32) -> Option<usize> {
    let mut best_idx = None;
    let mut best_short_side = f32::INFINITY;

    for (i, rect) in free_rects.iter().enumerate() {
        if rect.w + EPS >= w && rect.h + EPS >= h {
            let short_side = (rect.w - w).min(rect.h - h);
            if short_side < best_short_side {
                best_short_side = short_side;
                best_idx = Some(i);
            }
        }
    }
    best_idx
}

fn guillotine_split(free_rects: &mut Vec<FreeRect>, rect: FreeRect, w: f32, h: f32) {
    let right_w = rect.w - w;
    let below_h = rect.h - h;

    if right_w > EPS {
        free_rects.push(FreeRect {
            x: rect.x + w,
            y: rect.y,
            w: right_w,
            h,
        });
    }
    if below_h > EPS {
        free_rects.push(FreeRect {
            x: rect.x,
            y: rect.y + h,
            w: rect.w,
            h: below_h,
        });
    }
}
