//! Exact volumes of region unions.
//!
//! Purpose
//! - Measure convex regions by enumerating their vertices (Cramer solves over
//!   every n-subset of rows) and summing cones over facets anchored at a
//!   reference vertex; measure unions by inclusion–exclusion.
//! - The cone recursion is kept fully rational: the facet height carries a
//!   factor 1/‖a‖ and the coordinate projection of the facet carries ‖a‖/|aⱼ|,
//!   so the norms cancel and only |aⱼ| survives.
//!
//! Degeneracy
//! - A region whose affine hull is below the ambient dimension has measure
//!   zero here; `Volume` records its effective dimension so orderings can
//!   still rank it below any full-dimensional region.

use num_traits::{Signed, Zero};

use crate::rat::{int, Rat};

use super::{eval_row, normalize_row, ConvexRegion, Polytope};

/// Exact measure tagged with the effective (affine-hull) dimension. The
/// derived ordering is lexicographic: any full-dimensional volume outranks
/// every degenerate one.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Volume {
    pub dimension: usize,
    pub volume: Rat,
}

impl Volume {
    pub fn zero() -> Self {
        Volume {
            dimension: 0,
            volume: Rat::zero(),
        }
    }
}

/// Measure of a union: the maximum effective dimension across member
/// regions, and — when that reaches the ambient dimension — the exact
/// inclusion–exclusion sum over the full-dimensional members.
pub fn union_volume(p: &Polytope) -> Volume {
    if p.regions.is_empty() {
        return Volume::zero();
    }
    let ambient = p.dim();
    let mut top = 0usize;
    let mut full: Vec<&ConvexRegion> = Vec::new();
    for region in &p.regions {
        let v = convex_volume(&region.ineqs, ambient);
        if v.dimension > top {
            top = v.dimension;
        }
        if v.dimension == ambient {
            full.push(region);
        }
    }
    if full.is_empty() {
        return Volume {
            dimension: top,
            volume: Rat::zero(),
        };
    }
    // The u64 subset mask caps inclusion–exclusion at 63 full-dimensional
    // regions; the sum has 2^n terms and is out of reach well before then.
    assert!(
        full.len() < 64,
        "inclusion-exclusion over {} regions exceeds the supported bound of 63",
        full.len()
    );
    let mut total = Rat::zero();
    for mask in 1u64..(1u64 << full.len()) {
        let mut rows: Vec<Vec<Rat>> = Vec::new();
        for (i, region) in full.iter().enumerate() {
            if mask & (1 << i) != 0 {
                rows.extend(region.ineqs.iter().cloned());
            }
        }
        let v = convex_volume(&rows, ambient);
        if mask.count_ones() % 2 == 1 {
            total = &total + &v.volume;
        } else {
            total = &total - &v.volume;
        }
    }
    Volume {
        dimension: ambient,
        volume: total,
    }
}

/// Exact measure of one convex region given by `rows` in `ambient`
/// dimensions. Assumes the region is bounded (every region this crate
/// measures lies inside a fundamental alcove).
pub fn convex_volume(rows: &[Vec<Rat>], ambient: usize) -> Volume {
    let mut rows: Vec<Vec<Rat>> = rows.iter().map(|r| normalize_row(r)).collect();
    rows.sort();
    rows.dedup();
    rows.retain(|r| !r[1..].iter().all(|c| c.is_zero()) || r[0].is_negative());

    let verts = enumerate_vertices(&rows, ambient);
    if verts.is_empty() {
        return Volume::zero();
    }
    let rank = affine_rank(&verts);
    if rank < ambient {
        return Volume {
            dimension: rank,
            volume: Rat::zero(),
        };
    }
    Volume {
        dimension: ambient,
        volume: cone_volume(&rows, &verts, ambient),
    }
}

/// All vertices of the region: solutions of `dim`-subsets of tight rows that
/// satisfy every inequality.
pub fn enumerate_vertices(rows: &[Vec<Rat>], dim: usize) -> Vec<Vec<Rat>> {
    let mut verts: Vec<Vec<Rat>> = Vec::new();
    if rows.len() < dim {
        return verts;
    }
    let mut choice = vec![0usize; dim];
    enumerate_subsets(rows, dim, 0, 0, &mut choice, &mut verts);
    verts
}

fn enumerate_subsets(
    rows: &[Vec<Rat>],
    dim: usize,
    depth: usize,
    start: usize,
    choice: &mut Vec<usize>,
    verts: &mut Vec<Vec<Rat>>,
) {
    if depth == dim {
        if let Some(point) = solve_tight(rows, choice, dim) {
            if rows.iter().all(|row| !eval_row(row, &point).is_negative())
                && !verts.contains(&point)
            {
                verts.push(point);
            }
        }
        return;
    }
    for i in start..rows.len() {
        choice[depth] = i;
        enumerate_subsets(rows, dim, depth + 1, i + 1, choice, verts);
    }
}

/// Solve the square system `cᵢ·x = -dᵢ` for the chosen rows; `None` when
/// singular.
fn solve_tight(rows: &[Vec<Rat>], choice: &[usize], dim: usize) -> Option<Vec<Rat>> {
    let mut m: Vec<Vec<Rat>> = choice
        .iter()
        .map(|&i| {
            let mut row: Vec<Rat> = rows[i][1..].to_vec();
            row.push(-rows[i][0].clone());
            row
        })
        .collect();
    // Gaussian elimination with exact pivots.
    for col in 0..dim {
        let piv = (col..dim).find(|&r| !m[r][col].is_zero())?;
        m.swap(col, piv);
        let p = m[col][col].clone();
        for entry in m[col].iter_mut() {
            *entry = &*entry / &p;
        }
        for r in 0..dim {
            if r == col {
                continue;
            }
            let f = m[r][col].clone();
            if f.is_zero() {
                continue;
            }
            for c in 0..=dim {
                m[r][c] = &m[r][c] - &(&f * &m[col][c]);
            }
        }
    }
    Some(m.into_iter().map(|row| row[dim].clone()).collect())
}

/// Rank of the span of `vᵢ - v₀`.
fn affine_rank(verts: &[Vec<Rat>]) -> usize {
    if verts.len() < 2 {
        return 0;
    }
    let dim = verts[0].len();
    let mut basis: Vec<Vec<Rat>> = Vec::new();
    for v in &verts[1..] {
        let mut diff: Vec<Rat> = v
            .iter()
            .zip(&verts[0])
            .map(|(a, b)| a - b)
            .collect();
        for b in &basis {
            let lead = b.iter().position(|x| !x.is_zero()).unwrap();
            if !diff[lead].is_zero() {
                let f = &diff[lead] / &b[lead];
                for c in 0..dim {
                    diff[c] = &diff[c] - &(&f * &b[c]);
                }
            }
        }
        if diff.iter().any(|x| !x.is_zero()) {
            basis.push(diff);
            if basis.len() == dim {
                break;
            }
        }
    }
    basis.len()
}

/// Cone-over-facets recursion anchored at the first vertex. `rows` must be
/// normalized and duplicate-free; `verts` must be the full vertex set.
fn cone_volume(rows: &[Vec<Rat>], verts: &[Vec<Rat>], dim: usize) -> Rat {
    if dim == 1 {
        let mut lo = verts[0][0].clone();
        let mut hi = verts[0][0].clone();
        for v in verts {
            if v[0] < lo {
                lo = v[0].clone();
            }
            if v[0] > hi {
                hi = v[0].clone();
            }
        }
        return &hi - &lo;
    }
    let anchor = &verts[0];
    let mut total = Rat::zero();
    for row in rows {
        let slack = eval_row(row, anchor);
        if slack.is_zero() {
            continue; // anchor lies on this facet, zero-height cone
        }
        let tight: Vec<&Vec<Rat>> = verts
            .iter()
            .filter(|v| eval_row(row, v).is_zero())
            .collect();
        if tight.len() < dim {
            continue; // touches a lower face only
        }
        let j = row[1..]
            .iter()
            .position(|c| !c.is_zero())
            .expect("facet row has a nonzero coefficient");
        // Substitute x_j out of the remaining rows using the facet equality.
        let mut facet_rows: Vec<Vec<Rat>> = Vec::new();
        for other in rows {
            if other == row {
                continue;
            }
            let t = &other[j + 1] / &row[j + 1];
            let substituted: Vec<Rat> = other
                .iter()
                .zip(row.iter())
                .map(|(o, r)| o - &(&t * r))
                .collect();
            debug_assert!(substituted[j + 1].is_zero());
            let reduced = normalize_row(&drop_slot(&substituted, j + 1));
            if reduced[1..].iter().all(|c| c.is_zero()) && !reduced[0].is_negative() {
                continue;
            }
            if !facet_rows.contains(&reduced) {
                facet_rows.push(reduced);
            }
        }
        let facet_verts: Vec<Vec<Rat>> = tight
            .iter()
            .map(|v| drop_slot_point(v, j))
            .collect();
        let sub = cone_volume(&facet_rows, &facet_verts, dim - 1);
        if sub.is_zero() {
            continue;
        }
        total = &total + &(&(&slack.abs() * &sub) / &row[j + 1].abs());
    }
    &total / &int(dim as i64)
}

fn drop_slot(row: &[Rat], slot: usize) -> Vec<Rat> {
    let mut out = Vec::with_capacity(row.len() - 1);
    out.extend_from_slice(&row[..slot]);
    out.extend_from_slice(&row[slot + 1..]);
    out
}

fn drop_slot_point(point: &[Rat], coord: usize) -> Vec<Rat> {
    let mut out = Vec::with_capacity(point.len() - 1);
    out.extend_from_slice(&point[..coord]);
    out.extend_from_slice(&point[coord + 1..]);
    out
}
