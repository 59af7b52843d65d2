//! Exact convex-region algebra over rationals.
//!
//! Purpose
//! - Represent reachable sets as finite unions of convex regions, each a
//!   conjunction of half-spaces `d + Σ ci·xi ≥ 0` with `BigRational`
//!   coefficients, and provide the operations the composition pipeline and
//!   the coverage search need: intersect, union, reduce, embed, project,
//!   volume, trim.
//!
//! Why exact
//! - The coverage search proves exhaustiveness and irredundancy by comparing
//!   volumes and testing containment *exactly*; a floating-point rendition of
//!   any of these predicates silently corrupts the output set.
//!
//! Code cross-refs: `lp` (feasibility/redundancy oracle), `elimination`
//! (embedding + Fourier–Motzkin projection), `volume` (exact measure).

pub mod elimination;
pub mod lp;
pub mod volume;

use std::collections::HashSet;
use std::fmt;

use num_traits::{One, Signed, Zero};

use crate::rat::{gcd_big, lcm_big, Rat};

pub use elimination::{cylinderize, project, EmbedError};
pub use lp::{feasible, minimize, redundant, strictly_feasible, LpOutcome};
pub use volume::Volume;

/// One conjunction of half-spaces. Row convention: `[d, c1, …, cn]` denotes
/// `d + Σ ci·xi ≥ 0`. May be geometrically empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConvexRegion {
    pub ineqs: Vec<Vec<Rat>>,
}

/// A finite union of convex regions sharing one ambient dimension. The empty
/// list denotes the empty set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Polytope {
    pub regions: Vec<ConvexRegion>,
}

impl ConvexRegion {
    pub fn new(ineqs: Vec<Vec<Rat>>) -> Self {
        Self { ineqs }
    }

    /// Ambient dimension, read off the first row. Regions handled by this
    /// crate always carry at least one row.
    pub fn dim(&self) -> usize {
        debug_assert!(!self.ineqs.is_empty());
        self.ineqs[0].len() - 1
    }

    /// The single point `coords`, written as opposed half-space pairs.
    pub fn exactly(coords: &[Rat]) -> Self {
        let n = coords.len();
        let mut ineqs = Vec::with_capacity(2 * n);
        for (i, value) in coords.iter().enumerate() {
            let mut le = vec![Rat::zero(); n + 1];
            le[0] = value.clone();
            le[i + 1] = -Rat::one();
            let mut ge = vec![Rat::zero(); n + 1];
            ge[0] = -value.clone();
            ge[i + 1] = Rat::one();
            ineqs.push(le);
            ineqs.push(ge);
        }
        Self { ineqs }
    }

    /// Exact membership test.
    pub fn contains_point(&self, point: &[Rat]) -> bool {
        self.ineqs.iter().all(|row| !eval_row(row, point).is_negative())
    }

    /// True iff the region has no solutions.
    pub fn is_empty(&self) -> bool {
        !lp::feasible(&self.ineqs)
    }

    /// True iff every point of `self` lies in `other`.
    pub fn contained_in(&self, other: &ConvexRegion) -> bool {
        if self.is_empty() {
            return true;
        }
        other
            .ineqs
            .iter()
            .all(|row| lp::redundant(&self.ineqs, row))
    }

    /// Canonical form for syntactic comparison: normalized rows, sorted.
    fn canonical_rows(&self) -> Vec<Vec<Rat>> {
        let mut rows: Vec<Vec<Rat>> = self.ineqs.iter().map(|r| normalize_row(r)).collect();
        rows.sort();
        rows.dedup();
        rows
    }
}

impl Polytope {
    pub fn new(regions: Vec<ConvexRegion>) -> Self {
        Self { regions }
    }

    /// A single-region union.
    pub fn from_ineqs(ineqs: Vec<Vec<Rat>>) -> Self {
        Self {
            regions: vec![ConvexRegion::new(ineqs)],
        }
    }

    /// The single point `coords`.
    pub fn point(coords: &[Rat]) -> Self {
        Self {
            regions: vec![ConvexRegion::exactly(coords)],
        }
    }

    /// Ambient dimension of the member regions.
    pub fn dim(&self) -> usize {
        debug_assert!(!self.regions.is_empty());
        self.regions[0].dim()
    }

    pub fn is_empty_set(&self) -> bool {
        self.regions.is_empty()
    }

    /// Logical OR: concatenation of region lists. Duplicates are permitted
    /// and removed only by `reduce`.
    pub fn union(&self, other: &Polytope) -> Polytope {
        let mut regions = self.regions.clone();
        regions.extend(other.regions.iter().cloned());
        Polytope { regions }
    }

    /// Logical AND, distributed over the unions: the cartesian product of
    /// region pairs, each pair's inequalities concatenated.
    pub fn intersect(&self, other: &Polytope) -> Polytope {
        debug_assert!(
            self.regions.is_empty()
                || other.regions.is_empty()
                || self.dim() == other.dim()
        );
        let mut regions = Vec::with_capacity(self.regions.len() * other.regions.len());
        for a in &self.regions {
            for b in &other.regions {
                let mut ineqs = a.ineqs.clone();
                ineqs.extend(b.ineqs.iter().cloned());
                regions.push(ConvexRegion::new(ineqs));
            }
        }
        Polytope { regions }
    }

    /// Exact membership test (any member region contains the point).
    pub fn contains_point(&self, point: &[Rat]) -> bool {
        self.regions.iter().any(|r| r.contains_point(point))
    }

    /// Redundancy elimination. Per region: normalize rows, drop duplicates
    /// and dominated parallels, drop empty regions, then strip every row the
    /// LP oracle proves implied by the rest. Across regions: drop regions
    /// contained in another surviving region. Deterministic and idempotent.
    pub fn reduce(&self) -> Polytope {
        let mut reduced: Vec<ConvexRegion> = self
            .regions
            .iter()
            .filter_map(reduce_region)
            .collect();

        // Syntactic duplicates first (cheap), then geometric containment.
        let mut seen: HashSet<Vec<Vec<Rat>>> = HashSet::new();
        reduced.retain(|r| seen.insert(r.canonical_rows()));

        let mut alive = vec![true; reduced.len()];
        for i in 0..reduced.len() {
            let covered = (0..reduced.len()).any(|j| {
                j != i && alive[j] && reduced[i].contained_in(&reduced[j])
            });
            if covered {
                alive[i] = false;
            }
        }
        let regions = reduced
            .into_iter()
            .zip(alive)
            .filter_map(|(r, keep)| keep.then_some(r))
            .collect();
        Polytope { regions }
    }

    /// Exact measure of the union (see `volume` module).
    pub fn volume(&self) -> Volume {
        volume::union_volume(self)
    }

    /// True iff every point of `self` lies in some region of `other`. Unlike
    /// `ConvexRegion::contained_in`, the right-hand side is a union, so the
    /// test subtracts cover regions one at a time: the part of a region
    /// outside one cover region splits into pieces carrying a strictly
    /// violated row each, and containment holds iff every piece is emptied
    /// by the remaining cover. Degenerate regions are handled exactly; a
    /// single point is contained iff some cover region holds it.
    pub fn contained_in(&self, other: &Polytope) -> bool {
        let cover: Vec<&ConvexRegion> = other.regions.iter().collect();
        self.regions
            .iter()
            .all(|r| !escapes_cover(r.ineqs.clone(), Vec::new(), &cover))
    }
}

/// True iff the piece `{closed rows ≥ 0, strict rows > 0}` contains a point
/// outside every region of `cover`.
fn escapes_cover(
    closed: Vec<Vec<Rat>>,
    strict: Vec<Vec<Rat>>,
    cover: &[&ConvexRegion],
) -> bool {
    if !lp::strictly_feasible(&closed, &strict) {
        return false;
    }
    let (region, rest) = match cover.split_first() {
        Some(split) => split,
        None => return true,
    };
    // A point outside `region` strictly violates one of its rows; funneling
    // the points that satisfy the earlier rows into the later pieces keeps
    // the pieces disjoint.
    let mut satisfied: Vec<Vec<Rat>> = Vec::new();
    for row in &region.ineqs {
        let mut piece_closed = closed.clone();
        piece_closed.extend(satisfied.iter().cloned());
        let mut piece_strict = strict.clone();
        piece_strict.push(row.iter().map(|x| -x).collect());
        if escapes_cover(piece_closed, piece_strict, rest) {
            return true;
        }
        satisfied.push(row.clone());
    }
    false
}

/// Keep the candidates not wholly contained in the union of `fixed` and the
/// other surviving candidates; returns kept indices in order. The pass is
/// sequential, so of two candidates covering each other exactly one
/// survives. Containment is geometric, so a measure-zero candidate survives
/// whenever the rest of the set fails to cover it.
pub fn trim_set(candidates: &[Polytope], fixed: &[Polytope]) -> Vec<usize> {
    let mut alive = vec![true; candidates.len()];
    for i in 0..candidates.len() {
        let mut others = Polytope::default();
        for f in fixed {
            others.regions.extend(f.regions.iter().cloned());
        }
        for (j, c) in candidates.iter().enumerate() {
            if j != i && alive[j] {
                others.regions.extend(c.regions.iter().cloned());
            }
        }
        if candidates[i].contained_in(&others) {
            alive[i] = false;
        }
    }
    (0..candidates.len()).filter(|&i| alive[i]).collect()
}

impl fmt::Display for Polytope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} region(s)", self.regions.len())
    }
}

/// Evaluate `d + Σ ci·xi` at `point`.
pub(crate) fn eval_row(row: &[Rat], point: &[Rat]) -> Rat {
    debug_assert_eq!(row.len(), point.len() + 1);
    let mut acc = row[0].clone();
    for (ci, xi) in row[1..].iter().zip(point) {
        acc = &acc + &(ci * xi);
    }
    acc
}

/// Scale a row to primitive integer form (clear denominators, divide by the
/// gcd of the numerators). The all-zero row is returned unchanged.
pub(crate) fn normalize_row(row: &[Rat]) -> Vec<Rat> {
    use num_bigint::BigInt;
    if row.iter().all(|x| x.is_zero()) {
        return row.to_vec();
    }
    let mut l = BigInt::from(1);
    for x in row {
        l = lcm_big(&l, x.denom());
    }
    let mut g = BigInt::from(0);
    let scaled: Vec<BigInt> = row
        .iter()
        .map(|x| x.numer() * (&l / x.denom()))
        .collect();
    for s in &scaled {
        g = gcd_big(&g, s);
    }
    scaled
        .into_iter()
        .map(|s| Rat::from_integer(s / &g))
        .collect()
}

fn reduce_region(region: &ConvexRegion) -> Option<ConvexRegion> {
    let mut rows: Vec<Vec<Rat>> = Vec::with_capacity(region.ineqs.len());
    for row in &region.ineqs {
        let row = normalize_row(row);
        if row[1..].iter().all(|c| c.is_zero()) {
            if row[0].is_negative() {
                return None; // constant contradiction
            }
            continue; // trivially true
        }
        rows.push(row);
    }

    // Duplicates and dominated parallels: same coefficient part, keep the
    // tightest constant.
    let mut kept: Vec<Vec<Rat>> = Vec::with_capacity(rows.len());
    for row in rows {
        if let Some(prev) = kept.iter_mut().find(|p| p[1..] == row[1..]) {
            if row[0] < prev[0] {
                prev[0] = row[0].clone();
            }
            continue;
        }
        kept.push(row);
    }

    if !lp::feasible(&kept) {
        return None;
    }

    let mut i = 0;
    while i < kept.len() {
        let row = kept.remove(i);
        if lp::redundant(&kept, &row) {
            continue;
        }
        kept.insert(i, row);
        i += 1;
    }
    Some(ConvexRegion::new(kept))
}
