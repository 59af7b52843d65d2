//! Coordinate embedding and exact Fourier–Motzkin projection.
//!
//! `cylinderize` re-expresses a region union in a larger ambient space by a
//! coordinate map; `project` removes one coordinate by existential
//! quantifier elimination. Both are exact: projection keeps precisely the
//! points for which some value of the eliminated coordinate satisfies the
//! system, which requires combining every (positive, negative) coefficient
//! pair — skipping pairs loses solutions, keeping one-sided rows invents
//! constraints that no longer bind.

use std::collections::HashSet;
use std::fmt;

use num_traits::{Signed, Zero};

use crate::rat::Rat;

use super::{normalize_row, ConvexRegion, Polytope};

/// Embedding failure: the coordinate map does not fit the operands.
#[derive(Debug, PartialEq, Eq)]
pub enum EmbedError {
    /// Map length must be the region dimension plus the constant slot.
    MapLength { expected: usize, found: usize },
    /// A map target lies outside the ambient space.
    TargetOutOfRange { target: usize, ambient: usize },
    /// The constant slot must map to itself.
    ConstantMoved,
}

impl fmt::Display for EmbedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbedError::MapLength { expected, found } => {
                write!(f, "coordinate map has {found} entries, region needs {expected}")
            }
            EmbedError::TargetOutOfRange { target, ambient } => {
                write!(f, "map target {target} outside ambient width {ambient}")
            }
            EmbedError::ConstantMoved => write!(f, "map entry 0 must stay at slot 0"),
        }
    }
}

impl std::error::Error for EmbedError {}

/// Re-express `p` in an `ambient`-dimensional space, placing source slot `i`
/// (slot 0 is the constant) at slot `map[i]`. Unmapped ambient coordinates
/// are unconstrained.
pub fn cylinderize(p: &Polytope, map: &[usize], ambient: usize) -> Result<Polytope, EmbedError> {
    if map.first() != Some(&0) {
        return Err(EmbedError::ConstantMoved);
    }
    for &target in map {
        if target > ambient {
            return Err(EmbedError::TargetOutOfRange { target, ambient });
        }
    }
    let mut regions = Vec::with_capacity(p.regions.len());
    for region in &p.regions {
        let mut ineqs = Vec::with_capacity(region.ineqs.len());
        for row in &region.ineqs {
            if row.len() != map.len() {
                return Err(EmbedError::MapLength {
                    expected: row.len(),
                    found: map.len(),
                });
            }
            let mut out = vec![Rat::zero(); ambient + 1];
            for (value, &target) in row.iter().zip(map) {
                out[target] = value.clone();
            }
            ineqs.push(out);
        }
        regions.push(ConvexRegion::new(ineqs));
    }
    Ok(Polytope { regions })
}

/// Existentially eliminate the coordinate at vector slot `index` (1-based;
/// slot 0 is the constant) from every region of `p`. The result lives in an
/// ambient space one coordinate narrower.
pub fn project(p: &Polytope, index: usize) -> Polytope {
    let regions = p
        .regions
        .iter()
        .map(|region| project_region(region, index))
        .collect();
    Polytope { regions }
}

fn project_region(region: &ConvexRegion, index: usize) -> ConvexRegion {
    let mut kept: Vec<Vec<Rat>> = Vec::new();
    let mut lower: Vec<&Vec<Rat>> = Vec::new(); // positive coefficient: bounds below
    let mut upper: Vec<&Vec<Rat>> = Vec::new(); // negative coefficient: bounds above
    for row in &region.ineqs {
        debug_assert!(index < row.len());
        if row[index].is_zero() {
            kept.push(strip(row, index));
        } else if row[index].is_positive() {
            lower.push(row);
        } else {
            upper.push(row);
        }
    }

    // Each (lower, upper) pair combines with positive multipliers chosen so
    // the eliminated coordinate cancels. Rows bounding only one side impose
    // nothing once the coordinate is free to move that way.
    let mut seen: HashSet<Vec<Rat>> = kept.iter().cloned().collect();
    for lo in &lower {
        for hi in &upper {
            let cl = &lo[index];
            let ch = &hi[index]; // negative
            let combined: Vec<Rat> = lo
                .iter()
                .zip(hi.iter())
                .map(|(a, b)| &(a * &(-ch.clone())) + &(b * cl))
                .collect();
            debug_assert!(combined[index].is_zero());
            let row = normalize_row(&strip(&combined, index));
            if row[1..].iter().all(|c| c.is_zero()) && !row[0].is_negative() {
                continue; // trivially true
            }
            if seen.insert(row.clone()) {
                kept.push(row);
            }
        }
    }
    ConvexRegion::new(kept)
}

fn strip(row: &[Rat], index: usize) -> Vec<Rat> {
    let mut out = Vec::with_capacity(row.len() - 1);
    out.extend_from_slice(&row[..index]);
    out.extend_from_slice(&row[index + 1..]);
    out
}
