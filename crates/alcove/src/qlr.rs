//! Static monodromy data: the quantum Littlewood–Richardson table, the
//! inequality generator, and the Weyl alcove fundamental domains.
//!
//! Purpose
//! - Turn the hand-curated table of nonzero quantum Littlewood–Richardson
//!   coefficients for the small quantum cohomology of k-planes in C⁴
//!   (0 < k < 4) into the static composition polytope: the system of linear
//!   inequalities a legal (prefix, next-gate, result) coordinate triple must
//!   satisfy. See (*) in Theorem 23 of arXiv:1904.10541.
//! - Hold the SU(4) and PU(4) alcove constraints used to frame every
//!   composition.
//!
//! All three polytopes are built once per process into shared read-only
//! statics; a malformed table row is a fatal configuration error caught the
//! first time a static is touched.

use std::fmt;
use std::sync::OnceLock;

use crate::polytope::Polytope;
use crate::rat::{int, rat, Rat};

/// One nonzero coefficient `N_{ab}^{c, d} = 1`, i.e.
/// `<sigma_a, sigma_b, sigma_{*c}> = q^d`, at rank `r` for k-planes.
/// Entries with `a ≠ b` implicitly license the swapped entry as well.
pub struct QlrEntry {
    pub r: usize,
    pub k: usize,
    pub a: &'static [usize],
    pub b: &'static [usize],
    pub c: &'static [usize],
    pub d: i64,
}

const fn e(
    r: usize,
    k: usize,
    a: &'static [usize],
    b: &'static [usize],
    c: &'static [usize],
    d: i64,
) -> QlrEntry {
    QlrEntry { r, k, a, b, c, d }
}

/// Precomputed table of quantum Littlewood–Richardson coefficients. Only
/// entries with `a ≤ b` in the traversal ordering are stored.
pub const QLR_TABLE: &[QlrEntry] = &[
    //  r  k   a     b     c    d
    e(1, 3, &[0], &[0], &[0], 0),
    e(1, 3, &[0], &[1], &[1], 0),
    e(1, 3, &[0], &[2], &[2], 0),
    e(1, 3, &[0], &[3], &[3], 0),
    e(1, 3, &[1], &[1], &[2], 0),
    e(1, 3, &[1], &[2], &[3], 0),
    e(1, 3, &[1], &[3], &[0], 1),
    e(1, 3, &[2], &[2], &[0], 1),
    e(1, 3, &[2], &[3], &[1], 1),
    e(1, 3, &[3], &[3], &[2], 1),
    //  r  k     a        b        c      d
    e(2, 2, &[0, 0], &[0, 0], &[0, 0], 0),
    e(2, 2, &[0, 0], &[1, 0], &[1, 0], 0),
    e(2, 2, &[0, 0], &[1, 1], &[1, 1], 0),
    e(2, 2, &[0, 0], &[2, 0], &[2, 0], 0),
    e(2, 2, &[0, 0], &[2, 1], &[2, 1], 0),
    e(2, 2, &[0, 0], &[2, 2], &[2, 2], 0),
    e(2, 2, &[1, 0], &[1, 0], &[1, 1], 0),
    e(2, 2, &[1, 0], &[1, 0], &[2, 0], 0),
    e(2, 2, &[1, 0], &[1, 1], &[2, 1], 0),
    e(2, 2, &[1, 0], &[2, 0], &[2, 1], 0),
    e(2, 2, &[1, 0], &[2, 1], &[2, 2], 0),
    e(2, 2, &[1, 0], &[2, 1], &[0, 0], 1),
    e(2, 2, &[1, 0], &[2, 2], &[1, 0], 1),
    e(2, 2, &[1, 1], &[1, 1], &[2, 2], 0),
    e(2, 2, &[1, 1], &[2, 0], &[0, 0], 1),
    e(2, 2, &[1, 1], &[2, 1], &[1, 0], 1),
    e(2, 2, &[1, 1], &[2, 2], &[2, 0], 1),
    e(2, 2, &[2, 0], &[2, 0], &[2, 2], 0),
    e(2, 2, &[2, 0], &[2, 1], &[1, 0], 1),
    e(2, 2, &[2, 0], &[2, 2], &[1, 1], 1),
    e(2, 2, &[2, 1], &[2, 1], &[2, 0], 1),
    e(2, 2, &[2, 1], &[2, 1], &[1, 1], 1),
    e(2, 2, &[2, 1], &[2, 2], &[2, 1], 1),
    e(2, 2, &[2, 2], &[2, 2], &[0, 0], 2),
    //  r  k      a           b           c        d
    e(3, 1, &[0, 0, 0], &[0, 0, 0], &[0, 0, 0], 0),
    e(3, 1, &[0, 0, 0], &[1, 0, 0], &[1, 0, 0], 0),
    e(3, 1, &[0, 0, 0], &[1, 1, 0], &[1, 1, 0], 0),
    e(3, 1, &[0, 0, 0], &[1, 1, 1], &[1, 1, 1], 0),
    e(3, 1, &[1, 0, 0], &[1, 0, 0], &[1, 1, 0], 0),
    e(3, 1, &[1, 0, 0], &[1, 1, 0], &[1, 1, 1], 0),
    e(3, 1, &[1, 0, 0], &[1, 1, 1], &[0, 0, 0], 1),
    e(3, 1, &[1, 1, 0], &[1, 1, 0], &[0, 0, 0], 1),
    e(3, 1, &[1, 1, 0], &[1, 1, 1], &[1, 0, 0], 1),
    e(3, 1, &[1, 1, 1], &[1, 1, 1], &[1, 1, 0], 1),
];

/// A table row whose partition entries index outside their coordinate block.
#[derive(Debug, PartialEq, Eq)]
pub struct TableError {
    pub block: char,
    pub index: i64,
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "QLR table entry indexes slot {} outside block '{}' (valid 1..=4)",
            self.index, self.block
        )
    }
}

impl std::error::Error for TableError {}

/// Generate one composition-polytope inequality from a table row.
///
/// Builds the raw 13-wide vector (constant + three 4-wide blocks): each
/// partition entry pᵢ pokes slot `k + (i+1) - pᵢ` of its block, subtracting
/// for the "a" and "b" operands and adding for the result "c"; the constant
/// is the quantum degree `d`. The fourth coordinate of each block is then
/// eliminated via `x4 = -x1 - x2 - x3`, leaving a 10-wide vector.
pub fn ineq_from_entry(entry: &QlrEntry) -> Result<Vec<Rat>, TableError> {
    ineq_from_parts(entry.k, entry.a, entry.b, entry.c, entry.d)
}

fn ineq_from_parts(
    k: usize,
    a: &[usize],
    b: &[usize],
    c: &[usize],
    d: i64,
) -> Result<Vec<Rat>, TableError> {
    let mut raw = vec![int(0); 13];
    raw[0] = int(d);
    let mut poke = |part: &[usize], offset: usize, sign: i64, block: char| {
        for (i, pi) in part.iter().enumerate() {
            let subscript = (k + i + 1) as i64 - *pi as i64;
            if !(1..=4).contains(&subscript) {
                return Err(TableError {
                    block,
                    index: subscript,
                });
            }
            let slot = offset + subscript as usize;
            raw[slot] = &raw[slot] + &int(sign);
        }
        Ok(())
    };
    poke(a, 0, -1, 'a')?;
    poke(b, 4, -1, 'b')?;
    poke(c, 8, 1, 'c')?;

    let mut out = Vec::with_capacity(10);
    out.push(raw[0].clone());
    for block in 0..3 {
        let base = 1 + 4 * block;
        for slot in 0..3 {
            out.push(&raw[base + slot] - &raw[base + 3]);
        }
    }
    Ok(out)
}

/// All inequalities of the composition polytope: one per table row plus the
/// swapped row whenever `a ≠ b`.
pub fn generate_inequalities() -> Result<Vec<Vec<Rat>>, TableError> {
    let mut out = Vec::with_capacity(2 * QLR_TABLE.len());
    for entry in QLR_TABLE {
        out.push(ineq_from_entry(entry)?);
        if entry.a != entry.b {
            out.push(ineq_from_parts(entry.k, entry.b, entry.a, entry.c, entry.d)?);
        }
    }
    Ok(out)
}

/// The static composition polytope over the 10-wide `[1, a, b, c]` space.
/// Does *not* include the alcove constraints; those are imposed per
/// composition. No redundancy elimination happens here — it falls out later
/// against the alcove frames.
pub fn qlr_polytope() -> &'static Polytope {
    static P: OnceLock<Polytope> = OnceLock::new();
    P.get_or_init(|| {
        let ineqs = generate_inequalities().expect("static QLR table is well-formed");
        Polytope::from_ineqs(ineqs)
    })
}

/// Fundamental Weyl alcove for SU(4), in the reduced 3-coordinate space.
pub fn alcove() -> &'static Polytope {
    static P: OnceLock<Polytope> = OnceLock::new();
    P.get_or_init(|| {
        Polytope::from_ineqs(vec![
            vec![int(0), int(1), int(-1), int(0)],  // a1 - a2 >= 0
            vec![int(0), int(0), int(1), int(-1)],  // a2 - a3 >= 0
            vec![int(0), int(1), int(1), int(2)],   // a3 - a4 >= 0
            vec![int(1), int(-2), int(-1), int(-1)], // a4 - (a1 - 1) >= 0
        ])
    })
}

/// Fundamental Weyl alcove for PU(4): the SU(4) alcove cut by the C2
/// inequality `a3 + 1/2 - a1 >= 0`. This is the target domain coverage is
/// measured against.
pub fn alcove_c2() -> &'static Polytope {
    static P: OnceLock<Polytope> = OnceLock::new();
    P.get_or_init(|| {
        let mut ineqs = alcove().regions[0].ineqs.clone();
        ineqs.push(vec![int(1), int(-2), int(0), int(2)]);
        Polytope::from_ineqs(ineqs)
    })
}

/// The identity operation's reachable set: the alcove origin.
pub fn identity_polytope() -> &'static Polytope {
    static P: OnceLock<Polytope> = OnceLock::new();
    P.get_or_init(|| Polytope::point(&[rat(0, 1), rat(0, 1), rat(0, 1)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rat::int;

    #[test]
    fn known_row_generates_expected_inequality() {
        // [1, 3, [0], [1], [1], 0]: pokes a4, b3, c3; after collapsing the
        // fourth block coordinates this reads a1+a2+a3 - b3 + c3 >= 0.
        let entry = &QLR_TABLE[1];
        let row = ineq_from_entry(entry).unwrap();
        let expected: Vec<_> = [0, 1, 1, 1, 0, 0, -1, 0, 0, 1]
            .iter()
            .map(|&n| int(n))
            .collect();
        assert_eq!(row, expected);
    }

    #[test]
    fn generation_covers_table_plus_swaps() {
        let ineqs = generate_inequalities().unwrap();
        let swapped = QLR_TABLE.iter().filter(|e| e.a != e.b).count();
        assert_eq!(ineqs.len(), QLR_TABLE.len() + swapped);
        assert!(ineqs.iter().all(|row| row.len() == 10));
    }

    #[test]
    fn malformed_entry_is_rejected() {
        // Partition value 4 at k = 3 indexes slot 0, outside the block.
        let bad = QlrEntry {
            r: 1,
            k: 3,
            a: &[4],
            b: &[0],
            c: &[0],
            d: 0,
        };
        assert_eq!(
            ineq_from_entry(&bad),
            Err(TableError {
                block: 'a',
                index: 0,
            })
        );
    }

    #[test]
    fn alcove_c2_is_a_full_dimensional_cell() {
        let vol = alcove_c2().volume();
        assert_eq!(vol.dimension, 3);
        assert!(vol.volume > int(0));
    }

    #[test]
    fn identity_sits_in_both_alcoves() {
        let origin = [int(0), int(0), int(0)];
        assert!(alcove().contains_point(&origin));
        assert!(alcove_c2().contains_point(&origin));
    }
}
