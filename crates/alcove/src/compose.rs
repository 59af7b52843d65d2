//! Geometric composition: the c-consequences of a- and b-constraints.
//!
//! Given the reachable set of a prefix circuit (the "a" operand) and the
//! one-step set of the next gate (the "b" operand), this computes the exact
//! reachable set of their composition in the "c" block of the monodromy
//! coordinate space, then projects the operands away. The rho step folds in
//! the order-4 center action of PU(4), which the smaller target alcove does
//! not distinguish on its own.

use std::fmt;

use crate::polytope::{cylinderize, project, ConvexRegion, EmbedError, Polytope};
use crate::qlr::{alcove, alcove_c2, qlr_polytope};
use crate::rat::rat;

/// Slots of the 10-wide composition space, constant slot first.
const A_COORDS: [usize; 4] = [0, 1, 2, 3];
const B_COORDS: [usize; 4] = [0, 4, 5, 6];
const C_COORDS: [usize; 4] = [0, 7, 8, 9];

/// Ambient width of the composition space (three 3-coordinate blocks).
const COMPOSE_DIM: usize = 9;

/// Operands embedded into the composition space did not fit.
#[derive(Debug)]
pub enum ComposeError {
    /// An operand region is not 3-dimensional.
    OperandDimension { which: &'static str, found: usize },
    /// Internal embedding failure; indicates a malformed operand region.
    Embed(EmbedError),
}

impl fmt::Display for ComposeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComposeError::OperandDimension { which, found } => {
                write!(f, "{which} operand has ambient dimension {found}, expected 3")
            }
            ComposeError::Embed(e) => write!(f, "embedding failed: {e}"),
        }
    }
}

impl std::error::Error for ComposeError {}

impl From<EmbedError> for ComposeError {
    fn from(e: EmbedError) -> Self {
        ComposeError::Embed(e)
    }
}

/// Exact reachable set of "`prefix`, then `next_op`", as a region union in
/// the 3-coordinate target space.
pub fn compose(prefix: &Polytope, next_op: &Polytope) -> Result<Polytope, ComposeError> {
    check_operand("prefix", prefix)?;
    check_operand("next gate", next_op)?;

    // Frame both operands by the large alcove, then impose the given
    // constraints on top of the static composition polytope.
    let mut p = qlr_polytope().clone();
    p = p.intersect(&cylinderize(alcove(), &A_COORDS, COMPOSE_DIM)?);
    p = p.intersect(&cylinderize(alcove(), &B_COORDS, COMPOSE_DIM)?);
    p = p.intersect(&cylinderize(prefix, &A_COORDS, COMPOSE_DIM)?);
    p = p.intersect(&cylinderize(next_op, &B_COORDS, COMPOSE_DIM)?);

    // Rho-symmetrize the result block: an inequality
    //     d + x c1 + y c2 + z c3 >= 0
    // induces under the center action
    //     d + x (c3 + 1/2) + y (c4 + 1/2) + z (c1 - 1/2) >= 0, i.e.
    //    (d + x/2 + y/2 - z/2) + (z - y) c1 + (-y) c2 + (x - y) c3 >= 0.
    let mut rho_regions = Vec::with_capacity(p.regions.len());
    for region in &p.regions {
        let mut rotated = Vec::with_capacity(region.ineqs.len());
        for row in &region.ineqs {
            let (d, x, y, z) = (&row[0], &row[7], &row[8], &row[9]);
            let half = rat(1, 2);
            let mut new_row = row.clone();
            new_row[0] = &(&(d + &(x * &half)) + &(y * &half)) - &(z * &half);
            new_row[7] = z - y;
            new_row[8] = -y.clone();
            new_row[9] = x - y;
            rotated.push(new_row);
        }
        rho_regions.push(ConvexRegion::new(rotated));
    }
    p = p.union(&Polytope::new(rho_regions));

    // Restrict the result block to the PU(4) cell and project the operand
    // blocks away, highest coordinate first, re-reducing after each step.
    p = p.intersect(&cylinderize(alcove_c2(), &C_COORDS, COMPOSE_DIM)?);
    p = p.reduce();
    for index in (1..=6).rev() {
        p = project(&p, index);
        p = p.reduce();
    }
    Ok(p)
}

fn check_operand(which: &'static str, operand: &Polytope) -> Result<(), ComposeError> {
    for region in &operand.regions {
        if region.dim() != 3 {
            return Err(ComposeError::OperandDimension {
                which,
                found: region.dim(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qlr::identity_polytope;
    use crate::rat::{int, rat};

    #[test]
    fn rejects_wrong_operand_dimension() {
        let flat = Polytope::point(&[int(0), int(0)]);
        assert!(compose(&flat, identity_polytope()).is_err());
    }

    #[test]
    fn identity_then_gate_reaches_the_gate_point() {
        // The canonical CX-class point; composing from the identity must
        // reproduce exactly that point inside the PU(4) cell.
        let gate = Polytope::point(&[rat(1, 4), rat(1, 4), rat(-1, 4)]);
        let reached = compose(identity_polytope(), &gate).unwrap();
        assert!(reached.contains_point(&[rat(1, 4), rat(1, 4), rat(-1, 4)]));
        let vol = reached.volume();
        assert_eq!(vol.dimension, 0);
    }

    #[test]
    fn identity_then_full_alcove_saturates_the_cell() {
        let reached = compose(identity_polytope(), alcove_c2()).unwrap();
        assert_eq!(reached.volume(), alcove_c2().volume());
    }
}
