//! Builders for XX-interaction gate sets.
//!
//! Fractional-CX gates `XX^s` reach exactly the alcove point
//! `(s/4, s/4, -s/4)`; these helpers package them as search `Operation`s
//! together with an experimentally extracted fidelity cost model.

use crate::coverage::{ConfigError, Operation};
use crate::polytope::Polytope;
use crate::rat::{int, rat, Rat};

/// Fidelity cost of a ZX operation of fractional `strength`, from the
/// experimental model `strength * scale + offset` with
/// `scale = 64*90 / (10000*100)` (reported in percent per degree) and
/// `offset = 909 / (10000*100) + 1/1000` (two-qubit invocation plus local
/// cost).
pub fn xx_operation_cost(strength: &Rat) -> Rat {
    let scale = rat(64 * 90, 10_000 * 100);
    let offset = &rat(909, 10_000 * 100) + &rat(1, 1000);
    &(strength * &scale) + &offset
}

/// One-step reachable region of `XX^strength`: the single alcove point
/// `(s/4, s/4, -s/4)`.
pub fn xx_region(strength: &Rat) -> Polytope {
    let quarter = strength / &int(4);
    Polytope::point(&[quarter.clone(), quarter.clone(), -quarter])
}

/// Package one fractional-CX gate as a search operation.
pub fn xx_operation(strength: &Rat, cost: Rat) -> Result<Operation, ConfigError> {
    Operation::new(format!("rzx(pi/2 * {strength})"), cost, xx_region(strength))
}

/// Package a whole gate set from `(strength, cost)` pairs.
pub fn xx_operations(strengths: &[(Rat, Rat)]) -> Result<Vec<Operation>, ConfigError> {
    strengths
        .iter()
        .map(|(s, cost)| xx_operation(s, cost.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qlr::alcove_c2;

    #[test]
    fn cost_model_matches_known_values() {
        // Full CX: 5760/10^6 + 1909/10^6 = 7669/10^6.
        assert_eq!(xx_operation_cost(&int(1)), rat(7669, 1_000_000));
        // Half CX: 2880/10^6 + 1909/10^6.
        assert_eq!(xx_operation_cost(&rat(1, 2)), rat(4789, 1_000_000));
    }

    #[test]
    fn xx_regions_are_alcove_points() {
        for (num, den) in [(1i64, 1i64), (1, 2), (1, 3)] {
            let s = rat(num, den);
            let region = xx_region(&s);
            let q = &s / &int(4);
            assert!(region.contains_point(&[q.clone(), q.clone(), -q.clone()]));
            assert!(alcove_c2().contains_point(&[q.clone(), q.clone(), -q]));
        }
    }

    #[test]
    fn labels_identify_the_strength() {
        let op = xx_operation(&rat(1, 2), int(1)).unwrap();
        assert_eq!(op.label, "rzx(pi/2 * 1/2)");
    }
}
