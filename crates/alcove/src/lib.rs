//! Exact coverage-set search for two-qubit gate sets.
//!
//! Given a native gate set with fidelity costs, this crate computes the
//! minimal family of circuit shapes whose reachable sets cover every
//! two-qubit operation, working in the Weyl-alcove coordinates of the
//! monodromy polytope (arXiv:1904.10541). All geometry is exact: reachable
//! sets are unions of convex regions over arbitrary-precision rationals, and
//! exhaustiveness / irredundancy of the answer are proved by exact volume
//! and containment arguments, never by floating-point tolerance.

pub mod compose;
pub mod coverage;
pub mod ops;
pub mod polytope;
pub mod qlr;
pub mod rat;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::compose::compose;
    pub use crate::coverage::{
        build_coverage_set, search_order, CircuitRegion, CoverageSet, Operation,
    };
    pub use crate::ops::{xx_operation, xx_operation_cost, xx_operations, xx_region};
    pub use crate::polytope::{ConvexRegion, Polytope, Volume};
    pub use crate::qlr::{alcove, alcove_c2, identity_polytope, qlr_polytope};
    pub use crate::rat::{int, rat, Rat};
}
