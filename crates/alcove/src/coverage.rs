//! Cost-ordered coverage search over gate sequences.
//!
//! Purpose
//! - Given a native gate set with exact fidelity costs, emit the family of
//!   circuit shapes whose reachable sets cover the whole PU(4) alcove:
//!   exhaustive (every two-qubit target lies in some member) and irredundant
//!   (no member lies inside the union of equal-or-cheaper members).
//!
//! How
//! - A priority queue explores sequences in ascending (cost, volume) order.
//!   Candidates sharing one cost level are batched; at each level crossing
//!   the batch is trimmed against everything cheaper and folded into a
//!   running union. A sequence whose prefix was trimmed away is skipped
//!   outright — extending a useless prefix cannot become useful. The loop
//!   stops the first time a candidate's region attains the full cell volume.
//!
//! Code cross-refs: `compose` (region composition), `polytope::trim_set`
//! (batch trim), `qlr` (static alcoves).

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::fmt;

use num_traits::{Signed, ToPrimitive};
use tracing::{debug, trace, warn};

use crate::compose::{compose, ComposeError};
use crate::polytope::{trim_set, Polytope, Volume};
use crate::qlr::{alcove_c2, identity_polytope};
use crate::rat::{int, Rat};

/// One native gate: a label, an exact fidelity cost, and the one-step
/// reachable region in alcove coordinates.
#[derive(Clone, Debug)]
pub struct Operation {
    pub label: String,
    pub cost: Rat,
    pub region: Polytope,
}

/// Configuration problems are rejected eagerly, never tolerated silently.
#[derive(Debug)]
pub enum ConfigError {
    EmptyLabel,
    DuplicateLabel { label: String },
    /// A zero or negative cost would keep the frontier from progressing.
    NonPositiveCost { label: String },
    WrongDimension { label: String, found: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyLabel => write!(f, "operation label must be nonempty"),
            ConfigError::DuplicateLabel { label } => {
                write!(f, "duplicate operation label {label:?}")
            }
            ConfigError::NonPositiveCost { label } => {
                write!(f, "operation {label:?} must have strictly positive cost")
            }
            ConfigError::WrongDimension { label, found } => write!(
                f,
                "operation {label:?} region has ambient dimension {found}, expected 3"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Search failure: bad configuration or a composition over malformed regions.
#[derive(Debug)]
pub enum CoverageError {
    Config(ConfigError),
    Compose(ComposeError),
}

impl fmt::Display for CoverageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoverageError::Config(e) => write!(f, "{e}"),
            CoverageError::Compose(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CoverageError {}

impl From<ConfigError> for CoverageError {
    fn from(e: ConfigError) -> Self {
        CoverageError::Config(e)
    }
}

impl From<ComposeError> for CoverageError {
    fn from(e: ComposeError) -> Self {
        CoverageError::Compose(e)
    }
}

impl Operation {
    pub fn new(label: impl Into<String>, cost: Rat, region: Polytope) -> Result<Self, ConfigError> {
        let label = label.into();
        if label.is_empty() {
            return Err(ConfigError::EmptyLabel);
        }
        if !cost.is_positive() {
            return Err(ConfigError::NonPositiveCost { label });
        }
        for r in &region.regions {
            if r.dim() != 3 {
                return Err(ConfigError::WrongDimension {
                    label,
                    found: r.dim(),
                });
            }
        }
        Ok(Operation {
            label,
            cost,
            region,
        })
    }
}

/// A reachable set tagged with the gate sequence that produced it and the
/// summed cost of that sequence.
#[derive(Clone, Debug)]
pub struct CircuitRegion {
    pub gates: Vec<String>,
    pub cost: Rat,
    pub region: Polytope,
}

impl fmt::Display for CircuitRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.gates.is_empty() {
            write!(f, "cost {} | identity", self.cost)
        } else {
            write!(f, "cost {} | {}", self.cost, self.gates.join("·"))
        }
    }
}

/// Result of one search run. `complete` is false when the frontier drained
/// before any sequence reached the full cell: the returned set still covers
/// everything that was reachable and remains irredundant.
#[derive(Debug)]
pub struct CoverageSet {
    pub circuits: Vec<CircuitRegion>,
    pub complete: bool,
}

/// Total order driving the frontier: ascending cost, ties by ascending
/// volume. Deliberately a free function over plain pairs so the ordering
/// concern stays decoupled from the record types it ranks.
pub fn search_order(a: (&Rat, &Volume), b: (&Rat, &Volume)) -> Ordering {
    a.0.cmp(b.0).then_with(|| a.1.cmp(b.1))
}

/// Frontier entry: a candidate sequence, its summed cost, the one-step
/// region of its last gate, and that region's volume cached for ordering.
struct FrontierEntry {
    gates: Vec<String>,
    cost: Rat,
    last_region: Polytope,
    volume: Volume,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for FrontierEntry {}
impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        search_order((&self.cost, &self.volume), (&other.cost, &other.volume))
    }
}

/// Compute the exhaustive, irredundant coverage set for `operations`.
pub fn build_coverage_set(operations: &[Operation]) -> Result<CoverageSet, CoverageError> {
    let mut seen_labels: HashSet<&str> = HashSet::new();
    for op in operations {
        if !seen_labels.insert(op.label.as_str()) {
            return Err(ConfigError::DuplicateLabel {
                label: op.label.clone(),
            }
            .into());
        }
    }

    let target_volume = alcove_c2().volume();

    // Already-admitted circuit shapes, indexed by gate sequence for the
    // ancestor lookup, and the running union of their geometry.
    let mut necessary: Vec<CircuitRegion> = vec![CircuitRegion {
        gates: Vec::new(),
        cost: int(0),
        region: identity_polytope().clone(),
    }];
    let mut by_sequence: HashMap<Vec<String>, usize> = HashMap::new();
    by_sequence.insert(Vec::new(), 0);
    let mut total = identity_polytope().clone();

    // Frontier, seeded with the bare operations.
    let mut frontier: BinaryHeap<Reverse<FrontierEntry>> = BinaryHeap::new();
    for op in operations {
        frontier.push(Reverse(FrontierEntry {
            gates: vec![op.label.clone()],
            cost: op.cost.clone(),
            volume: op.region.volume(),
            last_region: op.region.clone(),
        }));
    }

    // Candidates at the cost level currently being processed.
    let mut batch: Vec<CircuitRegion> = Vec::new();
    let mut batch_cost = int(0);
    let mut complete = false;

    while let Some(Reverse(next)) = frontier.pop() {
        if next.cost > batch_cost {
            flush_batch(&mut necessary, &mut by_sequence, &mut total, &mut batch);
            batch_cost = next.cost.clone();
        }

        // A sequence whose prefix never made the necessary set is dead:
        // composing past a discarded prefix cannot add coverage.
        let prefix = &next.gates[..next.gates.len() - 1];
        let ancestor = match by_sequence.get(prefix) {
            Some(&i) => &necessary[i],
            None => {
                trace!(sequence = %next.gates.join("·"), "no ancestor, skipping");
                continue;
            }
        };

        let region = compose(&ancestor.region, &next.last_region)?;
        let volume = region.volume();
        debug!(
            sequence = %next.gates.join("·"),
            cost = %next.cost,
            percent = volume_percent(&volume, &target_volume),
            "explored candidate"
        );
        batch.push(CircuitRegion {
            gates: next.gates.clone(),
            cost: next.cost.clone(),
            region,
        });

        if volume < target_volume {
            for op in operations {
                let mut gates = next.gates.clone();
                gates.push(op.label.clone());
                frontier.push(Reverse(FrontierEntry {
                    gates,
                    cost: &next.cost + &op.cost,
                    volume: op.region.volume(),
                    last_region: op.region.clone(),
                }));
            }
        } else {
            // Cheapest sequence reaching the whole cell; by cost order no
            // unexplored sequence can beat it.
            complete = true;
            break;
        }
    }

    flush_batch(&mut necessary, &mut by_sequence, &mut total, &mut batch);

    if !complete {
        warn!("frontier exhausted without reaching full coverage");
    }
    Ok(CoverageSet {
        circuits: necessary,
        complete,
    })
}

/// Trim the pending batch against everything cheaper, admit the survivors,
/// and fold every batch member into the running union.
fn flush_batch(
    necessary: &mut Vec<CircuitRegion>,
    by_sequence: &mut HashMap<Vec<String>, usize>,
    total: &mut Polytope,
    batch: &mut Vec<CircuitRegion>,
) {
    if batch.is_empty() {
        return;
    }
    let candidate_regions: Vec<Polytope> = batch.iter().map(|c| c.region.clone()).collect();
    let fixed = vec![total.clone()];
    for i in trim_set(&candidate_regions, &fixed) {
        let circuit = batch[i].clone();
        by_sequence.insert(circuit.gates.clone(), necessary.len());
        debug!(circuit = %circuit, "admitted to coverage set");
        necessary.push(circuit);
    }
    for circuit in batch.drain(..) {
        *total = total.union(&circuit.region).reduce();
    }
}

fn volume_percent(volume: &Volume, target: &Volume) -> f64 {
    if volume.dimension < target.dimension {
        return 0.0;
    }
    let ratio = &volume.volume / &target.volume;
    100.0 * ratio.to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rat::{int, rat};

    fn full_cell_operation(label: &str, cost: Rat) -> Operation {
        Operation::new(label, cost, alcove_c2().clone()).unwrap()
    }

    fn point_operation(label: &str, cost: Rat, s: Rat) -> Operation {
        let quarter = &s / &int(4);
        let region = Polytope::point(&[quarter.clone(), quarter.clone(), -quarter]);
        Operation::new(label, cost, region).unwrap()
    }

    #[test]
    fn config_validation_rejects_bad_operations() {
        assert!(Operation::new("", int(1), alcove_c2().clone()).is_err());
        assert!(Operation::new("x", int(0), alcove_c2().clone()).is_err());
        let flat = Polytope::point(&[int(0), int(0)]);
        assert!(Operation::new("x", int(1), flat).is_err());
    }

    #[test]
    fn duplicate_labels_are_rejected() {
        let ops = vec![
            full_cell_operation("g", int(1)),
            full_cell_operation("g", int(2)),
        ];
        assert!(build_coverage_set(&ops).is_err());
    }

    #[test]
    fn single_full_operation_stops_after_first_batch() {
        let ops = vec![full_cell_operation("g", int(1))];
        let cover = build_coverage_set(&ops).unwrap();
        assert!(cover.complete);
        assert_eq!(cover.circuits.len(), 2);
        assert!(cover.circuits[0].gates.is_empty());
        assert_eq!(cover.circuits[0].cost, int(0));
        assert_eq!(cover.circuits[1].gates, vec!["g".to_string()]);
        assert_eq!(cover.circuits[1].cost, int(1));
        assert_eq!(cover.circuits[1].region.volume(), alcove_c2().volume());
    }

    #[test]
    fn gate_reaching_only_identity_is_trimmed_and_prunes_extensions() {
        // A gate whose one-step region is the identity point composes to the
        // identity again, so its cost-1 candidate is covered by the seed,
        // every longer sequence loses its ancestor, and the frontier drains
        // without composing at cost 2.
        let ops = vec![point_operation("g", int(1), int(0))];
        let cover = build_coverage_set(&ops).unwrap();
        assert!(!cover.complete);
        assert_eq!(cover.circuits.len(), 1);
        assert!(cover.circuits[0].gates.is_empty());
    }

    #[test]
    fn uncovered_point_gate_is_retained_alongside_covering_gate() {
        // The point gate reaches a measure-zero set nothing else accounts
        // for at its price, so it stays in the answer; its depth-2 extension
        // is swallowed by the full-cell gate and is dropped.
        let ops = vec![
            point_operation("p", rat(1, 2), int(1)),
            full_cell_operation("f", int(1)),
        ];
        let cover = build_coverage_set(&ops).unwrap();
        assert!(cover.complete);
        let sequences: Vec<_> = cover.circuits.iter().map(|c| c.gates.clone()).collect();
        assert!(sequences.contains(&vec![]));
        assert!(sequences.contains(&vec!["p".to_string()]));
        assert!(sequences.contains(&vec!["f".to_string()]));
        assert!(!sequences.contains(&vec!["p".to_string(), "p".to_string()]));

        // Exhaustive: the union of returned regions measures the whole cell.
        let mut union = Polytope::default();
        for c in &cover.circuits {
            union = union.union(&c.region);
        }
        assert_eq!(union.volume(), alcove_c2().volume());
    }

    #[test]
    fn full_cx_gate_covers_in_three_applications() {
        // The discrete-CX gate set: depth one and two reach only
        // measure-zero slices of the cell, yet both stay in the answer, and
        // the third application saturates the cell.
        let ops = vec![point_operation("CX", int(1), int(1))];
        let cover = build_coverage_set(&ops).unwrap();
        assert!(cover.complete);
        let depths: Vec<_> = cover.circuits.iter().map(|c| c.gates.len()).collect();
        assert_eq!(depths, vec![0, 1, 2, 3]);
        for (depth, circuit) in cover.circuits.iter().enumerate() {
            assert_eq!(circuit.cost, int(depth as i64));
            assert!(circuit.gates.iter().all(|g| g.as_str() == "CX"));
        }
        assert!(cover.circuits[1].region.volume().dimension < 3);
        assert!(cover.circuits[2].region.volume().dimension < 3);
        assert_eq!(cover.circuits[3].region.volume(), alcove_c2().volume());
    }

    #[test]
    fn returned_costs_are_non_decreasing() {
        let ops = vec![
            point_operation("p", rat(1, 2), int(1)),
            full_cell_operation("f", int(1)),
        ];
        let cover = build_coverage_set(&ops).unwrap();
        for pair in cover.circuits.windows(2) {
            assert!(pair[0].cost <= pair[1].cost);
        }
    }

    #[test]
    fn accepted_regions_match_recomposition() {
        let ops = vec![full_cell_operation("g", int(1))];
        let cover = build_coverage_set(&ops).unwrap();
        let accepted = &cover.circuits[1];
        let recomposed = compose(identity_polytope(), &ops[0].region).unwrap();
        assert_eq!(accepted.region.volume(), recomposed.volume());
        assert_eq!(accepted.region.reduce(), recomposed.reduce());
    }

    #[test]
    fn search_order_ranks_cost_before_volume() {
        let small = Volume {
            dimension: 0,
            volume: int(0),
        };
        let big = Volume {
            dimension: 3,
            volume: int(1),
        };
        assert_eq!(
            search_order((&int(1), &big), (&int(2), &small)),
            Ordering::Less
        );
        assert_eq!(
            search_order((&int(1), &small), (&int(1), &big)),
            Ordering::Less
        );
    }
}
