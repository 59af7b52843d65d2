//! Exact linear programming over rationals.
//!
//! Purpose
//! - Back the region algebra's feasibility, redundancy, and containment
//!   queries with an exact oracle: a two-phase tableau simplex over
//!   `BigRational` with Bland's rule (guaranteed termination, no tolerances).
//!
//! Conventions
//! - A constraint system is a slice of rows `[d, c1, …, cn]`, each meaning
//!   `d + Σ ci·xi ≥ 0` over free (sign-unrestricted) variables.
//! - `minimize` returns the exact minimum of an affine objective over that
//!   system, or reports infeasibility/unboundedness.

use num_traits::{Signed, Zero};

use crate::rat::{int, Rat};

/// Outcome of an exact LP solve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LpOutcome {
    /// The constraint system has no solution.
    Infeasible,
    /// The objective decreases without bound over the feasible set.
    Unbounded,
    /// The exact minimum value of the objective.
    Optimal(Rat),
}

/// Minimize `objective[0] + Σ objective[i]·xi` subject to every row of
/// `ineqs` holding (`d + Σ ci·xi ≥ 0`). Variables are free; internally each
/// is split into a difference of two nonnegative variables.
pub fn minimize(ineqs: &[Vec<Rat>], objective: &[Rat]) -> LpOutcome {
    let n = objective.len() - 1;
    debug_assert!(ineqs.iter().all(|row| row.len() == n + 1));

    let nv = 2 * n; // split variables, ids 0..nv
    let m = ineqs.len();

    // Constraint rows in `A y <= b` form: d + c·x >= 0  <=>  (-c)·x <= d,
    // with x_i = y_{2i} - y_{2i+1}.
    let mut t = Tableau {
        n_ids: (0..nv).collect(),
        b_ids: (nv..nv + m).collect(),
        a: Vec::with_capacity(m),
        b: Vec::with_capacity(m),
        c: vec![Rat::zero(); nv],
        v: Rat::zero(),
    };
    for row in ineqs {
        let mut arow = Vec::with_capacity(nv);
        for ci in &row[1..] {
            arow.push(-ci.clone());
            arow.push(ci.clone());
        }
        t.a.push(arow);
        t.b.push(row[0].clone());
    }

    // Maximize g·y = -(objective · x); min = objective[0] - max.
    let mut goal = vec![Rat::zero(); nv];
    for (i, ei) in objective[1..].iter().enumerate() {
        goal[2 * i] = -ei.clone();
        goal[2 * i + 1] = ei.clone();
    }

    if t.b.iter().any(|bi| bi.is_negative()) {
        if !t.phase_one(nv + m) {
            return LpOutcome::Infeasible;
        }
        t.install_objective(&goal);
    } else {
        t.c = goal;
    }

    match t.optimize() {
        Some(()) => LpOutcome::Optimal(&objective[0] - &t.v),
        None => LpOutcome::Unbounded,
    }
}

/// True iff the system `d + Σ ci·xi ≥ 0` has any solution.
pub fn feasible(ineqs: &[Vec<Rat>]) -> bool {
    if ineqs.is_empty() {
        return true;
    }
    let dim = ineqs[0].len();
    let zero_obj = vec![Rat::zero(); dim];
    minimize(ineqs, &zero_obj) != LpOutcome::Infeasible
}

/// True iff the mixed system of closed rows (`d + Σ ci·xi ≥ 0`) and strict
/// rows (`d + Σ ci·xi > 0`) has a solution. Realized by pressing a slack
/// variable `t ≤ 1` under every strict row and maximizing it: a solution
/// with every strict row positive exists iff the maximum is positive.
pub fn strictly_feasible(closed: &[Vec<Rat>], strict: &[Vec<Rat>]) -> bool {
    if strict.is_empty() {
        return feasible(closed);
    }
    let width = strict[0].len();
    debug_assert!(closed.iter().all(|row| row.len() == width));

    let mut rows: Vec<Vec<Rat>> = Vec::with_capacity(closed.len() + strict.len() + 1);
    for row in closed {
        let mut r = row.clone();
        r.push(Rat::zero());
        rows.push(r);
    }
    for row in strict {
        let mut r = row.clone();
        r.push(int(-1)); // d + c·x - t >= 0
        rows.push(r);
    }
    let mut cap = vec![Rat::zero(); width + 1];
    cap[0] = int(1);
    cap[width] = int(-1); // t <= 1
    rows.push(cap);

    let mut objective = vec![Rat::zero(); width + 1];
    objective[width] = int(-1);
    match minimize(&rows, &objective) {
        LpOutcome::Infeasible => false,
        LpOutcome::Unbounded => true,
        LpOutcome::Optimal(v) => v.is_negative(),
    }
}

/// True iff `row` is implied by `ineqs` (its left-hand side is nonnegative
/// everywhere on the feasible set). An empty feasible set implies every row.
pub fn redundant(ineqs: &[Vec<Rat>], row: &[Rat]) -> bool {
    match minimize(ineqs, row) {
        LpOutcome::Infeasible => true,
        LpOutcome::Unbounded => false,
        LpOutcome::Optimal(v) => !v.is_negative(),
    }
}

/// Dictionary-form simplex tableau: `x_B[i] = b[i] - Σ_j a[i][j]·x_N[j]`,
/// objective `z = v + Σ_j c[j]·x_N[j]`.
struct Tableau {
    n_ids: Vec<usize>,
    b_ids: Vec<usize>,
    a: Vec<Vec<Rat>>,
    b: Vec<Rat>,
    c: Vec<Rat>,
    v: Rat,
}

impl Tableau {
    fn pivot(&mut self, l: usize, e: usize) {
        let cols = self.n_ids.len();
        let piv = self.a[l][e].clone();
        debug_assert!(!piv.is_zero());

        self.b[l] = &self.b[l] / &piv;
        for j in 0..cols {
            if j != e {
                self.a[l][j] = &self.a[l][j] / &piv;
            }
        }
        self.a[l][e] = piv.recip();
        std::mem::swap(&mut self.b_ids[l], &mut self.n_ids[e]);

        for i in 0..self.a.len() {
            if i == l {
                continue;
            }
            let f = self.a[i][e].clone();
            if f.is_zero() {
                continue;
            }
            self.b[i] = &self.b[i] - &(&f * &self.b[l]);
            for j in 0..cols {
                if j != e {
                    self.a[i][j] = &self.a[i][j] - &(&f * &self.a[l][j]);
                }
            }
            self.a[i][e] = -(&f * &self.a[l][e]);
        }

        let ce = self.c[e].clone();
        if !ce.is_zero() {
            self.v = &self.v + &(&ce * &self.b[l]);
            for j in 0..cols {
                if j != e {
                    self.c[j] = &self.c[j] - &(&ce * &self.a[l][j]);
                }
            }
            self.c[e] = -(&ce * &self.a[l][e]);
        }
    }

    /// Bland's rule loop. `Some(())` at optimality, `None` if unbounded.
    fn optimize(&mut self) -> Option<()> {
        loop {
            // Entering: positive reduced cost, smallest variable id.
            let mut e: Option<usize> = None;
            for j in 0..self.n_ids.len() {
                if self.c[j].is_positive()
                    && e.map_or(true, |k| self.n_ids[j] < self.n_ids[k])
                {
                    e = Some(j);
                }
            }
            let e = match e {
                Some(e) => e,
                None => return Some(()),
            };
            // Leaving: tightest ratio, ties by smallest basic id.
            let mut l: Option<usize> = None;
            for i in 0..self.a.len() {
                if !self.a[i][e].is_positive() {
                    continue;
                }
                let better = match l {
                    None => true,
                    Some(k) => {
                        let ri = &self.b[i] / &self.a[i][e];
                        let rk = &self.b[k] / &self.a[k][e];
                        ri < rk || (ri == rk && self.b_ids[i] < self.b_ids[k])
                    }
                };
                if better {
                    l = Some(i);
                }
            }
            let l = l?;
            self.pivot(l, e);
        }
    }

    /// Phase one with one auxiliary variable `x0` (id `aux`): maximize `-x0`
    /// over the relaxed system. Returns false iff the original system is
    /// infeasible. On success the dictionary is feasible and `x0` is gone.
    fn phase_one(&mut self, aux: usize) -> bool {
        for row in &mut self.a {
            row.push(int(-1));
        }
        self.n_ids.push(aux);
        let cols = self.n_ids.len();
        self.c = vec![Rat::zero(); cols];
        self.c[cols - 1] = int(-1);
        self.v = Rat::zero();

        // Mandatory first pivot: bring x0 in against the most negative row.
        let mut l = 0;
        for i in 1..self.b.len() {
            if self.b[i] < self.b[l] || (self.b[i] == self.b[l] && self.b_ids[i] < self.b_ids[l])
            {
                l = i;
            }
        }
        let e = cols - 1;
        self.pivot(l, e);

        // The auxiliary objective is bounded above by zero.
        let bounded = self.optimize().is_some();
        debug_assert!(bounded);
        if !self.v.is_zero() {
            return false;
        }

        // Drive x0 out of the basis if it sits there at value zero.
        if let Some(r) = self.b_ids.iter().position(|&id| id == aux) {
            debug_assert!(self.b[r].is_zero());
            match (0..self.n_ids.len()).find(|&j| !self.a[r][j].is_zero()) {
                Some(j) => self.pivot(r, j),
                None => {
                    // All-zero row: the constraint is vacuous here.
                    self.a.remove(r);
                    self.b.remove(r);
                    self.b_ids.remove(r);
                }
            }
        }
        let jc = self
            .n_ids
            .iter()
            .position(|&id| id == aux)
            .expect("x0 is nonbasic after phase one");
        self.n_ids.remove(jc);
        self.c.remove(jc);
        for row in &mut self.a {
            row.remove(jc);
        }
        true
    }

    /// Express `goal` (indexed by variable id) in the current dictionary.
    fn install_objective(&mut self, goal: &[Rat]) {
        let cols = self.n_ids.len();
        self.v = Rat::zero();
        self.c = vec![Rat::zero(); cols];
        for (id, w) in goal.iter().enumerate() {
            if w.is_zero() {
                continue;
            }
            if let Some(j) = self.n_ids.iter().position(|&k| k == id) {
                self.c[j] = &self.c[j] + w;
            } else if let Some(i) = self.b_ids.iter().position(|&k| k == id) {
                self.v = &self.v + &(w * &self.b[i]);
                for j in 0..cols {
                    self.c[j] = &self.c[j] - &(w * &self.a[i][j]);
                }
            }
        }
    }
}
