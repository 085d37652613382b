// Copyright 2020 Xavier Gillard
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! This module provides the two lazy cutting-plane generators the
//! formulation can register on a model. Each cut is a single global
//! constraint: the generator owns a two-state `{pending, submitted}` machine
//! and transitions to `submitted` exactly once, atomically, because the
//! solver may deliver callbacks from several threads at once. After the
//! transition every invocation is a no-op.

use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;

use crate::{LazyCut, LinearConstraint, LinearExpr, Sense, SolutionValues, VarId};

/// The probability-sum cut: if the relaxation's total path-probability mass
/// deviates from 1 by more than epsilon, submit the global equality
/// `sum(pi) = 1` once.
///
/// The per-path bounds and linking constraints already force the mass to 1
/// in every feasible integer solution, so this cut only tightens the
/// relaxation during search.
pub struct ProbabilitySumCut {
    /// The whole path-probability variable family.
    pi: Vec<VarId>,
    /// The minimum nonzero path probability of the instance.
    epsilon: f64,
    submitted: AtomicBool,
}

impl ProbabilitySumCut {
    pub fn new(pi: Vec<VarId>, epsilon: f64) -> Self {
        ProbabilitySumCut {
            pi,
            epsilon,
            submitted: AtomicBool::new(false),
        }
    }
}

impl LazyCut for ProbabilitySumCut {
    fn separate(&self, solution: &dyn SolutionValues) -> Option<LinearConstraint> {
        if self.submitted.load(Ordering::Acquire) {
            return None;
        }
        let mass: f64 = self.pi.iter().map(|var| solution.value_of(*var)).sum();
        if (mass - 1.0).abs() <= self.epsilon {
            return None;
        }
        if self
            .submitted
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            // another callback thread won the race
            return None;
        }
        debug!("probability-sum cut submitted (relaxation mass was {mass})");
        let mut expr = LinearExpr::with_capacity(self.pi.len());
        for var in self.pi.iter() {
            expr.push(*var, 1.0);
        }
        Some(LinearConstraint::new(expr, Sense::Equal, 1.0))
    }
}

/// The path-count cut: when the caller knows that exactly `target` paths are
/// structurally realizable under any strategy, and the relaxation activates
/// a different number of paths (probability at least epsilon), submit the
/// global equality `sum(pi[s] / p(s)) = target` once. Dividing each term by
/// its chance-only upper bound `p(s)` normalizes it to a 0/1-like weight, so
/// the sum counts active paths.
pub struct PathCountCut {
    /// The whole path-probability variable family.
    pi: Vec<VarId>,
    /// The chance-only upper bound of each path, aligned with `pi`.
    probability: Vec<f64>,
    /// The minimum nonzero path probability: the activity threshold.
    epsilon: f64,
    /// The number of paths that must be active.
    target: usize,
    submitted: AtomicBool,
}

impl PathCountCut {
    pub fn new(pi: Vec<VarId>, probability: Vec<f64>, epsilon: f64, target: usize) -> Self {
        debug_assert_eq!(pi.len(), probability.len());
        PathCountCut {
            pi,
            probability,
            epsilon,
            target,
            submitted: AtomicBool::new(false),
        }
    }
}

impl LazyCut for PathCountCut {
    fn separate(&self, solution: &dyn SolutionValues) -> Option<LinearConstraint> {
        if self.submitted.load(Ordering::Acquire) {
            return None;
        }
        let active = self
            .pi
            .iter()
            .filter(|var| solution.value_of(**var) >= self.epsilon)
            .count();
        // counts are integers: any discrepancy beyond 0.9 is a discrepancy
        if (active as f64 - self.target as f64).abs() <= 0.9 {
            return None;
        }
        if self
            .submitted
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }
        debug!(
            "path-count cut submitted ({active} paths active, {} required)",
            self.target
        );
        let mut expr = LinearExpr::with_capacity(self.pi.len());
        for (var, p) in self.pi.iter().zip(self.probability.iter()) {
            // a zero-probability path has pi fixed to 0 by its upper bound
            // and can never be active
            if *p > 0.0 {
                expr.push(*var, 1.0 / p);
            }
        }
        Some(LinearConstraint::new(expr, Sense::Equal, self.target as f64))
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_probability_sum_cut {
    use crate::{LazyCut, ProbabilitySumCut, Sense, VarId};

    fn cut() -> ProbabilitySumCut {
        ProbabilitySumCut::new(vec![VarId(0), VarId(1)], 0.1)
    }

    #[test]
    fn no_cut_when_the_mass_is_close_enough_to_one() {
        let cut = cut();
        assert!(cut.separate(&vec![0.55, 0.5]).is_none());
        assert!(cut.separate(&vec![0.5, 0.5]).is_none());
    }

    #[test]
    fn a_violating_mass_triggers_the_global_equality() {
        let cut = cut();
        let constraint = cut.separate(&vec![0.2, 0.2]).unwrap();
        assert_eq!(Sense::Equal, constraint.sense);
        assert_eq!(1.0, constraint.rhs);
        assert_eq!(2, constraint.expr.terms().len());
    }

    #[test]
    fn the_cut_is_submitted_at_most_once() {
        let cut = cut();
        assert!(cut.separate(&vec![0.2, 0.2]).is_some());
        // same violation again: no second submission
        assert!(cut.separate(&vec![0.2, 0.2]).is_none());
        // a different violation does not revive it either
        assert!(cut.separate(&vec![2.0, 3.0]).is_none());
    }

    #[test]
    fn a_satisfied_invocation_does_not_burn_the_cut() {
        let cut = cut();
        assert!(cut.separate(&vec![0.5, 0.5]).is_none());
        assert!(cut.separate(&vec![0.2, 0.2]).is_some());
    }
}

#[cfg(test)]
mod test_path_count_cut {
    use crate::{LazyCut, PathCountCut, VarId};

    fn cut() -> PathCountCut {
        PathCountCut::new(
            vec![VarId(0), VarId(1), VarId(2), VarId(3)],
            vec![0.5, 0.5, 0.0, 0.25],
            0.25,
            2,
        )
    }

    #[test]
    fn no_cut_when_the_active_count_matches() {
        let cut = cut();
        assert!(cut.separate(&vec![0.5, 0.5, 0.0, 0.0]).is_none());
    }

    #[test]
    fn a_wrong_active_count_triggers_the_normalized_sum() {
        let cut = cut();
        let constraint = cut.separate(&vec![0.5, 0.0, 0.0, 0.0]).unwrap();
        assert_eq!(2.0, constraint.rhs);
        // the zero-probability path is skipped
        assert_eq!(3, constraint.expr.terms().len());
        assert!(constraint
            .expr
            .terms()
            .iter()
            .all(|(var, _)| *var != VarId(2)));
        // coefficients are the reciprocal upper bounds
        assert_eq!((VarId(0), 2.0), constraint.expr.terms()[0]);
        assert_eq!((VarId(3), 4.0), constraint.expr.terms()[2]);
    }

    #[test]
    fn the_cut_is_submitted_at_most_once() {
        let cut = cut();
        assert!(cut.separate(&vec![0.5, 0.0, 0.0, 0.0]).is_some());
        assert!(cut.separate(&vec![0.5, 0.0, 0.0, 0.0]).is_none());
        assert!(cut.separate(&vec![0.5, 0.5, 0.5, 0.5]).is_none());
    }
}
