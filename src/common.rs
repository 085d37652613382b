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

//! This module defines the most basic data types that are used throughout all
//! the code of our library: the identifiers of influence-diagram nodes and
//! arcs, the paths that assign a state to every node, the handles and linear
//! algebra of the produced MILP, and the `Specs` configuration record.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::SolutionValues;

// ----------------------------------------------------------------------------
// --- NODE -------------------------------------------------------------------
// ----------------------------------------------------------------------------
/// This type denotes a node of an influence diagram. Each node is identified
/// with a positive integer: the chance and decision nodes occupy the range
/// `1..=n` and the value nodes occupy `n+1..=n+|V|`.
///
/// # Examples:
/// ```
/// # use dido::Node;
/// assert_eq!(1, Node(1).id());
/// assert_eq!(4, Node(4).id());
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Node(pub usize);
impl Node {
    #[inline]
    /// This function returns the id (numeric value) of the node.
    pub fn id(self) -> usize {
        self.0
    }
}

// ----------------------------------------------------------------------------
// --- ARC --------------------------------------------------------------------
// ----------------------------------------------------------------------------
/// An ordered arc `(from, to)` of the influence diagram. A validated diagram
/// only ever contains arcs with `from < to`; this layering is what guarantees
/// acyclicity without a separate cycle check.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Arc {
    pub from: Node,
    pub to: Node,
}
impl Arc {
    pub fn new(from: Node, to: Node) -> Self {
        Arc { from, to }
    }
}

// ----------------------------------------------------------------------------
// --- PATH -------------------------------------------------------------------
// ----------------------------------------------------------------------------
/// A path is a full assignment of a (1-based) state to every chance and
/// decision node: position `k` of the vector holds the state of node `k+1`.
/// Paths are the unit of iteration over "all possible worlds"; they are never
/// stored in bulk.
pub type Path = Vec<usize>;

// ----------------------------------------------------------------------------
// --- MILP HANDLES -----------------------------------------------------------
// ----------------------------------------------------------------------------
/// The identifier of a variable of the produced MILP: it indicates the
/// position of the referenced variable in the `variables` vector of the model.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct VarId(pub usize);
impl VarId {
    #[inline]
    /// This function returns the id (numeric value) of the variable.
    pub fn id(self) -> usize {
        self.0
    }
}

/// The kind of a variable of the produced MILP.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum VarKind {
    /// A continuous variable (the path-probability family).
    Continuous,
    /// A 0-1 variable (the local-strategy family).
    Binary,
}

/// The sense of a linear constraint.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Sense {
    Equal,
    LessEqual,
    GreaterEqual,
}

/// A linear expression over the variables of the model, kept as a sparse
/// list of `(variable, coefficient)` terms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(VarId, f64)>,
}
impl LinearExpr {
    pub fn new() -> Self {
        Default::default()
    }
    pub fn with_capacity(capacity: usize) -> Self {
        LinearExpr {
            terms: Vec::with_capacity(capacity),
        }
    }
    /// Appends one `coefficient * variable` term to the expression.
    pub fn push(&mut self, var: VarId, coefficient: f64) {
        self.terms.push((var, coefficient));
    }
    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
    /// Evaluates the expression against some (solver supplied) assignment of
    /// values to the variables.
    pub fn evaluate(&self, solution: &dyn SolutionValues) -> f64 {
        self.terms
            .iter()
            .map(|(var, coefficient)| coefficient * solution.value_of(*var))
            .sum()
    }
}

/// One linear constraint of the produced MILP: `expr <sense> rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub expr: LinearExpr,
    pub sense: Sense,
    pub rhs: f64,
}
impl LinearConstraint {
    pub fn new(expr: LinearExpr, sense: Sense, rhs: f64) -> Self {
        LinearConstraint { expr, sense, rhs }
    }
    /// Tells whether the constraint holds for the given assignment, within
    /// the given absolute tolerance (floating comparisons are never exact).
    pub fn is_satisfied(&self, solution: &dyn SolutionValues, tolerance: f64) -> bool {
        let lhs = self.expr.evaluate(solution);
        match self.sense {
            Sense::Equal => (lhs - self.rhs).abs() <= tolerance,
            Sense::LessEqual => lhs <= self.rhs + tolerance,
            Sense::GreaterEqual => lhs >= self.rhs - tolerance,
        }
    }
}

// ----------------------------------------------------------------------------
// --- SPECS ------------------------------------------------------------------
// ----------------------------------------------------------------------------
/// The configuration record of the formulation builder. Both options default
/// to "off"; they select which lazy cuts get registered on the built model.
///
/// # Examples:
/// ```
/// # use dido::*;
/// let specs = SpecsBuilder::default()
///     .probability_sum_cut(true)
///     .num_paths(4)
///     .build()
///     .unwrap();
/// assert!(specs.probability_sum_cut);
/// assert_eq!(4, specs.num_paths);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Builder, Serialize, Deserialize)]
pub struct Specs {
    /// When set, a lazy constraint forcing the total path-probability mass
    /// to sum to 1 is submitted if the solver's relaxation violates it.
    #[builder(default)]
    #[serde(default)]
    pub probability_sum_cut: bool,
    /// When positive, a lazy constraint forcing the number of active paths
    /// (probability above epsilon) to equal this count is submitted if the
    /// solver's relaxation violates it. Zero disables the cut.
    #[builder(default)]
    #[serde(default)]
    pub num_paths: usize,
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################


#[cfg(test)]
mod test_linear {
    use crate::{LinearConstraint, LinearExpr, Sense, VarId};

    #[test]
    fn an_expression_evaluates_against_an_assignment() {
        let mut expr = LinearExpr::new();
        expr.push(VarId(0), 2.0);
        expr.push(VarId(2), -1.0);

        let solution = vec![3.0, 100.0, 4.0];
        assert_eq!(2.0, expr.evaluate(&solution));
    }

    #[test]
    fn constraint_satisfaction_uses_the_given_tolerance() {
        let mut expr = LinearExpr::new();
        expr.push(VarId(0), 1.0);
        let eq = LinearConstraint::new(expr, Sense::Equal, 1.0);

        assert!(eq.is_satisfied(&vec![1.0 + 1e-9], 1e-6));
        assert!(!eq.is_satisfied(&vec![1.5], 1e-6));
    }

    #[test]
    fn inequalities_check_the_proper_side() {
        let mut expr = LinearExpr::new();
        expr.push(VarId(0), 1.0);
        let le = LinearConstraint::new(expr.clone(), Sense::LessEqual, 1.0);
        let ge = LinearConstraint::new(expr, Sense::GreaterEqual, 1.0);

        assert!(le.is_satisfied(&vec![0.5], 1e-6));
        assert!(!le.is_satisfied(&vec![1.5], 1e-6));
        assert!(ge.is_satisfied(&vec![1.5], 1e-6));
        assert!(!ge.is_satisfied(&vec![0.5], 1e-6));
    }
}
