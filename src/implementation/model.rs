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

//! This module provides the in-memory MILP model the formulation builder
//! produces: variable declarations with bounds, linear constraint rows, a
//! maximized linear objective, and the registered lazy-cut callbacks. The
//! model never solves anything; it is handed as-is to an external
//! branch-and-cut engine.

use parking_lot::Mutex;

use crate::{LazyCut, LinearConstraint, LinearExpr, SolutionValues, VarId, VarKind};

/// The declaration of one variable of the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableData {
    pub kind: VarKind,
    pub lb: f64,
    pub ub: f64,
}

/// An in-memory mixed-integer linear program: the only artifact this library
/// produces. The build phase (`add_*`, `maximize`, `register_lazy_cut`) is
/// single-threaded and happens entirely before the model is handed over; the
/// callback phase ([`MilpModel::separate`]) takes `&self` and is safe to
/// drive from several solver threads at once.
#[derive(Default)]
pub struct MilpModel {
    variables: Vec<VariableData>,
    constraints: Vec<LinearConstraint>,
    objective: LinearExpr,
    cuts: Vec<Box<dyn LazyCut>>,
    /// The cuts submitted so far during search. Callbacks may be delivered
    /// concurrently, hence the lock.
    cut_pool: Mutex<Vec<LinearConstraint>>,
}

impl MilpModel {
    pub fn new() -> Self {
        Default::default()
    }

    /// Declares a continuous variable with the given bounds and returns its
    /// handle.
    pub fn add_continuous(&mut self, lb: f64, ub: f64) -> VarId {
        let id = VarId(self.variables.len());
        self.variables.push(VariableData {
            kind: VarKind::Continuous,
            lb,
            ub,
        });
        id
    }

    /// Declares a 0-1 variable and returns its handle.
    pub fn add_binary(&mut self) -> VarId {
        let id = VarId(self.variables.len());
        self.variables.push(VariableData {
            kind: VarKind::Binary,
            lb: 0.0,
            ub: 1.0,
        });
        id
    }

    pub fn add_constraint(&mut self, constraint: LinearConstraint) {
        self.constraints.push(constraint);
    }

    /// Sets the linear objective; the model is always a maximization.
    pub fn maximize(&mut self, objective: LinearExpr) {
        self.objective = objective;
    }

    /// Registers a lazy-cut callback to be driven by the external solver
    /// through [`MilpModel::separate`]. Nothing is evaluated at
    /// registration time.
    pub fn register_lazy_cut(&mut self, cut: Box<dyn LazyCut>) {
        self.cuts.push(cut);
    }

    pub fn variable(&self, var: VarId) -> VariableData {
        self.variables[var.id()]
    }
    pub fn variables(&self) -> &[VariableData] {
        &self.variables
    }
    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }
    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }
    pub fn num_lazy_cuts(&self) -> usize {
        self.cuts.len()
    }

    /// The callback entry point: the external solver calls this with the
    /// current solution at points of its own choosing during search. Every
    /// registered cut gets a chance to separate; the cuts it returns are
    /// accumulated in the pool and the number of newly submitted cuts is
    /// returned.
    pub fn separate(&self, solution: &dyn SolutionValues) -> usize {
        let mut added = 0;
        for cut in self.cuts.iter() {
            if let Some(constraint) = cut.separate(solution) {
                self.cut_pool.lock().push(constraint);
                added += 1;
            }
        }
        added
    }

    /// The cuts submitted during search so far, in submission order.
    pub fn submitted_cuts(&self) -> Vec<LinearConstraint> {
        self.cut_pool.lock().clone()
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
