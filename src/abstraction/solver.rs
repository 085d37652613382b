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

//! This module defines the traits a branch-and-cut engine must interact with
//! when it wants to drive the lazy-constraint callbacks registered on a
//! built model.

use crate::{LinearConstraint, VarId};

/// The solver's view of the incumbent solution at a callback point: read
/// access to the current (possibly fractional, possibly integer) value of
/// every variable of the model.
///
/// Implemented for plain float slices and vectors so that a test harness,
/// or any solver whose native solution representation is a dense vector
/// indexed by variable id, can be used directly.
pub trait SolutionValues {
    /// Returns the current value of the given variable.
    fn value_of(&self, var: VarId) -> f64;
}
impl SolutionValues for [f64] {
    fn value_of(&self, var: VarId) -> f64 {
        self[var.id()]
    }
}
impl SolutionValues for Vec<f64> {
    fn value_of(&self, var: VarId) -> f64 {
        self[var.id()]
    }
}

/// A lazy cutting-plane generator: a stateful object the external solver
/// invokes at points of its own choosing during branch-and-cut search.
///
/// Each invocation inspects the current solution and may return one global
/// linear constraint to be added to the model. Implementations must uphold
/// the at-most-once discipline: once a cut has been returned, every later
/// invocation is a no-op (`None`). Solvers are free to deliver callbacks
/// from several threads, hence the `Send + Sync` bound; the "already
/// submitted" state transition must accordingly be atomic.
pub trait LazyCut: Send + Sync {
    /// Inspects `solution` and returns the cut to submit, if the current
    /// relaxation violates it and no cut was returned before.
    fn separate(&self, solution: &dyn SolutionValues) -> Option<LinearConstraint>;
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
