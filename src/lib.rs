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

//! # DIDO
//! DIDO compiles a multi-stage decision problem under uncertainty, expressed
//! as an influence diagram (chance nodes, decision nodes, value nodes,
//! conditional probabilities, conditional utilities), into a compact
//! mixed-integer linear program whose optimum yields an optimal decision
//! strategy together with the probability distribution over the paths that
//! strategy makes reachable.
//!
//! The library validates the diagram as a layered DAG, validates the
//! probability and utility tensors against the diagram's information sets,
//! enumerates the (exponential) space of paths lazily, and builds the
//! path-indexed variables, objective and constraints of the MILP. It does
//! *not* solve anything: the built model is handed to whatever
//! branch-and-cut engine you use, which drives the registered lazy cuts
//! through callbacks during its own search.
//!
//! ## Quick Example
//! The classic one-observation problem: a chance node (1) is observed by a
//! decision node (2), and a value node (3) pays off according to both.
//!
//! ```
//! # use dido::*;
//! // 1. Describe and validate the diagram: C = {1}, D = {2}, V = {3}
//! let diagram = InfluenceDiagram::new(
//!     vec![Node(1)],
//!     vec![Node(2)],
//!     vec![Node(3)],
//!     vec![
//!         Arc::new(Node(1), Node(2)),
//!         Arc::new(Node(1), Node(3)),
//!         Arc::new(Node(2), Node(3)),
//!     ],
//!     vec![2, 2],
//! ).unwrap();
//!
//! // 2. Attach and validate the parameters: a row-stochastic probability
//! //    table for the chance node, a utility table for the value node
//! let params = Parameters::new(
//!     &diagram,
//!     [(Node(1), Tensor::new(vec![2], vec![0.5, 0.5]).unwrap())],
//!     [(Node(3), Tensor::new(vec![2, 2], vec![1.0, 2.0, 0.0, 3.0]).unwrap())],
//! ).unwrap();
//!
//! // 3. Build the MILP (optionally requesting the lazy cuts)
//! let specs = SpecsBuilder::default().probability_sum_cut(true).build().unwrap();
//! let formulation = Formulation::new(&specs, &diagram, &params);
//!
//! // one path-probability variable per path, one binary per (observation,
//! // choice) pair of the decision node
//! assert_eq!(4, formulation.path_vars().len());
//! assert_eq!(4, formulation.strategy_vars()[0].len());
//!
//! // 4. Hand `formulation.model()` to your MILP solver; at callback points
//! //    the solver feeds the incumbent back through `model.separate(..)`
//! //    and collects the cuts from `model.submitted_cuts()`. After the
//! //    solve, read the optimal strategy out of the strategy variables and
//! //    the path distribution out of the path variables.
//! ```
//!
//! ## Scaling limit
//! The formulation is path-indexed: the number of continuous variables is
//! the product of the state counts of every chance and decision node. This
//! is inherent to the encoding; the library keeps enumeration lazy so the
//! build is memory-bounded, but diagrams beyond a few million paths are not
//! practical targets.

mod common;
mod abstraction;
mod implementation;

pub use common::*;
pub use abstraction::*;
pub use implementation::*;
