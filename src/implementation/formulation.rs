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

//! This module provides the formulation builder: the transformation of a
//! validated diagram and parameterization into the MILP whose optimum is an
//! optimal decision strategy. The builder is a pure, single-threaded,
//! deterministic function of its inputs; it trusts them to be validated and
//! performs no checking of its own.
//!
//! The produced model has one continuous variable per path (the
//! path-probability family, bounded above by the chance-only probability of
//! the path) and one binary variable per decision context and candidate
//! state (the local-strategy family). Both families are exponential in the
//! number of chance and decision nodes; the formulation is only viable for
//! diagrams whose combined state space fits explicit enumeration (a few
//! million paths at most). That limit is inherent to the path-indexed
//! encoding, not an implementation artifact.

use log::debug;
use ordered_float::OrderedFloat;

use crate::{
    restrict, InfluenceDiagram, LinearConstraint, LinearExpr, MilpModel, Node, Parameters,
    PathCountCut, PathSpace, ProbabilitySumCut, Sense, Specs, VarId,
};

/// The chance-only joint probability of a full path: the product, over the
/// chance nodes, of the conditional probability of the state the path
/// assigns them, given the states it assigns their information set. This is
/// the unconditional probability of the path occurring when every decision
/// along it is taken: the tight upper bound of its probability variable.
pub fn path_probability(diagram: &InfluenceDiagram, params: &Parameters, path: &[usize]) -> f64 {
    diagram
        .chance()
        .iter()
        .map(|node| {
            params
                .probability(*node)
                .get(&restrict(path, &diagram.scope(*node)))
        })
        .product()
}

/// The minimum nonzero chance-only path probability of the instance: the
/// smallest probability mass a structurally reachable path can carry, used
/// by the lazy cuts as the activity threshold. Computing it walks the whole
/// path space once, lazily; this is the dominant up-front cost of a build.
pub fn minimum_path_probability(diagram: &InfluenceDiagram, params: &Parameters) -> f64 {
    diagram
        .path_space()
        .iter()
        .map(|path| path_probability(diagram, params, &path))
        .filter(|p| *p > 0.0)
        .map(OrderedFloat)
        .min()
        .map(OrderedFloat::into_inner)
        .unwrap_or(0.0)
}

// ----------------------------------------------------------------------------
// --- VARIABLE FAMILIES ------------------------------------------------------
// ----------------------------------------------------------------------------
/// The path-probability variable family: one continuous variable per path,
/// stored densely and addressed through the mixed-radix flat index of the
/// path space.
#[derive(Debug, Clone)]
pub struct PathVars {
    space: PathSpace,
    vars: Vec<VarId>,
}

impl PathVars {
    /// The path space indexing the family.
    pub fn space(&self) -> &PathSpace {
        &self.space
    }
    /// The variable holding the probability of the given full path.
    pub fn variable(&self, path: &[usize]) -> VarId {
        self.vars[self.space.flatten(path)]
    }
    /// All variables of the family, in path-space iteration order.
    pub fn all(&self) -> &[VarId] {
        &self.vars
    }
    pub fn len(&self) -> usize {
        self.vars.len()
    }
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// The local-strategy variable family of one decision node: one binary
/// variable per joint assignment of the node's information set and per
/// candidate own state, meaning "this node picks that state in that
/// context".
#[derive(Debug, Clone)]
pub struct StrategyVars {
    node: Node,
    /// The information set of the node followed by the node itself: the
    /// index basis of the family.
    scope: Vec<Node>,
    space: PathSpace,
    vars: Vec<VarId>,
}

impl StrategyVars {
    /// The decision node this family encodes a local rule for.
    pub fn node(&self) -> Node {
        self.node
    }
    /// The index basis: the information set followed by the node itself.
    pub fn scope(&self) -> &[Node] {
        &self.scope
    }
    /// The assignment space indexing the family.
    pub fn space(&self) -> &PathSpace {
        &self.space
    }
    /// The variable of one joint `(information set, own state)` assignment.
    pub fn variable(&self, assignment: &[usize]) -> VarId {
        self.vars[self.space.flatten(assignment)]
    }
    /// The variable the given full path agrees with: the one indexed by the
    /// path's restriction to this family's scope.
    pub fn variable_on_path(&self, path: &[usize]) -> VarId {
        self.variable(&restrict(path, &self.scope))
    }
    /// All variables of the family, in assignment-space iteration order.
    pub fn all(&self) -> &[VarId] {
        &self.vars
    }
    pub fn len(&self) -> usize {
        self.vars.len()
    }
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

// ----------------------------------------------------------------------------
// --- FORMULATION ------------------------------------------------------------
// ----------------------------------------------------------------------------
/// The built formulation: the MILP model together with the handles a caller
/// needs for post-solve extraction (the two named variable families), the
/// epsilon threshold, and the utility shift to undo when reporting the true
/// expected utility.
pub struct Formulation {
    model: MilpModel,
    path_vars: PathVars,
    strategy_vars: Vec<StrategyVars>,
    epsilon: f64,
    utility_shift: f64,
    num_value_nodes: usize,
}

impl Formulation {
    /// Builds the MILP for the given (validated) diagram and parameters.
    ///
    /// In order: the local-strategy binaries and their one-hot constraints,
    /// the epsilon pass over the path space, then a single pass per path
    /// creating its bounded probability variable, its objective term and its
    /// linking constraint per decision node. The lazy cuts requested by
    /// `specs` are registered last; they are never evaluated at build time.
    pub fn new(specs: &Specs, diagram: &InfluenceDiagram, params: &Parameters) -> Self {
        let mut model = MilpModel::new();

        // local strategies: one binary per (context, own state), exactly one
        // own state per context
        let mut strategy_vars = Vec::with_capacity(diagram.decision().len());
        for node in diagram.decision().iter().copied() {
            let scope = diagram.scope(node);
            let limits = diagram.state_counts(&scope);
            let space = PathSpace::new(limits.clone());
            let vars: Vec<VarId> = (0..space.size()).map(|_| model.add_binary()).collect();
            let family = StrategyVars {
                node,
                scope,
                space,
                vars,
            };

            let own_states = limits[limits.len() - 1];
            let contexts = PathSpace::new(limits[..limits.len() - 1].to_vec());
            for context in contexts.iter() {
                let mut one_hot = LinearExpr::with_capacity(own_states);
                for state in 1..=own_states {
                    let mut assignment = context.clone();
                    assignment.push(state);
                    one_hot.push(family.variable(&assignment), 1.0);
                }
                model.add_constraint(LinearConstraint::new(one_hot, Sense::Equal, 1.0));
            }
            strategy_vars.push(family);
        }

        let epsilon = minimum_path_probability(diagram, params);

        // utilities are shifted so the global minimum becomes 0: the lazy
        // cuts and the bounding of the objective require a non-negative
        // integrand, and the shift preserves the optimal strategy
        let utility_shift = diagram
            .value()
            .iter()
            .flat_map(|node| params.utility(*node).values().iter().copied())
            .map(OrderedFloat)
            .min()
            .map(OrderedFloat::into_inner)
            .unwrap_or(0.0);

        // one pass over the path space: probability variable, objective
        // term, one linking constraint per decision node
        let space = diagram.path_space();
        let mut objective = LinearExpr::with_capacity(space.size());
        let mut vars = Vec::with_capacity(space.size());
        for path in space.iter() {
            let probability = path_probability(diagram, params, &path);
            let var = model.add_continuous(0.0, probability);

            let utility: f64 = diagram
                .value()
                .iter()
                .map(|node| {
                    params.utility(*node).get(&restrict(&path, diagram.info_set(*node)))
                        - utility_shift
                })
                .sum();
            objective.push(var, utility);

            for family in strategy_vars.iter() {
                let mut link = LinearExpr::with_capacity(2);
                link.push(var, 1.0);
                link.push(family.variable_on_path(&path), -1.0);
                model.add_constraint(LinearConstraint::new(link, Sense::LessEqual, 0.0));
            }
            vars.push(var);
        }
        model.maximize(objective);
        let path_vars = PathVars { space, vars };

        if specs.probability_sum_cut {
            model.register_lazy_cut(Box::new(ProbabilitySumCut::new(
                path_vars.all().to_vec(),
                epsilon,
            )));
        }
        if specs.num_paths > 0 {
            let probabilities: Vec<f64> = path_vars
                .space()
                .iter()
                .map(|path| path_probability(diagram, params, &path))
                .collect();
            model.register_lazy_cut(Box::new(PathCountCut::new(
                path_vars.all().to_vec(),
                probabilities,
                epsilon,
                specs.num_paths,
            )));
        }

        debug!(
            "formulation built: {} variables, {} constraints, {} lazy cuts, epsilon {:e}",
            model.num_variables(),
            model.num_constraints(),
            model.num_lazy_cuts(),
            epsilon
        );

        Formulation {
            model,
            path_vars,
            strategy_vars,
            epsilon,
            utility_shift,
            num_value_nodes: diagram.value().len(),
        }
    }

    /// The built MILP, for hand-over to the external solver.
    pub fn model(&self) -> &MilpModel {
        &self.model
    }
    /// Relinquishes the built MILP; the caller owns it from then on.
    pub fn into_model(self) -> MilpModel {
        self.model
    }
    /// The path-probability variable family.
    pub fn path_vars(&self) -> &PathVars {
        &self.path_vars
    }
    /// The local-strategy variable families, one per decision node in node
    /// order.
    pub fn strategy_vars(&self) -> &[StrategyVars] {
        &self.strategy_vars
    }
    /// The minimum nonzero path probability of the instance.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
    /// The shift applied to every utility tensor (the global minimum of the
    /// raw utilities, subtracted so the shifted minimum is 0).
    pub fn utility_shift(&self) -> f64 {
        self.utility_shift
    }
    /// The total shift baked into the objective: the per-node shift summed
    /// over the value nodes.
    pub fn total_utility_shift(&self) -> f64 {
        self.utility_shift * self.num_value_nodes as f64
    }
    /// Recovers the true expected utility from the objective value the
    /// solver reports for the shifted model.
    pub fn true_objective(&self, reported: f64) -> f64 {
        reported + self.total_utility_shift()
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_formulation {
    use crate::{
        minimum_path_probability, path_probability, Arc, Formulation, InfluenceDiagram, Node,
        Parameters, Sense, Specs, SpecsBuilder, Tensor, VarKind,
    };

    fn arc(from: usize, to: usize) -> Arc {
        Arc::new(Node(from), Node(to))
    }

    /// C = {1}, D = {2}, V = {3}, arcs {(1,2), (1,3), (2,3)}, S = [2, 2].
    fn instance() -> (InfluenceDiagram, Parameters) {
        let diagram = InfluenceDiagram::new(
            vec![Node(1)],
            vec![Node(2)],
            vec![Node(3)],
            vec![arc(1, 2), arc(1, 3), arc(2, 3)],
            vec![2, 2],
        )
        .unwrap();
        let params = Parameters::new(
            &diagram,
            [(Node(1), Tensor::new(vec![2], vec![0.3, 0.7]).unwrap())],
            [(
                Node(3),
                Tensor::new(vec![2, 2], vec![1.0, 2.0, 0.0, 3.0]).unwrap(),
            )],
        )
        .unwrap();
        (diagram, params)
    }

    #[test]
    fn path_probability_multiplies_the_chance_tensors() {
        let (diagram, params) = instance();
        assert_eq!(0.3, path_probability(&diagram, &params, &[1, 1]));
        assert_eq!(0.3, path_probability(&diagram, &params, &[1, 2]));
        assert_eq!(0.7, path_probability(&diagram, &params, &[2, 1]));
    }

    #[test]
    fn epsilon_is_the_minimum_over_the_whole_path_space() {
        let (diagram, params) = instance();
        // brute force over the 4 paths
        let brute = diagram
            .path_space()
            .iter()
            .map(|path| path_probability(&diagram, &params, &path))
            .fold(f64::INFINITY, f64::min);
        assert_eq!(brute, minimum_path_probability(&diagram, &params));
        assert_eq!(0.3, minimum_path_probability(&diagram, &params));
    }

    #[test]
    fn epsilon_skips_structurally_unreachable_paths() {
        let diagram = InfluenceDiagram::new(
            vec![Node(1)],
            vec![],
            vec![Node(2)],
            vec![arc(1, 2)],
            vec![3],
        )
        .unwrap();
        let params = Parameters::new(
            &diagram,
            [(Node(1), Tensor::new(vec![3], vec![0.8, 0.0, 0.2]).unwrap())],
            [(Node(2), Tensor::new(vec![3], vec![0.0, 1.0, 2.0]).unwrap())],
        )
        .unwrap();
        assert_eq!(0.2, minimum_path_probability(&diagram, &params));
    }

    #[test]
    fn the_variable_families_have_the_prescribed_sizes() {
        let (diagram, params) = instance();
        let formulation = Formulation::new(&Specs::default(), &diagram, &params);

        // pi: one variable per path of the 2 x 2 space
        assert_eq!(4, formulation.path_vars().len());
        // z: one family for decision node 2, indexed by (state of 1, state of 2)
        assert_eq!(1, formulation.strategy_vars().len());
        let family = &formulation.strategy_vars()[0];
        assert_eq!(Node(2), family.node());
        assert_eq!(&[Node(1), Node(2)], family.scope());
        assert_eq!(4, family.len());
        assert_eq!(8, formulation.model().num_variables());
    }

    #[test]
    fn pi_variables_are_bounded_by_the_chance_only_probability() {
        let (diagram, params) = instance();
        let formulation = Formulation::new(&Specs::default(), &diagram, &params);

        let model = formulation.model();
        let pi = formulation.path_vars();
        for path in pi.space().iter() {
            let var = model.variable(pi.variable(&path));
            assert_eq!(VarKind::Continuous, var.kind);
            assert_eq!(0.0, var.lb);
            assert_eq!(path_probability(&diagram, &params, &path), var.ub);
        }
    }

    #[test]
    fn the_constraint_families_have_the_prescribed_sizes() {
        let (diagram, params) = instance();
        let formulation = Formulation::new(&Specs::default(), &diagram, &params);
        let model = formulation.model();

        // 2 one-hot contexts for node 2, plus 4 paths x 1 decision node links
        assert_eq!(6, model.num_constraints());
        let one_hot = model
            .constraints()
            .iter()
            .filter(|c| c.sense == Sense::Equal && c.rhs == 1.0)
            .count();
        assert_eq!(2, one_hot);
        let links = model
            .constraints()
            .iter()
            .filter(|c| c.sense == Sense::LessEqual && c.rhs == 0.0)
            .count();
        assert_eq!(4, links);
    }

    #[test]
    fn the_objective_carries_the_shifted_utilities() {
        let (diagram, params) = instance();
        let formulation = Formulation::new(&Specs::default(), &diagram, &params);

        // raw utilities range over [0, 3]: the global minimum is 0 and the
        // shift is a no-op here
        assert_eq!(0.0, formulation.utility_shift());
        let objective = formulation.model().objective();
        assert_eq!(4, objective.terms().len());

        // path (1, 1) pays Y[1,1] = 1, path (2, 2) pays Y[2,2] = 3
        let pi = formulation.path_vars();
        let coefficient_of = |path: &[usize]| {
            let var = pi.variable(path);
            objective
                .terms()
                .iter()
                .find(|(v, _)| *v == var)
                .map(|(_, c)| *c)
                .unwrap()
        };
        assert_eq!(1.0, coefficient_of(&[1, 1]));
        assert_eq!(2.0, coefficient_of(&[1, 2]));
        assert_eq!(0.0, coefficient_of(&[2, 1]));
        assert_eq!(3.0, coefficient_of(&[2, 2]));
    }

    #[test]
    fn negative_utilities_are_shifted_to_zero_and_recoverable() {
        let diagram = InfluenceDiagram::new(
            vec![Node(1)],
            vec![],
            vec![Node(2)],
            vec![arc(1, 2)],
            vec![2],
        )
        .unwrap();
        let params = Parameters::new(
            &diagram,
            [(Node(1), Tensor::new(vec![2], vec![0.5, 0.5]).unwrap())],
            [(Node(2), Tensor::new(vec![2], vec![-2.0, 4.0]).unwrap())],
        )
        .unwrap();
        let formulation = Formulation::new(&Specs::default(), &diagram, &params);

        assert_eq!(-2.0, formulation.utility_shift());
        assert_eq!(-2.0, formulation.total_utility_shift());
        // shifted utilities are 0 and 6; the shifted expectation 0.5*0+0.5*6
        // recovers the true expectation 0.5*(-2)+0.5*4 = 1
        assert_eq!(1.0, formulation.true_objective(3.0));

        let objective = formulation.model().objective();
        let coefficients: Vec<f64> = objective.terms().iter().map(|(_, c)| *c).collect();
        assert_eq!(vec![0.0, 6.0], coefficients);
    }

    #[test]
    fn lazy_cuts_are_registered_only_on_demand() {
        let (diagram, params) = instance();

        let none = Formulation::new(&Specs::default(), &diagram, &params);
        assert_eq!(0, none.model().num_lazy_cuts());

        let both = Formulation::new(
            &SpecsBuilder::default()
                .probability_sum_cut(true)
                .num_paths(2)
                .build()
                .unwrap(),
            &diagram,
            &params,
        );
        assert_eq!(2, both.model().num_lazy_cuts());
        // registration alone never submits anything
        assert!(both.model().submitted_cuts().is_empty());
    }

    #[test]
    fn a_decision_only_diagram_has_a_trivial_probability() {
        let diagram = InfluenceDiagram::new(
            vec![],
            vec![Node(1)],
            vec![Node(2)],
            vec![arc(1, 2)],
            vec![3],
        )
        .unwrap();
        let params = Parameters::new(
            &diagram,
            std::iter::empty(),
            [(Node(2), Tensor::new(vec![3], vec![1.0, 5.0, 2.0]).unwrap())],
        )
        .unwrap();
        let formulation = Formulation::new(&Specs::default(), &diagram, &params);

        // the empty product: every path is certain, pi bounded by 1
        for var in formulation.path_vars().all() {
            assert_eq!(1.0, formulation.model().variable(*var).ub);
        }
        assert_eq!(1.0, formulation.epsilon());
    }
}
