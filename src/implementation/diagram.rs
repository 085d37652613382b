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

//! This module provides the validated structural representation of an
//! influence diagram: the partition of the nodes into chance, decision and
//! value sets, the layered arc set, the per-node state counts, and the
//! information sets derived from the arcs. Validation is eager and all or
//! nothing: no partial diagram ever escapes a failed construction.

use thiserror::Error;

use crate::{Arc, Node, Path, PathSpace};

/// The error raised when a diagram invariant is violated. Always fatal to
/// diagram construction; never recovered internally.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StructuralValidationError {
    #[error("chance and decision nodes must partition 1..={n}, got {nodes:?}")]
    BrokenPartition { n: usize, nodes: Vec<usize> },
    #[error("value nodes must be numbered {lo}..={hi}, got {nodes:?}")]
    MisplacedValueNodes {
        lo: usize,
        hi: usize,
        nodes: Vec<usize>,
    },
    #[error("arc ({from}, {to}) violates the layering invariant 1 <= i < j <= {n}")]
    IllegalArc { from: usize, to: usize, n: usize },
    #[error("arc ({from}, {to}) has value node {from} as source, but value nodes are sinks")]
    ValueNodeSource { from: usize, to: usize },
    #[error("expected one state count per chance or decision node ({expected}), got {found}")]
    StateCountMismatch { expected: usize, found: usize },
    #[error("node {node} must have at least one state")]
    EmptyStateSpace { node: usize },
}

/// A validated influence diagram. Immutable once constructed; every accessor
/// is read-only and re-feeding the accessors to [`InfluenceDiagram::new`]
/// always succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfluenceDiagram {
    /// The chance nodes, sorted.
    chance: Vec<Node>,
    /// The decision nodes, sorted.
    decision: Vec<Node>,
    /// The value nodes, sorted. These are sinks: they aggregate utility and
    /// are never sampled, so they carry no state count.
    value: Vec<Node>,
    /// The arcs, sorted and deduplicated.
    arcs: Vec<Arc>,
    /// `states[k]` is the number of states of node `k+1`, for the chance and
    /// decision nodes only.
    states: Vec<usize>,
    /// `info[k]` is the information set `I(k+1)`: the sorted parents of node
    /// `k+1`, for every node of the diagram.
    info: Vec<Vec<Node>>,
}

impl InfluenceDiagram {
    /// Normalizes the node sets and the arc set to sorted-unique form, then
    /// checks every structural invariant in order: the chance/decision
    /// partition of `1..=n`, the placement of the value nodes right after,
    /// the arc layering, and the presence of a positive state count per
    /// chance/decision node. The information sets are derived on success.
    pub fn new(
        chance: Vec<Node>,
        decision: Vec<Node>,
        value: Vec<Node>,
        arcs: Vec<Arc>,
        states: Vec<usize>,
    ) -> Result<Self, StructuralValidationError> {
        let chance = sorted_unique(chance);
        let decision = sorted_unique(decision);
        let value = sorted_unique(value);
        let arcs = {
            let mut arcs = arcs;
            arcs.sort_unstable();
            arcs.dedup();
            arcs
        };

        let n = chance.len() + decision.len();
        let num_nodes = n + value.len();

        let mut partition: Vec<Node> = chance.iter().chain(decision.iter()).copied().collect();
        partition.sort_unstable();
        let covers = partition.len() == n
            && partition.iter().enumerate().all(|(k, node)| node.id() == k + 1);
        if !covers {
            return Err(StructuralValidationError::BrokenPartition {
                n,
                nodes: partition.iter().map(|node| node.id()).collect(),
            });
        }

        let placed = value.iter().enumerate().all(|(k, node)| node.id() == n + k + 1);
        if !placed {
            return Err(StructuralValidationError::MisplacedValueNodes {
                lo: n + 1,
                hi: num_nodes,
                nodes: value.iter().map(|node| node.id()).collect(),
            });
        }

        for arc in arcs.iter() {
            if arc.from.id() < 1 || arc.from >= arc.to || arc.to.id() > num_nodes {
                return Err(StructuralValidationError::IllegalArc {
                    from: arc.from.id(),
                    to: arc.to.id(),
                    n: num_nodes,
                });
            }
            if arc.from.id() > n {
                return Err(StructuralValidationError::ValueNodeSource {
                    from: arc.from.id(),
                    to: arc.to.id(),
                });
            }
        }

        if states.len() != n {
            return Err(StructuralValidationError::StateCountMismatch {
                expected: n,
                found: states.len(),
            });
        }
        if let Some(k) = states.iter().position(|count| *count < 1) {
            return Err(StructuralValidationError::EmptyStateSpace { node: k + 1 });
        }

        // arcs are sorted by (from, to) so each target collects its parents
        // already in increasing order
        let mut info = vec![vec![]; num_nodes];
        for arc in arcs.iter() {
            info[arc.to.id() - 1].push(arc.from);
        }

        Ok(InfluenceDiagram {
            chance,
            decision,
            value,
            arcs,
            states,
            info,
        })
    }

    /// The chance nodes, sorted.
    pub fn chance(&self) -> &[Node] {
        &self.chance
    }
    /// The decision nodes, sorted.
    pub fn decision(&self) -> &[Node] {
        &self.decision
    }
    /// The value nodes, sorted.
    pub fn value(&self) -> &[Node] {
        &self.value
    }
    /// The arcs, sorted and deduplicated.
    pub fn arcs(&self) -> &[Arc] {
        &self.arcs
    }
    /// The state counts of the chance and decision nodes, by node order.
    pub fn states(&self) -> &[usize] {
        &self.states
    }
    /// The number `n` of chance and decision nodes.
    pub fn num_chance_decision(&self) -> usize {
        self.states.len()
    }
    /// The total number of nodes, value nodes included.
    pub fn num_nodes(&self) -> usize {
        self.states.len() + self.value.len()
    }
    /// The number of states of a chance or decision node.
    pub fn state_count(&self, node: Node) -> usize {
        self.states[node.id() - 1]
    }
    /// The information set `I(j)` of any node: its parents, sorted.
    pub fn info_set(&self, node: Node) -> &[Node] {
        &self.info[node.id() - 1]
    }
    /// The index basis of a chance or decision node's tensor and local rule:
    /// its information set followed by the node itself.
    pub fn scope(&self, node: Node) -> Vec<Node> {
        let mut scope = self.info_set(node).to_vec();
        scope.push(node);
        scope
    }
    /// The space of all paths of the diagram: the Cartesian product of the
    /// state ranges of every chance and decision node.
    pub fn path_space(&self) -> PathSpace {
        PathSpace::new(self.states.clone())
    }
    /// The state counts of a list of nodes, typically a scope or an
    /// information set.
    pub fn state_counts(&self, nodes: &[Node]) -> Path {
        nodes.iter().map(|node| self.state_count(*node)).collect()
    }
}

fn sorted_unique(mut nodes: Vec<Node>) -> Vec<Node> {
    nodes.sort_unstable();
    nodes.dedup();
    nodes
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_diagram {
    use crate::{Arc, InfluenceDiagram, Node, StructuralValidationError};

    fn arc(from: usize, to: usize) -> Arc {
        Arc::new(Node(from), Node(to))
    }

    fn simple_diagram() -> InfluenceDiagram {
        InfluenceDiagram::new(
            vec![Node(1)],
            vec![Node(2)],
            vec![Node(3)],
            vec![arc(1, 2), arc(1, 3), arc(2, 3)],
            vec![2, 2],
        )
        .unwrap()
    }

    #[test]
    fn a_valid_diagram_exposes_its_structure() {
        let diagram = simple_diagram();
        assert_eq!(&[Node(1)], diagram.chance());
        assert_eq!(&[Node(2)], diagram.decision());
        assert_eq!(&[Node(3)], diagram.value());
        assert_eq!(&[2, 2], diagram.states());
        assert_eq!(2, diagram.num_chance_decision());
        assert_eq!(3, diagram.num_nodes());
    }

    #[test]
    fn information_sets_are_the_sorted_parents() {
        let diagram = simple_diagram();
        assert!(diagram.info_set(Node(1)).is_empty());
        assert_eq!(&[Node(1)], diagram.info_set(Node(2)));
        assert_eq!(&[Node(1), Node(2)], diagram.info_set(Node(3)));
        assert_eq!(vec![Node(1), Node(2)], diagram.scope(Node(2)));
    }

    #[test]
    fn a_gap_in_the_chance_decision_range_is_rejected() {
        let result = InfluenceDiagram::new(
            vec![Node(1)],
            vec![Node(3)],
            vec![],
            vec![],
            vec![2, 2],
        );
        assert_eq!(
            Err(StructuralValidationError::BrokenPartition {
                n: 2,
                nodes: vec![1, 3]
            }),
            result
        );
    }

    #[test]
    fn a_node_in_both_chance_and_decision_is_rejected() {
        let result = InfluenceDiagram::new(
            vec![Node(1)],
            vec![Node(1)],
            vec![],
            vec![],
            vec![2, 2],
        );
        assert!(matches!(
            result,
            Err(StructuralValidationError::BrokenPartition { .. })
        ));
    }

    #[test]
    fn value_nodes_must_come_right_after_the_others() {
        let result = InfluenceDiagram::new(
            vec![Node(1)],
            vec![Node(2)],
            vec![Node(5)],
            vec![],
            vec![2, 2],
        );
        assert_eq!(
            Err(StructuralValidationError::MisplacedValueNodes {
                lo: 3,
                hi: 3,
                nodes: vec![5]
            }),
            result
        );
    }

    #[test]
    fn a_backward_arc_is_rejected_not_reordered() {
        let result = InfluenceDiagram::new(
            vec![Node(1)],
            vec![Node(2)],
            vec![Node(3)],
            vec![arc(2, 1)],
            vec![2, 2],
        );
        assert_eq!(
            Err(StructuralValidationError::IllegalArc { from: 2, to: 1, n: 3 }),
            result
        );
    }

    #[test]
    fn a_self_loop_is_rejected() {
        let result = InfluenceDiagram::new(
            vec![Node(1)],
            vec![Node(2)],
            vec![],
            vec![arc(2, 2)],
            vec![2, 2],
        );
        assert!(matches!(
            result,
            Err(StructuralValidationError::IllegalArc { .. })
        ));
    }

    #[test]
    fn an_arc_beyond_the_last_node_is_rejected() {
        let result = InfluenceDiagram::new(
            vec![Node(1)],
            vec![Node(2)],
            vec![Node(3)],
            vec![arc(1, 4)],
            vec![2, 2],
        );
        assert_eq!(
            Err(StructuralValidationError::IllegalArc { from: 1, to: 4, n: 3 }),
            result
        );
    }

    #[test]
    fn a_value_node_cannot_be_an_arc_source() {
        let result = InfluenceDiagram::new(
            vec![Node(1)],
            vec![Node(2)],
            vec![Node(3), Node(4)],
            vec![arc(3, 4)],
            vec![2, 2],
        );
        assert_eq!(
            Err(StructuralValidationError::ValueNodeSource { from: 3, to: 4 }),
            result
        );
    }

    #[test]
    fn one_state_count_per_chance_or_decision_node() {
        let result = InfluenceDiagram::new(
            vec![Node(1)],
            vec![Node(2)],
            vec![],
            vec![],
            vec![2],
        );
        assert_eq!(
            Err(StructuralValidationError::StateCountMismatch {
                expected: 2,
                found: 1
            }),
            result
        );
    }

    #[test]
    fn a_degenerate_state_space_is_rejected() {
        let result = InfluenceDiagram::new(
            vec![Node(1)],
            vec![Node(2)],
            vec![],
            vec![],
            vec![2, 0],
        );
        assert_eq!(
            Err(StructuralValidationError::EmptyStateSpace { node: 2 }),
            result
        );
    }

    #[test]
    fn duplicate_arcs_and_nodes_are_normalized_away() {
        let diagram = InfluenceDiagram::new(
            vec![Node(1), Node(1)],
            vec![Node(2)],
            vec![Node(3)],
            vec![arc(1, 3), arc(1, 3), arc(1, 2)],
            vec![2, 2],
        )
        .unwrap();
        assert_eq!(&[Node(1)], diagram.chance());
        assert_eq!(&[arc(1, 2), arc(1, 3)], diagram.arcs());
    }

    #[test]
    fn revalidating_a_validated_diagram_succeeds() {
        let diagram = simple_diagram();
        let again = InfluenceDiagram::new(
            diagram.chance().to_vec(),
            diagram.decision().to_vec(),
            diagram.value().to_vec(),
            diagram.arcs().to_vec(),
            diagram.states().to_vec(),
        )
        .unwrap();
        assert_eq!(diagram, again);
    }
}
