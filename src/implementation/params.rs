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

//! This module provides the validated parameterization of an influence
//! diagram: one conditional probability tensor per chance node and one
//! conditional utility tensor per value node, each indexed by the node's
//! information-set states. Like the diagram itself, parameters are checked
//! eagerly at construction and immutable thereafter.

use fxhash::FxHashMap;
use thiserror::Error;

use crate::{InfluenceDiagram, Node, PathSpace, Tensor};

/// The absolute tolerance used when checking that conditional probabilities
/// sum to one. Probability rows are produced by floating arithmetic, so
/// exact equality is never required.
pub const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

/// The error raised when a probability or utility tensor does not fit the
/// diagram. Always fatal to parameter construction.
#[derive(Debug, Error, PartialEq)]
pub enum ParameterValidationError {
    #[error("chance node {node} has no probability tensor")]
    MissingProbability { node: usize },
    #[error("value node {node} has no utility tensor")]
    MissingUtility { node: usize },
    #[error("node {node} is not a chance node, yet a probability tensor was supplied for it")]
    SurplusProbability { node: usize },
    #[error("node {node} is not a value node, yet a utility tensor was supplied for it")]
    SurplusUtility { node: usize },
    #[error("probability tensor of chance node {node} has shape {found:?}, expected {expected:?}")]
    ProbabilityShape {
        node: usize,
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    #[error("utility tensor of value node {node} has shape {found:?}, expected {expected:?}")]
    UtilityShape {
        node: usize,
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    #[error("probability tensor of chance node {node} is negative for assignment {assignment:?}")]
    NegativeProbability { node: usize, assignment: Vec<usize> },
    #[error(
        "probabilities of chance node {node} sum to {sum} over information state {assignment:?}"
    )]
    NotNormalized {
        node: usize,
        assignment: Vec<usize>,
        sum: f64,
    },
}

/// The validated probability and utility tensors of a diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    probabilities: FxHashMap<Node, Tensor>,
    utilities: FxHashMap<Node, Tensor>,
}

impl Parameters {
    /// Validates the given tensors against the diagram and keeps them on
    /// success. Probabilities are checked first, then utilities; the first
    /// violation aborts construction.
    pub fn new(
        diagram: &InfluenceDiagram,
        probabilities: impl IntoIterator<Item = (Node, Tensor)>,
        utilities: impl IntoIterator<Item = (Node, Tensor)>,
    ) -> Result<Self, ParameterValidationError> {
        let probabilities: FxHashMap<Node, Tensor> = probabilities.into_iter().collect();
        let utilities: FxHashMap<Node, Tensor> = utilities.into_iter().collect();
        validate_probabilities(diagram, &probabilities)?;
        validate_utilities(diagram, &utilities)?;
        Ok(Parameters {
            probabilities,
            utilities,
        })
    }

    /// The probability tensor of a chance node. The node must belong to the
    /// diagram these parameters were validated against.
    pub fn probability(&self, node: Node) -> &Tensor {
        &self.probabilities[&node]
    }

    /// The utility tensor of a value node. The node must belong to the
    /// diagram these parameters were validated against.
    pub fn utility(&self, node: Node) -> &Tensor {
        &self.utilities[&node]
    }
}

/// Checks that every supplied tensor is keyed by a chance node and, for
/// every chance node, that a tensor is present with shape
/// `(S[I(j)]..., S[j])`, that every entry is non-negative, and that the
/// entries over the node's own states sum to one for every joint assignment
/// of its information set (within [`PROBABILITY_SUM_TOLERANCE`]).
pub fn validate_probabilities(
    diagram: &InfluenceDiagram,
    probabilities: &FxHashMap<Node, Tensor>,
) -> Result<(), ParameterValidationError> {
    // chance nodes are kept sorted, so membership is a binary search
    for node in probabilities.keys() {
        if diagram.chance().binary_search(node).is_err() {
            return Err(ParameterValidationError::SurplusProbability { node: node.id() });
        }
    }
    for node in diagram.chance().iter().copied() {
        let tensor = probabilities
            .get(&node)
            .ok_or(ParameterValidationError::MissingProbability { node: node.id() })?;

        let expected = diagram.state_counts(&diagram.scope(node));
        if tensor.shape() != expected.as_slice() {
            return Err(ParameterValidationError::ProbabilityShape {
                node: node.id(),
                found: tensor.shape().to_vec(),
                expected,
            });
        }

        let own_states = diagram.state_count(node);
        let info_space = PathSpace::new(expected[..expected.len() - 1].to_vec());
        for info in info_space.iter() {
            let mut sum = 0.0;
            for state in 1..=own_states {
                let mut assignment = info.clone();
                assignment.push(state);
                let p = tensor.get(&assignment);
                if p < 0.0 {
                    return Err(ParameterValidationError::NegativeProbability {
                        node: node.id(),
                        assignment,
                    });
                }
                sum += p;
            }
            if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
                return Err(ParameterValidationError::NotNormalized {
                    node: node.id(),
                    assignment: info,
                    sum,
                });
            }
        }
    }
    Ok(())
}

/// Checks that every supplied tensor is keyed by a value node and, for every
/// value node, that a tensor is present with shape `S[I(j)]`. Utilities
/// carry no sign or sum constraint.
pub fn validate_utilities(
    diagram: &InfluenceDiagram,
    utilities: &FxHashMap<Node, Tensor>,
) -> Result<(), ParameterValidationError> {
    for node in utilities.keys() {
        if diagram.value().binary_search(node).is_err() {
            return Err(ParameterValidationError::SurplusUtility { node: node.id() });
        }
    }
    for node in diagram.value().iter().copied() {
        let tensor = utilities
            .get(&node)
            .ok_or(ParameterValidationError::MissingUtility { node: node.id() })?;

        let expected = diagram.state_counts(diagram.info_set(node));
        if tensor.shape() != expected.as_slice() {
            return Err(ParameterValidationError::UtilityShape {
                node: node.id(),
                found: tensor.shape().to_vec(),
                expected,
            });
        }
    }
    Ok(())
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
