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

//! This module provides the inbound instance format: the JSON shape in which
//! a `(diagram, parameters, specs)` triple reaches the engine, whether it
//! was hand-authored or produced by a random-instance generator. A raw
//! instance is plain data; everything it holds is funneled through the same
//! structural and parameter validation as programmatic construction, so an
//! invalid instance is rejected, never coerced.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    Arc, InfluenceDiagram, Node, ParameterValidationError, Parameters, Specs,
    StructuralValidationError, Tensor, TensorError,
};

/// The error raised when an instance cannot be parsed or does not validate.
#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("malformed instance: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Structure(#[from] StructuralValidationError),
    #[error(transparent)]
    Parameters(#[from] ParameterValidationError),
    #[error("tensor of node {node}: {source}")]
    Tensor { node: usize, source: TensorError },
}

/// One serialized tensor: the node it parameterizes, its shape, and its flat
/// row-major data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTensor {
    pub node: usize,
    pub shape: Vec<usize>,
    pub data: Vec<f64>,
}

/// One serialized instance, mirroring the arguments of
/// [`InfluenceDiagram::new`] and [`Parameters::new`] in plain-data form.
/// The `specs` field may be omitted and defaults to everything off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInstance {
    pub chance: Vec<usize>,
    pub decision: Vec<usize>,
    pub value: Vec<usize>,
    pub arcs: Vec<(usize, usize)>,
    pub states: Vec<usize>,
    pub probabilities: Vec<RawTensor>,
    pub utilities: Vec<RawTensor>,
    #[serde(default)]
    pub specs: Specs,
}

impl RawInstance {
    /// Parses an instance from its JSON rendition. Parsing performs no
    /// semantic validation; see [`RawInstance::validate`].
    pub fn from_json(text: &str) -> Result<Self, InstanceError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serializes the instance back to JSON.
    pub fn to_json(&self) -> Result<String, InstanceError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Validates the raw data and turns it into the engine's construction
    /// types. Any structural, tensor or parameter violation surfaces as the
    /// corresponding validation error; no partially validated triple is
    /// ever returned.
    pub fn validate(self) -> Result<(InfluenceDiagram, Parameters, Specs), InstanceError> {
        let diagram = InfluenceDiagram::new(
            to_nodes(self.chance),
            to_nodes(self.decision),
            to_nodes(self.value),
            self.arcs
                .into_iter()
                .map(|(from, to)| Arc::new(Node(from), Node(to)))
                .collect(),
            self.states,
        )?;
        let probabilities = to_tensors(self.probabilities)?;
        let utilities = to_tensors(self.utilities)?;
        let params = Parameters::new(&diagram, probabilities, utilities)?;
        Ok((diagram, params, self.specs))
    }
}

fn to_nodes(ids: Vec<usize>) -> Vec<Node> {
    ids.into_iter().map(Node).collect()
}

fn to_tensors(raw: Vec<RawTensor>) -> Result<Vec<(Node, Tensor)>, InstanceError> {
    raw.into_iter()
        .map(|tensor| {
            let node = tensor.node;
            let built = Tensor::new(tensor.shape, tensor.data)
                .map_err(|source| InstanceError::Tensor { node, source })?;
            Ok((Node(node), built))
        })
        .collect()
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
