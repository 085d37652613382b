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

//! This module provides the dense tensor used to hold the conditional
//! probabilities of chance nodes and the conditional utilities of value
//! nodes: a shape vector plus a flat row-major data vector, addressed with
//! 1-based state indices.

use thiserror::Error;

/// The error raised when the flat data of a tensor does not match its shape.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TensorError {
    #[error("tensor data holds {found} entries but shape {shape:?} requires {expected}")]
    DataLength {
        shape: Vec<usize>,
        expected: usize,
        found: usize,
    },
}

/// A dense tensor of `f64` entries in row-major layout. A scalar is the
/// degenerate case of an empty shape with a single entry; it is what a
/// parentless value node's utility table looks like.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl Tensor {
    /// Builds a tensor from its shape and flat row-major data, rejecting any
    /// data vector whose length is not the product of the shape.
    pub fn new(shape: Vec<usize>, data: Vec<f64>) -> Result<Self, TensorError> {
        let expected = shape.iter().product::<usize>();
        if data.len() != expected {
            return Err(TensorError::DataLength {
                found: data.len(),
                shape,
                expected,
            });
        }
        Ok(Tensor { shape, data })
    }

    /// A zero-dimensional tensor holding one entry.
    pub fn scalar(value: f64) -> Self {
        Tensor {
            shape: vec![],
            data: vec![value],
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The flat row-major view of every entry.
    pub fn values(&self) -> &[f64] {
        &self.data
    }

    /// The entry addressed by a 1-based multi-index with one component per
    /// shape dimension.
    pub fn get(&self, index: &[usize]) -> f64 {
        debug_assert_eq!(index.len(), self.shape.len());
        let flat = index
            .iter()
            .zip(self.shape.iter())
            .fold(0, |flat, (i, limit)| flat * limit + (i - 1));
        self.data[flat]
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
