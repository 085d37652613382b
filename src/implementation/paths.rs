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

//! This module provides the path enumerator: a lazy, restartable iteration
//! over the Cartesian product of per-node state ranges. The state space of
//! an influence diagram is exponential in the number of chance and decision
//! nodes, so no combination is ever materialized before it is requested;
//! the same mixed-radix scheme also serves as the flat index of the dense
//! path-probability variable family.

use crate::{Node, Path};

/// The Cartesian product of 1-based state ranges, one per node: the space of
/// all paths over a given vector of state counts.
///
/// The space itself is a cheap descriptor; [`PathSpace::iter`] starts a fresh
/// lazy enumeration every time it is called, so the space can be walked any
/// number of times (and several walks may be in flight at once).
///
/// # Examples:
/// ```
/// # use dido::PathSpace;
/// let space = PathSpace::new(vec![2, 3]);
/// assert_eq!(6, space.size());
/// assert_eq!(6, space.iter().count());
/// assert_eq!(vec![1, 1], space.iter().next().unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSpace {
    limits: Vec<usize>,
}

impl PathSpace {
    pub fn new(limits: Vec<usize>) -> Self {
        PathSpace { limits }
    }
    /// The per-node state counts this space ranges over.
    pub fn limits(&self) -> &[usize] {
        &self.limits
    }
    /// The number of paths in the space. An empty limits vector describes
    /// the space holding exactly one empty path.
    pub fn size(&self) -> usize {
        self.limits.iter().product()
    }
    /// Starts a fresh lazy enumeration of every path of the space, exactly
    /// once each, in mixed-radix (odometer) order with the last component
    /// varying fastest.
    pub fn iter(&self) -> PathIter<'_> {
        let first = if self.limits.contains(&0) {
            None
        } else {
            Some(vec![1; self.limits.len()])
        };
        PathIter {
            limits: &self.limits,
            next: first,
        }
    }
    /// The flat (mixed-radix) index of a path, consistent with the order in
    /// which [`PathSpace::iter`] produces paths.
    pub fn flatten(&self, path: &[usize]) -> usize {
        debug_assert_eq!(path.len(), self.limits.len());
        path.iter()
            .zip(self.limits.iter())
            .fold(0, |flat, (state, limit)| flat * limit + (state - 1))
    }
    /// The inverse of [`PathSpace::flatten`].
    pub fn unflatten(&self, mut index: usize) -> Path {
        let mut path = vec![1; self.limits.len()];
        for (k, limit) in self.limits.iter().enumerate().rev() {
            path[k] = index % limit + 1;
            index /= limit;
        }
        path
    }
}

impl<'a> IntoIterator for &'a PathSpace {
    type Item = Path;
    type IntoIter = PathIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One lazy walk over a [`PathSpace`]. Only the next path to emit is kept
/// in memory.
#[derive(Debug, Clone)]
pub struct PathIter<'a> {
    limits: &'a [usize],
    next: Option<Path>,
}

impl Iterator for PathIter<'_> {
    type Item = Path;

    fn next(&mut self) -> Option<Path> {
        let current = self.next.take()?;
        // odometer step: bump the last component, carrying leftwards
        let mut succ = current.clone();
        for k in (0..succ.len()).rev() {
            if succ[k] < self.limits[k] {
                succ[k] += 1;
                self.next = Some(succ);
                return Some(current);
            }
            succ[k] = 1;
        }
        // every component wrapped: current was the last path of the space
        Some(current)
    }
}

/// Restricts a full path to the states of the given nodes, in the order the
/// nodes are listed. This is how a path gets projected onto an information
/// set (or onto an information set extended with the node itself) before
/// indexing a tensor or a local-strategy variable.
pub fn restrict(path: &[usize], nodes: &[Node]) -> Path {
    nodes.iter().map(|node| path[node.id() - 1]).collect()
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
