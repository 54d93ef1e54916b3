//! Topological ordering of the drainage forest.
//!
//! Replaces an O(n log n) sort with an O(n) traversal: because every cell
//! has exactly one receiver, the receiver relation is a forest rooted at the
//! sinks, and a single stack-based depth-first traversal seeded from all
//! roots visits every cell exactly once, each cell after its receiver.

use crate::error::ModelError;

/// The processing order of Braun & Willett (2013), plus the donor adjacency
/// it is built from.
///
/// Donors (the inverse of the receiver relation) are stored in compressed
/// form: `donor_start[i]..donor_start[i + 1]` indexes the slice of `donors`
/// holding the cells that drain into `i`. All buffers are reused across
/// steps; nothing persists logically because flow directions change with
/// elevation.
#[derive(Debug, Clone, Default)]
pub struct FlowStack {
    donor_start: Vec<usize>,
    donor_cursor: Vec<usize>,
    donors: Vec<usize>,
    order: Vec<usize>,
    pending: Vec<usize>,
}

impl FlowStack {
    /// Create an empty stack; buffers grow on first rebuild.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the donor adjacency and the topological order from the
    /// current receiver relation (`receivers[i] == i` marks a sink).
    ///
    /// Roots (sinks) are seeded in ascending index order and donors are
    /// pushed in ascending index order; the traversal itself is an explicit
    /// growable stack, never call-stack recursion, since large grids exceed
    /// typical recursion depth limits.
    ///
    /// The resulting order has sinks first and the most upstream cells last:
    /// reading it forward gives the downstream-to-upstream direction the
    /// incision solver needs, reading it backward gives the
    /// upstream-to-downstream direction the area pass needs.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::TopologyViolation`] if the traversal does not
    /// reach every cell, which means the receiver relation contains a cycle.
    pub fn rebuild(&mut self, receivers: &[usize]) -> Result<(), ModelError> {
        let n = receivers.len();

        // Donor counts, shifted by one for the prefix sum
        self.donor_start.clear();
        self.donor_start.resize(n + 1, 0);
        for (i, &r) in receivers.iter().enumerate() {
            if r != i {
                self.donor_start[r + 1] += 1;
            }
        }
        for i in 1..=n {
            self.donor_start[i] += self.donor_start[i - 1];
        }

        // Scatter donors into their slots, ascending index order per receiver
        self.donor_cursor.clear();
        self.donor_cursor.extend_from_slice(&self.donor_start[..n]);
        self.donors.resize(self.donor_start[n], 0);
        for (i, &r) in receivers.iter().enumerate() {
            if r != i {
                self.donors[self.donor_cursor[r]] = i;
                self.donor_cursor[r] += 1;
            }
        }

        // Depth-first traversal from all sinks
        self.order.clear();
        self.order.reserve(n);
        self.pending.clear();
        for (i, &r) in receivers.iter().enumerate() {
            if r == i {
                self.pending.push(i);
            }
        }
        while let Some(cell) = self.pending.pop() {
            self.order.push(cell);
            let donors = &self.donors[self.donor_start[cell]..self.donor_start[cell + 1]];
            self.pending.extend_from_slice(donors);
        }

        if self.order.len() == n {
            Ok(())
        } else {
            Err(ModelError::TopologyViolation {
                visited: self.order.len(),
                cells: n,
            })
        }
    }

    /// The topological order: sinks first, most upstream cells last.
    #[inline]
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Cells that drain directly into `index`.
    #[inline]
    pub fn donor_slice(&self, index: usize) -> &[usize] {
        &self.donors[self.donor_start[index]..self.donor_start[index + 1]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_orders_sink_first() {
        // 2 drains into 1 drains into 0
        let mut stack = FlowStack::new();
        stack.rebuild(&[0, 0, 1]).unwrap();
        assert_eq!(stack.order(), &[0, 1, 2]);
        assert_eq!(stack.donor_slice(0), &[1]);
        assert_eq!(stack.donor_slice(1), &[2]);
        assert!(stack.donor_slice(2).is_empty());
    }

    #[test]
    fn every_cell_follows_its_receiver() {
        // Two trees: 0 <- {1, 2}, 3 <- {4}, plus the isolated sink 5
        let receivers = [0, 0, 0, 3, 3, 5];
        let mut stack = FlowStack::new();
        stack.rebuild(&receivers).unwrap();

        let order = stack.order();
        assert_eq!(order.len(), receivers.len());
        let mut position = vec![0; order.len()];
        for (pos, &cell) in order.iter().enumerate() {
            position[cell] = pos;
        }
        for (i, &r) in receivers.iter().enumerate() {
            if r != i {
                assert!(
                    position[r] < position[i],
                    "cell {i} ordered before its receiver {r}"
                );
            }
        }
    }

    #[test]
    fn rebuild_resets_previous_state() {
        let mut stack = FlowStack::new();
        stack.rebuild(&[0, 0, 0, 2]).unwrap();
        stack.rebuild(&[0, 0, 1]).unwrap();
        assert_eq!(stack.order(), &[0, 1, 2]);
    }

    #[test]
    fn cycle_is_detected() {
        // 0 -> 1 -> 2 -> 0 is unreachable from the only sink, 3
        let mut stack = FlowStack::new();
        let err = stack.rebuild(&[1, 2, 0, 3]).unwrap_err();
        assert_eq!(
            err,
            ModelError::TopologyViolation {
                visited: 1,
                cells: 4
            }
        );
    }
}
